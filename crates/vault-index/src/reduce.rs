//! Truncated singular value decomposition.
//!
//! The decomposition is computed exactly from the eigen-decomposition of the smaller of
//! the two Gram matrices, `A·Aᵀ` (documents × documents) or `Aᵀ·A` (terms × terms), using
//! cyclic Jacobi rotations. Catalog corpora are small, so this stays cheap, and the
//! result depends only on the matrix, which keeps rebuilds reproducible.

use serde::{Deserialize, Serialize};

use crate::vector::{dot, normalize};

/// Singular values at or below this are treated as zero.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Upper bound on Jacobi sweeps.
const MAX_SWEEPS: usize = 100;

/// Rank actually used for a reduction.
///
/// `max(1, min(requested, documents - 1, vocabulary - 1))`.
pub fn effective_rank(requested: usize, documents: usize, vocabulary: usize) -> usize {
    requested
        .min(documents.saturating_sub(1))
        .min(vocabulary.saturating_sub(1))
        .max(1)
}

/// A learned linear map from term space into a `k`-dimensional space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Number of output components.
    components: usize,
    /// Singular values, descending.
    singular_values: Vec<f64>,
    /// Row per vocabulary term, one column per component.
    basis: Vec<Vec<f64>>,
}

impl Projection {
    /// Fits a rank-`requested` projection to a documents × terms matrix.
    ///
    /// The rank is clamped with [`effective_rank`]. Components whose singular value is
    /// zero project everything onto zero.
    pub fn fit(matrix: &[Vec<f64>], requested: usize) -> Self {
        let documents = matrix.len();
        let terms = matrix.first().map_or(0, Vec::len);
        let k = effective_rank(requested, documents, terms);

        let (values, term_vectors) = if documents <= terms {
            right_vectors_from_document_gram(matrix, terms)
        } else {
            right_vectors_from_term_gram(matrix, terms)
        };

        let mut basis = vec![vec![0.0; k]; terms];
        let mut singular_values = Vec::with_capacity(k);
        for component in 0..k {
            let sigma = values.get(component).copied().unwrap_or(0.0).max(0.0).sqrt();
            singular_values.push(sigma);
            if sigma <= SINGULAR_EPSILON {
                continue;
            }
            if let Some(column) = term_vectors.get(component) {
                for (row, value) in basis.iter_mut().zip(column) {
                    row[component] = *value;
                }
            }
        }

        Self {
            components: k,
            singular_values,
            basis,
        }
    }

    /// Number of output components.
    pub fn components(&self) -> usize {
        self.components
    }

    /// Number of input terms.
    pub fn input_dimension(&self) -> usize {
        self.basis.len()
    }

    /// Singular values of the kept components, descending.
    pub fn singular_values(&self) -> &[f64] {
        &self.singular_values
    }

    /// Projects a term-space vector.
    pub fn project(&self, vector: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.components];
        for (weight, row) in vector.iter().zip(&self.basis) {
            if *weight == 0.0 {
                continue;
            }
            for (acc, b) in out.iter_mut().zip(row) {
                *acc += weight * b;
            }
        }
        out
    }

    /// Projects and normalizes a term-space vector.
    pub fn embed(&self, vector: &[f64]) -> Vec<f64> {
        normalize(&self.project(vector))
    }
}

/// Eigenpairs of `A·Aᵀ`, mapped to right singular vectors `v = Aᵀu / σ`.
fn right_vectors_from_document_gram(matrix: &[Vec<f64>], terms: usize) -> (Vec<f64>, Vec<Vec<f64>>) {
    let gram: Vec<Vec<f64>> = matrix
        .iter()
        .map(|a| matrix.iter().map(|b| dot(a, b)).collect())
        .collect();
    let (values, vectors) = sorted_eigen(gram);

    let mapped = values
        .iter()
        .zip(&vectors)
        .map(|(value, u)| {
            let sigma = value.max(0.0).sqrt();
            if sigma <= SINGULAR_EPSILON {
                return vec![0.0; terms];
            }
            let mut v = vec![0.0; terms];
            for (weight, row) in u.iter().zip(matrix) {
                for (acc, a) in v.iter_mut().zip(row) {
                    *acc += weight * a;
                }
            }
            let v: Vec<f64> = v.into_iter().map(|x| x / sigma).collect();
            fix_sign(v)
        })
        .collect();
    (values, mapped)
}

/// Eigenpairs of `Aᵀ·A`, whose eigenvectors are the right singular vectors.
fn right_vectors_from_term_gram(matrix: &[Vec<f64>], terms: usize) -> (Vec<f64>, Vec<Vec<f64>>) {
    let mut gram = vec![vec![0.0; terms]; terms];
    for row in matrix {
        for (i, a) in row.iter().enumerate() {
            if *a == 0.0 {
                continue;
            }
            for (j, b) in row.iter().enumerate() {
                gram[i][j] += a * b;
            }
        }
    }
    let (values, vectors) = sorted_eigen(gram);
    (values, vectors.into_iter().map(fix_sign).collect())
}

/// Flips a vector so its largest-magnitude entry (first on ties) is positive.
fn fix_sign(v: Vec<f64>) -> Vec<f64> {
    let pivot = v
        .iter()
        .copied()
        .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
    if pivot < 0.0 {
        v.into_iter().map(|x| -x).collect()
    } else {
        v
    }
}

/// Eigen-decomposition of a symmetric matrix, eigenvalues descending.
///
/// Returns the eigenvalues and the matching unit eigenvectors.
fn sorted_eigen(matrix: Vec<Vec<f64>>) -> (Vec<f64>, Vec<Vec<f64>>) {
    let (values, vectors) = jacobi_eigen(matrix);
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]).then(a.cmp(&b)));

    let sorted_values = order.iter().map(|&i| values[i]).collect();
    let sorted_vectors = order
        .iter()
        .map(|&col| vectors.iter().map(|row| row[col]).collect())
        .collect();
    (sorted_values, sorted_vectors)
}

/// Cyclic Jacobi eigenvalue iteration.
///
/// Returns the diagonal after convergence and the accumulated rotation matrix, whose
/// columns are the eigenvectors.
fn jacobi_eigen(mut matrix: Vec<Vec<f64>>) -> (Vec<f64>, Vec<Vec<f64>>) {
    let size = matrix.len();
    let mut rotation: Vec<Vec<f64>> = (0..size)
        .map(|i| (0..size).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    let total: f64 = matrix.iter().flatten().map(|x| x * x).sum();
    let tolerance = total * f64::EPSILON * f64::EPSILON;

    for _ in 0..MAX_SWEEPS {
        let off: f64 = (0..size)
            .flat_map(|p| ((p + 1)..size).map(move |q| (p, q)))
            .map(|(p, q)| matrix[p][q] * matrix[p][q])
            .sum();
        if off <= tolerance {
            break;
        }

        for p in 0..size {
            for q in (p + 1)..size {
                rotate(&mut matrix, &mut rotation, p, q);
            }
        }
    }

    let values = (0..size).map(|i| matrix[i][i]).collect();
    (values, rotation)
}

/// Applies the Jacobi rotation that zeroes `matrix[p][q]`.
fn rotate(matrix: &mut [Vec<f64>], rotation: &mut [Vec<f64>], p: usize, q: usize) {
    let apq = matrix[p][q];
    if apq == 0.0 {
        return;
    }
    let theta = (matrix[q][q] - matrix[p][p]) / (2.0 * apq);
    let tan = theta.signum() / (theta.abs() + theta.mul_add(theta, 1.0).sqrt());
    let cos = 1.0 / tan.mul_add(tan, 1.0).sqrt();
    let sin = tan * cos;

    for row in matrix.iter_mut().chain(rotation.iter_mut()) {
        let (kp, kq) = (row[p], row[q]);
        row[p] = cos * kp - sin * kq;
        row[q] = sin * kp + cos * kq;
    }
    for col in 0..matrix.len() {
        let (pk, qk) = (matrix[p][col], matrix[q][col]);
        matrix[p][col] = cos * pk - sin * qk;
        matrix[q][col] = sin * pk + cos * qk;
    }
}
