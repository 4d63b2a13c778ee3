//! Dense vector helpers.

/// Denominator used in place of a zero norm when normalizing.
pub const NORM_EPSILON: f64 = 1e-10;

/// Dot product over the shared prefix of two vectors.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Euclidean norm.
pub fn norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

/// Cosine similarity; zero when either vector has zero norm.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let denominator = norm(a) * norm(b);
    if denominator == 0.0 {
        return 0.0;
    }
    dot(a, b) / denominator
}

/// Scales a vector to unit length, dividing by [`NORM_EPSILON`] when the norm is zero.
pub fn normalize(v: &[f64]) -> Vec<f64> {
    let n = norm(v);
    let denominator = if n == 0.0 { NORM_EPSILON } else { n };
    v.iter().map(|x| x / denominator).collect()
}

/// Returns true if every entry is zero.
pub fn is_zero(v: &[f64]) -> bool {
    v.iter().all(|x| *x == 0.0)
}
