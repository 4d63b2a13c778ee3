//! Ranking a query plan against a snapshot.

use serde::Serialize;
use tracing::trace;

use crate::{IndexError, plan::QueryPlan, snapshot::Snapshot};

/// Score given to documents returned without ranking.
pub const UNSCORED: f64 = 1.0;

/// One ranked document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hit {
    /// Position of the document in the corpus.
    pub position: usize,
    /// Similarity to the query, in `[0, 1]` for every strategy.
    pub score: f64,
}

/// Ranks the documents of a snapshot against a query plan.
///
/// Documents failing a constraint are never returned. When the plan carries weight,
/// the remaining documents are scored, those below `threshold` are dropped and the rest
/// are sorted by descending score with ties in corpus order. When the plan carries no
/// weight, or none of its terms are known to the index, every remaining document is
/// returned with score [`UNSCORED`] in corpus order.
pub fn search(
    snapshot: &Snapshot,
    plan: &QueryPlan,
    threshold: f64,
) -> Result<Vec<Hit>, IndexError> {
    if snapshot.is_empty() {
        return Ok(Vec::new());
    }

    let candidates = snapshot
        .documents()
        .iter()
        .enumerate()
        .filter(|(_, doc)| plan.accepts(doc))
        .map(|(position, _)| position);

    let scores = if plan.terms().is_empty() {
        None
    } else {
        snapshot.index().similarities(plan.terms())?
    };
    let Some(scores) = scores else {
        trace!(query = plan.query(), "query carries no weight, returning unscored");
        return Ok(candidates
            .map(|position| Hit {
                position,
                score: UNSCORED,
            })
            .collect());
    };

    let mut hits: Vec<Hit> = candidates
        .filter_map(|position| {
            let score = scores.get(position).copied().unwrap_or(0.0);
            (score >= threshold).then_some(Hit { position, score })
        })
        .collect();
    // Stable, so equal scores keep corpus order.
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(hits)
}
