//! Leave-one-out harness
//!
//! For every row with at least one token, one token is held out, the
//! recommender sees the remainder, and the held-out token is looked up in
//! its top-k. The held-out token is drawn from a per-row random stream, so a
//! given seed selects the same targets no matter how rows are scheduled.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::types::{RowId, Token, TokenSet};
use crate::eval::metrics::{mrr_at_k, recall_at_k};

/// Mean Recall@k and MRR@k over the rows that could be evaluated
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EvalReport {
    pub recall: f64,
    pub mrr: f64,
    /// Rows that contributed; rows with empty sets are excluded
    pub evaluated: usize,
}

impl EvalReport {
    fn from_hits(hits: &[(f64, f64)]) -> Self {
        if hits.is_empty() {
            return Self::default();
        }
        let n = hits.len() as f64;
        Self {
            recall: hits.iter().map(|(r, _)| r).sum::<f64>() / n,
            mrr: hits.iter().map(|(_, m)| m).sum::<f64>() / n,
            evaluated: hits.len(),
        }
    }

    pub fn summary(&self) -> String {
        format!("recall={:.3} mrr={:.3} n={}", self.recall, self.mrr, self.evaluated)
    }
}

/// Token held out of `set` when evaluating position `row`; `None` for an empty set
pub fn held_out_target(set: &TokenSet, seed: u64, row: usize) -> Option<Token> {
    if set.is_empty() {
        return None;
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(row as u64);
    set.iter().nth(rng.gen_range(0..set.len())).cloned()
}

fn evaluate<F>(sets: &[TokenSet], k: usize, seed: u64, recommend: F) -> EvalReport
where
    F: Fn(RowId, &TokenSet, usize) -> Vec<Token> + Sync,
{
    let hits: Vec<(f64, f64)> = sets
        .par_iter()
        .enumerate()
        .filter_map(|(row, set)| {
            let target = held_out_target(set, seed, row)?;
            let mut known = set.clone();
            known.remove(&target);
            let recs = recommend(row, &known, k);
            Some((recall_at_k(&recs, &target, k), mrr_at_k(&recs, &target, k)))
        })
        .collect();

    EvalReport::from_hits(&hits)
}

/// Evaluate a recommender that only needs the known set
pub fn loo_eval_per_field<F>(sets: &[TokenSet], recommend: F, k: usize, seed: u64) -> EvalReport
where
    F: Fn(&TokenSet, usize) -> Vec<Token> + Sync,
{
    evaluate(sets, k, seed, |_, known, k| recommend(known, k))
}

/// Evaluate a recommender that also needs the row being evaluated.
///
/// `sets` must be indexed by row id.
pub fn loo_eval_rowwise<F>(sets: &[TokenSet], recommend: F, k: usize, seed: u64) -> EvalReport
where
    F: Fn(RowId, &TokenSet, usize) -> Vec<Token> + Sync,
{
    evaluate(sets, k, seed, recommend)
}
