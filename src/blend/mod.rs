//! Weighted blending of scorer outputs with per-source attribution
//!
//! The blended score of a token is the weighted sum of its score in every
//! source (0 where a source has no entry). Attribution keeps each weighted
//! term so that a token's contributions always add up to its blended score.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{Token, TokenSet};
use crate::rules::{apply_penalties, PenaltyMap};
use crate::scoring::ScoreMap;

/// Per-token, per-source weighted contribution
pub type Attribution = AHashMap<Token, BTreeMap<String, f64>>;

/// Blend named score maps. Sources beyond the last weight are ignored.
pub fn blend(parts: &[(&str, &ScoreMap)], weights: &[f64]) -> (ScoreMap, Attribution) {
    let mut scores = ScoreMap::new();
    let mut attribution = Attribution::new();

    for ((source, part), &weight) in parts.iter().zip(weights) {
        for (token, value) in part.iter() {
            let contribution = weight * value;
            scores.add(token, contribution);
            *attribution
                .entry(token.to_string())
                .or_default()
                .entry(source.to_string())
                .or_insert(0.0) += contribution;
        }
    }

    (scores, attribution)
}

/// One ranked candidate with the pieces of its final score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub token: Token,
    /// Blended score plus penalty
    pub score: f64,
    pub contributions: BTreeMap<String, f64>,
    pub penalty: f64,
}

/// Finish a blend: drop owned tokens, apply penalties, rank and keep the top `k`.
///
/// `penalize` sees the candidates that survive owned-token removal. NaN
/// scores are dropped; ties keep the order in which tokens were first scored.
pub fn rank_blended(
    mut scores: ScoreMap,
    attribution: &Attribution,
    owned: &TokenSet,
    penalize: impl FnOnce(&ScoreMap) -> PenaltyMap,
    k: usize,
) -> Vec<RankedCandidate> {
    scores.remove_owned(owned);
    let penalties = penalize(&scores);
    apply_penalties(&mut scores, &penalties);

    scores
        .ranked()
        .into_iter()
        .take(k)
        .map(|(token, score)| RankedCandidate {
            contributions: attribution.get(&token).cloned().unwrap_or_default(),
            penalty: penalties.get(&token).copied().unwrap_or(0.0),
            token,
            score,
        })
        .collect()
}
