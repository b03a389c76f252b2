use crate::core::types::TokenSet;
use crate::scoring::{CandidateScorer, ScoreMap, ScoringContext};
use crate::stats::Popularity;

/// Training-split popularity, excluding owned tokens
#[derive(Debug, Clone, Copy)]
pub struct PopularityScorer<'a> {
    pub popularity: &'a Popularity,
}

impl CandidateScorer for PopularityScorer<'_> {
    fn name(&self) -> &'static str {
        "popularity"
    }

    fn score(&self, known: &TokenSet, _ctx: &ScoringContext<'_>) -> ScoreMap {
        self.popularity.scores(known)
    }
}

/// Global popularity prior over every observed token.
///
/// Owned tokens are left in; the blender drops them after combining sources.
#[derive(Debug, Clone, Copy)]
pub struct PriorScorer<'a> {
    pub prior: &'a ScoreMap,
}

impl CandidateScorer for PriorScorer<'_> {
    fn name(&self) -> &'static str {
        "popularity"
    }

    fn score(&self, _known: &TokenSet, _ctx: &ScoringContext<'_>) -> ScoreMap {
        self.prior.clone()
    }
}
