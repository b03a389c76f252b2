//! Item-neighbor scoring with popularity fallback

use crate::core::config::ItemScorerKind;
use crate::core::types::{Token, TokenSet};
use crate::scoring::{CandidateScorer, ScoreMap, ScoringContext};
use crate::stats::{CooccurrenceTable, ItemStats, Popularity};

/// Co-occurrence statistic used to score partners of known tokens
#[derive(Debug, Clone, Copy)]
pub enum ItemMethod<'a> {
    Jaccard(&'a CooccurrenceTable),
    Pmi(&'a ItemStats),
}

impl<'a> ItemMethod<'a> {
    pub fn select(kind: ItemScorerKind, table: &'a CooccurrenceTable, stats: &'a ItemStats) -> Self {
        match kind {
            ItemScorerKind::Jaccard => ItemMethod::Jaccard(table),
            ItemScorerKind::Pmi => ItemMethod::Pmi(stats),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ItemNeighborScorer<'a> {
    pub method: ItemMethod<'a>,
    pub popularity: &'a Popularity,
}

impl<'a> ItemNeighborScorer<'a> {
    pub fn new(method: ItemMethod<'a>, popularity: &'a Popularity) -> Self {
        Self { method, popularity }
    }

    /// Scores from the co-occurrence statistic alone, without fallback
    pub fn raw_scores(&self, known: &TokenSet) -> ScoreMap {
        match self.method {
            ItemMethod::Jaccard(table) => table.jaccard_scores(known),
            ItemMethod::Pmi(stats) => stats.pmi_scores(known),
        }
    }

    /// True when `known` gives the statistic nothing to work with
    pub fn needs_fallback(&self, known: &TokenSet) -> bool {
        known.is_empty() || self.raw_scores(known).is_empty()
    }

    /// Top `k` unowned tokens, falling back to popularity
    pub fn recommend(&self, known: &TokenSet, k: usize) -> Vec<Token> {
        self.score(known, &ScoringContext::default()).top_k(k)
    }
}

impl CandidateScorer for ItemNeighborScorer<'_> {
    fn name(&self) -> &'static str {
        "itemknn"
    }

    fn score(&self, known: &TokenSet, _ctx: &ScoringContext<'_>) -> ScoreMap {
        if known.is_empty() {
            return self.popularity.scores(known);
        }
        let scores = self.raw_scores(known);
        if scores.is_empty() {
            tracing::trace!(known = known.len(), "No co-occurring candidates; using popularity");
            return self.popularity.scores(known);
        }
        scores
    }
}
