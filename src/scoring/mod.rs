//! Candidate scorers
//!
//! Each scorer maps a character's known tokens to scores for candidate
//! tokens. Scorers only read shared statistics, so one instance can serve
//! many rows concurrently.

pub mod item_neighbor;
pub mod narrative;
pub mod popularity;
pub mod score_map;

pub use item_neighbor::{ItemMethod, ItemNeighborScorer};
pub use narrative::NarrativeScorer;
pub use popularity::{PopularityScorer, PriorScorer};
pub use score_map::{remove_duplicates, ScoreMap};

use crate::core::types::{RowId, TokenSet};

/// Per-call information beyond the known set
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringContext<'a> {
    /// Row being scored; required by scorers that look at neighboring rows
    pub row_id: Option<RowId>,
    pub primary_class: Option<&'a str>,
}

impl<'a> ScoringContext<'a> {
    pub fn for_row(row_id: RowId) -> Self {
        Self {
            row_id: Some(row_id),
            primary_class: None,
        }
    }

    pub fn with_primary_class(mut self, primary_class: Option<&'a str>) -> Self {
        self.primary_class = primary_class;
        self
    }
}

pub trait CandidateScorer: Sync {
    /// Source name used in score attribution
    fn name(&self) -> &'static str;

    fn score(&self, known: &TokenSet, ctx: &ScoringContext<'_>) -> ScoreMap;
}
