use crate::core::types::TokenSet;
use crate::scoring::{CandidateScorer, ScoreMap, ScoringContext};
use crate::text::NeighborTable;

/// Votes from the token sets of narratively similar rows.
///
/// Each neighbor adds its similarity to every token it owns that the scored
/// character does not. Needs `ctx.row_id`; without a row there are no votes.
#[derive(Debug, Clone, Copy)]
pub struct NarrativeScorer<'a> {
    pub neighbors: &'a NeighborTable,
    /// Token sets of every row, indexed by row id
    pub sets: &'a [TokenSet],
    pub top_n: usize,
}

impl CandidateScorer for NarrativeScorer<'_> {
    fn name(&self) -> &'static str {
        "narrative"
    }

    fn score(&self, known: &TokenSet, ctx: &ScoringContext<'_>) -> ScoreMap {
        let mut votes = ScoreMap::new();
        let Some(row) = ctx.row_id else {
            return votes;
        };

        for &(neighbor, similarity) in self.neighbors.neighbors(row, self.top_n) {
            if similarity <= 0.0 {
                continue;
            }
            let Some(tokens) = self.sets.get(neighbor) else {
                continue;
            };
            for token in tokens.iter().filter(|t| !known.contains(*t)) {
                votes.add(token, similarity);
            }
        }
        votes
    }
}
