//! Row-aware hybrid recommender for one field
//!
//! Blends three signals: membership in the item-neighbor candidate pool,
//! votes from narratively similar rows, and the global popularity prior.
//! Owned tokens are dropped and the heavy-armor nudge applied before ranking.

use crate::blend::{blend, rank_blended, RankedCandidate};
use crate::core::config::RecommendConfig;
use crate::core::types::{RowId, Token, TokenSet, Weights};
use crate::eval::{loo_eval_rowwise, EvalReport};
use crate::pipeline::export::Explanation;
use crate::pipeline::field::FieldModel;
use crate::rules::HeavyArmorNudge;
use crate::scoring::{CandidateScorer, ItemNeighborScorer, NarrativeScorer, PriorScorer, ScoreMap, ScoringContext};
use crate::text::NeighborTable;

/// Score of every member of the item-neighbor candidate pool
pub const ITEM_POOL_SCORE: f64 = 2.0;

/// Flat [`ITEM_POOL_SCORE`] for every token in the top `pool` item-neighbor candidates.
///
/// An empty known set gives no item signal at all, so the popularity
/// fallback is not counted twice alongside the prior.
pub fn item_pool_signal(scorer: &ItemNeighborScorer<'_>, known: &TokenSet, pool: usize) -> ScoreMap {
    if known.is_empty() {
        return ScoreMap::new();
    }
    scorer
        .recommend(known, pool)
        .into_iter()
        .map(|token| (token, ITEM_POOL_SCORE))
        .collect()
}

/// Hybrid recommender bound to one field and one weight vector
pub struct HybridRecommender<'a> {
    pub model: &'a FieldModel,
    pub neighbors: &'a NeighborTable,
    /// Primary class of every row, indexed by row id
    pub primary_classes: &'a [Option<String>],
    pub nudge: &'a HeavyArmorNudge,
    pub config: &'a RecommendConfig,
    pub weights: Weights,
}

impl<'a> HybridRecommender<'a> {
    fn primary_class(&self, row: RowId) -> Option<&'a str> {
        self.primary_classes.get(row).and_then(|c| c.as_deref())
    }

    /// Ranked candidates for `row`, treating `known` as its owned tokens
    pub fn rank(&self, row: RowId, known: &TokenSet, k: usize) -> Vec<RankedCandidate> {
        let primary = self.primary_class(row);
        let ctx = ScoringContext::for_row(row).with_primary_class(primary);

        let item_scorer = self.model.item_scorer(self.config.item_scorer);
        let narrative = NarrativeScorer {
            neighbors: self.neighbors,
            sets: &self.model.sets,
            top_n: self.config.narrative_neighbors,
        };
        let prior = PriorScorer {
            prior: &self.model.prior,
        };

        let item_scores = item_pool_signal(&item_scorer, known, self.config.item_pool_size);
        let narrative_scores = narrative.score(known, &ctx);
        let prior_scores = prior.score(known, &ctx);

        let (scores, attribution) = blend(
            &[
                (item_scorer.name(), &item_scores),
                (narrative.name(), &narrative_scores),
                (prior.name(), &prior_scores),
            ],
            self.weights.as_slice(),
        );

        rank_blended(
            scores,
            &attribution,
            known,
            |candidates| self.nudge.penalties(ctx.primary_class, candidates.tokens()),
            k,
        )
    }

    /// Top `k` tokens for `row` given a reduced known set
    pub fn top_tokens(&self, row: RowId, known: &TokenSet, k: usize) -> Vec<Token> {
        self.rank(row, known, k).into_iter().map(|c| c.token).collect()
    }

    /// Recommendations and explanations for `row` using its full token set
    pub fn recommend(&self, row: RowId, k: usize) -> (Vec<Token>, Vec<Explanation>) {
        let empty = TokenSet::new();
        let known = self.model.sets.get(row).unwrap_or(&empty);
        let ranked = self.rank(row, known, k);
        let primary = self.primary_class(row);
        let details = ranked
            .iter()
            .map(|c| Explanation::new(row, self.model.field.key(), c, primary))
            .collect();
        (ranked.into_iter().map(|c| c.token).collect(), details)
    }

    /// Row-aware leave-one-out evaluation over every row
    pub fn evaluate(&self) -> EvalReport {
        loo_eval_rowwise(
            &self.model.sets,
            |row, known, k| self.top_tokens(row, known, k),
            self.config.top_k,
            self.config.seed,
        )
    }
}
