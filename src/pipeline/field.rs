//! Per-field statistics and baseline evaluation

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{ItemScorerKind, RecommendConfig};
use crate::core::types::{Field, TokenSet};
use crate::data::Dataset;
use crate::eval::{loo_eval_per_field, EvalReport};
use crate::scoring::{CandidateScorer, ItemMethod, ItemNeighborScorer, PopularityScorer, ScoreMap, ScoringContext};
use crate::stats::{popularity_prior, CooccurrenceTable, ItemStats, Popularity};

/// Shuffle rows with `seed` and cut at `fraction` (rounded down)
pub fn train_test_split(sets: &[TokenSet], fraction: f64, seed: u64) -> (Vec<TokenSet>, Vec<TokenSet>) {
    let mut order: Vec<usize> = (0..sets.len()).collect();
    order.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
    let cut = ((sets.len() as f64) * fraction).floor() as usize;
    let pick = |ids: &[usize]| ids.iter().map(|&i| sets[i].clone()).collect::<Vec<_>>();
    (pick(&order[..cut]), pick(&order[cut..]))
}

/// Statistics for one field.
///
/// Baseline statistics come from the training split only; the prior and the
/// row-indexed sets used by the hybrid cover every row.
#[derive(Debug, Clone)]
pub struct FieldModel {
    pub field: Field,
    /// Token set of every row, indexed by row id
    pub sets: Vec<TokenSet>,
    pub train: Vec<TokenSet>,
    pub test: Vec<TokenSet>,
    pub popularity: Popularity,
    pub cooccurrence: CooccurrenceTable,
    pub item_stats: ItemStats,
    pub prior: ScoreMap,
}

impl FieldModel {
    pub fn build(dataset: &Dataset, field: Field, config: &RecommendConfig) -> Self {
        let sets = dataset.field_sets(field);
        let (train, test) = train_test_split(&sets, config.train_fraction, config.seed);

        let popularity = Popularity::from_sets(&train, config.popularity_list_size);
        let cooccurrence = CooccurrenceTable::build(&train, config.max_set_size);
        let item_stats = ItemStats::build(&train, config.max_set_size);
        let prior = popularity_prior(&sets);

        tracing::debug!(
            %field,
            train = train.len(),
            test = test.len(),
            vocabulary = prior.len(),
            "Built field statistics"
        );

        Self {
            field,
            sets,
            train,
            test,
            popularity,
            cooccurrence,
            item_stats,
            prior,
        }
    }

    pub fn item_scorer(&self, kind: ItemScorerKind) -> ItemNeighborScorer<'_> {
        ItemNeighborScorer::new(
            ItemMethod::select(kind, &self.cooccurrence, &self.item_stats),
            &self.popularity,
        )
    }

    pub fn popularity_scorer(&self) -> PopularityScorer<'_> {
        PopularityScorer {
            popularity: &self.popularity,
        }
    }

    /// Evaluate the popularity and item-neighbor baselines on the test split
    pub fn evaluate_baselines(&self, k: usize, seed: u64) -> BaselineReport {
        let ctx = ScoringContext::default();
        let popularity = self.popularity_scorer();
        let popularity = loo_eval_per_field(&self.test, |known, k| popularity.score(known, &ctx).top_k(k), k, seed);
        let jaccard = self.item_scorer(ItemScorerKind::Jaccard);
        let jaccard = loo_eval_per_field(&self.test, |known, k| jaccard.recommend(known, k), k, seed);
        let pmi = self.item_scorer(ItemScorerKind::Pmi);
        let pmi = loo_eval_per_field(&self.test, |known, k| pmi.recommend(known, k), k, seed);

        let nonempty = self.sets.iter().filter(|s| !s.is_empty()).count();
        let total: usize = self.sets.iter().map(TokenSet::len).sum();

        BaselineReport {
            field: self.field,
            rows: self.sets.len(),
            nonempty,
            avg_len: total as f64 / self.sets.len().max(1) as f64,
            k,
            popularity,
            jaccard,
            pmi,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineReport {
    pub field: Field,
    pub rows: usize,
    pub nonempty: usize,
    pub avg_len: f64,
    pub k: usize,
    pub popularity: EvalReport,
    pub jaccard: EvalReport,
    pub pmi: EvalReport,
}

impl BaselineReport {
    pub fn summary(&self) -> String {
        let line = |name: &str, r: &EvalReport| {
            format!(
                "{:8}    {:8} R@{k}:{:.3} MRR@{k}:{:.3} (n={})",
                "",
                name,
                r.recall,
                r.mrr,
                r.evaluated,
                k = self.k
            )
        };
        [
            format!(
                "[{}] rows={} nonempty={} avg_len={:.2}",
                self.field, self.rows, self.nonempty, self.avg_len
            ),
            line("Pop", &self.popularity),
            line("ItemKNN", &self.jaccard),
            line("PMI", &self.pmi),
        ]
        .join("\n")
    }
}
