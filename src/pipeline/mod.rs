//! End-to-end runs over a loaded dataset
//!
//! A [`Pipeline`] owns the dataset and the narrative neighbor table, which
//! are shared by every field and by the next-class recommender. Per-field
//! statistics are built on demand.

pub mod export;
pub mod field;
pub mod hybrid;
pub mod next_class;

pub use export::{
    write_json, CharacterRecommendation, EligibilityVerdict, Explanation, NextClassRecommendation,
};
pub use field::{train_test_split, BaselineReport, FieldModel};
pub use hybrid::{item_pool_signal, HybridRecommender};
pub use next_class::NextClassModel;

use std::collections::BTreeMap;
use std::path::Path;

use derive_more::Display;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::config::RecommenderConfig;
use crate::core::error::Result;
use crate::core::types::{Field, Weights};
use crate::data::Dataset;
use crate::eval::EvalReport;
use crate::rules::HeavyArmorNudge;
use crate::text::{NeighborTable, SimilarityIndex};
use crate::tune::{candidate_weights, tune, WeightCache};

/// Where a field's blend weights came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightSource {
    #[display(fmt = "cached")]
    Cached,
    #[display(fmt = "tuned")]
    Tuned,
    #[display(fmt = "configured")]
    Configured,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldOutcome {
    pub field: Field,
    pub weights: Weights,
    pub source: WeightSource,
    pub report: EvalReport,
}

/// Hybrid evaluation results plus the per-row export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridRun {
    pub fields: Vec<FieldOutcome>,
    pub recommendations: Vec<CharacterRecommendation>,
    pub explanations: Vec<Explanation>,
}

impl HybridRun {
    pub fn summary(&self) -> String {
        self.fields
            .iter()
            .map(|o| {
                format!(
                    "{:8} -> Hybrid  R@k:{:.3} MRR@k:{:.3} (n={}) weights={} [{}]",
                    o.field, o.report.recall, o.report.mrr, o.report.evaluated, o.weights, o.source
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn export(&self, dir: &Path) -> Result<()> {
        write_json(&dir.join(export::RECOMMENDATIONS_FILE), &self.recommendations)?;
        write_json(&dir.join(export::EXPLANATIONS_FILE), &self.explanations)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextClassRun {
    pub recommendations: Vec<NextClassRecommendation>,
    pub explanations: Vec<Explanation>,
}

impl NextClassRun {
    pub fn export(&self, dir: &Path) -> Result<()> {
        write_json(&dir.join(export::NEXT_CLASS_FILE), &self.recommendations)?;
        write_json(&dir.join(export::NEXT_CLASS_EXPLANATIONS_FILE), &self.explanations)
    }
}

pub struct Pipeline {
    pub config: RecommenderConfig,
    pub dataset: Dataset,
    pub neighbors: NeighborTable,
    pub primary_classes: Vec<Option<String>>,
    pub nudge: HeavyArmorNudge,
}

impl Pipeline {
    /// Fit the narrative index and precompute enough neighbors for every consumer
    pub fn new(dataset: Dataset, config: RecommenderConfig) -> Self {
        let index = SimilarityIndex::fit(&dataset.narratives(), &config.text);
        let depth = config.recommend.narrative_neighbors.max(config.next_class.neighbors);
        let neighbors = index.neighbor_table(depth);
        tracing::info!(
            rows = dataset.len(),
            vocabulary = index.vocabulary_size(),
            connected = neighbors.connected_rows().len(),
            "Built narrative neighbor table"
        );

        Self {
            primary_classes: dataset.primary_classes(),
            nudge: HeavyArmorNudge::from_config(&config.legality),
            neighbors,
            dataset,
            config,
        }
    }

    pub fn field_model(&self, field: Field) -> FieldModel {
        FieldModel::build(&self.dataset, field, &self.config.recommend)
    }

    pub fn hybrid<'a>(&'a self, model: &'a FieldModel, weights: Weights) -> HybridRecommender<'a> {
        HybridRecommender {
            model,
            neighbors: &self.neighbors,
            primary_classes: &self.primary_classes,
            nudge: &self.nudge,
            config: &self.config.recommend,
            weights,
        }
    }

    /// Popularity and item-neighbor baselines for every field
    pub fn baselines(&self) -> Vec<BaselineReport> {
        let r = &self.config.recommend;
        Field::ALL
            .iter()
            .map(|&field| self.field_model(field).evaluate_baselines(r.top_k, r.seed))
            .collect()
    }

    /// Cached weights unless `retune`; otherwise tune (recording the winner
    /// in `cache`) or fall back to the configured weights.
    pub fn resolve_weights(&self, model: &FieldModel, cache: &mut WeightCache, retune: bool) -> (Weights, WeightSource) {
        let field = model.field;
        if !retune {
            if let Some(weights) = cache.get(field) {
                tracing::info!(%field, %weights, "Using cached blend weights");
                return (weights, WeightSource::Cached);
            }
        }

        let configured = self.config.weights.for_field(field);
        if !self.config.tuning.enabled {
            return (configured, WeightSource::Configured);
        }

        let candidates = candidate_weights(&self.config.tuning);
        match tune(&candidates, |w| self.hybrid(model, w).evaluate()) {
            Some(outcome) => {
                tracing::info!(
                    %field,
                    weights = %outcome.weights,
                    recall = outcome.report.recall,
                    trials = outcome.trials,
                    "Tuned blend weights"
                );
                cache.insert(field, outcome.weights);
                (outcome.weights, WeightSource::Tuned)
            }
            None => (configured, WeightSource::Configured),
        }
    }

    /// Resolve weights and evaluate every field, then recommend for every row
    pub fn run_hybrid(&self, retune: bool) -> Result<HybridRun> {
        let mut cache = WeightCache::load(&self.config.tuning.cache_path);
        let models: Vec<FieldModel> = Field::ALL.iter().map(|&f| self.field_model(f)).collect();

        let mut fields = Vec::with_capacity(models.len());
        for model in &models {
            let (weights, source) = self.resolve_weights(model, &mut cache, retune);
            let report = self.hybrid(model, weights).evaluate();
            tracing::info!(field = %model.field, %source, "Hybrid {}", report.summary());
            fields.push(FieldOutcome {
                field: model.field,
                weights,
                source,
                report,
            });
        }
        if fields.iter().any(|o| o.source == WeightSource::Tuned) {
            cache.save()?;
        }

        let hybrids: Vec<HybridRecommender<'_>> = models
            .iter()
            .zip(&fields)
            .map(|(model, outcome)| self.hybrid(model, outcome.weights))
            .collect();
        let k = self.config.recommend.top_k;

        let per_row: Vec<(CharacterRecommendation, Vec<Explanation>)> = self
            .dataset
            .rows
            .par_iter()
            .map(|character| {
                let row = character.row_id;
                let mut top = BTreeMap::new();
                let mut details = Vec::new();
                for hybrid in &hybrids {
                    let (items, explained) = hybrid.recommend(row, k);
                    top.insert(format!("top_{}", hybrid.model.field.key()), items);
                    details.extend(explained);
                }
                let recommendation = CharacterRecommendation {
                    row_id: row,
                    primary_class: character.primary_class().map(str::to_string),
                    primary_subclass: character.primary().and_then(|c| c.subclass.clone()),
                    top,
                };
                (recommendation, details)
            })
            .collect();

        let (recommendations, explanations): (Vec<_>, Vec<_>) = per_row.into_iter().unzip();
        Ok(HybridRun {
            fields,
            recommendations,
            explanations: explanations.into_iter().flatten().collect(),
        })
    }

    /// Next-class suggestions for every row
    pub fn run_next_class(&self) -> NextClassRun {
        let model = NextClassModel::build(&self.dataset, &self.config.next_class);
        let per_row: Vec<_> = (0..self.dataset.len())
            .into_par_iter()
            .map(|row| model.recommend(&self.dataset, &self.neighbors, row))
            .collect();

        let (recommendations, explanations): (Vec<_>, Vec<Vec<Explanation>>) = per_row.into_iter().unzip();
        tracing::info!(rows = recommendations.len(), "Computed next-class suggestions");
        NextClassRun {
            recommendations,
            explanations: explanations.into_iter().flatten().collect(),
        }
    }
}
