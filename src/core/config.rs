//! Recommender configuration with documented defaults
//!
//! Every tunable constant lives here and is passed explicitly into the
//! components that need it. Values can be overridden from a TOML file;
//! any section or key left out keeps its default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{RecsError, Result};
use crate::core::types::{Field, Weights};

/// Which co-occurrence statistic drives the item-neighbor scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemScorerKind {
    /// Additive vote over raw co-occurrence counts
    Jaccard,
    /// Sum of add-one smoothed pointwise mutual information
    Pmi,
}

/// How an ineligible next-class candidate is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EligibilityPolicy {
    /// Enormous negative offset, effectively removing the candidate from top-k
    Hard,
    /// Small negative offset, candidate can still rank if strongly supported
    Soft,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    /// Number of recommendations returned per row and field
    pub top_k: usize,
    /// Seed for the train/test split and held-out target selection
    pub seed: u64,
    /// Fraction of rows used to build baseline statistics
    pub train_fraction: f64,
    /// Length of the precomputed popularity list
    pub popularity_list_size: usize,
    /// Size of the item-neighbor candidate pool fed into the hybrid blend
    pub item_pool_size: usize,
    /// Nearest narrative rows that vote in the hybrid blend
    pub narrative_neighbors: usize,
    /// Statistic backing the item-neighbor scorer
    pub item_scorer: ItemScorerKind,
    /// Optional cap on tokens per row when counting pairs.
    ///
    /// Pair counting costs O(rows * set_size^2); rows above the cap only
    /// contribute their first `max_set_size` tokens.
    pub max_set_size: Option<usize>,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            seed: 42,
            train_fraction: 0.8,
            popularity_list_size: 300,
            item_pool_size: 80,
            narrative_neighbors: 35,
            item_scorer: ItemScorerKind::Jaccard,
            max_set_size: None,
        }
    }
}

/// Starting blend weights per field, used when no tuned weights exist
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldWeights {
    /// Feats lean on narrative neighbors; item-item evidence is sparse
    pub feats: Weights,
    pub weapons: Weights,
    pub armor: Weights,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            feats: Weights::new(0.35, 0.55, 0.10),
            weapons: Weights::new(0.5, 0.4, 0.1),
            armor: Weights::new(0.5, 0.4, 0.1),
        }
    }
}

impl FieldWeights {
    pub fn for_field(&self, field: Field) -> Weights {
        match field {
            Field::Feats => self.feats,
            Field::Weapons => self.weapons,
            Field::Armor => self.armor,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Minimum number of rows a term must appear in
    pub min_df: usize,
    /// Terms present in more than this fraction of rows are dropped
    pub max_df: f64,
    /// Longest word n-gram indexed (1 = unigrams only)
    pub max_ngram: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            min_df: 1,
            max_df: 0.9,
            max_ngram: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LegalityConfig {
    /// Armor tokens that draw the heavy-equipment nudge
    pub heavy_armor_tokens: Vec<String>,
    /// Primary classes exempt from the nudge
    pub heavy_ok_classes: Vec<String>,
    /// Size of the nudge (subtracted from the blended score)
    pub heavy_penalty: f64,
}

impl Default for LegalityConfig {
    fn default() -> Self {
        Self {
            heavy_armor_tokens: [
                "plate_armor",
                "half_plate",
                "splint",
                "ring_mail",
                "chain_mail",
                "dwarven_plate",
                "dragon_scale_mail_black",
                "dragon_scale_mail_gold",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            heavy_ok_classes: vec!["fighter".to_string(), "paladin".to_string()],
            heavy_penalty: 0.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NextClassConfig {
    /// Weights for (class co-occurrence, narrative votes, popularity prior)
    pub weights: Weights,
    pub neighbors: usize,
    pub top_k: usize,
    pub policy: EligibilityPolicy,
    /// Final score of an ineligible class under the hard policy is `-ban_penalty`
    pub ban_penalty: f64,
    /// Offset applied under the soft policy
    pub soft_penalty: f64,
}

impl Default for NextClassConfig {
    fn default() -> Self {
        Self {
            weights: Weights::new(0.55, 0.35, 0.10),
            neighbors: 25,
            top_k: 5,
            policy: EligibilityPolicy::Hard,
            ban_penalty: 1000.0,
            soft_penalty: 0.35,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// When false the configured field weights are used as-is
    pub enabled: bool,
    /// Number of Dirichlet(1, 1, 1) samples per field
    pub dirichlet_trials: usize,
    /// Step of the deterministic simplex grid; 0 disables the grid
    pub grid_step: f64,
    pub seed: u64,
    /// Where tuned weights are cached between runs
    pub cache_path: PathBuf,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dirichlet_trials: 100,
            grid_step: 0.1,
            seed: 42,
            cache_path: PathBuf::from("processed/tuned_weights.json"),
        }
    }
}

/// Complete recommender configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    pub recommend: RecommendConfig,
    pub weights: FieldWeights,
    pub text: TextConfig,
    pub legality: LegalityConfig,
    pub next_class: NextClassConfig,
    pub tuning: TuningConfig,
}

impl RecommenderConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let contents = fs::read_to_string(path)?;
                toml::from_str(&contents)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let r = &self.recommend;
        if r.top_k == 0 {
            return Err(RecsError::Config("top_k must be at least 1".into()));
        }
        if !(r.train_fraction > 0.0 && r.train_fraction <= 1.0) {
            return Err(RecsError::Config(format!(
                "train_fraction ({}) must be in (0, 1]",
                r.train_fraction
            )));
        }
        if r.max_set_size == Some(0) {
            return Err(RecsError::Config("max_set_size must be at least 1".into()));
        }

        if !(self.text.max_df > 0.0 && self.text.max_df <= 1.0) {
            return Err(RecsError::Config(format!(
                "max_df ({}) must be in (0, 1]",
                self.text.max_df
            )));
        }
        if self.text.max_ngram == 0 {
            return Err(RecsError::Config("max_ngram must be at least 1".into()));
        }

        for field in Field::ALL {
            if !self.weights.for_field(field).is_valid() {
                return Err(RecsError::Config(format!(
                    "weights for {} must be finite and non-negative",
                    field
                )));
            }
        }
        if !self.next_class.weights.is_valid() {
            return Err(RecsError::Config(
                "next_class weights must be finite and non-negative".into(),
            ));
        }
        if self.next_class.ban_penalty < 0.0 || self.next_class.soft_penalty < 0.0 {
            return Err(RecsError::Config("eligibility penalties are magnitudes and must be >= 0".into()));
        }
        if self.legality.heavy_penalty < 0.0 {
            return Err(RecsError::Config("heavy_penalty must be >= 0".into()));
        }

        let step = self.tuning.grid_step;
        if !(0.0..=1.0).contains(&step) {
            return Err(RecsError::Config(format!("grid_step ({}) must be in [0, 1]", step)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RecommenderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RecommenderConfig = toml::from_str(
            r#"
            [recommend]
            top_k = 10
            item_scorer = "pmi"

            [next_class]
            policy = "soft"
            "#,
        )
        .unwrap();

        assert_eq!(config.recommend.top_k, 10);
        assert_eq!(config.recommend.item_scorer, ItemScorerKind::Pmi);
        assert_eq!(config.recommend.seed, 42);
        assert_eq!(config.next_class.policy, EligibilityPolicy::Soft);
        assert_eq!(config.weights.feats, Weights::new(0.35, 0.55, 0.10));
    }

    #[test]
    fn test_weights_from_toml_array() {
        let config: RecommenderConfig = toml::from_str(
            r#"
            [weights]
            armor = [0.2, 0.2, 0.6]
            "#,
        )
        .unwrap();
        assert_eq!(config.weights.for_field(Field::Armor), Weights::new(0.2, 0.2, 0.6));
        assert_eq!(config.weights.for_field(Field::Weapons), Weights::new(0.5, 0.4, 0.1));
    }

    #[test]
    fn test_invalid_train_fraction_rejected() {
        let mut config = RecommenderConfig::default();
        config.recommend.train_fraction = 1.5;
        assert!(matches!(config.validate(), Err(RecsError::Config(_))));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut config = RecommenderConfig::default();
        config.weights.weapons = Weights::new(-0.5, 1.0, 0.5);
        assert!(config.validate().is_err());
    }
}
