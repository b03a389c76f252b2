//! Next-class suggestions
//!
//! Class co-occurrence across every character, class votes from narrative
//! neighbors, and a class popularity prior are blended; classes the
//! character already has are dropped and the multiclass prerequisites are
//! enforced through the eligibility gate.

use ahash::AHashMap;

use crate::blend::{blend, rank_blended};
use crate::core::config::NextClassConfig;
use crate::core::types::{RowId, Token, TokenSet};
use crate::data::Dataset;
use crate::pipeline::export::{EligibilityVerdict, Explanation, NextClassRecommendation};
use crate::rules::{Eligibility, EligibilityGate};
use crate::scoring::{CandidateScorer, NarrativeScorer, ScoreMap, ScoringContext};
use crate::stats::{popularity_prior, CooccurrenceTable};
use crate::text::NeighborTable;

pub const NEXT_CLASS_FIELD: &str = "next_class";

#[derive(Debug, Clone)]
pub struct NextClassModel {
    /// Distinct classes of every row, indexed by row id
    pub bags: Vec<TokenSet>,
    pub cooccurrence: CooccurrenceTable,
    pub prior: ScoreMap,
    pub gate: EligibilityGate,
    pub config: NextClassConfig,
}

impl NextClassModel {
    pub fn build(dataset: &Dataset, config: &NextClassConfig) -> Self {
        let bags = dataset.class_bags();
        let cooccurrence = CooccurrenceTable::build(&bags, None);
        let prior = popularity_prior(&bags);
        tracing::debug!(classes = prior.len(), "Built class statistics");
        Self {
            bags,
            cooccurrence,
            prior,
            gate: EligibilityGate::from_config(config),
            config: config.clone(),
        }
    }

    /// Suggestions and explanations for one row of `dataset`
    pub fn recommend(
        &self,
        dataset: &Dataset,
        neighbors: &NeighborTable,
        row: RowId,
    ) -> (NextClassRecommendation, Vec<Explanation>) {
        let character = dataset.rows.get(row);
        let owned = self.bags.get(row).cloned().unwrap_or_default();
        let primary = character.and_then(|c| c.primary_class());
        let abilities = character.map(|c| c.abilities).unwrap_or_default();

        let cooccurrence = self.cooccurrence.jaccard_scores(&owned);
        let narrative = NarrativeScorer {
            neighbors,
            sets: &self.bags,
            top_n: self.config.neighbors,
        };
        let narrative_scores = narrative.score(&owned, &ScoringContext::for_row(row));

        let (scores, attribution) = blend(
            &[
                ("cooccurrence", &cooccurrence),
                (narrative.name(), &narrative_scores),
                ("popularity", &self.prior),
            ],
            self.config.weights.as_slice(),
        );

        let mut excluded = owned.clone();
        excluded.extend(primary.map(str::to_string));

        let mut verdicts: AHashMap<Token, Eligibility> = AHashMap::new();
        let ranked = rank_blended(
            scores,
            &attribution,
            &excluded,
            |candidates| {
                let (penalties, checks) = self.gate.penalties(&abilities, candidates);
                verdicts = checks;
                penalties
            },
            self.config.top_k,
        );

        let details = ranked
            .iter()
            .map(|c| {
                let explanation = Explanation::new(row, NEXT_CLASS_FIELD, c, primary).with_owned_classes(&owned);
                match verdicts.get(&c.token) {
                    Some(v) => explanation.with_eligibility(EligibilityVerdict::new(v, self.gate.policy)),
                    None => explanation,
                }
            })
            .collect();

        let recommendation = NextClassRecommendation {
            row_id: row,
            primary_class: primary.map(str::to_string),
            owned_classes: owned.into_iter().collect(),
            top_next_classes: ranked.into_iter().map(|c| c.token).collect(),
        };
        (recommendation, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EligibilityPolicy;
    use serde_json::json;

    fn dataset() -> Dataset {
        let records = vec![
            json!({"class": "Fighter Level 5 | Wizard Level 1", "str": 15, "int": 14}),
            json!({"class": "Fighter Level 3 | Rogue Level 2", "str": 14, "dex": 14}),
            json!({"class": "Fighter Level 6", "str": 16, "dex": 10, "int": 8, "cha": 8}),
            json!({"class": "Wizard Level 4", "int": 17}),
            json!({"class": "Rogue Level 3", "dex": 16}),
        ];
        let records = records.into_iter().map(|r| r.as_object().cloned().unwrap()).collect();
        Dataset::from_records(records).unwrap()
    }

    fn no_neighbors(n: usize) -> NeighborTable {
        NeighborTable::from_lists(vec![Vec::new(); n])
    }

    #[test]
    fn test_owned_and_primary_excluded() {
        let data = dataset();
        let model = NextClassModel::build(&data, &NextClassConfig::default());
        let (rec, details) = model.recommend(&data, &no_neighbors(data.len()), 0);
        assert_eq!(rec.primary_class.as_deref(), Some("fighter"));
        assert_eq!(rec.owned_classes, vec!["fighter", "wizard"]);
        assert!(!details.is_empty());
        for d in &details {
            assert_eq!(d.owned_classes.as_ref(), Some(&rec.owned_classes));
        }
        assert!(!rec.top_next_classes.contains(&"fighter".to_string()));
        assert!(!rec.top_next_classes.contains(&"wizard".to_string()));
    }

    #[test]
    fn test_hard_policy_sinks_ineligible() {
        let data = dataset();
        let model = NextClassModel::build(&data, &NextClassConfig::default());

        // row 2: STR 16, DEX 10, INT 8 - rogue and wizard fail their prerequisites
        let (rec, details) = model.recommend(&data, &no_neighbors(data.len()), 2);
        assert_eq!(rec.top_next_classes.len(), 2);

        for d in &details {
            let verdict = d.eligibility.as_ref().unwrap();
            assert!(!verdict.eligible);
            assert_eq!(verdict.policy, Some(EligibilityPolicy::Hard));
            assert!((d.score + 1000.0).abs() < 1e-9);
            assert!(d.penalty <= -1000.0);
        }
        let wizard = details.iter().find(|d| d.candidate == "wizard").unwrap();
        assert_eq!(wizard.eligibility.as_ref().unwrap().reason, "INT>=13 (have 8)");
    }

    #[test]
    fn test_soft_policy_offsets_ineligible() {
        let data = dataset();
        let config = NextClassConfig {
            policy: EligibilityPolicy::Soft,
            ..NextClassConfig::default()
        };
        let model = NextClassModel::build(&data, &config);

        // row 1 (STR 14, DEX 14, no INT): wizard is the only other class, and ineligible
        let (rec, details) = model.recommend(&data, &no_neighbors(data.len()), 1);
        assert_eq!(rec.top_next_classes, vec!["wizard"]);
        assert_eq!(details[0].penalty, -0.35);
        assert_eq!(details[0].eligibility.as_ref().unwrap().policy, Some(EligibilityPolicy::Soft));
    }

    #[test]
    fn test_eligible_candidate_has_no_policy() {
        let data = dataset();
        let model = NextClassModel::build(&data, &NextClassConfig::default());

        // row 4 is a rogue with DEX 16, enough for fighter
        let (rec, details) = model.recommend(&data, &no_neighbors(data.len()), 4);
        assert!(rec.top_next_classes.contains(&"fighter".to_string()));
        let fighter = details.iter().find(|d| d.candidate == "fighter").unwrap();
        let verdict = fighter.eligibility.as_ref().unwrap();
        assert!(verdict.eligible);
        assert_eq!(verdict.policy, None);
    }

    #[test]
    fn test_hard_ban_holds_against_heavy_cooccurrence() {
        let mut records: Vec<_> = (0..2500)
            .map(|_| json!({"class": "Fighter Level 3 | Wizard Level 2", "str": 14, "int": 14}))
            .collect();
        records.extend((0..3).map(|_| json!({"class": "Fighter Level 3 | Rogue Level 2", "str": 14, "dex": 14})));
        records.push(json!({"class": "Fighter Level 5", "str": 15, "dex": 14, "int": 8}));
        let records = records.into_iter().map(|r| r.as_object().cloned().unwrap()).collect();
        let data = Dataset::from_records(records).unwrap();
        let model = NextClassModel::build(&data, &NextClassConfig::default());

        let row = data.len() - 1;
        let (rec, details) = model.recommend(&data, &no_neighbors(data.len()), row);
        assert_eq!(rec.top_next_classes, vec!["rogue", "wizard"]);

        let wizard = details.iter().find(|d| d.candidate == "wizard").unwrap();
        let support: f64 = wizard.contributions.values().sum();
        assert!(support > 1000.0);
        assert!((wizard.score + 1000.0).abs() < 1e-9);
        assert!((support + wizard.penalty - wizard.score).abs() < 1e-9);
        assert!(!wizard.eligibility.as_ref().unwrap().eligible);
    }
}
