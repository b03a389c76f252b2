//! End-to-end tests over the public API

use std::fs;
use std::path::Path;

use character_recs::core::config::{EligibilityPolicy, ItemScorerKind};
use character_recs::core::{Field, RecommenderConfig, RecsError, TokenSet, Weights};
use character_recs::data::Dataset;
use character_recs::pipeline::{Pipeline, WeightSource};
use character_recs::rules::{check_requirement, Ability, AbilityScores};
use character_recs::scoring::{CandidateScorer, ItemMethod, ItemNeighborScorer, ScoringContext};
use character_recs::stats::{CooccurrenceTable, Popularity};
use character_recs::tune::{candidate_weights, tune, WeightCache};
use serde_json::{json, Value};

fn set(tokens: &[&str]) -> TokenSet {
    tokens.iter().map(|t| t.to_string()).collect()
}

fn characters() -> Value {
    json!([
        {"Class": "Fighter (Champion) Level 5", "Weapons": "Longsword, Shield", "Armor": "Chain Mail",
         "Feats": "Great Weapon Master | Tough", "Backstory": "A soldier of the northern border wars",
         "Ability Scores": {"STR": 16, "DEX": 12, "CON": 14, "INT": 8, "WIS": 10, "CHA": 9}},
        {"Class": "Fighter Level 4 | Rogue Level 1", "Weapons": "Longsword, Dagger", "Armor": "Chain Mail, Shield",
         "Feats": "Tough", "Backstory": "A veteran soldier, scarred by the border wars",
         "Ability Scores": {"STR": 15, "DEX": 14, "CON": 13, "INT": 10, "WIS": 11, "CHA": 8}},
        {"Class": "Wizard (Evocation) Level 6", "Weapons": "Quarterstaff, Dagger", "Armor": "None",
         "Feats": "War Caster, Alert", "Backstory": "A scholar of arcane tomes and forbidden lore",
         "Ability Scores": {"STR": 8, "DEX": 14, "CON": 12, "INT": 17, "WIS": 12, "CHA": 10}},
        {"Class": "Rogue Level 3", "Weapons": "Shortbow; Dagger", "Armor": "Leather",
         "Feats": "Alert", "Backstory": "A thief who works the city docks at night",
         "Ability Scores": {"STR": 10, "DEX": 16, "CON": 12, "INT": 12, "WIS": 13, "CHA": 11}},
        {"Class": "Wizard Level 2", "Weapons": "Dagger", "Armor": "",
         "Feats": "War Caster", "Backstory": "An arcane scholar who hoards forbidden tomes",
         "Ability Scores": {"STR": 9, "DEX": 13, "CON": 10, "INT": 16, "WIS": 12, "CHA": 12}},
        {"Class": "Paladin Level 7", "Weapons": "Longsword", "Armor": "Plate Armor, Shield",
         "Feats": "Great Weapon Master", "Backstory": "A knight sworn to guard the border",
         "Ability Scores": {"STR": 17, "DEX": 10, "CON": 14, "INT": 9, "WIS": 12, "CHA": 15}}
    ])
}

fn write_dataset(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("characters.json");
    fs::write(&path, serde_json::to_string(&characters()).unwrap()).unwrap();
    path
}

fn config_in(dir: &Path) -> RecommenderConfig {
    let mut config = RecommenderConfig::default();
    config.recommend.train_fraction = 1.0;
    config.tuning.cache_path = dir.join("processed").join("tuned_weights.json");
    config.tuning.dirichlet_trials = 5;
    config.tuning.grid_step = 0.5;
    config
}

#[test]
fn test_item_neighbor_single_partner_scenario() {
    let table = CooccurrenceTable::from_pairs([("longsword", "shield", 5)]);
    let popularity = Popularity::from_ranked(["shield".to_string(), "dagger".to_string()]);
    let scorer = ItemNeighborScorer::new(ItemMethod::Jaccard(&table), &popularity);

    let known = set(&["longsword"]);
    assert_eq!(scorer.recommend(&known, 2), vec!["shield"]);
    assert!(!scorer.needs_fallback(&known));
    assert_eq!(scorer.score(&known, &ScoringContext::default()).len(), 1);
}

#[test]
fn test_fighter_prerequisite_names_both_abilities() {
    let eligible = AbilityScores::new().with(Ability::Str, 10).with(Ability::Dex, 13);
    assert!(check_requirement("fighter", &eligible).eligible);

    let ineligible = AbilityScores::new().with(Ability::Str, 10).with(Ability::Dex, 12);
    let verdict = check_requirement("fighter", &ineligible);
    assert!(!verdict.eligible);
    assert!(verdict.reason.contains("STR") && verdict.reason.contains("DEX"));
}

#[test]
fn test_dataset_loads_embedded_abilities() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&write_dataset(dir.path())).unwrap();
    assert_eq!(dataset.len(), 6);

    let wizard = &dataset.rows[2];
    assert_eq!(wizard.primary_class(), Some("wizard"));
    assert_eq!(wizard.primary().unwrap().subclass.as_deref(), Some("evocation"));
    assert_eq!(wizard.abilities.get(Ability::Int), 17);
    assert!(wizard.armor.is_empty());
    assert_eq!(dataset.rows[3].weapons, set(&["dagger", "shortbow"]));
}

#[test]
fn test_missing_class_column_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"[{"Feats": "Alert"}]"#).unwrap();
    assert!(matches!(Dataset::load(&path), Err(RecsError::MissingColumn(_))));
}

#[test]
fn test_hybrid_run_tunes_then_uses_cache() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&write_dataset(dir.path())).unwrap();
    let config = config_in(dir.path());
    let cache_path = config.tuning.cache_path.clone();
    let pipeline = Pipeline::new(dataset, config);

    let first = pipeline.run_hybrid(false).unwrap();
    assert!(first.fields.iter().all(|o| o.source == WeightSource::Tuned));
    assert!(cache_path.exists());

    let second = pipeline.run_hybrid(false).unwrap();
    for (a, b) in first.fields.iter().zip(&second.fields) {
        assert_eq!(b.source, WeightSource::Cached);
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.report, b.report);
    }
    assert_eq!(first.recommendations, second.recommendations);

    let retuned = pipeline.run_hybrid(true).unwrap();
    assert!(retuned.fields.iter().all(|o| o.source == WeightSource::Tuned));

    // every row is covered and nothing owned is recommended
    assert_eq!(first.recommendations.len(), 6);
    for rec in &first.recommendations {
        let row = &pipeline.dataset.rows[rec.row_id];
        for field in Field::ALL {
            let top = &rec.top[&format!("top_{}", field.key())];
            assert!(top.len() <= 5);
            assert!(top.iter().all(|t| !row.field(field).contains(t)));
        }
    }
    for e in &first.explanations {
        let sum: f64 = e.contributions.values().sum();
        assert!((sum + e.penalty - e.score).abs() < 1e-9);
    }
}

#[test]
fn test_corrupt_cache_triggers_tuning() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&write_dataset(dir.path())).unwrap();
    let config = config_in(dir.path());
    fs::create_dir_all(config.tuning.cache_path.parent().unwrap()).unwrap();
    fs::write(&config.tuning.cache_path, "{\"feats\": oops").unwrap();
    let cache_path = config.tuning.cache_path.clone();

    let run = Pipeline::new(dataset, config).run_hybrid(false).unwrap();
    assert!(run.fields.iter().all(|o| o.source == WeightSource::Tuned));
    assert_eq!(WeightCache::load(&cache_path).len(), 3);
}

#[test]
fn test_tuning_disabled_uses_configured_weights() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&write_dataset(dir.path())).unwrap();
    let mut config = config_in(dir.path());
    config.tuning.enabled = false;
    config.recommend.item_scorer = ItemScorerKind::Pmi;
    let cache_path = config.tuning.cache_path.clone();

    let run = Pipeline::new(dataset, config).run_hybrid(false).unwrap();
    let feats = &run.fields[0];
    assert_eq!(feats.field, Field::Feats);
    assert_eq!(feats.source, WeightSource::Configured);
    assert_eq!(feats.weights, Weights::new(0.35, 0.55, 0.10));
    assert!(!cache_path.exists());
}

#[test]
fn test_tuner_is_deterministic_over_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&write_dataset(dir.path())).unwrap();
    let pipeline = Pipeline::new(dataset, config_in(dir.path()));
    let model = pipeline.field_model(Field::Weapons);
    let candidates = candidate_weights(&pipeline.config.tuning);

    let a = tune(&candidates, |w| pipeline.hybrid(&model, w).evaluate()).unwrap();
    let b = tune(&candidates, |w| pipeline.hybrid(&model, w).evaluate()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_next_class_run_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&write_dataset(dir.path())).unwrap();
    let pipeline = Pipeline::new(dataset, config_in(dir.path()));

    let run = pipeline.run_next_class();
    assert_eq!(run.recommendations.len(), 6);
    for rec in &run.recommendations {
        assert!(rec.top_next_classes.len() <= 5);
        for class in &rec.top_next_classes {
            assert!(!rec.owned_classes.contains(class));
            assert_ne!(Some(class), rec.primary_class.as_ref());
        }
    }

    // the first fighter has INT 8: wizard must be flagged under the hard policy
    let flagged = run
        .explanations
        .iter()
        .find(|e| e.row_id == 0 && e.candidate == "wizard")
        .unwrap();
    let verdict = flagged.eligibility.as_ref().unwrap();
    assert!(!verdict.eligible);
    assert_eq!(verdict.policy, Some(EligibilityPolicy::Hard));
    assert!((flagged.score + 1000.0).abs() < 1e-9);
    assert_eq!(flagged.owned_classes.as_deref(), Some(&["fighter".to_string()][..]));

    let out = dir.path().join("out");
    run.export(&out).unwrap();
    let exported: Value = serde_json::from_str(&fs::read_to_string(out.join("next_class.json")).unwrap()).unwrap();
    assert_eq!(exported.as_array().unwrap().len(), 6);
    assert!(out.join("next_class_explained.json").exists());
}

#[test]
fn test_baselines_cover_every_field() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&write_dataset(dir.path())).unwrap();
    let pipeline = Pipeline::new(dataset, RecommenderConfig::default());

    let reports = pipeline.baselines();
    assert_eq!(reports.len(), 3);
    assert_eq!(reports[1].field, Field::Weapons);
    assert_eq!(reports[1].rows, 6);
    for report in &reports {
        assert!(report.popularity.recall <= 1.0);
        assert!(report.pmi.evaluated <= report.rows);
    }
}
