//! Ability scores and their extraction from raw records
//!
//! Exports store ability scores in one of two shapes: one column per ability
//! (`strength`, `abilityscores_dex`, ...) or a single column holding a
//! name -> score mapping. The shape is detected once per dataset from its
//! column names and the resulting extractor is reused for every row.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::dataset::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
pub enum Ability {
    #[display(fmt = "STR")]
    Str,
    #[display(fmt = "DEX")]
    Dex,
    #[display(fmt = "CON")]
    Con,
    #[display(fmt = "INT")]
    Int,
    #[display(fmt = "WIS")]
    Wis,
    #[display(fmt = "CHA")]
    Cha,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Str,
        Ability::Dex,
        Ability::Con,
        Ability::Int,
        Ability::Wis,
        Ability::Cha,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Resolve a full or abbreviated ability name
    pub fn from_alias(name: &str) -> Option<Ability> {
        match name.trim().to_lowercase().as_str() {
            "strength" | "str" => Some(Ability::Str),
            "dexterity" | "dex" => Some(Ability::Dex),
            "constitution" | "con" => Some(Ability::Con),
            "intelligence" | "int" => Some(Ability::Int),
            "wisdom" | "wis" => Some(Ability::Wis),
            "charisma" | "cha" => Some(Ability::Cha),
            _ => None,
        }
    }
}

const ALIASES: &[&str] = &[
    "strength",
    "str",
    "dexterity",
    "dex",
    "constitution",
    "con",
    "intelligence",
    "int",
    "wisdom",
    "wis",
    "charisma",
    "cha",
];

/// Columns that hold an embedded ability mapping
pub const EMBEDDED_COLUMNS: &[&str] = &["abilityscores", "ability_scores"];

/// The six ability scores of a character; unknown scores are `None`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    scores: [Option<i32>; 6],
}

impl AbilityScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, ability: Ability, score: i32) -> Self {
        self.set(ability, score);
        self
    }

    pub fn set(&mut self, ability: Ability, score: i32) {
        self.scores[ability.index()] = Some(score);
    }

    pub fn raw(&self, ability: Ability) -> Option<i32> {
        self.scores[ability.index()]
    }

    /// Score used for comparisons; a missing score counts as 0
    pub fn get(&self, ability: Ability) -> i32 {
        self.raw(ability).unwrap_or(0)
    }
}

fn coerce_score(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .and_then(|i| i32::try_from(i).ok()),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i32>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i32))
        }
        _ => None,
    }
}

/// Ability column layout of a dataset
#[derive(Debug, Clone, PartialEq)]
pub enum AbilityExtractor {
    /// One column per ability, resolved to (column, ability) pairs
    NamedColumns(Vec<(String, Ability)>),
    /// A single column holding a name -> score mapping
    EmbeddedMap(String),
    /// No ability data; every score is missing
    Absent,
}

impl AbilityExtractor {
    /// Pick the extraction strategy from normalized column names
    pub fn detect<'a>(columns: impl IntoIterator<Item = &'a str>) -> Self {
        let columns: Vec<&str> = columns.into_iter().collect();

        if let Some(col) = EMBEDDED_COLUMNS.iter().find(|c| columns.contains(*c)) {
            return AbilityExtractor::EmbeddedMap(col.to_string());
        }

        let named: Vec<(String, Ability)> = columns
            .iter()
            .filter_map(|col| {
                ALIASES
                    .iter()
                    .find(|alias| *col == **alias || col.ends_with(&format!("_{}", alias)))
                    .and_then(|alias| Ability::from_alias(alias))
                    .map(|ability| (col.to_string(), ability))
            })
            .collect();

        if named.is_empty() {
            AbilityExtractor::Absent
        } else {
            AbilityExtractor::NamedColumns(named)
        }
    }

    pub fn extract(&self, record: &Record) -> AbilityScores {
        let mut scores = AbilityScores::new();
        match self {
            AbilityExtractor::NamedColumns(columns) => {
                for (col, ability) in columns {
                    if let Some(score) = record.get(col).and_then(coerce_score) {
                        scores.set(*ability, score);
                    }
                }
            }
            AbilityExtractor::EmbeddedMap(col) => {
                let parsed;
                let map = match record.get(col) {
                    Some(Value::Object(map)) => Some(map),
                    Some(Value::String(s)) => {
                        parsed = serde_json::from_str::<Value>(s).ok();
                        parsed.as_ref().and_then(Value::as_object)
                    }
                    _ => None,
                };
                for (name, value) in map.into_iter().flatten() {
                    if let (Some(ability), Some(score)) = (Ability::from_alias(name), coerce_score(value)) {
                        scores.set(ability, score);
                    }
                }
            }
            AbilityExtractor::Absent => {}
        }
        scores
    }
}
