//! Character dataset: the boundary between raw exports and the recommender
//!
//! Raw records are JSON objects keyed by spreadsheet column. Column names are
//! normalized once, the source columns for each field are resolved once, and
//! every row is reduced to token sets, a class list, narrative text and
//! ability scores.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::core::error::{RecsError, Result};
use crate::core::types::{Field, RowId, TokenSet};
use crate::data::classes::{parse_classes_field, primary_class, ClassLevel};
use crate::data::tokens::build_token_set;
use crate::rules::abilities::{AbilityExtractor, AbilityScores};

/// One raw record, keyed by (normalized) column name
pub type Record = Map<String, Value>;

/// Columns that may hold the class/level cell, in lookup order
pub const CLASS_COLUMNS: &[&str] = &["class", "classes", "class_es", "class_subclass_levels"];

/// Free-text columns concatenated into the narrative document
pub const NARRATIVE_FIELDS: &[&str] = &["appearance", "backstory", "ideals", "bonds", "flaws", "personality"];

const NARRATIVE_SEPARATOR: &str = " \n";

/// Trim, collapse runs of non-word characters to `_`, lowercase
pub fn normalize_column_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_gap = false;
    for c in name.trim().chars() {
        if c.is_alphanumeric() || c == '_' {
            in_gap = false;
            out.extend(c.to_lowercase());
        } else if !in_gap {
            in_gap = true;
            out.push('_');
        }
    }
    out
}

/// Read a JSON array of records, or one record per line
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let contents = fs::read_to_string(path)?;
    let trimmed = contents.trim_start();

    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<Record>(line)
                .map_err(|e| RecsError::InvalidInput(format!("{}:{}: {}", path.display(), i + 1, e)))
        })
        .collect()
}

/// One character, reduced to what the recommender consumes
#[derive(Debug, Clone, Default)]
pub struct CharacterRow {
    pub row_id: RowId,
    pub classes: Vec<ClassLevel>,
    pub feats: TokenSet,
    pub weapons: TokenSet,
    pub armor: TokenSet,
    pub narrative: String,
    pub abilities: AbilityScores,
}

impl CharacterRow {
    pub fn field(&self, field: Field) -> &TokenSet {
        match field {
            Field::Feats => &self.feats,
            Field::Weapons => &self.weapons,
            Field::Armor => &self.armor,
        }
    }

    pub fn primary(&self) -> Option<&ClassLevel> {
        primary_class(&self.classes)
    }

    pub fn primary_class(&self) -> Option<&str> {
        self.primary().map(|c| c.class.as_str())
    }

    /// Distinct class slugs this character has levels in
    pub fn class_bag(&self) -> TokenSet {
        self.classes.iter().map(|c| c.class.clone()).collect()
    }

    pub fn total_level(&self) -> u32 {
        self.classes.iter().map(|c| c.level).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub rows: Vec<CharacterRow>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self> {
        let records = load_records(path)?;
        let dataset = Self::from_records(records)?;
        tracing::info!(rows = dataset.len(), path = %path.display(), "Loaded character dataset");
        Ok(dataset)
    }

    /// Normalize raw records into character rows.
    ///
    /// Fails only when no class column exists at all; everything else about
    /// a row degrades to empty values.
    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        let records: Vec<Record> = records
            .into_iter()
            .map(|record| {
                record
                    .into_iter()
                    .map(|(k, v)| (normalize_column_name(&k), v))
                    .collect()
            })
            .collect();

        let columns: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| r.keys().map(String::as_str))
            .collect();

        let find = |aliases: &[&str]| -> Option<String> {
            aliases
                .iter()
                .find(|alias| columns.contains(**alias))
                .map(|alias| alias.to_string())
        };

        let class_col = find(CLASS_COLUMNS).ok_or_else(|| RecsError::MissingColumn(CLASS_COLUMNS.join(", ")))?;
        let feats_col = find(Field::Feats.column_aliases());
        let weapons_col = find(Field::Weapons.column_aliases());
        let armor_col = find(Field::Armor.column_aliases());
        let extractor = AbilityExtractor::detect(columns.iter().copied());

        for (field, col) in [
            (Field::Feats, &feats_col),
            (Field::Weapons, &weapons_col),
            (Field::Armor, &armor_col),
        ] {
            if col.is_none() {
                tracing::warn!(%field, "No source column found; every row will be empty");
            }
        }
        tracing::debug!(class_column = %class_col, ?extractor, "Resolved dataset columns");

        let cell_set = |record: &Record, col: &Option<String>| -> TokenSet {
            build_token_set(col.as_ref().and_then(|c| record.get(c)))
        };

        let rows = records
            .iter()
            .enumerate()
            .map(|(row_id, record)| CharacterRow {
                row_id,
                classes: record
                    .get(&class_col)
                    .and_then(Value::as_str)
                    .map(parse_classes_field)
                    .unwrap_or_default(),
                feats: cell_set(record, &feats_col),
                weapons: cell_set(record, &weapons_col),
                armor: cell_set(record, &armor_col),
                narrative: narrative_text(record),
                abilities: extractor.extract(record),
            })
            .collect();

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Token set of `field` for every row, indexed by row id
    pub fn field_sets(&self, field: Field) -> Vec<TokenSet> {
        self.rows.iter().map(|r| r.field(field).clone()).collect()
    }

    pub fn narratives(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.narrative.as_str()).collect()
    }

    pub fn primary_classes(&self) -> Vec<Option<String>> {
        self.rows
            .iter()
            .map(|r| r.primary_class().map(str::to_string))
            .collect()
    }

    pub fn class_bags(&self) -> Vec<TokenSet> {
        self.rows.iter().map(CharacterRow::class_bag).collect()
    }
}

fn narrative_text(record: &Record) -> String {
    NARRATIVE_FIELDS
        .iter()
        .map(|f| match record.get(*f) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(NARRATIVE_SEPARATOR)
}
