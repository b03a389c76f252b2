//! Descriptive summary of a loaded dataset

use serde::{Deserialize, Serialize};

use crate::core::types::{Field, Token, TokenSet};
use crate::data::dataset::Dataset;
use crate::stats::token_counts;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatasetReport {
    pub rows: usize,
    pub top_primary_classes: Vec<(Token, u32)>,
    pub top_feats: Vec<(Token, u32)>,
    pub top_weapons: Vec<(Token, u32)>,
    pub top_armor: Vec<(Token, u32)>,
    /// Mean total level over characters with at least one parsed class
    pub avg_total_level: Option<f64>,
}

fn top_counts<'a>(tokens: impl Iterator<Item = &'a str>, k: usize) -> Vec<(Token, u32)> {
    let sets: Vec<TokenSet> = tokens.map(|t| std::iter::once(t.to_string()).collect()).collect();
    token_counts(&sets)
        .ranked()
        .into_iter()
        .take(k)
        .map(|(t, c)| (t, c as u32))
        .collect()
}

impl DatasetReport {
    pub fn new(dataset: &Dataset) -> Self {
        let field_top = |field: Field| {
            top_counts(
                dataset.rows.iter().flat_map(|r| r.field(field).iter().map(String::as_str)),
                15,
            )
        };

        let leveled: Vec<u32> = dataset
            .rows
            .iter()
            .filter(|r| !r.classes.is_empty())
            .map(|r| r.total_level())
            .collect();
        let avg_total_level = if leveled.is_empty() {
            None
        } else {
            Some(leveled.iter().sum::<u32>() as f64 / leveled.len() as f64)
        };

        Self {
            rows: dataset.len(),
            top_primary_classes: top_counts(dataset.rows.iter().filter_map(|r| r.primary_class()), 10),
            top_feats: field_top(Field::Feats),
            top_weapons: field_top(Field::Weapons),
            top_armor: field_top(Field::Armor),
            avg_total_level,
        }
    }

    pub fn summary(&self) -> String {
        let mut out = format!("=== Rows: {}\n", self.rows);
        let sections = [
            ("Top primary classes", &self.top_primary_classes),
            ("Top feats", &self.top_feats),
            ("Top weapons", &self.top_weapons),
            ("Top armor", &self.top_armor),
        ];
        for (title, counts) in sections {
            out.push_str(&format!("\n{}:\n", title));
            for (token, count) in counts {
                out.push_str(&format!("  {:<32} {}\n", token, count));
            }
        }
        if let Some(avg) = self.avg_total_level {
            out.push_str(&format!("\nAvg total level per character: {:.2}\n", avg));
        }
        out
    }
}
