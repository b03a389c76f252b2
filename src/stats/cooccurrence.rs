//! Symmetric item-item co-occurrence counts
//!
//! Built once per training split and read-only afterwards. Every pair of
//! distinct tokens in a row adds 1 in both directions, so building costs
//! O(rows * set_size^2); pass a cap to bound the per-row contribution.
//! Counts are never decayed or pruned.

use std::collections::BTreeMap;

use crate::core::types::{Token, TokenSet};
use crate::scoring::ScoreMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CooccurrenceTable {
    table: BTreeMap<Token, BTreeMap<Token, u32>>,
}

impl CooccurrenceTable {
    /// Count co-occurrences over `sets`, using at most `cap` tokens per row
    pub fn build(sets: &[TokenSet], cap: Option<usize>) -> Self {
        let mut table: BTreeMap<Token, BTreeMap<Token, u32>> = BTreeMap::new();

        for set in sets {
            let items: Vec<&Token> = set.iter().take(cap.unwrap_or(usize::MAX)).collect();
            for (i, a) in items.iter().enumerate() {
                table.entry((*a).clone()).or_default();
                for b in &items[i + 1..] {
                    *table.entry((*a).clone()).or_default().entry((*b).clone()).or_insert(0) += 1;
                    *table.entry((*b).clone()).or_default().entry((*a).clone()).or_insert(0) += 1;
                }
            }
        }

        Self { table }
    }

    /// Build from explicit adjacency (mirrored so the result stays symmetric)
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str, u32)>) -> Self {
        let mut table: BTreeMap<Token, BTreeMap<Token, u32>> = BTreeMap::new();
        for (a, b, count) in pairs {
            if a == b {
                continue;
            }
            table.entry(a.to_string()).or_default().insert(b.to_string(), count);
            table.entry(b.to_string()).or_default().insert(a.to_string(), count);
        }
        Self { table }
    }

    pub fn partners(&self, token: &str) -> Option<&BTreeMap<Token, u32>> {
        self.table.get(token)
    }

    pub fn count(&self, a: &str, b: &str) -> u32 {
        self.partners(a).and_then(|p| p.get(b)).copied().unwrap_or(0)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> + '_ {
        self.table.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Additive co-occurrence vote for every partner of a known token.
    ///
    /// The vote is a plain sum of partner counts; it is not normalized by
    /// the size of the known set, so characters with many known tokens
    /// produce larger scores.
    pub fn jaccard_scores(&self, known: &TokenSet) -> ScoreMap {
        let mut scores = ScoreMap::new();
        for token in known {
            let Some(partners) = self.partners(token) else {
                continue;
            };
            for (candidate, &count) in partners {
                if known.contains(candidate) {
                    continue;
                }
                scores.add(candidate, count as f64);
            }
        }
        scores
    }
}

/// Co-occurrence table over a training split, with no per-row cap
pub fn build_cooccurrence(train_sets: &[TokenSet]) -> CooccurrenceTable {
    CooccurrenceTable::build(train_sets, None)
}
