//! Singleton and pair frequencies for PMI scoring

use std::collections::BTreeMap;

use crate::core::types::{Token, TokenSet};
use crate::scoring::ScoreMap;

#[derive(Debug, Clone, Default)]
pub struct ItemStats {
    /// Rows counted
    pub n_rows: usize,
    pub item_count: BTreeMap<Token, u32>,
    /// Keyed by (min, max) so each unordered pair has exactly one entry
    pub pair_count: BTreeMap<(Token, Token), u32>,
    /// Per-token view of `pair_count`, derived once after counting
    partners: BTreeMap<Token, Vec<(Token, u32)>>,
}

impl ItemStats {
    pub fn build(sets: &[TokenSet], cap: Option<usize>) -> Self {
        let mut item_count: BTreeMap<Token, u32> = BTreeMap::new();
        let mut pair_count: BTreeMap<(Token, Token), u32> = BTreeMap::new();

        for set in sets {
            for token in set {
                *item_count.entry(token.clone()).or_insert(0) += 1;
            }
            // BTreeSet iteration is sorted, so (items[i], items[j]) is already canonical
            let items: Vec<&Token> = set.iter().take(cap.unwrap_or(usize::MAX)).collect();
            for (i, a) in items.iter().enumerate() {
                for b in &items[i + 1..] {
                    *pair_count.entry(((*a).clone(), (*b).clone())).or_insert(0) += 1;
                }
            }
        }

        let mut partners: BTreeMap<Token, Vec<(Token, u32)>> = BTreeMap::new();
        for ((a, b), &count) in &pair_count {
            partners.entry(a.clone()).or_default().push((b.clone(), count));
            partners.entry(b.clone()).or_default().push((a.clone(), count));
        }

        Self {
            n_rows: sets.len(),
            item_count,
            pair_count,
            partners,
        }
    }

    pub fn count(&self, token: &str) -> u32 {
        self.item_count.get(token).copied().unwrap_or(0)
    }

    pub fn pair(&self, a: &str, b: &str) -> u32 {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.pair_count
            .get(&(key.0.to_string(), key.1.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Add-one smoothed PMI proxy: ln((c(a,b) + 1) / (c(a) * c(b) + 1)).
    ///
    /// Finite for any counts, including pairs that never co-occur.
    pub fn pmi(&self, a: &str, b: &str) -> f64 {
        smoothed_pmi(self.pair(a, b), self.count(a), self.count(b))
    }

    /// Sum of PMI contributions from every known token to each co-occurring candidate
    pub fn pmi_scores(&self, known: &TokenSet) -> ScoreMap {
        let mut scores = ScoreMap::new();
        for a in known {
            let ca = self.count(a);
            if ca == 0 {
                continue;
            }
            let Some(partners) = self.partners.get(a) else {
                continue;
            };
            for (b, cab) in partners {
                if known.contains(b) {
                    continue;
                }
                scores.add(b, smoothed_pmi(*cab, ca, self.count(b)));
            }
        }
        scores
    }
}

pub fn smoothed_pmi(pair: u32, count_a: u32, count_b: u32) -> f64 {
    let num = pair as f64 + 1.0;
    let den = count_a as f64 * count_b as f64 + 1.0;
    (num / den).ln()
}

/// Row count, singleton counts and canonical pair counts of a training split
pub fn build_item_stats(train_sets: &[TokenSet]) -> ItemStats {
    ItemStats::build(train_sets, None)
}
