//! Frequency-ranked tokens and the global popularity prior

use crate::core::types::{Token, TokenSet};
use crate::scoring::ScoreMap;

/// Occurrence count of every token, in first-seen order
pub fn token_counts(sets: &[TokenSet]) -> ScoreMap {
    let mut counts = ScoreMap::new();
    for set in sets {
        for token in set {
            counts.add(token, 1.0);
        }
    }
    counts
}

/// Every observed token scored by its count relative to the most frequent one.
///
/// Gives each token a small positive score, so that a token with no other
/// support can still be ranked.
pub fn popularity_prior(sets: &[TokenSet]) -> ScoreMap {
    normalize_by_max(&token_counts(sets))
}

pub fn normalize_by_max(counts: &ScoreMap) -> ScoreMap {
    let max = counts.iter().map(|(_, c)| c).fold(0.0, f64::max);
    let max = if max > 0.0 { max } else { 1.0 };
    counts.iter().map(|(t, c)| (t.to_string(), c / max)).collect()
}

/// Most frequent tokens of a training split, best first
#[derive(Debug, Clone, Default)]
pub struct Popularity {
    ranked: Vec<(Token, f64)>,
}

impl Popularity {
    /// Keep the `n` most frequent tokens; ties keep first-seen order
    pub fn from_sets(sets: &[TokenSet], n: usize) -> Self {
        let mut ranked = token_counts(sets).ranked();
        ranked.truncate(n);
        Self { ranked }
    }

    /// Use an already-ranked list as-is
    pub fn from_ranked(tokens: impl IntoIterator<Item = Token>) -> Self {
        let tokens: Vec<Token> = tokens.into_iter().collect();
        let n = tokens.len();
        Self {
            ranked: tokens
                .into_iter()
                .enumerate()
                .map(|(i, t)| (t, (n - i) as f64))
                .collect(),
        }
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> + '_ {
        self.ranked.iter().map(|(t, _)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// First `k` popular tokens the character does not own
    pub fn recommend(&self, known: &TokenSet, k: usize) -> Vec<Token> {
        self.tokens()
            .filter(|t| !known.contains(*t))
            .take(k)
            .map(str::to_string)
            .collect()
    }

    /// Unowned popular tokens scored by relative frequency
    pub fn scores(&self, known: &TokenSet) -> ScoreMap {
        let max = self.ranked.first().map(|(_, c)| *c).filter(|c| *c > 0.0).unwrap_or(1.0);
        self.ranked
            .iter()
            .filter(|(t, _)| !known.contains(t))
            .map(|(t, c)| (t.clone(), c / max))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tokens: &[&str]) -> TokenSet {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_from_sets_orders_by_frequency() {
        let sets = vec![set(&["dagger", "shield"]), set(&["shield"]), set(&["bow", "shield", "dagger"])];
        let pop = Popularity::from_sets(&sets, 10);
        assert_eq!(pop.tokens().collect::<Vec<_>>(), vec!["shield", "dagger", "bow"]);

        let top1 = Popularity::from_sets(&sets, 1);
        assert_eq!(top1.len(), 1);
    }

    #[test]
    fn test_recommend_skips_known() {
        let pop = Popularity::from_ranked(["shield".to_string(), "dagger".to_string(), "bow".to_string()]);
        assert_eq!(pop.recommend(&set(&["shield"]), 5), vec!["dagger", "bow"]);
        assert_eq!(pop.recommend(&TokenSet::new(), 1), vec!["shield"]);
    }

    #[test]
    fn test_prior_normalized_by_max() {
        let prior = popularity_prior(&[set(&["a", "b"]), set(&["a"]), set(&["a", "c"])]);
        assert_eq!(prior.get("a"), Some(1.0));
        assert!((prior.get("b").unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(prior.len(), 3);
        assert!(popularity_prior(&[]).is_empty());
    }

    #[test]
    fn test_scores_exclude_known() {
        let pop = Popularity::from_sets(&[set(&["a", "b"]), set(&["a"])], 10);
        let scores = pop.scores(&set(&["a"]));
        assert!(!scores.contains("a"));
        assert_eq!(scores.get("b"), Some(0.5));
    }
}
