//! Insertion-ordered token -> score mapping
//!
//! Ranking uses a stable sort over insertion order, so tokens with equal
//! scores come out in the order they were first scored.

use std::cmp::Reverse;

use ahash::AHashMap;
use ordered_float::OrderedFloat;

use crate::core::types::{Token, TokenSet};

#[derive(Debug, Clone, Default)]
pub struct ScoreMap {
    entries: Vec<(Token, f64)>,
    index: AHashMap<Token, usize>,
}

impl ScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate `delta` onto the token's score, inserting it at 0 first
    pub fn add(&mut self, token: &str, delta: f64) {
        match self.index.get(token) {
            Some(&i) => self.entries[i].1 += delta,
            None => {
                self.index.insert(token.to_string(), self.entries.len());
                self.entries.push((token.to_string(), delta));
            }
        }
    }

    pub fn get(&self, token: &str) -> Option<f64> {
        self.index.get(token).map(|&i| self.entries[i].1)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(t, s)| (t.as_str(), *s))
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, f64) -> bool) {
        self.entries.retain(|(t, s)| keep(t, *s));
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (t, _))| (t.clone(), i))
            .collect();
    }

    /// Drop every token the character already owns
    pub fn remove_owned(&mut self, owned: &TokenSet) {
        if owned.is_empty() {
            return;
        }
        self.retain(|t, _| !owned.contains(t));
    }

    /// Entries sorted by descending score; NaN scores are dropped
    pub fn ranked(&self) -> Vec<(Token, f64)> {
        let mut ranked: Vec<(Token, f64)> = self
            .entries
            .iter()
            .filter(|(_, s)| !s.is_nan())
            .cloned()
            .collect();
        ranked.sort_by_key(|(_, s)| Reverse(OrderedFloat(*s)));
        ranked
    }

    /// The `k` best tokens
    pub fn top_k(&self, k: usize) -> Vec<Token> {
        self.ranked().into_iter().take(k).map(|(t, _)| t).collect()
    }
}

impl FromIterator<(Token, f64)> for ScoreMap {
    fn from_iter<I: IntoIterator<Item = (Token, f64)>>(iter: I) -> Self {
        let mut map = ScoreMap::new();
        for (token, score) in iter {
            map.add(&token, score);
        }
        map
    }
}

/// Copy of `scores` without any owned token
pub fn remove_duplicates(scores: &ScoreMap, owned: &TokenSet) -> ScoreMap {
    let mut out = scores.clone();
    out.remove_owned(owned);
    out
}
