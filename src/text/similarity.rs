//! TF-IDF vector space over narrative text with cosine neighbor queries
//!
//! Rows are L2-normalized sparse vectors, so cosine similarity is a dot
//! product. Queries walk an inverted index and only touch rows that share
//! at least one term with the query row.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use ahash::{AHashMap, AHashSet};
use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::core::config::TextConfig;
use crate::core::types::RowId;
use crate::text::tokenize::ngrams;

/// Sparse vector: (term index, weight), sorted by term index
pub type SparseVector = Vec<(usize, f64)>;

#[derive(Debug, Clone, Default)]
pub struct SimilarityIndex {
    vocabulary: AHashMap<String, usize>,
    rows: Vec<SparseVector>,
    postings: Vec<Vec<(RowId, f64)>>,
}

impl SimilarityIndex {
    /// Build the vocabulary and row vectors from one document per row.
    ///
    /// Terms in fewer than `min_df` rows or in more than `max_df` of all rows
    /// are dropped. An empty document (or one whose terms were all dropped)
    /// becomes the zero vector and is similar to nothing.
    pub fn fit<S: AsRef<str>>(corpus: &[S], config: &TextConfig) -> Self {
        let n_docs = corpus.len();
        let term_counts: Vec<AHashMap<String, u32>> = corpus
            .iter()
            .map(|doc| {
                let mut counts = AHashMap::new();
                for term in ngrams(doc.as_ref(), config.max_ngram) {
                    *counts.entry(term).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for counts in &term_counts {
            for term in counts.keys() {
                *df.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let max_doc_count = config.max_df * n_docs as f64;
        let kept: Vec<(&str, usize)> = df
            .into_iter()
            .filter(|(_, d)| *d >= config.min_df && (*d as f64) <= max_doc_count)
            .collect();

        let vocabulary: AHashMap<String, usize> = kept
            .iter()
            .enumerate()
            .map(|(i, (term, _))| (term.to_string(), i))
            .collect();
        let idf: Vec<f64> = kept
            .iter()
            .map(|(_, d)| ((1.0 + n_docs as f64) / (1.0 + *d as f64)).ln() + 1.0)
            .collect();

        let rows: Vec<SparseVector> = term_counts
            .iter()
            .map(|counts| {
                let mut vector: SparseVector = counts
                    .iter()
                    .filter_map(|(term, &tf)| vocabulary.get(term).map(|&i| (i, tf as f64 * idf[i])))
                    .collect();
                vector.sort_by_key(|(i, _)| *i);
                let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for (_, w) in vector.iter_mut() {
                        *w /= norm;
                    }
                }
                vector
            })
            .collect();

        let mut postings: Vec<Vec<(RowId, f64)>> = vec![Vec::new(); vocabulary.len()];
        for (row, vector) in rows.iter().enumerate() {
            for &(term, w) in vector {
                postings[term].push((row, w));
            }
        }

        tracing::debug!(
            rows = n_docs,
            vocabulary = vocabulary.len(),
            "Fitted narrative similarity index"
        );

        Self {
            vocabulary,
            rows,
            postings,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    pub fn vector(&self, row: RowId) -> Option<&SparseVector> {
        self.rows.get(row)
    }

    /// Cosine similarity between two rows; 0 for unknown rows
    pub fn similarity(&self, a: RowId, b: RowId) -> f64 {
        let (Some(va), Some(vb)) = (self.rows.get(a), self.rows.get(b)) else {
            return 0.0;
        };
        let (mut i, mut j, mut dot) = (0, 0, 0.0);
        while i < va.len() && j < vb.len() {
            match va[i].0.cmp(&vb[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dot += va[i].1 * vb[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        dot
    }

    /// Up to `top_n` rows most similar to `row`, best first, excluding `row`.
    ///
    /// Only rows with positive similarity are returned; ties keep row order.
    pub fn query(&self, row: RowId, top_n: usize) -> Vec<(RowId, f64)> {
        let Some(vector) = self.rows.get(row) else {
            return Vec::new();
        };

        let mut scores: AHashMap<RowId, f64> = AHashMap::new();
        for &(term, w) in vector {
            for &(other, w2) in &self.postings[term] {
                if other != row {
                    *scores.entry(other).or_insert(0.0) += w * w2;
                }
            }
        }

        let mut hits: Vec<(RowId, f64)> = scores
            .into_iter()
            .filter(|(_, s)| *s > 0.0 && s.is_finite())
            .collect();
        hits.sort_by_key(|(r, _)| *r);
        hits.sort_by_key(|(_, s)| Reverse(OrderedFloat(*s)));
        hits.truncate(top_n);
        hits
    }

    /// Precompute the `top_n` neighbors of every row
    pub fn neighbor_table(&self, top_n: usize) -> NeighborTable {
        let lists = (0..self.rows.len())
            .into_par_iter()
            .map(|row| self.query(row, top_n))
            .collect();
        NeighborTable { lists }
    }
}

/// Nearest narrative rows of every row, computed once per dataset
#[derive(Debug, Clone, Default)]
pub struct NeighborTable {
    lists: Vec<Vec<(RowId, f64)>>,
}

impl NeighborTable {
    pub fn from_lists(lists: Vec<Vec<(RowId, f64)>>) -> Self {
        Self { lists }
    }

    /// The first `top_n` neighbors of `row`; empty for unknown rows
    pub fn neighbors(&self, row: RowId, top_n: usize) -> &[(RowId, f64)] {
        self.lists
            .get(row)
            .map(|list| &list[..top_n.min(list.len())])
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Rows that have at least one neighbor
    pub fn connected_rows(&self) -> AHashSet<RowId> {
        self.lists
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.is_empty())
            .map(|(r, _)| r)
            .collect()
    }
}
