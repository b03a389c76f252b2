//! Narrative text similarity

pub mod similarity;
pub mod tokenize;

pub use similarity::{NeighborTable, SimilarityIndex, SparseVector};
