//! Closed-form statistics over training token sets
//!
//! Everything here is built once per split into local mutable maps and then
//! only read, so the same statistics can be shared freely across threads.

pub mod cooccurrence;
pub mod item_stats;
pub mod popularity;

pub use cooccurrence::{build_cooccurrence, CooccurrenceTable};
pub use item_stats::{build_item_stats, smoothed_pmi, ItemStats};
pub use popularity::{normalize_by_max, popularity_prior, token_counts, Popularity};
