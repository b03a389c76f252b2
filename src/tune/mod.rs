//! Blend weight tuning against leave-one-out recall

pub mod cache;
pub mod simplex;
pub mod tuner;

pub use cache::WeightCache;
pub use simplex::{dirichlet_samples, grid};
pub use tuner::{candidate_weights, tune, TuneOutcome};
