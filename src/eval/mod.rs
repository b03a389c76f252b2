//! Leave-one-out evaluation of recommenders

pub mod loo;
pub mod metrics;

pub use loo::{held_out_target, loo_eval_per_field, loo_eval_rowwise, EvalReport};
pub use metrics::{mrr_at_k, rank_of, recall_at_k};
