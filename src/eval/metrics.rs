use crate::core::types::Token;

/// Zero-based position of `target` within the first `k` recommendations
pub fn rank_of(recommendations: &[Token], target: &str, k: usize) -> Option<usize> {
    recommendations.iter().take(k).position(|t| t == target)
}

/// 1 if `target` is among the first `k` recommendations, else 0
pub fn recall_at_k(recommendations: &[Token], target: &str, k: usize) -> f64 {
    match rank_of(recommendations, target, k) {
        Some(_) => 1.0,
        None => 0.0,
    }
}

/// 1 / (rank + 1) if `target` is among the first `k` recommendations, else 0
pub fn mrr_at_k(recommendations: &[Token], target: &str, k: usize) -> f64 {
    match rank_of(recommendations, target, k) {
        Some(rank) => 1.0 / (rank as f64 + 1.0),
        None => 0.0,
    }
}
