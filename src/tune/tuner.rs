//! Brute-force blend weight search

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::config::TuningConfig;
use crate::core::types::Weights;
use crate::eval::EvalReport;
use crate::tune::simplex::{dirichlet_samples, grid};

/// Winning weights and how they scored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TuneOutcome {
    pub weights: Weights,
    pub report: EvalReport,
    pub trials: usize,
}

/// Random simplex samples followed by the deterministic grid
pub fn candidate_weights(config: &TuningConfig) -> Vec<Weights> {
    let mut candidates = dirichlet_samples(config.dirichlet_trials, config.seed);
    candidates.extend(grid(config.grid_step));
    candidates
}

/// Evaluate every candidate and keep the highest recall.
///
/// Trials run in parallel but are compared in candidate order, so the first
/// candidate reaching the best recall wins. `None` when there are no candidates.
pub fn tune<F>(candidates: &[Weights], evaluate: F) -> Option<TuneOutcome>
where
    F: Fn(Weights) -> EvalReport + Sync,
{
    let reports: Vec<EvalReport> = candidates.par_iter().map(|w| evaluate(*w)).collect();

    let mut best: Option<(Weights, EvalReport)> = None;
    for (weights, report) in candidates.iter().zip(reports) {
        let better = match &best {
            None => true,
            Some((_, current)) => report.recall > current.recall,
        };
        if better {
            tracing::debug!(%weights, recall = report.recall, "New best blend weights");
            best = Some((*weights, report));
        }
    }

    best.map(|(weights, report)| TuneOutcome {
        weights,
        report,
        trials: candidates.len(),
    })
}
