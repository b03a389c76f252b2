//! Candidate weight triples on the 2-simplex

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::types::Weights;

/// `n` draws from Dirichlet(1, 1, 1).
///
/// Each draw normalizes three unit exponentials, which is exactly the
/// uniform distribution over the simplex.
pub fn dirichlet_samples(n: usize, seed: u64) -> Vec<Weights> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let draws: [f64; 3] = std::array::from_fn(|_| -(1.0 - rng.gen::<f64>()).ln());
            let total: f64 = draws.iter().sum();
            if total > 0.0 {
                Weights(draws.map(|d| d / total))
            } else {
                Weights([1.0 / 3.0; 3])
            }
        })
        .collect()
}

/// Every (a, b) on a `step` lattice with a + b <= 1; the third weight takes
/// the remainder. Empty when `step` is not in (0, 1].
pub fn grid(step: f64) -> Vec<Weights> {
    if !(step > 0.0 && step <= 1.0) {
        return Vec::new();
    }
    let steps = (1.0 / step).round() as usize;
    let mut points = Vec::new();
    for i in 0..=steps {
        for j in 0..=steps - i {
            let a = i as f64 * step;
            let b = j as f64 * step;
            if a + b > 1.0 + 1e-9 {
                continue;
            }
            points.push(Weights::new(a, b, (1.0 - a - b).max(0.0)));
        }
    }
    points
}
