//! Domain constraints applied on top of blended scores
//!
//! Both policies produce additive penalties. A missing entry means no
//! penalty.

pub mod abilities;
pub mod eligibility;
pub mod legality;

pub use abilities::{Ability, AbilityExtractor, AbilityScores};
pub use eligibility::{check_requirement, requirement_for, Eligibility, EligibilityGate, Requirement};
pub use legality::HeavyArmorNudge;

use ahash::AHashMap;

use crate::core::types::Token;
use crate::scoring::ScoreMap;

/// Additive penalty per candidate token
pub type PenaltyMap = AHashMap<Token, f64>;

/// Add each penalty to the matching score; tokens absent from `scores` are ignored
pub fn apply_penalties(scores: &mut ScoreMap, penalties: &PenaltyMap) {
    for (token, penalty) in penalties {
        if *penalty != 0.0 && scores.contains(token) {
            scores.add(token, *penalty);
        }
    }
}
