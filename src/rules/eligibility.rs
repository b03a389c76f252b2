//! Multiclass ability prerequisites
//!
//! Static table of minimum ability scores a character needs before taking a
//! level in a class, and the gate that turns a failed check into a penalty
//! according to the configured policy.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::{EligibilityPolicy, NextClassConfig};
use crate::core::types::Token;
use crate::rules::abilities::{Ability, AbilityScores};
use crate::rules::PenaltyMap;
use crate::scoring::ScoreMap;

const MINIMUM: i32 = 13;

/// Ability prerequisite of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Every listed ability must meet its minimum
    All(&'static [(Ability, i32)]),
    /// Either ability meeting the minimum suffices
    Either(Ability, Ability, i32),
}

/// Look up the prerequisite for a class slug; `None` means unrestricted
pub fn requirement_for(class: &str) -> Option<Requirement> {
    use Ability::*;

    let req = match class.to_lowercase().as_str() {
        "barbarian" => Requirement::All(&[(Str, MINIMUM)]),
        "bard" => Requirement::All(&[(Cha, MINIMUM)]),
        "cleric" => Requirement::All(&[(Wis, MINIMUM)]),
        "druid" => Requirement::All(&[(Wis, MINIMUM)]),
        "fighter" => Requirement::Either(Str, Dex, MINIMUM),
        "monk" => Requirement::All(&[(Dex, MINIMUM), (Wis, MINIMUM)]),
        "paladin" => Requirement::All(&[(Str, MINIMUM), (Cha, MINIMUM)]),
        "ranger" => Requirement::All(&[(Dex, MINIMUM), (Wis, MINIMUM)]),
        "rogue" => Requirement::All(&[(Dex, MINIMUM)]),
        "sorcerer" => Requirement::All(&[(Cha, MINIMUM)]),
        "warlock" => Requirement::All(&[(Cha, MINIMUM)]),
        "wizard" => Requirement::All(&[(Int, MINIMUM)]),
        "artificer" => Requirement::All(&[(Int, MINIMUM)]),
        _ => return None,
    };
    Some(req)
}

/// Outcome of a prerequisite check, with a human-readable reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub eligible: bool,
    pub reason: String,
}

/// Check a class prerequisite; missing scores count as 0
pub fn check_requirement(class: &str, scores: &AbilityScores) -> Eligibility {
    match requirement_for(class) {
        None => Eligibility {
            eligible: true,
            reason: "no_requirement".to_string(),
        },
        Some(Requirement::Either(a, b, need)) => {
            let (have_a, have_b) = (scores.get(a), scores.get(b));
            Eligibility {
                eligible: have_a >= need || have_b >= need,
                reason: format!(
                    "need {a}>={need} or {b}>={need}; have {a}={have_a}, {b}={have_b}"
                ),
            }
        }
        Some(Requirement::All(minima)) => {
            let missing: Vec<String> = minima
                .iter()
                .filter(|(ability, need)| scores.get(*ability) < *need)
                .map(|(ability, need)| format!("{}>={} (have {})", ability, need, scores.get(*ability)))
                .collect();
            if missing.is_empty() {
                Eligibility {
                    eligible: true,
                    reason: "ok".to_string(),
                }
            } else {
                Eligibility {
                    eligible: false,
                    reason: missing.join(" & "),
                }
            }
        }
    }
}

/// Turns eligibility checks into additive penalties.
///
/// Under the hard policy an ineligible candidate's final score is pinned to
/// `-ban_penalty` whatever its blended support; the soft policy subtracts a
/// fixed amount.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityGate {
    pub policy: EligibilityPolicy,
    pub ban_penalty: f64,
    pub soft_penalty: f64,
}

impl EligibilityGate {
    pub fn from_config(config: &NextClassConfig) -> Self {
        Self {
            policy: config.policy,
            ban_penalty: config.ban_penalty,
            soft_penalty: config.soft_penalty,
        }
    }

    /// Penalty for a candidate with blended `score` under the current policy
    pub fn penalty_for(&self, eligibility: &Eligibility, score: f64) -> f64 {
        if eligibility.eligible {
            return 0.0;
        }
        match self.policy {
            EligibilityPolicy::Hard => -(score + self.ban_penalty),
            EligibilityPolicy::Soft => -self.soft_penalty,
        }
    }

    /// Penalty and check result for every scored candidate class
    pub fn penalties(
        &self,
        abilities: &AbilityScores,
        candidates: &ScoreMap,
    ) -> (PenaltyMap, AHashMap<Token, Eligibility>) {
        let mut penalties = PenaltyMap::new();
        let mut verdicts = AHashMap::new();
        for (class, score) in candidates.iter() {
            let verdict = check_requirement(class, abilities);
            penalties.insert(class.to_string(), self.penalty_for(&verdict, score));
            verdicts.insert(class.to_string(), verdict);
        }
        (penalties, verdicts)
    }
}
