//! Exported recommendation and explanation records

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::blend::RankedCandidate;
use crate::core::config::EligibilityPolicy;
use crate::core::error::Result;
use crate::core::types::{RowId, Token, TokenSet};
use crate::rules::Eligibility;

pub const RECOMMENDATIONS_FILE: &str = "recommendations.json";
pub const EXPLANATIONS_FILE: &str = "recommendations_explained.json";
pub const NEXT_CLASS_FILE: &str = "next_class.json";
pub const NEXT_CLASS_EXPLANATIONS_FILE: &str = "next_class_explained.json";

/// Eligibility outcome attached to a next-class explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub eligible: bool,
    pub reason: String,
    /// Policy that priced the failure; absent for eligible candidates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<EligibilityPolicy>,
}

impl EligibilityVerdict {
    pub fn new(eligibility: &Eligibility, policy: EligibilityPolicy) -> Self {
        Self {
            eligible: eligibility.eligible,
            reason: eligibility.reason.clone(),
            policy: (!eligibility.eligible).then_some(policy),
        }
    }
}

/// Why one candidate was recommended to one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub row_id: RowId,
    pub field: String,
    pub candidate: Token,
    pub score: f64,
    /// Weighted contribution of every source that scored the candidate
    pub contributions: BTreeMap<String, f64>,
    pub penalty: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<EligibilityVerdict>,
    pub primary_class: Option<String>,
    /// Classes the character already has; next-class explanations only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_classes: Option<Vec<Token>>,
}

impl Explanation {
    pub fn new(row_id: RowId, field: &str, candidate: &RankedCandidate, primary_class: Option<&str>) -> Self {
        Self {
            row_id,
            field: field.to_string(),
            candidate: candidate.token.clone(),
            score: candidate.score,
            contributions: candidate.contributions.clone(),
            penalty: candidate.penalty,
            eligibility: None,
            primary_class: primary_class.map(str::to_string),
            owned_classes: None,
        }
    }

    pub fn with_eligibility(mut self, verdict: EligibilityVerdict) -> Self {
        self.eligibility = Some(verdict);
        self
    }

    pub fn with_owned_classes(mut self, owned: &TokenSet) -> Self {
        self.owned_classes = Some(owned.iter().cloned().collect());
        self
    }
}

/// Top tokens per field for one character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecommendation {
    pub row_id: RowId,
    pub primary_class: Option<String>,
    pub primary_subclass: Option<String>,
    /// Keyed `top_<field>`
    #[serde(flatten)]
    pub top: BTreeMap<String, Vec<Token>>,
}

/// Suggested next classes for one character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextClassRecommendation {
    pub row_id: RowId,
    pub primary_class: Option<String>,
    pub owned_classes: Vec<Token>,
    pub top_next_classes: Vec<Token>,
}

/// Write `value` as pretty JSON, creating parent directories
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    tracing::info!(path = %path.display(), "Wrote export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> RankedCandidate {
        RankedCandidate {
            token: "wizard".to_string(),
            score: -999.5,
            contributions: [("cooccurrence".to_string(), 0.5)].into_iter().collect(),
            penalty: -1000.0,
        }
    }

    #[test]
    fn test_verdict_names_policy_only_when_ineligible() {
        let failed = Eligibility {
            eligible: false,
            reason: "INT>=13 (have 8)".to_string(),
        };
        let verdict = EligibilityVerdict::new(&failed, EligibilityPolicy::Hard);
        assert_eq!(verdict.policy, Some(EligibilityPolicy::Hard));

        let ok = Eligibility {
            eligible: true,
            reason: "ok".to_string(),
        };
        assert_eq!(EligibilityVerdict::new(&ok, EligibilityPolicy::Soft).policy, None);
    }

    #[test]
    fn test_explanation_json_shape() {
        let failed = Eligibility {
            eligible: false,
            reason: "INT>=13 (have 8)".to_string(),
        };
        let owned: TokenSet = ["fighter".to_string(), "rogue".to_string()].into_iter().collect();
        let explanation = Explanation::new(3, "next_class", &candidate(), Some("fighter"))
            .with_eligibility(EligibilityVerdict::new(&failed, EligibilityPolicy::Hard))
            .with_owned_classes(&owned);
        let value = serde_json::to_value(&explanation).unwrap();
        assert_eq!(value["candidate"], "wizard");
        assert_eq!(value["owned_classes"], serde_json::json!(["fighter", "rogue"]));
        assert_eq!(value["eligibility"]["policy"], "hard");
        assert_eq!(value["contributions"]["cooccurrence"], 0.5);

        let plain = serde_json::to_value(Explanation::new(3, "feats", &candidate(), None)).unwrap();
        assert!(plain.get("eligibility").is_none());
        assert!(plain.get("owned_classes").is_none());
    }

    #[test]
    fn test_recommendation_flattens_fields() {
        let rec = CharacterRecommendation {
            row_id: 0,
            primary_class: Some("fighter".to_string()),
            primary_subclass: None,
            top: [("top_armor".to_string(), vec!["shield".to_string()])].into_iter().collect(),
        };
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["top_armor"][0], "shield");
    }

    #[test]
    fn test_write_json_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join(NEXT_CLASS_FILE);
        write_json(&path, &vec![1, 2, 3]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().replace(char::is_whitespace, ""), "[1,2,3]");
    }
}
