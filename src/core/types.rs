//! Core type definitions used throughout the codebase

use std::collections::BTreeSet;

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Normalized attribute identifier (feat, weapon, armor piece or class slug)
pub type Token = String;

/// Tokens owned by one character row.
///
/// Ordered so that every pass over a set visits tokens in the same order,
/// which keeps "first seen" tie-breaks reproducible.
pub type TokenSet = BTreeSet<Token>;

/// Position of a character row in the loaded dataset
pub type RowId = usize;

/// Attribute fields that get per-field recommendations and tuned weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    #[display(fmt = "feats")]
    Feats,
    #[display(fmt = "weapons")]
    Weapons,
    #[display(fmt = "armor")]
    Armor,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Feats, Field::Weapons, Field::Armor];

    /// Key used for cached weights and exported column names
    pub fn key(&self) -> &'static str {
        match self {
            Field::Feats => "feats",
            Field::Weapons => "weapons",
            Field::Armor => "armor",
        }
    }

    /// Accepted source column names, in lookup order
    pub fn column_aliases(&self) -> &'static [&'static str] {
        match self {
            Field::Feats => &["feats", "feat_list"],
            Field::Weapons => &["weapons", "weapon_list"],
            Field::Armor => &["armor", "armour", "armor_list", "armour_list"],
        }
    }
}

/// Blend weights for (item-neighbor, narrative-neighbor, popularity prior).
///
/// Components should be non-negative and sum to 1; tuning only ever samples
/// from the simplex but hand-written weights are accepted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weights(pub [f64; 3]);

impl Weights {
    pub fn new(item: f64, narrative: f64, popularity: f64) -> Self {
        Self([item, narrative, popularity])
    }

    pub fn item(&self) -> f64 {
        self.0[0]
    }

    pub fn narrative(&self) -> f64 {
        self.0[1]
    }

    pub fn popularity(&self) -> f64 {
        self.0[2]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// All components finite and non-negative
    pub fn is_valid(&self) -> bool {
        self.0.iter().all(|w| w.is_finite() && *w >= 0.0)
    }
}

impl std::fmt::Display for Weights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.0[0], self.0[1], self.0[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_keys_match_display() {
        for field in Field::ALL {
            assert_eq!(field.key(), field.to_string());
        }
    }

    #[test]
    fn test_weights_validity() {
        assert!(Weights::new(0.5, 0.4, 0.1).is_valid());
        assert!(!Weights::new(-0.1, 0.6, 0.5).is_valid());
        assert!(!Weights::new(f64::NAN, 0.5, 0.5).is_valid());
    }

    #[test]
    fn test_weights_serialize_as_triple() {
        let json = serde_json::to_string(&Weights::new(0.5, 0.25, 0.25)).unwrap();
        assert_eq!(json, "[0.5,0.25,0.25]");
    }
}
