//! Equipment legality nudges

use ahash::AHashSet;

use crate::core::config::LegalityConfig;
use crate::rules::PenaltyMap;

/// Soft penalty on heavy armor for characters whose primary class rarely wears it.
///
/// The candidate stays rankable; it only loses `penalty` from its score.
#[derive(Debug, Clone)]
pub struct HeavyArmorNudge {
    heavy_tokens: AHashSet<String>,
    allowed_classes: AHashSet<String>,
    penalty: f64,
}

impl HeavyArmorNudge {
    pub fn from_config(config: &LegalityConfig) -> Self {
        Self {
            heavy_tokens: config.heavy_armor_tokens.iter().cloned().collect(),
            allowed_classes: config.heavy_ok_classes.iter().map(|c| c.to_lowercase()).collect(),
            penalty: config.heavy_penalty,
        }
    }

    pub fn is_heavy(&self, token: &str) -> bool {
        self.heavy_tokens.contains(token)
    }

    /// Additive penalty for every candidate; 0 when no rule applies
    pub fn penalties<'a>(
        &self,
        primary_class: Option<&str>,
        candidates: impl IntoIterator<Item = &'a str>,
    ) -> PenaltyMap {
        let exempt = primary_class
            .map(|c| self.allowed_classes.contains(&c.to_lowercase()))
            .unwrap_or(false);

        candidates
            .into_iter()
            .map(|c| {
                let penalty = if !exempt && self.is_heavy(c) { -self.penalty } else { 0.0 };
                (c.to_string(), penalty)
            })
            .collect()
    }
}

impl Default for HeavyArmorNudge {
    fn default() -> Self {
        Self::from_config(&LegalityConfig::default())
    }
}
