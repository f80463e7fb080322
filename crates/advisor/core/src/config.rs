//! Engine configuration constants and tunable parameters.

use serde::{Deserialize, Serialize};

/// Tunables for the advisory engine.
///
/// Every field has a default so partial config files stay valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Accepted history entries read by anchor detection.
    pub anchor_window: usize,
    /// Accepted history entries read by the pivot detector.
    pub pivot_window: usize,
    /// Reasons shown per suggestion after curation.
    pub max_display_reasons: usize,
    /// Highest level at which heritage options still get their own tier.
    pub heritage_max_level: u32,
    /// Levels for the heritage tier bonus to halve.
    pub heritage_half_life_levels: u32,
    /// Opportunity costs stay silent at or below this level.
    pub cost_min_level: u32,
    /// Cost caveats are appended to explanations from this level on.
    pub caveat_min_level: u32,
}

impl EngineConfig {
    // ===== fixed thresholds =====
    /// Hard ceiling for any engine-produced confidence.
    pub const MAX_CONFIDENCE: f32 = 0.95;
    /// Ceiling for archetype bonus plus tier-3 subpriority bonus.
    pub const MAX_COMBINED_BONUS: f32 = 0.40;
    /// Ceiling for the archetype alignment bonus alone.
    pub const MAX_ARCHETYPE_BONUS: f32 = 0.20;
    /// Ceiling for the summed tier-3 subpriority bonuses.
    pub const MAX_SUBPRIORITY_BONUS: f32 = 0.25;
    /// Ceiling for the summed opportunity cost.
    pub const MAX_OPPORTUNITY_COST: f32 = 0.30;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ANCHOR_WINDOW: usize = 15;
    pub const DEFAULT_PIVOT_WINDOW: usize = 10;
    pub const DEFAULT_MAX_DISPLAY_REASONS: usize = 3;
    pub const DEFAULT_HERITAGE_MAX_LEVEL: u32 = 8;
    pub const DEFAULT_HERITAGE_HALF_LIFE: u32 = 3;
    pub const DEFAULT_COST_MIN_LEVEL: u32 = 3;
    pub const DEFAULT_CAVEAT_MIN_LEVEL: u32 = 5;

    pub fn new() -> Self {
        Self {
            anchor_window: Self::DEFAULT_ANCHOR_WINDOW,
            pivot_window: Self::DEFAULT_PIVOT_WINDOW,
            max_display_reasons: Self::DEFAULT_MAX_DISPLAY_REASONS,
            heritage_max_level: Self::DEFAULT_HERITAGE_MAX_LEVEL,
            heritage_half_life_levels: Self::DEFAULT_HERITAGE_HALF_LIFE,
            cost_min_level: Self::DEFAULT_COST_MIN_LEVEL,
            caveat_min_level: Self::DEFAULT_CAVEAT_MIN_LEVEL,
        }
    }

    #[must_use]
    pub fn with_max_display_reasons(mut self, max: usize) -> Self {
        self.max_display_reasons = max;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"max_display_reasons": 5}"#).unwrap();
        assert_eq!(config.max_display_reasons, 5);
        assert_eq!(config.anchor_window, EngineConfig::DEFAULT_ANCHOR_WINDOW);
        assert_eq!(config.pivot_window, EngineConfig::DEFAULT_PIVOT_WINDOW);
    }
}
