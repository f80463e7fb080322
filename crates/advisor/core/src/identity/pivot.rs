//! Pivot detector: watches recent choices for drift away from a locked anchor.
//!
//! The detector only relaxes constraints (see [`PivotState::nudge`]); it
//! never recommends a direction of its own.

use serde::{Deserialize, Serialize};

use super::anchor::IdentityAnchor;
use super::theme::{Theme, ThemeAlignment, ThemeTable};
use crate::history::{HistoryEntry, recent_accepted, theme_frequencies};

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PivotPhase {
    Stable,
    /// Also the phase whenever no anchor is locked.
    #[default]
    Exploratory,
    Pivoting,
}

impl PivotPhase {
    /// Phases in which advice is softened and low scores are nudged up.
    pub const fn is_exploring(self) -> bool {
        matches!(self, Self::Exploratory | Self::Pivoting)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PivotTransition {
    pub from: PivotPhase,
    pub to: PivotPhase,
    pub divergence: f32,
    pub level: u32,
}

/// Per-character pivot record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PivotState {
    pub phase: PivotPhase,
    /// Share of the window that diverges from the locked archetype, in `[0, 1]`.
    pub divergence_score: f32,
    pub emerging_theme: Option<Theme>,
    /// Most recent transitions, oldest first.
    pub transition_history: Vec<PivotTransition>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotResult {
    pub state: PivotState,
    pub transition: Option<PivotTransition>,
}

impl PivotState {
    pub const EXPLORE_AT: f32 = 0.3;
    pub const SETTLE_BELOW: f32 = 0.2;
    pub const PIVOT_ABOVE: f32 = 0.6;
    pub const LOSE_FOCUS_BELOW: f32 = 0.4;

    /// Minimum entries for a divergent theme to count as emerging.
    pub const EMERGING_MIN_COUNT: usize = 3;
    /// Minimum share of the divergent entries held by the emerging theme.
    pub const EMERGING_MIN_SHARE: f32 = 0.5;

    pub const NUDGE_BELOW: f32 = 0.5;
    pub const NUDGE: f32 = 0.1;
    pub const NUDGE_CAP: f32 = 0.6;

    pub const MAX_TRANSITIONS: usize = 20;

    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes divergence and applies at most one transition.
    pub fn update(
        &mut self,
        anchor: &IdentityAnchor,
        history: &[HistoryEntry],
        table: &ThemeTable,
        window: usize,
        level: u32,
    ) -> Option<PivotTransition> {
        let from = self.phase;

        let locked = anchor.archetype.as_ref().filter(|_| anchor.is_locked());
        let Some(archetype) = locked else {
            self.divergence_score = 0.0;
            self.emerging_theme = None;
            self.phase = PivotPhase::Exploratory;
            return self.record(from, level);
        };

        let recent = recent_accepted(history, window);
        let divergent: Vec<&HistoryEntry> = recent
            .iter()
            .copied()
            .filter(|e| table.alignment(e.theme.as_ref(), archetype) == ThemeAlignment::Mismatch)
            .collect();

        let divergence = if window == 0 {
            0.0
        } else {
            (divergent.len() as f32 / window as f32).clamp(0.0, 1.0)
        };
        self.divergence_score = divergence;
        self.emerging_theme = Self::emerging(&divergent);

        self.phase = match self.phase {
            PivotPhase::Stable if divergence >= Self::EXPLORE_AT => PivotPhase::Exploratory,
            PivotPhase::Exploratory if divergence < Self::SETTLE_BELOW => PivotPhase::Stable,
            PivotPhase::Exploratory
                if divergence > Self::PIVOT_ABOVE && self.emerging_theme.is_some() =>
            {
                PivotPhase::Pivoting
            }
            PivotPhase::Pivoting if divergence < Self::SETTLE_BELOW => PivotPhase::Stable,
            PivotPhase::Pivoting if divergence < Self::LOSE_FOCUS_BELOW => PivotPhase::Exploratory,
            phase => phase,
        };

        self.record(from, level)
    }

    /// The dominant divergent theme, if it is concentrated enough to call.
    fn emerging(divergent: &[&HistoryEntry]) -> Option<Theme> {
        let (theme, count) = theme_frequencies(divergent).into_iter().next()?;
        let share = count as f32 / divergent.len() as f32;
        (count >= Self::EMERGING_MIN_COUNT && share >= Self::EMERGING_MIN_SHARE)
            .then(|| theme.clone())
    }

    fn record(&mut self, from: PivotPhase, level: u32) -> Option<PivotTransition> {
        if from == self.phase {
            return None;
        }
        let transition = PivotTransition {
            from,
            to: self.phase,
            divergence: self.divergence_score,
            level,
        };
        self.transition_history.push(transition.clone());
        if self.transition_history.len() > Self::MAX_TRANSITIONS {
            let excess = self.transition_history.len() - Self::MAX_TRANSITIONS;
            self.transition_history.drain(..excess);
        }
        Some(transition)
    }

    /// Broadens visible options while exploring: low display confidence is
    /// lifted by [`Self::NUDGE`], never past [`Self::NUDGE_CAP`]. Tiers are
    /// untouched.
    pub fn nudge(&self, confidence: f32) -> f32 {
        if self.phase.is_exploring() && confidence < Self::NUDGE_BELOW {
            (confidence + Self::NUDGE).min(Self::NUDGE_CAP)
        } else {
            confidence
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Outcome;
    use crate::identity::{AnchorState, Archetype};

    fn entries(theme: &str, n: usize) -> Vec<HistoryEntry> {
        (0..n)
            .map(|i| HistoryEntry::accepted(format!("{theme}-{i}"), theme, 1))
            .collect()
    }

    fn locked_warrior() -> IdentityAnchor {
        IdentityAnchor {
            state: AnchorState::Locked,
            archetype: Some(Archetype::new("warrior")),
            theme: Some(Theme::new("melee")),
            ..IdentityAnchor::default()
        }
    }

    fn stable(anchor: &IdentityAnchor, table: &ThemeTable) -> PivotState {
        let mut pivot = PivotState::new();
        pivot.update(anchor, &entries("melee", 10), table, 10, 4);
        assert_eq!(pivot.phase, PivotPhase::Stable);
        pivot
    }

    #[test]
    fn defaults_to_exploratory_without_locked_anchor() {
        let table = ThemeTable::default();
        let mut pivot = PivotState {
            phase: PivotPhase::Stable,
            ..PivotState::default()
        };
        let transition = pivot.update(&IdentityAnchor::default(), &entries("social", 10), &table, 10, 2);
        assert_eq!(pivot.phase, PivotPhase::Exploratory);
        assert_eq!(pivot.divergence_score, 0.0);
        assert!(transition.is_some());
    }

    #[test]
    fn four_divergent_of_ten_starts_exploring() {
        let table = ThemeTable::default();
        let anchor = locked_warrior();
        let mut pivot = stable(&anchor, &table);

        let mut history = entries("melee", 6);
        history.extend(entries("social", 4));
        let transition = pivot.update(&anchor, &history, &table, 10, 5).unwrap();

        assert!((pivot.divergence_score - 0.4).abs() < 1e-6);
        assert_eq!(transition.from, PivotPhase::Stable);
        assert_eq!(transition.to, PivotPhase::Exploratory);
        assert_eq!(pivot.transition_history.len(), 2);
    }

    #[test]
    fn only_accepted_themed_choices_diverge() {
        let table = ThemeTable::default();
        let anchor = locked_warrior();
        let mut pivot = stable(&anchor, &table);

        let mut history = entries("melee", 6);
        history.extend((0..4).map(|i| {
            HistoryEntry::new(format!("untagged-{i}"), None, 5, Outcome::Accepted, 0)
        }));
        history.extend((0..5).map(|i| {
            HistoryEntry::new(format!("declined-{i}"), Some(Theme::new("social")), 5, Outcome::Rejected, 0)
        }));
        assert!(pivot.update(&anchor, &history, &table, 10, 5).is_none());
        assert_eq!(pivot.divergence_score, 0.0);
        assert_eq!(pivot.phase, PivotPhase::Stable);

        history.extend(entries("homebrew", 3));
        pivot.update(&anchor, &history, &table, 10, 6);
        assert!((pivot.divergence_score - 0.3).abs() < 1e-6);
        assert_eq!(pivot.phase, PivotPhase::Exploratory);
    }

    #[test]
    fn sustained_drift_with_emerging_theme_pivots() {
        let table = ThemeTable::default();
        let anchor = locked_warrior();
        let mut pivot = stable(&anchor, &table);

        let mut history = entries("melee", 3);
        history.extend(entries("technical", 7));
        pivot.update(&anchor, &history, &table, 10, 5);
        assert_eq!(pivot.phase, PivotPhase::Exploratory);

        pivot.update(&anchor, &history, &table, 10, 6);
        assert_eq!(pivot.phase, PivotPhase::Pivoting);
        assert_eq!(pivot.emerging_theme, Some(Theme::new("technical")));
    }

    #[test]
    fn scattered_drift_does_not_pivot() {
        let table = ThemeTable::default();
        let anchor = locked_warrior();
        let mut pivot = stable(&anchor, &table);

        let mut history = entries("melee", 2);
        for theme in ["social", "technical", "force", "medical"] {
            history.extend(entries(theme, 2));
        }
        pivot.update(&anchor, &history, &table, 10, 5);
        pivot.update(&anchor, &history, &table, 10, 6);
        assert!(pivot.divergence_score > PivotState::PIVOT_ABOVE);
        assert_eq!(pivot.emerging_theme, None);
        assert_eq!(pivot.phase, PivotPhase::Exploratory);
    }

    #[test]
    fn pivoting_loses_focus_then_settles() {
        let table = ThemeTable::default();
        let anchor = locked_warrior();
        let mut pivot = PivotState {
            phase: PivotPhase::Pivoting,
            ..PivotState::default()
        };

        let mut history = entries("melee", 7);
        history.extend(entries("social", 3));
        pivot.update(&anchor, &history, &table, 10, 7);
        assert_eq!(pivot.phase, PivotPhase::Exploratory);

        pivot.update(&anchor, &entries("melee", 10), &table, 10, 8);
        assert_eq!(pivot.phase, PivotPhase::Stable);
    }

    #[test]
    fn themeless_entries_are_neutral() {
        let table = ThemeTable::default();
        let anchor = locked_warrior();
        let mut pivot = stable(&anchor, &table);
        let history: Vec<HistoryEntry> = (0..10)
            .map(|i| {
                HistoryEntry::new(format!("x{i}"), None, 3, crate::history::Outcome::Accepted, 0)
            })
            .collect();
        pivot.update(&anchor, &history, &table, 10, 5);
        assert_eq!(pivot.divergence_score, 0.0);
        assert_eq!(pivot.phase, PivotPhase::Stable);
    }

    #[test]
    fn nudge_only_applies_while_exploring() {
        let exploring = PivotState::default();
        assert!((exploring.nudge(0.3) - 0.4).abs() < 1e-6);
        assert!((exploring.nudge(0.45) - 0.55).abs() < 1e-6);
        assert_eq!(exploring.nudge(0.7), 0.7);

        let settled = PivotState {
            phase: PivotPhase::Stable,
            ..PivotState::default()
        };
        assert_eq!(settled.nudge(0.3), 0.3);
    }

    #[test]
    fn transition_history_is_bounded() {
        let table = ThemeTable::default();
        let anchor = locked_warrior();
        let mut pivot = PivotState::new();
        let calm = entries("melee", 10);
        let mut drift = entries("melee", 6);
        drift.extend(entries("social", 4));
        for level in 0..30 {
            let history = if level % 2 == 0 { &calm } else { &drift };
            pivot.update(&anchor, history, &table, 10, level);
        }
        assert_eq!(pivot.transition_history.len(), PivotState::MAX_TRANSITIONS);
    }
}
