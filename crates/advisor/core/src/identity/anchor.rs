//! Build identity anchor state machine.
//!
//! The anchor tracks the claim that a character has committed to an
//! archetype. It is driven by the accepted-choice history and only ever
//! reaches [`AnchorState::Locked`] through an explicit [`IdentityAnchor::confirm`].
//!
//! ```text
//!            consistency >= 0.6            confirm()
//!   None ───────────────────────▶ Proposed ──────────▶ Locked
//!    ▲  ◀── consistency < 0.5 ───┘   │ reject()          │  ▲
//!    │  ◀────────────────────────────┘      < 0.4        │  │ >= 0.6
//!    │                                                   ▼  │
//!    └──── next update ──── Released ◀── 3 levels, < 0.3 ── Weakening
//! ```

use serde::{Deserialize, Serialize};

use super::theme::{Archetype, Theme, ThemeAlignment, ThemeTable};
use crate::error::AnchorError;
use crate::history::{HistoryEntry, recent_accepted, theme_frequencies};

/// Lifecycle state of an anchor.
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
pub enum AnchorState {
    #[default]
    None,
    Proposed,
    Locked,
    Weakening,
    Released,
}

/// Evidence behind the current consistency figure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorEvidence {
    /// Entries in the window that support the archetype.
    pub matching: u32,
    /// Accepted entries in the window.
    pub total: u32,
    /// Item ids of the supporting entries, oldest first.
    pub items: Vec<String>,
}

/// Result of scanning history for the dominant theme.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorDetection {
    pub theme: Option<Theme>,
    pub archetype: Option<Archetype>,
    pub consistency: f32,
    pub confidence: f32,
    pub evidence: AnchorEvidence,
}

/// A state change produced by an update or a lifecycle command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorTransition {
    pub from: AnchorState,
    pub to: AnchorState,
    pub level: u32,
    pub at: u64,
}

/// Tracked archetype commitment for one character.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityAnchor {
    pub state: AnchorState,
    pub archetype: Option<Archetype>,
    pub theme: Option<Theme>,
    pub consistency: f32,
    pub confidence: f32,
    pub evidence: AnchorEvidence,
    pub weakening_start_level: Option<u32>,
    pub proposed_at: Option<u64>,
    pub locked_at: Option<u64>,
    pub updated_at: u64,
}

impl IdentityAnchor {
    pub const PROPOSE_AT: f32 = 0.6;
    pub const DROP_PROPOSAL_BELOW: f32 = 0.5;
    pub const WEAKEN_BELOW: f32 = 0.4;
    pub const RECOVER_AT: f32 = 0.6;
    pub const RELEASE_BELOW: f32 = 0.3;
    pub const RELEASE_AFTER_LEVELS: u32 = 3;
    /// Accepted entries at which detection confidence stops scaling up.
    pub const FULL_CONFIDENCE_SAMPLE: u32 = 5;

    /// Confidence adjustment for candidates matching a locked anchor.
    pub const MATCH_BOOST: f32 = 0.15;
    /// Confidence adjustment for candidates contradicting a locked anchor.
    pub const MISMATCH_PENALTY: f32 = 0.20;
    /// Contradicting candidates are never pushed below this.
    pub const MISMATCH_FLOOR: f32 = 0.20;

    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the most frequent mapped theme among the last `window` accepted
    /// entries. `exclude` skips themes of one archetype (used by the
    /// secondary anchor).
    pub fn detect(
        history: &[HistoryEntry],
        table: &ThemeTable,
        window: usize,
        exclude: Option<&Archetype>,
    ) -> AnchorDetection {
        let recent = recent_accepted(history, window);
        let total = recent.len() as u32;
        if total == 0 {
            return AnchorDetection::default();
        }

        let dominant = theme_frequencies(&recent)
            .into_iter()
            .find_map(|(theme, count)| {
                let archetype = table.archetype_for(theme)?;
                (Some(archetype) != exclude).then_some((theme, archetype, count))
            });

        let Some((theme, archetype, count)) = dominant else {
            return AnchorDetection {
                evidence: AnchorEvidence {
                    total,
                    ..AnchorEvidence::default()
                },
                ..AnchorDetection::default()
            };
        };

        let consistency = count as f32 / total as f32;
        AnchorDetection {
            theme: Some(theme.clone()),
            archetype: Some(archetype.clone()),
            consistency,
            confidence: Self::confidence_for(consistency, total),
            evidence: AnchorEvidence {
                matching: count as u32,
                total,
                items: recent
                    .iter()
                    .filter(|e| e.theme.as_ref() == Some(theme))
                    .map(|e| e.item_id.clone())
                    .collect(),
            },
        }
    }

    /// Consistency of the history with an already chosen archetype: the
    /// share of recent accepted entries whose theme maps to it.
    pub fn measure(
        history: &[HistoryEntry],
        table: &ThemeTable,
        window: usize,
        archetype: &Archetype,
    ) -> AnchorDetection {
        let recent = recent_accepted(history, window);
        let total = recent.len() as u32;
        let supporting: Vec<&HistoryEntry> = recent
            .iter()
            .copied()
            .filter(|e| table.alignment(e.theme.as_ref(), archetype) == ThemeAlignment::Match)
            .collect();
        let matching = supporting.len() as u32;
        let consistency = if total == 0 {
            0.0
        } else {
            matching as f32 / total as f32
        };
        AnchorDetection {
            theme: None,
            archetype: Some(archetype.clone()),
            consistency,
            confidence: Self::confidence_for(consistency, total),
            evidence: AnchorEvidence {
                matching,
                total,
                items: supporting.iter().map(|e| e.item_id.clone()).collect(),
            },
        }
    }

    fn confidence_for(consistency: f32, total: u32) -> f32 {
        let sample = (total as f32 / Self::FULL_CONFIDENCE_SAMPLE as f32).min(1.0);
        (consistency * sample).clamp(0.0, 1.0)
    }

    /// Anchors in these states influence scoring and explanations.
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            AnchorState::Proposed | AnchorState::Locked | AnchorState::Weakening
        )
    }

    pub fn is_locked(&self) -> bool {
        self.state == AnchorState::Locked
    }

    /// Advances the state machine by at most one transition.
    ///
    /// Never moves a proposal to [`AnchorState::Locked`]; that takes
    /// [`Self::confirm`].
    pub fn update(
        &mut self,
        history: &[HistoryEntry],
        table: &ThemeTable,
        window: usize,
        level: u32,
        now: u64,
        exclude: Option<&Archetype>,
    ) -> Option<AnchorTransition> {
        self.updated_at = now;
        let from = self.state;

        match self.state {
            AnchorState::Released => {
                self.reset(now);
            }
            AnchorState::None => {
                let detection = Self::detect(history, table, window, exclude);
                self.observe(&detection);
                if detection.archetype.is_some() && detection.consistency >= Self::PROPOSE_AT
                {
                    self.state = AnchorState::Proposed;
                    self.archetype = detection.archetype;
                    self.theme = detection.theme;
                    self.proposed_at = Some(now);
                }
            }
            AnchorState::Proposed | AnchorState::Locked | AnchorState::Weakening => {
                let Some(archetype) = self.archetype.clone() else {
                    // An active state without an archetype is unrecoverable; start over.
                    self.reset(now);
                    return self.transition(from, level, now);
                };
                let measured = Self::measure(history, table, window, &archetype);
                self.observe(&measured);
                let consistency = measured.consistency;

                match self.state {
                    AnchorState::Proposed if consistency < Self::DROP_PROPOSAL_BELOW => {
                        self.reset(now);
                    }
                    AnchorState::Locked if consistency < Self::WEAKEN_BELOW => {
                        self.state = AnchorState::Weakening;
                        self.weakening_start_level = Some(level);
                    }
                    AnchorState::Weakening if consistency >= Self::RECOVER_AT => {
                        self.state = AnchorState::Locked;
                        self.weakening_start_level = None;
                    }
                    AnchorState::Weakening => {
                        let started = self.weakening_start_level.unwrap_or(level);
                        if level.saturating_sub(started) >= Self::RELEASE_AFTER_LEVELS
                            && consistency < Self::RELEASE_BELOW
                        {
                            self.state = AnchorState::Released;
                        }
                    }
                    _ => {}
                }
            }
        }

        self.transition(from, level, now)
    }

    /// Locks a proposed anchor. `archetype` may differ from the proposal
    /// when the player picks another identity; it must have at least one
    /// theme in `table`.
    pub fn confirm(
        &mut self,
        archetype: &Archetype,
        table: &ThemeTable,
        level: u32,
        now: u64,
    ) -> Result<AnchorTransition, AnchorError> {
        if self.state != AnchorState::Proposed {
            return Err(AnchorError::NotProposed {
                state: self.state,
                action: "confirmed",
            });
        }
        if self.archetype.as_ref() != Some(archetype) {
            let theme = table
                .themes_for(archetype)
                .next()
                .cloned()
                .ok_or_else(|| AnchorError::UnknownArchetype(archetype.to_string()))?;
            self.archetype = Some(archetype.clone());
            self.theme = Some(theme);
        }
        self.state = AnchorState::Locked;
        self.locked_at = Some(now);
        self.weakening_start_level = None;
        self.updated_at = now;
        Ok(AnchorTransition {
            from: AnchorState::Proposed,
            to: AnchorState::Locked,
            level,
            at: now,
        })
    }

    /// Declines a proposal and returns the anchor to [`AnchorState::None`].
    pub fn reject(&mut self, level: u32, now: u64) -> Result<AnchorTransition, AnchorError> {
        if self.state != AnchorState::Proposed {
            return Err(AnchorError::NotProposed {
                state: self.state,
                action: "rejected",
            });
        }
        self.reset(now);
        Ok(AnchorTransition {
            from: AnchorState::Proposed,
            to: AnchorState::None,
            level,
            at: now,
        })
    }

    /// Confidence after anchor weighting. Only a locked anchor weighs in:
    /// matching candidates gain [`Self::MATCH_BOOST`]; contradicting ones lose
    /// [`Self::MISMATCH_PENALTY`] but stay viable at [`Self::MISMATCH_FLOOR`].
    pub fn adjust_confidence(&self, theme: Option<&Theme>, table: &ThemeTable, confidence: f32) -> f32 {
        let Some(archetype) = self.archetype.as_ref().filter(|_| self.is_locked()) else {
            return confidence;
        };
        match table.alignment(theme, archetype) {
            ThemeAlignment::Match => (confidence + Self::MATCH_BOOST).min(1.0),
            ThemeAlignment::Mismatch => {
                (confidence - Self::MISMATCH_PENALTY).max(Self::MISMATCH_FLOOR.min(confidence))
            }
            ThemeAlignment::Neutral => confidence,
        }
    }

    /// Alignment of a theme with this anchor, or `Neutral` if inactive.
    pub fn alignment(&self, theme: Option<&Theme>, table: &ThemeTable) -> ThemeAlignment {
        match self.archetype.as_ref().filter(|_| self.is_active()) {
            Some(archetype) => table.alignment(theme, archetype),
            None => ThemeAlignment::Neutral,
        }
    }

    fn observe(&mut self, detection: &AnchorDetection) {
        self.consistency = detection.consistency;
        self.confidence = detection.confidence;
        self.evidence = detection.evidence.clone();
    }

    fn reset(&mut self, now: u64) {
        *self = Self {
            updated_at: now,
            ..Self::default()
        };
    }

    fn transition(&self, from: AnchorState, level: u32, now: u64) -> Option<AnchorTransition> {
        (from != self.state).then_some(AnchorTransition {
            from,
            to: self.state,
            level,
            at: now,
        })
    }
}

/// The primary and secondary anchors of one character.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorPair {
    pub primary: IdentityAnchor,
    pub secondary: IdentityAnchor,
}

/// Outcome of one anchor update pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorResult {
    pub anchors: AnchorPair,
    pub primary_transition: Option<AnchorTransition>,
    pub secondary_transition: Option<AnchorTransition>,
}

impl AnchorPair {
    /// Updates both anchors. The secondary anchor tracks the strongest
    /// archetype other than the primary's.
    pub fn update(
        &mut self,
        history: &[HistoryEntry],
        table: &ThemeTable,
        window: usize,
        level: u32,
        now: u64,
    ) -> AnchorResult {
        let primary_transition = self.primary.update(history, table, window, level, now, None);

        let primary_archetype = self.primary.archetype.clone();
        if self.secondary.archetype.is_some() && self.secondary.archetype == primary_archetype {
            self.secondary.reset(now);
        }
        let secondary_transition = self.secondary.update(
            history,
            table,
            window,
            level,
            now,
            primary_archetype.as_ref(),
        );

        AnchorResult {
            anchors: self.clone(),
            primary_transition,
            secondary_transition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted(theme: &str, n: usize) -> Vec<HistoryEntry> {
        (0..n)
            .map(|i| HistoryEntry::accepted(format!("{theme}-{i}"), theme, 1))
            .collect()
    }

    fn table() -> ThemeTable {
        ThemeTable::default()
    }

    #[test]
    fn fresh_character_detects_nothing() {
        let detection = IdentityAnchor::detect(&[], &table(), 15, None);
        assert_eq!(detection.archetype, None);
        assert_eq!(detection.confidence, 0.0);
        assert_eq!(detection.consistency, 0.0);
    }

    #[test]
    fn uniform_melee_history_proposes_then_locks_on_confirm() {
        let history = accepted("melee", 5);
        let mut anchor = IdentityAnchor::new();

        let transition = anchor.update(&history, &table(), 15, 3, 10, None);
        assert_eq!(anchor.state, AnchorState::Proposed);
        assert_eq!(anchor.consistency, 1.0);
        assert_eq!(anchor.archetype, Some(Archetype::new("warrior")));
        assert_eq!(
            transition.map(|t| (t.from, t.to)),
            Some((AnchorState::None, AnchorState::Proposed))
        );

        anchor
            .confirm(&Archetype::new("warrior"), &table(), 3, 11)
            .unwrap();
        assert_eq!(anchor.state, AnchorState::Locked);
        assert_eq!(anchor.locked_at, Some(11));
    }

    #[test]
    fn updates_alone_never_lock() {
        let history = accepted("melee", 15);
        let mut anchor = IdentityAnchor::new();
        for level in 1..=20 {
            anchor.update(&history, &table(), 15, level, level as u64, None);
            assert_ne!(anchor.state, AnchorState::Locked);
        }
        assert_eq!(anchor.state, AnchorState::Proposed);
    }

    #[test]
    fn single_consistent_choice_is_proposed_with_low_confidence() {
        let history = accepted("melee", 1);
        let mut anchor = IdentityAnchor::new();
        let transition = anchor.update(&history, &table(), 15, 1, 0, None);
        assert_eq!(transition.map(|t| t.to), Some(AnchorState::Proposed));
        assert_eq!(anchor.consistency, 1.0);
        assert!(anchor.confidence < 0.5);

        let mut fresh = IdentityAnchor::new();
        let mixed = [accepted("melee", 1), accepted("social", 1)].concat();
        assert!(fresh.update(&mixed, &table(), 15, 1, 0, None).is_none());
        assert_eq!(fresh.state, AnchorState::None);
    }

    #[test]
    fn proposal_drops_when_consistency_falls_below_half() {
        let mut history = accepted("melee", 4);
        let mut anchor = IdentityAnchor::new();
        anchor.update(&history, &table(), 15, 2, 0, None);
        assert_eq!(anchor.state, AnchorState::Proposed);

        history.extend(accepted("social", 5));
        let transition = anchor.update(&history, &table(), 15, 3, 1, None);
        assert_eq!(anchor.state, AnchorState::None);
        assert_eq!(anchor.archetype, None);
        assert_eq!(transition.map(|t| t.to), Some(AnchorState::None));
    }

    #[test]
    fn reject_returns_proposal_to_none() {
        let mut anchor = IdentityAnchor::new();
        anchor.update(&accepted("social", 5), &table(), 15, 2, 0, None);
        assert_eq!(anchor.state, AnchorState::Proposed);
        anchor.reject(2, 1).unwrap();
        assert_eq!(anchor.state, AnchorState::None);
        assert!(anchor.reject(2, 2).is_err());
    }

    #[test]
    fn confirm_requires_proposal() {
        let mut anchor = IdentityAnchor::new();
        let err = anchor
            .confirm(&Archetype::new("warrior"), &table(), 1, 0)
            .unwrap_err();
        assert!(matches!(
            err,
            AnchorError::NotProposed {
                state: AnchorState::None,
                ..
            }
        ));
    }

    #[test]
    fn confirm_with_other_archetype_requires_known_theme() {
        let mut anchor = IdentityAnchor::new();
        anchor.update(&accepted("melee", 5), &table(), 15, 2, 0, None);

        let err = anchor
            .confirm(&Archetype::new("bard"), &table(), 2, 1)
            .unwrap_err();
        assert_eq!(err, AnchorError::UnknownArchetype("bard".into()));

        anchor.confirm(&Archetype::new("face"), &table(), 2, 1).unwrap();
        assert_eq!(anchor.archetype, Some(Archetype::new("face")));
        assert_eq!(anchor.theme, Some(Theme::new("leadership")));
    }

    fn locked_warrior(history: &[HistoryEntry]) -> IdentityAnchor {
        let mut anchor = IdentityAnchor::new();
        anchor.update(history, &table(), 15, 3, 0, None);
        anchor
            .confirm(&Archetype::new("warrior"), &table(), 3, 0)
            .unwrap();
        anchor
    }

    #[test]
    fn locked_anchor_weakens_recovers_and_releases() {
        let mut history = accepted("melee", 5);
        let mut anchor = locked_warrior(&history);

        // 5 melee of 15 => 0.33 < 0.4
        history.extend(accepted("social", 10));
        anchor.update(&history, &table(), 15, 5, 1, None);
        assert_eq!(anchor.state, AnchorState::Weakening);
        assert_eq!(anchor.weakening_start_level, Some(5));

        // Recovers once melee dominates the window again.
        history.extend(accepted("weapons", 10));
        anchor.update(&history, &table(), 15, 6, 2, None);
        assert_eq!(anchor.state, AnchorState::Locked);
        assert_eq!(anchor.weakening_start_level, None);

        // Weakens again, then releases after three levels below 0.3.
        history.extend(accepted("social", 15));
        anchor.update(&history, &table(), 15, 7, 3, None);
        assert_eq!(anchor.state, AnchorState::Weakening);
        anchor.update(&history, &table(), 15, 9, 4, None);
        assert_eq!(anchor.state, AnchorState::Weakening);
        anchor.update(&history, &table(), 15, 10, 5, None);
        assert_eq!(anchor.state, AnchorState::Released);

        // Auto-reset on the next evaluation.
        let transition = anchor.update(&history, &table(), 15, 10, 6, None);
        assert_eq!(anchor.state, AnchorState::None);
        assert_eq!(
            transition.map(|t| (t.from, t.to)),
            Some((AnchorState::Released, AnchorState::None))
        );
    }

    #[test]
    fn locked_anchor_weights_candidates() {
        let anchor = locked_warrior(&accepted("melee", 5));
        let table = table();

        let boosted = anchor.adjust_confidence(Some(&Theme::new("melee")), &table, 0.6);
        assert!((boosted - 0.75).abs() < 1e-6);

        let penalized = anchor.adjust_confidence(Some(&Theme::new("social")), &table, 0.6);
        assert!((penalized - 0.4).abs() < 1e-6);

        let floored = anchor.adjust_confidence(Some(&Theme::new("social")), &table, 0.3);
        assert!((floored - 0.2).abs() < 1e-6);

        let neutral = anchor.adjust_confidence(None, &table, 0.3);
        assert!((neutral - 0.3).abs() < 1e-6);
    }

    #[test]
    fn proposed_anchor_does_not_weight_candidates() {
        let mut anchor = IdentityAnchor::new();
        anchor.update(&accepted("melee", 5), &table(), 15, 2, 0, None);
        let adjusted = anchor.adjust_confidence(Some(&Theme::new("social")), &table(), 0.6);
        assert_eq!(adjusted, 0.6);
    }

    #[test]
    fn secondary_anchor_tracks_runner_up_archetype() {
        let mut history = accepted("melee", 6);
        history.extend(accepted("stealth", 4));
        let mut pair = AnchorPair::default();

        // primary: melee 6/10 = 0.6; secondary: stealth 4/10 = 0.4 (not proposed)
        let result = pair.update(&history, &table(), 15, 4, 0);
        assert_eq!(pair.primary.state, AnchorState::Proposed);
        assert_eq!(pair.secondary.state, AnchorState::None);
        assert_eq!(pair.secondary.consistency, 0.4);
        assert!(result.primary_transition.is_some());
        assert!(result.secondary_transition.is_none());
    }
}
