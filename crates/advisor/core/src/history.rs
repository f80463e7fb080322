//! Choice history read by the identity state machines.
//!
//! History is append-only. Both state machines only ever read a rolling
//! window of recent entries; older entries stay in the log for audit.

use serde::{Deserialize, Serialize};

use crate::identity::Theme;

/// What the player did with an offered option.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Outcome {
    Accepted,
    Rejected,
    Ignored,
}

/// One completed choice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub item_id: String,
    pub theme: Option<Theme>,
    pub level: u32,
    pub outcome: Outcome,
    /// Unix seconds, supplied by the host.
    pub timestamp: u64,
}

impl HistoryEntry {
    pub fn new(
        item_id: impl Into<String>,
        theme: Option<Theme>,
        level: u32,
        outcome: Outcome,
        timestamp: u64,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            theme,
            level,
            outcome,
            timestamp,
        }
    }

    /// Shorthand for an accepted choice.
    pub fn accepted(item_id: impl Into<String>, theme: impl Into<Theme>, level: u32) -> Self {
        Self::new(item_id, Some(theme.into()), level, Outcome::Accepted, 0)
    }

    pub fn is_accepted(&self) -> bool {
        self.outcome == Outcome::Accepted
    }
}

/// The last `window` accepted entries, oldest first.
pub fn recent_accepted(history: &[HistoryEntry], window: usize) -> Vec<&HistoryEntry> {
    let mut recent: Vec<&HistoryEntry> = history
        .iter()
        .rev()
        .filter(|entry| entry.is_accepted())
        .take(window)
        .collect();
    recent.reverse();
    recent
}

/// Frequency of each theme in `entries`, most frequent first.
///
/// Ties are broken by the theme that appeared most recently, then by name,
/// so detection never depends on hash-map iteration order.
pub fn theme_frequencies<'a>(entries: &[&'a HistoryEntry]) -> Vec<(&'a Theme, usize)> {
    let mut counts: Vec<(&Theme, usize, usize)> = Vec::new();
    for (position, entry) in entries.iter().copied().enumerate() {
        let Some(theme) = entry.theme.as_ref() else {
            continue;
        };
        match counts.iter_mut().find(|(t, _, _)| *t == theme) {
            Some((_, count, last_seen)) => {
                *count += 1;
                *last_seen = position;
            }
            None => counts.push((theme, 1, position)),
        }
    }
    counts.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| b.2.cmp(&a.2))
            .then_with(|| a.0.cmp(b.0))
    });
    counts
        .into_iter()
        .map(|(theme, count, _)| (theme, count))
        .collect()
}
