//! Records persisted next to the history log.

use advisor_core::Suggestion;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Advice given at one decision step, replayed while its input is unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdviceRecord {
    pub step: String,
    /// Hex SHA-256, see [`AdviceRecord::digest`].
    pub input_digest: String,
    pub suggestions: Vec<Suggestion>,
    #[serde(default)]
    pub future: Vec<Suggestion>,
    pub created_at: u64,
}

impl AdviceRecord {
    /// Digest over `step | snapshot hash | sorted candidate ids | context`.
    pub fn digest<'a>(
        step: &str,
        snapshot_hash: &str,
        candidate_ids: impl IntoIterator<Item = &'a str>,
        context: &str,
    ) -> String {
        let mut ids: Vec<&str> = candidate_ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();

        let mut hasher = Sha256::new();
        hasher.update(step.as_bytes());
        hasher.update(b"|");
        hasher.update(snapshot_hash.as_bytes());
        hasher.update(b"|");
        hasher.update(ids.join(",").as_bytes());
        hasher.update(b"|");
        hasher.update(context.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Suggestion ids last presented for one context.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastShown {
    pub context: String,
    pub ids: Vec<String>,
    pub shown_at: u64,
}
