//! Display curation of reason atoms.
//!
//! Unsafe atoms are dropped, duplicates by code collapse to their first
//! occurrence, domains hidden by the active focus are filtered out, and the
//! rest are ranked by relevance and truncated.

use super::ReasonAtom;
use crate::focus::FocusProfile;

/// Relevance of a reason under a focus: `strength × domain weight`.
pub fn relevance(atom: &ReasonAtom, focus: &FocusProfile) -> f32 {
    atom.strength * focus.domain_weight(atom.domain)
}

pub fn curate_reasons(reasons: &[ReasonAtom], focus: &FocusProfile, max: usize) -> Vec<ReasonAtom> {
    let mut curated: Vec<ReasonAtom> = Vec::with_capacity(reasons.len());
    for atom in reasons {
        if !atom.safe || !focus.is_visible(atom.domain) {
            continue;
        }
        if curated.iter().any(|kept| kept.code == atom.code) {
            continue;
        }
        curated.push(atom.clone());
    }
    // Stable sort keeps first-seen order among equal relevance.
    curated.sort_by(|a, b| relevance(b, focus).total_cmp(&relevance(a, focus)));
    curated.truncate(max);
    curated
}
