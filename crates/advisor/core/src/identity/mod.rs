//! Build identity tracking: themes, the anchor state machine, and the pivot
//! detector that watches for drift away from a locked anchor.

mod anchor;
mod pivot;
mod theme;

pub use anchor::{
    AnchorDetection, AnchorEvidence, AnchorPair, AnchorResult, AnchorState, AnchorTransition,
    IdentityAnchor,
};
pub use pivot::{PivotPhase, PivotResult, PivotState, PivotTransition};
pub use theme::{Archetype, Theme, ThemeAlignment, ThemeTable};
