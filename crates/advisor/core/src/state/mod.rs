//! Host-supplied character state.

mod attributes;
mod character;

pub use attributes::{Attribute, Attributes};
pub use character::{
    AdvisorBias, BuildGoal, CharacterId, CharacterState, PendingSelections, WishlistEntry,
};
