//! Command implementations for the `advisor` binary.
//!
//! Each command is a separate module that implements its own CLI args and
//! execution logic.

mod anchor;
mod inspect;
mod record;
mod snapshot;
mod suggest;

pub use anchor::{Confirm, Reject};
pub use inspect::Inspect;
pub use record::Record;
pub use snapshot::Snapshot;
pub use suggest::Suggest;
