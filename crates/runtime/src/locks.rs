//! Per-character serialization and staleness tracking.
//!
//! Every state-touching request takes a [`Ticket`]: taking one bumps the
//! character's generation, so any older ticket still in flight becomes
//! stale. Holders of a stale ticket may finish computing but must not
//! commit state ("last snapshot wins").

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use advisor_core::CharacterId;
use tokio::sync::MutexGuard;

#[derive(Default)]
struct Slot {
    lock: tokio::sync::Mutex<()>,
    generation: AtomicU64,
}

#[derive(Default)]
pub(crate) struct CharacterLocks {
    slots: Mutex<HashMap<CharacterId, Arc<Slot>>>,
}

impl CharacterLocks {
    pub(crate) fn ticket(&self, character: &CharacterId) -> Ticket {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(character.clone()).or_default())
        };
        let generation = slot.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket { slot, generation }
    }
}

pub(crate) struct Ticket {
    slot: Arc<Slot>,
    generation: u64,
}

impl Ticket {
    /// Waits for exclusive access to the character's records.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, ()> {
        self.slot.lock.lock().await
    }

    /// True while no newer ticket has been issued for the character.
    pub(crate) fn is_current(&self) -> bool {
        self.slot.generation.load(Ordering::SeqCst) == self.generation
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}
