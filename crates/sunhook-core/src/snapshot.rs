//! Published game state.
//!
//! The synchroniser is the only writer. Readers hold a [`SnapshotReader`] and
//! get the last committed tick as an `Arc<Snapshot>`; a publish swaps the
//! whole `Arc`, so a half-written tick is never visible.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};

use crate::game::{AbilityVector, GameLocation};

/// Game state as of one tick.
///
/// Every field except `attached` reads as absent while detached. `tick` and
/// `updated_at` identify the last committed tick and are always available.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub(crate) attached: bool,
    pub(crate) pid: Option<u32>,
    pub(crate) base_address: Option<u64>,
    pub(crate) location: Option<GameLocation>,
    pub(crate) abilities: Option<AbilityVector>,
    pub(crate) seed: Option<String>,
    pub(crate) seed_error: Option<String>,
    pub(crate) skill_shines: Vec<u32>,
    pub(crate) total_shines: Option<u32>,
    pub(crate) tick: u64,
    pub(crate) updated_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Copy of this snapshot with `attached` cleared and nothing else changed.
    pub fn detached(&self) -> Self {
        Self {
            attached: false,
            ..self.clone()
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    fn gate<T>(&self, value: Option<T>) -> Option<T> {
        value.filter(|_| self.attached)
    }

    pub fn pid(&self) -> Option<u32> {
        self.gate(self.pid)
    }

    pub fn base_address(&self) -> Option<u64> {
        self.gate(self.base_address)
    }

    pub fn location(&self) -> Option<&GameLocation> {
        self.gate(self.location.as_ref())
    }

    pub fn abilities(&self) -> Option<&AbilityVector> {
        self.gate(self.abilities.as_ref())
    }

    pub fn seed(&self) -> Option<&str> {
        self.gate(self.seed.as_deref())
    }

    /// Message of the most recent failed seed read, if the last tick had one.
    pub fn seed_error(&self) -> Option<&str> {
        self.gate(self.seed_error.as_deref())
    }

    /// Shine id linked to each ability; empty while detached or never read.
    pub fn skill_shines(&self) -> &[u32] {
        if self.attached { &self.skill_shines } else { &[] }
    }

    pub fn total_shines(&self) -> Option<u32> {
        self.gate(self.total_shines)
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

type Slot = Arc<RwLock<Arc<Snapshot>>>;

/// Write side of the snapshot slot.
#[derive(Debug, Default)]
pub struct SnapshotPublisher {
    slot: Slot,
}

impl SnapshotPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            slot: Arc::clone(&self.slot),
        }
    }

    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Arc::clone(&snapshot);
        snapshot
    }

    pub fn current(&self) -> Arc<Snapshot> {
        load(&self.slot)
    }
}

/// Cloneable read-only view of the latest snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    slot: Slot,
}

impl SnapshotReader {
    pub fn current(&self) -> Arc<Snapshot> {
        load(&self.slot)
    }
}

fn load(slot: &Slot) -> Arc<Snapshot> {
    Arc::clone(&slot.read().unwrap_or_else(PoisonError::into_inner))
}
