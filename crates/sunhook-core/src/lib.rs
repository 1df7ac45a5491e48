//! # sunhook-core
//!
//! Live game-state tracking for Super Mario Sunshine running in Dolphin.
//!
//! This crate provides:
//! - Process discovery and RAM image resolution behind a platform trait
//! - Big-endian reads of emulated memory through an attached hook
//! - Location, ability, seed and shine decoding
//! - A polling synchroniser that publishes immutable snapshots
//!
//! Memory is only ever read; nothing is written to the emulator.

pub mod api;
pub mod config;
pub mod error;
pub mod game;
pub mod gamedata;
pub mod hook;
pub mod memory;
pub mod process;
pub mod shutdown;
pub mod snapshot;
pub mod sync;

pub use api::{MemoryState, SkillMapping, skill_mappings};
pub use config::{CONFIG_FILE, TimingPolicy, TrackerConfig};
pub use error::{Error, Result};
pub use game::{Ability, AbilityVector, GameLocation, Level};
pub use gamedata::{ShineCatalog, ShineInfo, ShineLookup};
pub use hook::{HookHandle, HookManager, HookState};
pub use memory::{MemoryReader, ReadMemory};
pub use process::{MemoryRegion, NativeProvider, ProcessInfo, ProcessProvider};
pub use shutdown::ShutdownSignal;
pub use snapshot::{Snapshot, SnapshotPublisher, SnapshotReader};
pub use sync::{SharedShineLookup, StateSynchronizer, TickOutcome};
