//! Memory layout constants for the emulated GameCube RAM image
//!
//! This module centralizes every fixed address and size the tracker reads.
//! Addresses are emulated (console-side) addresses; see
//! [`translate`](super::translate) for how they map into the host process.

/// RAM image geometry
pub mod ram {
    /// Size of the GameCube main RAM mirror inside the emulator (32 MiB)
    pub const SIZE: u64 = 0x200_0000;

    /// Disc id prefix found at the start of the RAM image ("GMS" = Sunshine)
    pub const MAGIC: &[u8; 3] = b"GMS";

    /// Strips the cached/uncached segment bit of an emulated address
    pub const SEGMENT_MASK: u32 = 0x7FFF_FFFF;

    /// First address of the cached RAM segment
    pub const BASE: u32 = 0x8000_0000;
}

/// Level-name scan windows
pub mod scan {
    /// First emulated address scanned for level names
    pub const START: u32 = 0x8000_0000;

    /// Size of each scan window (4 MiB)
    pub const WINDOW_SIZE: usize = 0x40_0000;

    /// Number of windows; together they cover 0x80000000..0x81800000
    pub const WINDOW_COUNT: u32 = 6;

    /// Known false-positive zone (menu string table), inclusive on both ends
    pub const EXCLUDED_START: u32 = 0x8096_0000;
    pub const EXCLUDED_END: u32 = 0x8097_0000;

    /// Bytes preceding a level match searched for the mission label
    pub const MISSION_CONTEXT: usize = 1024;

    /// Mission tokens must be strictly longer than this...
    pub const MISSION_MIN_LEN: usize = 4;
    /// ...and strictly shorter than this
    pub const MISSION_MAX_LEN: usize = 40;
}

/// Player progress data
pub mod progress {
    /// Word size (4 bytes / 32-bit big-endian integer)
    pub const WORD: usize = 4;

    /// One byte per ability, nonzero when unlocked
    pub const ABILITIES: u32 = 0x8044_96AF;
    pub const ABILITY_COUNT: usize = 23;

    /// Shine id linked to each ability (one word per ability)
    pub const SKILL_SHINES: u32 = ABILITIES + 0x19;
    pub const SKILL_SHINES_SIZE: usize = ABILITY_COUNT * WORD;

    /// Total number of shines collected
    pub const TOTAL_SHINES: u32 = 0x8043_A5A4;

    /// Randomizer session seed
    pub const SEED: u32 = 0x8044_9698;
    pub const SEED_SIZE: usize = 4;
}

/// Timing constants for the polling loop
pub mod timing {
    /// Wait after a failed attach attempt (ms)
    pub const ATTACH_BACKOFF_MS: u64 = 2000;

    /// Wait after the connection was lost mid-tick (ms)
    pub const FAILURE_BACKOFF_MS: u64 = 1000;

    /// Interval between successful ticks (ms)
    pub const POLL_INTERVAL_MS: u64 = 500;
}
