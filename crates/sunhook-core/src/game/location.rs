//! Current level and mission detection.
//!
//! The game keeps the name of the loaded level as a plain ASCII string
//! somewhere in RAM, with the mission title a little before it. Neither has a
//! fixed address, so both are found by content: the level by exact pattern
//! match, the mission by picking the nearest printable token before it.

use memchr::memmem;
use serde::{Serialize, Serializer};
use strum::{EnumCount, EnumIter, IntoEnumIterator, IntoStaticStr};
use tracing::trace;

use crate::error::Result;
use crate::memory::ReadMemory;
use crate::memory::layout::scan;

/// Levels the scanner can recognise, in match priority order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, IntoStaticStr, strum::Display,
)]
pub enum Level {
    #[strum(serialize = "BIANCO HILLS")]
    BiancoHills,
    #[strum(serialize = "RICCO HARBOR")]
    RiccoHarbor,
    #[strum(serialize = "GELATO BEACH")]
    GelatoBeach,
    #[strum(serialize = "PINNA PARK")]
    PinnaPark,
    #[strum(serialize = "SIRENA BEACH")]
    SirenaBeach,
    #[strum(serialize = "PIANTA VILLAGE")]
    PiantaVillage,
    #[strum(serialize = "NOKI BAY")]
    NokiBay,
    #[strum(serialize = "CORONA MOUNTAIN")]
    CoronaMountain,
    #[strum(serialize = "DELFINO PLAZA")]
    DelfinoPlaza,
    #[strum(serialize = "AIRSTRIP")]
    Airstrip,
}

impl Level {
    /// In-game name, exactly as stored in memory
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Where the player currently is
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameLocation {
    pub level: Level,
    pub level_address: u32,
    pub mission: String,
    /// Display-only anchor: the word at the start of the mission search
    /// window, not the address of the mission string itself.
    pub mission_address: u32,
}

/// Label reported when no mission token qualifies
pub const UNKNOWN_MISSION: &str = "???";

/// A level name accepted inside one scan window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelMatch {
    pub level: Level,
    /// Offset inside the window
    pub offset: usize,
    /// Absolute emulated address
    pub address: u32,
}

fn is_excluded(address: u32) -> bool {
    (scan::EXCLUDED_START..=scan::EXCLUDED_END).contains(&address)
}

/// Find the first acceptable level name in a window.
///
/// Levels are tried in declared order and, per level, occurrences low to
/// high. An occurrence is rejected when it lies in the excluded range or when
/// the byte before it is not NUL (it is part of a longer string).
pub fn find_level_in_window(data: &[u8], window_start: u32) -> Option<LevelMatch> {
    for level in Level::iter() {
        for offset in memmem::find_iter(data, level.name().as_bytes()) {
            let address = window_start.wrapping_add(offset as u32);
            if is_excluded(address) {
                trace!("Ignoring {} at {:#010x} (excluded range)", level, address);
                continue;
            }
            if offset > 0 && data[offset - 1] != 0x00 {
                continue;
            }
            return Some(LevelMatch {
                level,
                offset,
                address,
            });
        }
    }
    None
}

/// Byte length of the whitespace character at the start (or end) of `bytes`,
/// or 0 if it does not begin (end) with one. Invalid UTF-8 stops trimming.
fn edge_space(bytes: &[u8], from_end: bool) -> usize {
    for n in 1..=bytes.len().min(4) {
        let edge = if from_end {
            &bytes[bytes.len() - n..]
        } else {
            &bytes[..n]
        };
        if let Ok(s) = std::str::from_utf8(edge) {
            return if s.chars().all(char::is_whitespace) { n } else { 0 };
        }
    }
    0
}

/// Strip Unicode whitespace from both ends, including the vertical tab and
/// the UTF-8 encoded NEL and no-break space.
fn trim_space(mut token: &[u8]) -> &[u8] {
    loop {
        let n = edge_space(token, false);
        if n == 0 {
            break;
        }
        token = &token[n..];
    }
    loop {
        let n = edge_space(token, true);
        if n == 0 {
            break;
        }
        token = &token[..token.len() - n];
    }
    token
}

/// Pick the mission label out of the bytes preceding a level match.
///
/// Returns the label and the big-endian word at the start of `context`,
/// or `("???", 0)` when no token qualifies.
pub fn find_mission(context: &[u8]) -> (String, u32) {
    let token = context.split(|&b| b == 0x00).rev().find_map(|token| {
        let token = trim_space(token);
        let plausible = token.len() > scan::MISSION_MIN_LEN
            && token.len() < scan::MISSION_MAX_LEN
            && token.iter().all(|b| (32..=126).contains(b));
        plausible.then_some(token)
    });

    match token {
        Some(token) => {
            let anchor = context
                .get(..4)
                .map(|w| u32::from_be_bytes([w[0], w[1], w[2], w[3]]))
                .unwrap_or(0);
            (String::from_utf8_lossy(token).into_owned(), anchor)
        }
        None => (UNKNOWN_MISSION.to_string(), 0),
    }
}

/// Sweep the scan windows low to high and stop at the first accepted level.
///
/// Any read failure is returned immediately; the caller treats it as a lost
/// connection.
pub fn scan_location<R: ReadMemory + ?Sized>(reader: &R) -> Result<Option<GameLocation>> {
    for index in 0..scan::WINDOW_COUNT {
        let window_start = scan::START + index * scan::WINDOW_SIZE as u32;
        let data = reader.read_bytes(window_start, scan::WINDOW_SIZE)?;

        if let Some(found) = find_level_in_window(&data, window_start) {
            let context_start = found.offset.saturating_sub(scan::MISSION_CONTEXT);
            let (mission, mission_address) = find_mission(&data[context_start..found.offset]);
            trace!(
                "Level {} at {:#010x}, mission {:?}",
                found.level, found.address, mission
            );
            return Ok(Some(GameLocation {
                level: found.level,
                level_address: found.address,
                mission,
                mission_address,
            }));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::memory::MockMemoryBuilder;

    fn window_with(entries: &[(usize, &[u8])]) -> Vec<u8> {
        let mut data = vec![0u8; 0x1000];
        for (offset, bytes) in entries {
            data[*offset..*offset + bytes.len()].copy_from_slice(bytes);
        }
        data
    }

    #[test]
    fn level_names_match_memory_strings() {
        assert_eq!(Level::COUNT, 10);
        assert_eq!(Level::BiancoHills.name(), "BIANCO HILLS");
        assert_eq!(Level::Airstrip.to_string(), "AIRSTRIP");
        let first = Level::iter().next().unwrap();
        assert_eq!(first, Level::BiancoHills);
    }

    #[test]
    fn accepts_null_preceded_match() {
        let data = window_with(&[(0x100, b"RICCO HARBOR")]);
        let found = find_level_in_window(&data, 0x8000_0000).unwrap();
        assert_eq!(found.level, Level::RiccoHarbor);
        assert_eq!(found.offset, 0x100);
        assert_eq!(found.address, 0x8000_0100);
    }

    #[test]
    fn accepts_match_at_window_start() {
        let data = window_with(&[(0, b"NOKI BAY")]);
        let found = find_level_in_window(&data, 0x8040_0000).unwrap();
        assert_eq!(found.address, 0x8040_0000);
    }

    #[test]
    fn rejects_match_inside_longer_token() {
        let data = window_with(&[(0x100, b"XNOKI BAY")]);
        assert_eq!(find_level_in_window(&data, 0x8000_0000), None);
    }

    #[test]
    fn rejected_substring_does_not_hide_later_occurrence() {
        let data = window_with(&[(0x100, b"GO TO PINNA PARK"), (0x200, b"PINNA PARK")]);
        let found = find_level_in_window(&data, 0x8000_0000).unwrap();
        assert_eq!(found.offset, 0x200);
    }

    #[test]
    fn rejects_match_in_excluded_range() {
        // Window starting inside the menu string table
        let start = scan::EXCLUDED_START - 0x100;
        let data = window_with(&[(0x100, b"DELFINO PLAZA"), (0x300, b"DELFINO PLAZA")]);
        assert_eq!(find_level_in_window(&data, start), None);
    }

    #[test]
    fn excluded_range_is_inclusive() {
        let start = scan::EXCLUDED_END - 0x100;
        let data = window_with(&[(0x100, b"AIRSTRIP")]);
        assert_eq!(find_level_in_window(&data, start), None);

        let data = window_with(&[(0x101, b"AIRSTRIP")]);
        let found = find_level_in_window(&data, start).unwrap();
        assert_eq!(found.address, scan::EXCLUDED_END + 1);
    }

    #[test]
    fn declared_order_beats_position() {
        let data = window_with(&[(0x10, b"AIRSTRIP"), (0x800, b"BIANCO HILLS")]);
        let found = find_level_in_window(&data, 0x8000_0000).unwrap();
        assert_eq!(found.level, Level::BiancoHills);
    }

    #[test]
    fn mission_prefers_closest_printable_token() {
        let context = b"\0OLD\0EP1: INTRO SCENE\0\x01\x02";
        let (mission, address) = find_mission(context);
        assert_eq!(mission, "EP1: INTRO SCENE");
        assert_eq!(address, u32::from_be_bytes([0, b'O', b'L', b'D']));
    }

    #[test]
    fn mission_without_candidate_is_unknown() {
        let context = b"\0OLD\0\x01\x02\x03\x04\x05\x06\0abcd\0";
        assert_eq!(find_mission(context), ("???".to_string(), 0));
        assert_eq!(find_mission(b""), ("???".to_string(), 0));
    }

    #[test]
    fn mission_length_bounds_are_exclusive() {
        assert_eq!(find_mission(b"\0ABCD").0, "???");
        assert_eq!(find_mission(b"\0ABCDE").0, "ABCDE");

        let long_ok = "A".repeat(39);
        let too_long = "A".repeat(40);
        assert_eq!(find_mission(format!("\0{}", long_ok).as_bytes()).0, long_ok);
        assert_eq!(find_mission(format!("\0{}", too_long).as_bytes()).0, "???");
    }

    #[test]
    fn mission_token_is_trimmed() {
        let (mission, _) = find_mission(b"\0   The Hillside Cave Secret  \0");
        assert_eq!(mission, "The Hillside Cave Secret");

        // Whitespace does not count towards the length
        assert_eq!(find_mission(b"\0   ABCD   ").0, "???");
    }

    #[test]
    fn mission_trims_vertical_tab_and_unicode_spaces() {
        assert_eq!(find_mission(b"\0\x0bABCDE\0").0, "ABCDE");
        assert_eq!(find_mission(b"\0\xc2\xa0Pianta Pond\xc2\x85\0").0, "Pianta Pond");
        assert_eq!(find_mission(b"\0\x0c\xe3\x80\x80Noki Bay\t\x0b").0, "Noki Bay");

        // Only edges are trimmed; inner no-break spaces are not printable
        assert_eq!(find_mission(b"\0Pianta\xc2\xa0Pond\0").0, "???");
        assert_eq!(find_mission(b"\0\xc2\xa0ABCD\xc2\xa0").0, "???");
    }

    #[test]
    fn mission_rejects_high_bytes() {
        let (mission, _) = find_mission(b"\0Valid Title\0Caf\xe9 Bad Title\0");
        assert_eq!(mission, "Valid Title");
    }

    #[test]
    fn scan_finds_level_and_mission() {
        let reader = MockMemoryBuilder::new()
            .write(0x8041_0000, b"\0\0Red Coins of the Pianta Pond\0")
            .write(0x8041_0020, b"PIANTA VILLAGE\0")
            .build();

        let location = scan_location(&reader).unwrap().unwrap();
        assert_eq!(location.level, Level::PiantaVillage);
        assert_eq!(location.level_address, 0x8041_0020);
        assert_eq!(location.mission, "Red Coins of the Pianta Pond");
        // Anchor is the word at match - 1024 (zeros here)
        assert_eq!(location.mission_address, 0);
    }

    #[test]
    fn scan_context_is_clamped_to_window() {
        let reader = MockMemoryBuilder::new()
            .write(0x8040_0000, b"GMSE\0Shadow Mario on the Loose\0")
            .write(0x8040_0030, b"BIANCO HILLS")
            .build();

        let location = scan_location(&reader).unwrap().unwrap();
        assert_eq!(location.mission, "Shadow Mario on the Loose");
        assert_eq!(location.mission_address, u32::from_be_bytes(*b"GMSE"));
    }

    #[test]
    fn scan_checks_windows_low_to_high() {
        let reader = MockMemoryBuilder::new()
            .write(0x8000_1000, b"\0AIRSTRIP")
            .write(0x8100_0000, b"\0BIANCO HILLS")
            .build();

        let location = scan_location(&reader).unwrap().unwrap();
        assert_eq!(location.level, Level::Airstrip);
    }

    #[test]
    fn scan_stops_at_first_acceptance() {
        let reader = MockMemoryBuilder::new()
            .write(0x8000_1000, b"\0SIRENA BEACH")
            .build();

        scan_location(&reader).unwrap().unwrap();
        assert_eq!(reader.reads().len(), 1);
    }

    #[test]
    fn scan_without_level_reads_all_windows() {
        let reader = MockMemoryBuilder::new().build();

        assert_eq!(scan_location(&reader).unwrap(), None);
        let reads = reader.reads();
        assert_eq!(reads.len(), 6);
        assert_eq!(reads[0], (0x8000_0000, scan::WINDOW_SIZE));
        assert_eq!(reads[5], (0x8140_0000, scan::WINDOW_SIZE));
    }

    #[test]
    fn scan_propagates_read_fault() {
        let reader = MockMemoryBuilder::new()
            .write(0x8100_0000, b"\0GELATO BEACH")
            .fault(0x8080_0000..0x8080_0004)
            .build();

        let err = scan_location(&reader).unwrap_err();
        assert!(matches!(err, Error::ReadFault { .. }));
    }
}
