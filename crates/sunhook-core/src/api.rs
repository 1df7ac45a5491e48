//! Serializable views of a [`Snapshot`] for the presentation layer.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::game::Ability;
use crate::gamedata::ShineLookup;
use crate::snapshot::Snapshot;

/// Level name reported while no location is known
pub const SEARCHING: &str = "SEARCHING...";

/// Tracker memory state, as served to the browser UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryState {
    pub is_hooked: bool,
    pub current_level: String,
    pub level_address: String,
    pub current_episode: String,
    pub episode_address: String,
    pub unlocks: BTreeMap<&'static str, bool>,
    pub seed: String,
    pub total_shines: u32,
}

fn hex_address(address: u32) -> String {
    format!("0x{:08X}", address)
}

impl MemoryState {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let (current_level, level_address, current_episode, episode_address) =
            match snapshot.location() {
                Some(location) => (
                    location.level.name().to_string(),
                    location.level_address,
                    location.mission.clone(),
                    location.mission_address,
                ),
                None => (SEARCHING.to_string(), 0, String::new(), 0),
            };

        let unlocks = snapshot
            .abilities()
            .map(|abilities| {
                abilities
                    .iter()
                    .map(|(ability, unlocked)| (ability.name(), unlocked))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            is_hooked: snapshot.is_attached(),
            current_level,
            level_address: hex_address(level_address),
            current_episode,
            episode_address: hex_address(episode_address),
            unlocks,
            seed: snapshot.seed().unwrap_or_default().to_string(),
            total_shines: snapshot.total_shines().unwrap_or(0),
        }
    }
}

/// One ability and the shine that grants it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillMapping {
    #[serde(skip)]
    pub ability: Ability,
    pub skill_name: &'static str,
    pub has_skill: bool,
    pub shine_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shine_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    pub is_mapped: bool,
}

/// Pair every ability with its linked shine.
///
/// A shine listed under several zones yields one entry per zone; ids with no
/// catalog entry yield a single unmapped entry. Sorted by ability order, then
/// zone name. `None` until both the abilities and the shine ids are known.
pub fn skill_mappings<L>(snapshot: &Snapshot, lookup: &L) -> Option<Vec<SkillMapping>>
where
    L: ShineLookup + ?Sized,
{
    let abilities = snapshot.abilities()?;
    let shine_ids = snapshot.skill_shines();
    if shine_ids.is_empty() {
        return None;
    }

    let mut mappings = Vec::new();
    for ((ability, has_skill), &shine_id) in abilities.iter().zip(shine_ids) {
        let base = SkillMapping {
            ability,
            skill_name: ability.name(),
            has_skill,
            shine_id,
            shine_name: None,
            zone_name: None,
            is_mapped: false,
        };

        let shines = lookup.shines(shine_id);
        if shines.is_empty() {
            mappings.push(base);
            continue;
        }
        mappings.extend(shines.into_iter().map(|shine| SkillMapping {
            shine_name: Some(shine.name.clone()),
            zone_name: Some(shine.zone_name.clone()),
            is_mapped: true,
            ..base.clone()
        }));
    }

    mappings.sort_by(|a, b| {
        a.ability
            .cmp(&b.ability)
            .then_with(|| a.zone_name.cmp(&b.zone_name))
    });
    Some(mappings)
}
