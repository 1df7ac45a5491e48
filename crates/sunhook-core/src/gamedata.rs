//! Static shine data used to name the shine linked to each ability.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// A collectible shine and the zone it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShineInfo {
    /// Numeric id as stored in game memory
    pub id: u32,
    /// Tracker key of the shine
    pub key: String,
    pub name: String,
    pub zone_id: String,
    pub zone_name: String,
}

/// Resolves in-game shine ids to catalog entries.
pub trait ShineLookup {
    fn shine(&self, id: u32) -> Option<&ShineInfo>;

    /// Every entry carrying `id`. The same shine can be listed under several zones.
    fn shines(&self, id: u32) -> Vec<&ShineInfo> {
        self.shine(id).into_iter().collect()
    }
}

#[derive(Debug, Deserialize)]
struct ZonesDocument {
    zones: BTreeMap<String, ZoneEntry>,
}

#[derive(Debug, Deserialize)]
struct ZoneEntry {
    name: String,
    #[serde(default)]
    shines_available: Vec<ShineEntry>,
}

#[derive(Debug, Deserialize)]
struct ShineEntry {
    id: String,
    name: String,
    #[serde(default)]
    num_id: u32,
}

/// In-memory shine table built from a zones document
#[derive(Debug, Clone, Default)]
pub struct ShineCatalog {
    by_id: HashMap<u32, Vec<ShineInfo>>,
}

impl ShineCatalog {
    /// Parse `{"zones": {"<id>": {"name", "shines_available": [...]}}}`.
    ///
    /// Shines without a numeric id (`num_id` 0 or missing) are not tracked in
    /// memory and are skipped. Entries for one id are ordered by zone name.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: ZonesDocument = serde_json::from_str(json)?;
        let mut by_id: HashMap<u32, Vec<ShineInfo>> = HashMap::new();

        for (zone_id, zone) in document.zones {
            for shine in zone.shines_available {
                if shine.num_id == 0 {
                    continue;
                }
                by_id.entry(shine.num_id).or_default().push(ShineInfo {
                    id: shine.num_id,
                    key: shine.id,
                    name: shine.name,
                    zone_id: zone_id.clone(),
                    zone_name: zone.name.clone(),
                });
            }
        }

        for entries in by_id.values_mut() {
            entries.sort_by(|a, b| a.zone_name.cmp(&b.zone_name));
        }

        debug!("Loaded {} shine ids", by_id.len());
        Ok(Self { by_id })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl ShineLookup for ShineCatalog {
    fn shine(&self, id: u32) -> Option<&ShineInfo> {
        self.by_id.get(&id).and_then(|entries| entries.first())
    }

    fn shines(&self, id: u32) -> Vec<&ShineInfo> {
        self.by_id
            .get(&id)
            .map(|entries| entries.iter().collect())
            .unwrap_or_default()
    }
}
