//! One-shot state dump.

use anyhow::Result;
use sunhook_core::{
    HookManager, MemoryState, NativeProvider, ShineCatalog, StateSynchronizer, TickOutcome,
    TrackerConfig, skill_mappings,
};

/// Attach, run a single tick and print the result as JSON.
///
/// With a shine catalog the ability to shine mapping is included as well.
pub fn run(config: &TrackerConfig, catalog: Option<&ShineCatalog>) -> Result<()> {
    let hook = HookManager::with_targets(NativeProvider::new(), config.process_names.clone());
    let mut sync = StateSynchronizer::new(hook, config.timing);

    let snapshot = match sync.tick() {
        TickOutcome::Published(snapshot) => snapshot,
        TickOutcome::NotAttached(e) | TickOutcome::ConnectionLost(e) => return Err(e.into()),
    };

    let state = MemoryState::from_snapshot(&snapshot);
    let json = match catalog.and_then(|catalog| skill_mappings(&snapshot, catalog)) {
        Some(mappings) => serde_json::to_string_pretty(&serde_json::json!({
            "memory": state,
            "skill_mappings": mappings,
        }))?,
        None => serde_json::to_string_pretty(&state)?,
    };
    println!("{}", json);
    Ok(())
}
