//! Continuous tracking mode.

use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Result, anyhow};
use owo_colors::OwoColorize;
use sunhook_core::{
    HookManager, MemoryState, NativeProvider, SharedShineLookup, ShineCatalog, ShutdownSignal,
    StateSynchronizer, TrackerConfig,
};
use tracing::{info, warn};

/// How often the foreground checks the published snapshot
const REFRESH_INTERVAL: Duration = Duration::from_millis(250);

/// Poll the emulator on a background thread and report every state change.
pub fn run(
    config: &TrackerConfig,
    catalog: Option<Arc<ShineCatalog>>,
    output: Option<&Path>,
) -> Result<()> {
    let shutdown = Arc::new(ShutdownSignal::new());
    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        shutdown_ctrlc.trigger();
    })?;

    let (reader_tx, reader_rx) = mpsc::channel();
    let poller = {
        let shutdown = Arc::clone(&shutdown);
        let config = config.clone();
        thread::Builder::new()
            .name("sunhook-poller".to_string())
            .spawn(move || {
                let hook = HookManager::with_targets(NativeProvider::new(), config.process_names);
                let mut sync = StateSynchronizer::new(hook, config.timing);
                if let Some(catalog) = catalog {
                    sync = sync.with_shine_lookup(catalog as SharedShineLookup);
                }
                if reader_tx.send(sync.reader()).is_ok() {
                    sync.run(&shutdown);
                }
            })?
    };
    let reader = reader_rx.recv()?;

    println!("Waiting for Dolphin... (Press Ctrl+C to quit)");

    let mut last: Option<MemoryState> = None;
    while !shutdown.wait(REFRESH_INTERVAL) {
        let state = MemoryState::from_snapshot(&reader.current());
        if last.as_ref() == Some(&state) {
            continue;
        }

        print_status(&state);
        if let Some(path) = output
            && let Err(e) = write_state(path, &state)
        {
            warn!("Failed to write {}: {}", path.display(), e);
        }
        last = Some(state);
    }

    poller
        .join()
        .map_err(|_| anyhow!("poller thread panicked"))?;
    Ok(())
}

fn print_status(state: &MemoryState) {
    if !state.is_hooked {
        println!("{}", "Not hooked, searching for Dolphin...".yellow());
        return;
    }

    let unlocked = state.unlocks.values().filter(|&&unlocked| unlocked).count();
    println!(
        "{} {} / {} | abilities {}/{} | shines {} | seed {}",
        "[hooked]".green(),
        state.current_level.bold(),
        state.current_episode,
        unlocked,
        state.unlocks.len(),
        state.total_shines,
        state.seed.cyan()
    );
}

fn write_state(path: &Path, state: &MemoryState) -> Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json)?;
    Ok(())
}
