//! The polling loop that turns emulator memory into published snapshots.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::TimingPolicy;
use crate::error::{Error, Result};
use crate::game::{read_abilities, read_seed, read_skill_shines, read_total_shines, scan_location};
use crate::gamedata::ShineLookup;
use crate::hook::HookManager;
use crate::process::ProcessProvider;
use crate::shutdown::ShutdownSignal;
use crate::snapshot::{Snapshot, SnapshotPublisher, SnapshotReader};

/// Shine lookup shared with the polling thread
pub type SharedShineLookup = Arc<dyn ShineLookup + Send + Sync>;

/// Result of one [`StateSynchronizer::tick`]
#[derive(Debug)]
pub enum TickOutcome {
    /// No emulator could be attached; nothing was published
    NotAttached(Error),
    /// A complete snapshot was committed
    Published(Arc<Snapshot>),
    /// A read failed mid-tick; the hook was dropped and a detached copy of
    /// the previous snapshot was published
    ConnectionLost(Error),
}

impl TickOutcome {
    /// How long the loop sleeps before the next tick.
    pub fn delay(&self, timing: &TimingPolicy) -> Duration {
        match self {
            TickOutcome::NotAttached(_) => timing.attach_backoff(),
            TickOutcome::Published(_) => timing.poll_interval(),
            TickOutcome::ConnectionLost(_) => timing.failure_backoff(),
        }
    }
}

/// Owns the hook and the publisher. Runs on the polling thread only.
pub struct StateSynchronizer<P: ProcessProvider> {
    hook: HookManager<P>,
    publisher: SnapshotPublisher,
    timing: TimingPolicy,
    shines: Option<SharedShineLookup>,
    /// Last committed state, fields intact even after a detach
    last: Snapshot,
}

impl<P: ProcessProvider> StateSynchronizer<P> {
    pub fn new(hook: HookManager<P>, timing: TimingPolicy) -> Self {
        Self {
            hook,
            publisher: SnapshotPublisher::new(),
            timing,
            shines: None,
            last: Snapshot::default(),
        }
    }

    /// Name the shine behind each ability change in unlock logs.
    pub fn with_shine_lookup(mut self, shines: SharedShineLookup) -> Self {
        self.shines = Some(shines);
        self
    }

    pub fn reader(&self) -> SnapshotReader {
        self.publisher.reader()
    }

    pub fn hook(&self) -> &HookManager<P> {
        &self.hook
    }

    pub fn timing(&self) -> &TimingPolicy {
        &self.timing
    }

    /// Attach if needed, sample memory and publish.
    pub fn tick(&mut self) -> TickOutcome {
        if let Err(e) = self.hook.try_attach() {
            debug!("Attach failed: {}", e);
            return TickOutcome::NotAttached(e);
        }

        match self.sample() {
            Ok(snapshot) => {
                self.log_unlocks(&snapshot);
                self.last = snapshot.clone();
                TickOutcome::Published(self.publisher.publish(snapshot))
            }
            Err(e) => {
                warn!("Connection to emulator lost: {}", e);
                self.hook.detach();
                self.last = self.last.detached();
                self.publisher.publish(self.last.clone());
                TickOutcome::ConnectionLost(e)
            }
        }
    }

    /// Tick until `shutdown` fires, sleeping per [`TickOutcome::delay`].
    pub fn run(&mut self, shutdown: &ShutdownSignal) {
        info!(
            "Waiting for emulator process ({})",
            self.hook.targets().join(", ")
        );

        while !shutdown.is_triggered() {
            let delay = self.tick().delay(&self.timing);
            if shutdown.wait(delay) {
                break;
            }
        }

        if self.hook.is_attached() {
            self.hook.detach();
            self.publisher.publish(self.last.detached());
        }
        info!("State synchroniser stopped");
    }

    /// Read one full tick. Location and ability failures abort the tick;
    /// the progress reads fall back to the previous values.
    fn sample(&self) -> Result<Snapshot> {
        let hook = self.hook.handle().ok_or(Error::NotAttached)?;
        let reader = self.hook.reader()?;

        let location = scan_location(&reader)?;
        let abilities = read_abilities(&reader)?;

        let mut snapshot = Snapshot {
            attached: true,
            pid: Some(hook.pid()),
            base_address: Some(hook.base_address()),
            location,
            abilities: Some(abilities),
            seed: self.last.seed.clone(),
            seed_error: None,
            skill_shines: self.last.skill_shines.clone(),
            total_shines: self.last.total_shines,
            tick: self.last.tick + 1,
            updated_at: Some(Utc::now()),
        };

        match read_skill_shines(&reader) {
            Ok(shines) => snapshot.skill_shines = shines,
            Err(e) => debug!("Failed to read skill shines: {}", e),
        }
        match read_total_shines(&reader) {
            Ok(total) => snapshot.total_shines = Some(total),
            Err(e) => debug!("Failed to read total shines: {}", e),
        }
        match read_seed(&reader) {
            Ok(seed) => snapshot.seed = Some(seed),
            Err(e) => {
                warn!("Failed to read seed: {}", e);
                snapshot.seed_error = Some(e.to_string());
            }
        }

        Ok(snapshot)
    }

    fn log_unlocks(&self, snapshot: &Snapshot) {
        let (Some(previous), Some(current)) = (&self.last.abilities, &snapshot.abilities) else {
            return;
        };

        let (level, mission) = snapshot
            .location
            .as_ref()
            .map(|l| (l.level.name(), l.mission.as_str()))
            .unwrap_or(("unknown", "unknown"));

        for ability in current.changed_since(previous) {
            let state = if current.is_unlocked(ability) {
                "unlocked"
            } else {
                "locked"
            };
            let Some(&shine_id) = snapshot.skill_shines.get(ability.index()) else {
                info!("{} {} in {} / {}", ability, state, level, mission);
                continue;
            };

            info!(
                "{} {} by shine {} in {} / {} (total shines: {})",
                ability,
                state,
                shine_id,
                level,
                mission,
                snapshot.total_shines.unwrap_or(0)
            );

            if let Some(shines) = &self.shines {
                match shines.shine(shine_id) {
                    Some(shine) => info!(
                        "Shine {} is \"{}\" in {}",
                        shine_id, shine.name, shine.zone_name
                    ),
                    None => warn!("Shine {} linked to {} has no catalog entry", shine_id, ability),
                }
            }
        }
    }
}
