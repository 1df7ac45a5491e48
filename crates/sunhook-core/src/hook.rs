//! Attach/detach lifecycle for the emulator process.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::memory::{MemoryReader, ReadMemory};
use crate::process::{DEFAULT_TARGETS, ProcessProvider, find_process, resolve_ram_base};

/// Lifecycle state of the hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HookState {
    Unattached,
    Attaching,
    Attached,
}

/// A bound emulator process: pid, RAM image base and the platform handle.
pub struct HookHandle<H> {
    pid: u32,
    base_address: u64,
    process: H,
}

impl<H> HookHandle<H> {
    pub fn new(pid: u32, base_address: u64, process: H) -> Self {
        Self {
            pid,
            base_address,
            process,
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn base_address(&self) -> u64 {
        self.base_address
    }

    pub fn process(&self) -> &H {
        &self.process
    }
}

/// Owns the provider and the single live [`HookHandle`].
///
/// Reads go through the manager's [`ReadMemory`] impl, which fails with
/// [`Error::NotAttached`] while no handle is held.
pub struct HookManager<P: ProcessProvider> {
    provider: P,
    targets: Vec<String>,
    state: HookState,
    hook: Option<HookHandle<P::Handle>>,
}

impl<P: ProcessProvider> HookManager<P> {
    pub fn new(provider: P) -> Self {
        Self::with_targets(provider, DEFAULT_TARGETS.iter().map(|s| s.to_string()))
    }

    pub fn with_targets<I, S>(provider: P, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            provider,
            targets: targets.into_iter().map(Into::into).collect(),
            state: HookState::Unattached,
            hook: None,
        }
    }

    pub fn state(&self) -> HookState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        self.state == HookState::Attached
    }

    pub fn handle(&self) -> Option<&HookHandle<P::Handle>> {
        self.hook.as_ref()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Run the locate → open → resolve pipeline.
    ///
    /// A no-op when already attached. On failure the manager is left
    /// unattached and any opened process handle has been released.
    pub fn try_attach(&mut self) -> Result<()> {
        if self.is_attached() {
            return Ok(());
        }

        self.state = HookState::Attaching;
        match self.locate_and_resolve() {
            Ok(hook) => {
                info!(
                    "Attached to PID {} (RAM base: {:#x})",
                    hook.pid(),
                    hook.base_address()
                );
                self.hook = Some(hook);
                self.state = HookState::Attached;
                Ok(())
            }
            Err(e) => {
                self.state = HookState::Unattached;
                Err(e)
            }
        }
    }

    fn locate_and_resolve(&self) -> Result<HookHandle<P::Handle>> {
        let pid = find_process(&self.provider, &self.targets)
            .ok_or_else(|| Error::ProcessNotFound(self.targets.join(", ")))?;
        debug!("Found emulator process {}", pid);

        let process = self.provider.open_process(pid)?;
        let base = resolve_ram_base(&self.provider, &process)
            .ok_or(Error::RegionNotFound { pid })?;

        Ok(HookHandle::new(pid, base, process))
    }

    /// Release the platform handle and return to `Unattached`.
    ///
    /// The handle is moved out before being dropped, so it is released
    /// exactly once no matter how often this is called.
    pub fn detach(&mut self) {
        if let Some(hook) = self.hook.take() {
            let pid = hook.pid();
            drop(hook);
            info!("Detached from PID {}", pid);
        }
        self.state = HookState::Unattached;
    }

    /// Reader bound to the current handle.
    pub fn reader(&self) -> Result<MemoryReader<'_, P>> {
        match (&self.hook, self.state) {
            (Some(hook), HookState::Attached) => Ok(MemoryReader::new(&self.provider, hook)),
            _ => Err(Error::NotAttached),
        }
    }
}

impl<P: ProcessProvider> ReadMemory for HookManager<P> {
    fn read_bytes(&self, address: u32, len: usize) -> Result<Vec<u8>> {
        self.reader()?.read_bytes(address, len)
    }
}
