//! Host process access.
//!
//! Everything platform specific sits behind [`ProcessProvider`]. The locator
//! and resolver are written against the trait only; [`NativeProvider`] picks
//! the implementation for the build target.

mod locator;
mod resolver;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(any(target_os = "linux", target_os = "windows")))]
mod unsupported;
#[cfg(target_os = "windows")]
mod win32;

#[cfg(test)]
pub mod mock;

use serde::Serialize;

use crate::error::Result;

pub use locator::{DEFAULT_TARGETS, find_process, name_matches};
pub use resolver::resolve_ram_base;

#[cfg(target_os = "linux")]
pub use linux::{LinuxProcess, LinuxProvider as NativeProvider};
#[cfg(not(any(target_os = "linux", target_os = "windows")))]
pub use unsupported::UnsupportedProvider as NativeProvider;
#[cfg(target_os = "windows")]
pub use win32::{WindowsProcess, WindowsProvider as NativeProvider};

/// A running process as reported by enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessInfo {
    pub pid: u32,
    /// Image name (Windows) or `comm` name (Linux)
    pub name: String,
}

/// A mapped region of a process's virtual address space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryRegion {
    pub base: u64,
    pub size: u64,
}

impl MemoryRegion {
    pub fn end(&self) -> u64 {
        self.base.saturating_add(self.size)
    }
}

/// Platform capability interface used by the locator, resolver and reader.
pub trait ProcessProvider {
    /// Open process resource; released when dropped.
    type Handle;

    /// List running processes. Entries whose name cannot be read are omitted.
    fn enumerate_processes(&self) -> Result<Vec<ProcessInfo>>;

    fn open_process(&self, pid: u32) -> Result<Self::Handle>;

    /// Mapped regions of the process that may hold the RAM image.
    fn query_memory_regions(&self, process: &Self::Handle) -> Result<Vec<MemoryRegion>>;

    /// Copy `buf.len()` bytes from `address`; returns the number of bytes copied.
    fn read_process_memory(
        &self,
        process: &Self::Handle,
        address: u64,
        buf: &mut [u8],
    ) -> Result<usize>;

    /// Whether image names compare case-insensitively on this platform.
    fn case_insensitive_names(&self) -> bool {
        false
    }

    /// Whether several regions of the RAM size can coexist, so the disc id
    /// magic must be checked.
    fn requires_magic(&self) -> bool {
        false
    }
}
