//! Fallback for targets without a process access implementation.

use super::{MemoryRegion, ProcessInfo, ProcessProvider};
use crate::error::{Error, Result};

pub struct UnsupportedProcess;

#[derive(Default)]
pub struct UnsupportedProvider;

impl UnsupportedProvider {
    pub fn new() -> Self {
        Self
    }

    fn unsupported<T>() -> Result<T> {
        Err(Error::Platform(format!(
            "process access is not implemented for {}",
            std::env::consts::OS
        )))
    }
}

impl ProcessProvider for UnsupportedProvider {
    type Handle = UnsupportedProcess;

    fn enumerate_processes(&self) -> Result<Vec<ProcessInfo>> {
        Self::unsupported()
    }

    fn open_process(&self, _pid: u32) -> Result<UnsupportedProcess> {
        Self::unsupported()
    }

    fn query_memory_regions(&self, _process: &UnsupportedProcess) -> Result<Vec<MemoryRegion>> {
        Self::unsupported()
    }

    fn read_process_memory(
        &self,
        _process: &UnsupportedProcess,
        _address: u64,
        _buf: &mut [u8],
    ) -> Result<usize> {
        Self::unsupported()
    }
}
