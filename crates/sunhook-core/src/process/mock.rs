//! In-memory [`ProcessProvider`] for tests.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use super::{MemoryRegion, ProcessInfo, ProcessProvider};
use crate::error::{Error, Result};
use crate::memory::layout::ram;
use crate::memory::translate;

struct MockRegion {
    region: MemoryRegion,
    /// Backing bytes; may be shorter than the region (the rest is unreadable)
    data: Arc<RwLock<Vec<u8>>>,
}

/// Handle returned by [`MockProvider::open_process`]; counts its own release.
pub struct MockProcess {
    pub pid: u32,
    released: Arc<AtomicUsize>,
}

impl Drop for MockProcess {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Shared view of the primary RAM image, usable after the provider was moved.
#[derive(Clone)]
pub struct MockRam {
    data: Arc<RwLock<Vec<u8>>>,
}

impl MockRam {
    /// Write bytes at an emulated address.
    pub fn write(&self, address: u32, bytes: &[u8]) {
        let offset = translate(0, address) as usize;
        let mut data = self.data.write().unwrap();
        data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn clear(&self, address: u32, len: usize) {
        self.write(address, &vec![0u8; len]);
    }
}

/// Emulated address ranges whose reads fail, shared with the provider.
#[derive(Clone, Default)]
pub struct MockFaults {
    ranges: Arc<Mutex<Vec<Range<u64>>>>,
}

impl MockFaults {
    pub fn add(&self, address: u32, len: usize) {
        let start = translate(0, address);
        self.ranges.lock().unwrap().push(start..start + len as u64);
    }

    pub fn clear(&self) {
        self.ranges.lock().unwrap().clear();
    }

    fn overlaps(&self, offset: u64, len: usize) -> bool {
        let end = offset + len as u64;
        self.ranges
            .lock()
            .unwrap()
            .iter()
            .any(|r| offset < r.end && r.start < end)
    }
}

pub struct MockProvider {
    processes: Vec<ProcessInfo>,
    regions: Vec<MockRegion>,
    primary_ram: Option<Arc<RwLock<Vec<u8>>>>,
    enumeration_fails: bool,
    region_query_fails: bool,
    case_insensitive: bool,
    requires_magic: bool,
    fail_reads: Arc<AtomicBool>,
    faults: MockFaults,
    released: Arc<AtomicUsize>,
    opened: Arc<AtomicUsize>,
    read_log: Arc<Mutex<Vec<u64>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            processes: Vec::new(),
            regions: Vec::new(),
            primary_ram: None,
            enumeration_fails: false,
            region_query_fails: false,
            case_insensitive: false,
            requires_magic: false,
            fail_reads: Arc::new(AtomicBool::new(false)),
            faults: MockFaults::default(),
            released: Arc::new(AtomicUsize::new(0)),
            opened: Arc::new(AtomicUsize::new(0)),
            read_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_process(mut self, pid: u32, name: &str) -> Self {
        self.processes.push(ProcessInfo {
            pid,
            name: name.to_string(),
        });
        self
    }

    pub fn with_region(mut self, base: u64, size: u64, data: Vec<u8>) -> Self {
        self.regions.push(MockRegion {
            region: MemoryRegion { base, size },
            data: Arc::new(RwLock::new(data)),
        });
        self
    }

    /// Add a zeroed 32 MiB RAM image starting with the disc id magic.
    /// The first one added becomes the target of [`MockRam`] writes.
    pub fn with_ram(mut self, base: u64) -> Self {
        let mut data = vec![0u8; ram::SIZE as usize];
        data[..3].copy_from_slice(ram::MAGIC);
        let data = Arc::new(RwLock::new(data));
        if self.primary_ram.is_none() {
            self.primary_ram = Some(Arc::clone(&data));
        }
        self.regions.push(MockRegion {
            region: MemoryRegion {
                base,
                size: ram::SIZE,
            },
            data,
        });
        self
    }

    pub fn failing_enumeration(mut self) -> Self {
        self.enumeration_fails = true;
        self
    }

    pub fn failing_region_query(mut self) -> Self {
        self.region_query_fails = true;
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    pub fn requiring_magic(mut self) -> Self {
        self.requires_magic = true;
        self
    }

    pub fn ram(&self) -> MockRam {
        MockRam {
            data: Arc::clone(self.primary_ram.as_ref().expect("no RAM region added")),
        }
    }

    /// Switch that makes every subsequent read fail while set.
    pub fn read_failure_switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fail_reads)
    }

    /// Per-range read failures, offsets taken relative to each region base.
    pub fn faults(&self) -> MockFaults {
        self.faults.clone()
    }

    /// Number of [`MockProcess`] handles dropped so far.
    pub fn release_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.released)
    }

    pub fn open_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.opened)
    }

    /// Host addresses of every read issued, in order.
    pub fn read_log(&self) -> Arc<Mutex<Vec<u64>>> {
        Arc::clone(&self.read_log)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessProvider for MockProvider {
    type Handle = MockProcess;

    fn enumerate_processes(&self) -> Result<Vec<ProcessInfo>> {
        if self.enumeration_fails {
            return Err(Error::Platform("enumeration denied".to_string()));
        }
        Ok(self.processes.clone())
    }

    fn open_process(&self, pid: u32) -> Result<MockProcess> {
        if !self.processes.iter().any(|p| p.pid == pid) {
            return Err(Error::ProcessNotFound(format!("pid {}", pid)));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockProcess {
            pid,
            released: Arc::clone(&self.released),
        })
    }

    fn query_memory_regions(&self, _process: &MockProcess) -> Result<Vec<MemoryRegion>> {
        if self.region_query_fails {
            return Err(Error::Platform("process exited".to_string()));
        }
        Ok(self.regions.iter().map(|r| r.region).collect())
    }

    fn read_process_memory(
        &self,
        _process: &MockProcess,
        address: u64,
        buf: &mut [u8],
    ) -> Result<usize> {
        self.read_log.lock().unwrap().push(address);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Platform("process exited".to_string()));
        }

        let region = self
            .regions
            .iter()
            .find(|r| address >= r.region.base && address < r.region.end())
            .ok_or_else(|| Error::Platform(format!("unmapped address {:#x}", address)))?;

        if self.faults.overlaps(address - region.region.base, buf.len()) {
            return Err(Error::Platform(format!("fault at {:#x}", address)));
        }

        let data = region.data.read().unwrap();
        let offset = (address - region.region.base) as usize;
        let backing = data.get(offset..).unwrap_or(&[]);
        let available = backing.len().min(buf.len());
        buf[..available].copy_from_slice(&backing[..available]);
        Ok(available)
    }

    fn case_insensitive_names(&self) -> bool {
        self.case_insensitive
    }

    fn requires_magic(&self) -> bool {
        self.requires_magic
    }
}
