//! Linux process access through procfs and `process_vm_readv`.

use std::fs;
use std::io::IoSliceMut;
use std::path::{Path, PathBuf};

use nix::sys::uio::{RemoteIoVec, process_vm_readv};
use nix::unistd::Pid;
use tracing::trace;

use super::{MemoryRegion, ProcessInfo, ProcessProvider};
use crate::error::{Error, Result};

/// Target process. Nothing is held open on Linux; reads go by pid.
#[derive(Debug, Clone, Copy)]
pub struct LinuxProcess {
    pid: Pid,
}

impl LinuxProcess {
    pub fn pid(&self) -> u32 {
        self.pid.as_raw() as u32
    }
}

/// One line of `/proc/<pid>/maps`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MapsEntry {
    pub start: u64,
    pub end: u64,
    pub perms: String,
}

impl MapsEntry {
    /// Private read-write mapping, the only kind that can back emulated RAM
    fn is_private_rw(&self) -> bool {
        self.perms == "rw-p"
    }
}

/// Parse the text of a maps file; malformed lines are skipped.
pub(crate) fn parse_maps(content: &str) -> Vec<MapsEntry> {
    content
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let range = fields.next()?;
            let perms = fields.next()?;
            let (start, end) = range.split_once('-')?;
            let start = u64::from_str_radix(start, 16).ok()?;
            let end = u64::from_str_radix(end, 16).ok()?;
            (end >= start).then(|| MapsEntry {
                start,
                end,
                perms: perms.to_string(),
            })
        })
        .collect()
}

pub struct LinuxProvider {
    proc_root: PathBuf,
}

impl LinuxProvider {
    pub fn new() -> Self {
        Self::with_proc_root("/proc")
    }

    /// Use an alternative procfs mount (tests point this at a temp dir).
    pub fn with_proc_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            proc_root: root.as_ref().to_path_buf(),
        }
    }
}

impl Default for LinuxProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessProvider for LinuxProvider {
    type Handle = LinuxProcess;

    fn enumerate_processes(&self) -> Result<Vec<ProcessInfo>> {
        let mut processes = Vec::new();
        for entry in fs::read_dir(&self.proc_root)? {
            let Ok(entry) = entry else { continue };
            let Some(pid) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<u32>().ok())
            else {
                continue;
            };

            // Processes can exit or deny access between readdir and here
            match fs::read_to_string(entry.path().join("comm")) {
                Ok(comm) => processes.push(ProcessInfo {
                    pid,
                    name: comm.trim().to_string(),
                }),
                Err(e) => trace!("Skipping pid {}: {}", pid, e),
            }
        }
        processes.sort_by_key(|p| p.pid);
        Ok(processes)
    }

    fn open_process(&self, pid: u32) -> Result<LinuxProcess> {
        let raw = i32::try_from(pid)
            .map_err(|_| Error::ProcessNotFound(format!("pid {} out of range", pid)))?;
        if !self.proc_root.join(pid.to_string()).exists() {
            return Err(Error::ProcessNotFound(format!("pid {}", pid)));
        }
        Ok(LinuxProcess {
            pid: Pid::from_raw(raw),
        })
    }

    fn query_memory_regions(&self, process: &LinuxProcess) -> Result<Vec<MemoryRegion>> {
        let maps = fs::read_to_string(
            self.proc_root
                .join(process.pid().to_string())
                .join("maps"),
        )?;
        Ok(parse_maps(&maps)
            .into_iter()
            .filter(MapsEntry::is_private_rw)
            .map(|entry| MemoryRegion {
                base: entry.start,
                size: entry.end - entry.start,
            })
            .collect())
    }

    fn read_process_memory(
        &self,
        process: &LinuxProcess,
        address: u64,
        buf: &mut [u8],
    ) -> Result<usize> {
        let len = buf.len();
        let base = usize::try_from(address)
            .map_err(|_| Error::Platform(format!("address {:#x} out of range", address)))?;
        let mut local = [IoSliceMut::new(buf)];
        let remote = [RemoteIoVec { base, len }];

        process_vm_readv(process.pid, &mut local, &remote)
            .map_err(|e| Error::Platform(format!("process_vm_readv: {}", e)))
    }
}
