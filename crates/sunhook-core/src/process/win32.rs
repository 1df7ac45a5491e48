//! Windows process access through ToolHelp, `VirtualQueryEx` and
//! `ReadProcessMemory`.

use std::ffi::c_void;
use std::mem;

use tracing::{debug, trace};
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW,
    TH32CS_SNAPPROCESS,
};
use windows::Win32::System::Memory::{MEM_COMMIT, MEMORY_BASIC_INFORMATION, VirtualQueryEx};
use windows::Win32::System::Threading::{OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ};

use super::{MemoryRegion, ProcessInfo, ProcessProvider};
use crate::error::{Error, Result};

/// Open process handle, closed on drop.
pub struct WindowsProcess {
    pid: u32,
    handle: HANDLE,
}

// SAFETY: the handle is owned exclusively by this value and only used by the
// thread that currently owns it.
unsafe impl Send for WindowsProcess {}

impl WindowsProcess {
    pub fn pid(&self) -> u32 {
        self.pid
    }
}

impl Drop for WindowsProcess {
    fn drop(&mut self) {
        if !self.handle.is_invalid() {
            // SAFETY: the handle came from OpenProcess and is closed only here.
            unsafe {
                let _ = CloseHandle(self.handle);
            }
            debug!("Closed process handle for PID {}", self.pid);
        }
    }
}

/// Closes a ToolHelp snapshot on every exit path.
struct Snapshot(HANDLE);

impl Drop for Snapshot {
    fn drop(&mut self) {
        // SAFETY: the snapshot handle is valid for the lifetime of this guard.
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

fn utf16_name(raw: &[u16]) -> String {
    let len = raw.iter().position(|&c| c == 0).unwrap_or(raw.len());
    String::from_utf16_lossy(&raw[..len])
}

#[derive(Default)]
pub struct WindowsProvider;

impl WindowsProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessProvider for WindowsProvider {
    type Handle = WindowsProcess;

    fn enumerate_processes(&self) -> Result<Vec<ProcessInfo>> {
        // SAFETY: plain ToolHelp enumeration; the entry size is initialised
        // before the first call and the snapshot guard closes the handle.
        unsafe {
            let snapshot = Snapshot(
                CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0)
                    .map_err(|e| Error::Platform(format!("CreateToolhelp32Snapshot: {}", e)))?,
            );

            let mut entry = PROCESSENTRY32W {
                dwSize: mem::size_of::<PROCESSENTRY32W>() as u32,
                ..Default::default()
            };

            let mut processes = Vec::new();
            if Process32FirstW(snapshot.0, &mut entry).is_ok() {
                loop {
                    if entry.th32ProcessID != 0 {
                        processes.push(ProcessInfo {
                            pid: entry.th32ProcessID,
                            name: utf16_name(&entry.szExeFile),
                        });
                    }
                    if Process32NextW(snapshot.0, &mut entry).is_err() {
                        break;
                    }
                }
            }
            Ok(processes)
        }
    }

    fn open_process(&self, pid: u32) -> Result<WindowsProcess> {
        // SAFETY: OpenProcess has no preconditions; ownership of the returned
        // handle moves into WindowsProcess.
        let handle = unsafe { OpenProcess(PROCESS_VM_READ | PROCESS_QUERY_INFORMATION, false, pid) }
            .map_err(|e| Error::ProcessNotFound(format!("OpenProcess({}): {}", pid, e)))?;
        Ok(WindowsProcess { pid, handle })
    }

    fn query_memory_regions(&self, process: &WindowsProcess) -> Result<Vec<MemoryRegion>> {
        let mut regions = Vec::new();
        let mut address: usize = 0;

        loop {
            let mut mbi = MEMORY_BASIC_INFORMATION::default();
            // SAFETY: mbi is a properly sized out-parameter.
            let written = unsafe {
                VirtualQueryEx(
                    process.handle,
                    Some(address as *const c_void),
                    &mut mbi,
                    mem::size_of::<MEMORY_BASIC_INFORMATION>(),
                )
            };
            if written == 0 || mbi.RegionSize == 0 {
                break;
            }

            if mbi.State == MEM_COMMIT {
                regions.push(MemoryRegion {
                    base: mbi.BaseAddress as u64,
                    size: mbi.RegionSize as u64,
                });
            }

            match (mbi.BaseAddress as usize).checked_add(mbi.RegionSize) {
                Some(next) if next > address => address = next,
                _ => break,
            }
        }

        trace!("PID {}: {} committed regions", process.pid, regions.len());
        Ok(regions)
    }

    fn read_process_memory(
        &self,
        process: &WindowsProcess,
        address: u64,
        buf: &mut [u8],
    ) -> Result<usize> {
        let mut read = 0usize;
        // SAFETY: buf is valid for buf.len() bytes and read is a valid out-pointer.
        unsafe {
            ReadProcessMemory(
                process.handle,
                address as *const c_void,
                buf.as_mut_ptr().cast(),
                buf.len(),
                Some(&mut read),
            )
        }
        .map_err(|e| Error::Platform(format!("ReadProcessMemory: {}", e)))?;
        Ok(read)
    }

    fn case_insensitive_names(&self) -> bool {
        true
    }

    fn requires_magic(&self) -> bool {
        true
    }
}
