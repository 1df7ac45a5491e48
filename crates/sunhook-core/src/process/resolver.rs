use tracing::{debug, trace};

use super::{MemoryRegion, ProcessProvider};
use crate::memory::layout::ram;

/// Locate the emulated RAM image inside the process.
///
/// Regions are walked in ascending address order; the first one that is
/// exactly [`ram::SIZE`] bytes (and starts with [`ram::MAGIC`] where the
/// platform requires it) wins.
pub fn resolve_ram_base<P: ProcessProvider>(provider: &P, process: &P::Handle) -> Option<u64> {
    let mut regions = match provider.query_memory_regions(process) {
        Ok(regions) => regions,
        Err(e) => {
            debug!("Memory region query failed: {}", e);
            return None;
        }
    };
    regions.sort_by_key(|region| region.base);

    let check_magic = provider.requires_magic();
    regions
        .iter()
        .filter(|region| region.size == ram::SIZE)
        .find(|region| !check_magic || has_magic(provider, process, region))
        .map(|region| {
            debug!(
                "RAM image candidate at {:#x}..{:#x}",
                region.base,
                region.end()
            );
            region.base
        })
}

fn has_magic<P: ProcessProvider>(provider: &P, process: &P::Handle, region: &MemoryRegion) -> bool {
    let mut magic = [0u8; 3];
    match provider.read_process_memory(process, region.base, &mut magic) {
        Ok(n) if n == magic.len() => &magic == ram::MAGIC,
        Ok(n) => {
            trace!("Short magic read at {:#x} ({} bytes)", region.base, n);
            false
        }
        Err(e) => {
            trace!("Magic read at {:#x} failed: {}", region.base, e);
            false
        }
    }
}
