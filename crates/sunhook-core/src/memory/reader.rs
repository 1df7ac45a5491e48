use crate::error::{Error, Result};
use crate::hook::HookHandle;
use crate::memory::layout::ram;
use crate::process::ProcessProvider;

/// Map an emulated address onto the host address of the RAM image.
///
/// The segment bit is stripped first; what remains is wrapped into the
/// 32 MiB image so the cached and uncached mirrors read the same bytes.
pub fn translate(base: u64, address: u32) -> u64 {
    let offset = u64::from(address & ram::SEGMENT_MASK) % ram::SIZE;
    base + offset
}

/// Read access to emulated memory.
///
/// Values are big-endian, as on the console.
pub trait ReadMemory {
    fn read_bytes(&self, address: u32, len: usize) -> Result<Vec<u8>>;

    fn read_u32(&self, address: u32) -> Result<u32> {
        let bytes = self.read_bytes(address, 4)?;
        let word: [u8; 4] = bytes
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| Error::read_fault(address, "short read"))?;
        Ok(u32::from_be_bytes(word))
    }

    fn read_u32_array(&self, address: u32, count: usize) -> Result<Vec<u32>> {
        let bytes = self.read_bytes(address, count * 4)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect())
    }
}

/// Reads through a live hook handle.
pub struct MemoryReader<'a, P: ProcessProvider> {
    provider: &'a P,
    hook: &'a HookHandle<P::Handle>,
}

impl<'a, P: ProcessProvider> MemoryReader<'a, P> {
    pub fn new(provider: &'a P, hook: &'a HookHandle<P::Handle>) -> Self {
        Self { provider, hook }
    }

    pub fn base_address(&self) -> u64 {
        self.hook.base_address()
    }
}

impl<P: ProcessProvider> ReadMemory for MemoryReader<'_, P> {
    fn read_bytes(&self, address: u32, len: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; len];
        if len == 0 {
            return Ok(buffer);
        }

        let real = translate(self.hook.base_address(), address);
        match self
            .provider
            .read_process_memory(self.hook.process(), real, &mut buffer)
        {
            Ok(n) if n == len => Ok(buffer),
            Ok(n) => Err(Error::read_fault(
                address,
                format!("short read ({} of {} bytes)", n, len),
            )),
            Err(e) => Err(Error::read_fault(address, e.to_string())),
        }
    }
}
