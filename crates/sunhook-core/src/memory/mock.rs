//! Emulated-memory stand-in for decoder tests.

use std::cell::RefCell;
use std::ops::Range;

use super::layout::ram;
use super::{ReadMemory, translate};
use crate::error::{Error, Result};

pub struct MockMemoryReader {
    data: Vec<u8>,
    faults: Vec<Range<u32>>,
    reads: RefCell<Vec<(u32, usize)>>,
}

impl MockMemoryReader {
    /// Every `(address, len)` read so far.
    pub fn reads(&self) -> Vec<(u32, usize)> {
        self.reads.borrow().clone()
    }
}

impl ReadMemory for MockMemoryReader {
    fn read_bytes(&self, address: u32, len: usize) -> Result<Vec<u8>> {
        self.reads.borrow_mut().push((address, len));
        let end = address.wrapping_add(len as u32);
        if self
            .faults
            .iter()
            .any(|fault| address < fault.end && fault.start < end)
        {
            return Err(Error::read_fault(address, "mock fault"));
        }

        let offset = translate(0, address) as usize;
        self.data
            .get(offset..offset + len)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| Error::read_fault(address, "out of range"))
    }
}

#[derive(Default)]
pub struct MockMemoryBuilder {
    writes: Vec<(u32, Vec<u8>)>,
    faults: Vec<Range<u32>>,
}

impl MockMemoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(mut self, address: u32, bytes: &[u8]) -> Self {
        self.writes.push((address, bytes.to_vec()));
        self
    }

    /// Any read overlapping `range` fails with a read fault.
    pub fn fault(mut self, range: Range<u32>) -> Self {
        self.faults.push(range);
        self
    }

    pub fn build(self) -> MockMemoryReader {
        let mut data = vec![0u8; ram::SIZE as usize];
        for (address, bytes) in self.writes {
            let offset = translate(0, address) as usize;
            data[offset..offset + bytes.len()].copy_from_slice(&bytes);
        }
        MockMemoryReader {
            data,
            faults: self.faults,
            reads: RefCell::new(Vec::new()),
        }
    }
}
