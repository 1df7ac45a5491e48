pub mod layout;
mod reader;

#[cfg(test)]
pub mod mock;

pub use reader::{MemoryReader, ReadMemory, translate};

#[cfg(test)]
pub use mock::{MockMemoryBuilder, MockMemoryReader};
