use crate::error::Result;
use crate::memory::ReadMemory;
use crate::memory::layout::progress;

/// Render the seed bytes as 8 uppercase hex digits.
pub fn format_seed(bytes: [u8; 4]) -> String {
    format!("{:08X}", u32::from_be_bytes(bytes))
}

pub fn read_seed<R: ReadMemory + ?Sized>(reader: &R) -> Result<String> {
    Ok(format_seed(reader.read_u32(progress::SEED)?.to_be_bytes()))
}

/// Shine id linked to each ability, in ability order.
pub fn read_skill_shines<R: ReadMemory + ?Sized>(reader: &R) -> Result<Vec<u32>> {
    reader.read_u32_array(progress::SKILL_SHINES, progress::ABILITY_COUNT)
}

pub fn read_total_shines<R: ReadMemory + ?Sized>(reader: &R) -> Result<u32> {
    reader.read_u32(progress::TOTAL_SHINES)
}
