//! Fixed-width reads at validated offsets.

use crate::elf::types::DataEncoding;
use crate::error::{ElfError, Result};

/// Trait for reading values with endianness support.
///
/// Every read is fallible; an offset/width pair that runs past the buffer
/// surfaces [`ElfError::OutOfBounds`] instead of panicking.
pub trait EndianRead {
    fn read_u8(&self, offset: usize) -> Result<u8>;
    fn read_u16(&self, offset: usize, encoding: DataEncoding) -> Result<u16>;
    fn read_u32(&self, offset: usize, encoding: DataEncoding) -> Result<u32>;
    fn read_u64(&self, offset: usize, encoding: DataEncoding) -> Result<u64>;
}

fn out_of_bounds(offset: usize, needed: usize) -> ElfError {
    ElfError::OutOfBounds {
        offset: offset as u64,
        needed,
    }
}

fn concrete(encoding: DataEncoding) -> Result<DataEncoding> {
    match encoding {
        DataEncoding::Little | DataEncoding::Big => Ok(encoding),
        other => Err(ElfError::UnsupportedLayout(format!(
            "cannot read multi-byte fields with data encoding {:?}",
            other
        ))),
    }
}

impl EndianRead for [u8] {
    fn read_u8(&self, offset: usize) -> Result<u8> {
        self.get(offset)
            .copied()
            .ok_or_else(|| out_of_bounds(offset, 1))
    }

    fn read_u16(&self, offset: usize, encoding: DataEncoding) -> Result<u16> {
        let encoding = concrete(encoding)?;
        if offset.saturating_add(2) > self.len() {
            return Err(out_of_bounds(offset, 2));
        }
        let bytes: [u8; 2] = self[offset..offset + 2].try_into().unwrap();
        Ok(match encoding {
            DataEncoding::Big => u16::from_be_bytes(bytes),
            _ => u16::from_le_bytes(bytes),
        })
    }

    fn read_u32(&self, offset: usize, encoding: DataEncoding) -> Result<u32> {
        let encoding = concrete(encoding)?;
        if offset.saturating_add(4) > self.len() {
            return Err(out_of_bounds(offset, 4));
        }
        let bytes: [u8; 4] = self[offset..offset + 4].try_into().unwrap();
        Ok(match encoding {
            DataEncoding::Big => u32::from_be_bytes(bytes),
            _ => u32::from_le_bytes(bytes),
        })
    }

    fn read_u64(&self, offset: usize, encoding: DataEncoding) -> Result<u64> {
        let encoding = concrete(encoding)?;
        if offset.saturating_add(8) > self.len() {
            return Err(out_of_bounds(offset, 8));
        }
        let bytes: [u8; 8] = self[offset..offset + 8].try_into().unwrap();
        Ok(match encoding {
            DataEncoding::Big => u64::from_be_bytes(bytes),
            _ => u64::from_le_bytes(bytes),
        })
    }
}
