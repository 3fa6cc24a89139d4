//! Program header table decoding.

use crate::elf::cursor::EndianRead;
use crate::elf::types::{
    DataEncoding, FileHeader, ProgramHeaderEntry, SegmentFlags, SegmentKind, PHDR_SIZE,
};
use crate::error::{ElfError, Result};
use tracing::debug;

/// The decoded program header table, in on-disk order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentTable {
    entries: Vec<ProgramHeaderEntry>,
}

impl SegmentTable {
    /// Decode all `e_phnum` entries starting at `e_phoff`.
    ///
    /// Every entry's end offset is checked against the buffer before any of
    /// its bytes are read; the table of a truncated or adversarial file
    /// fails with [`ElfError::OutOfBounds`] instead of reading past the
    /// image.
    pub fn decode(data: &[u8], header: &FileHeader) -> Result<Self> {
        let phnum = header.phnum as u64;
        let phentsize = header.phentsize as u64;

        if phnum == 0 || header.phoff == 0 {
            return Ok(Self {
                entries: Vec::new(),
            });
        }

        let mut entries = Vec::with_capacity(header.phnum as usize);
        for i in 0..phnum {
            let entry_offset = header
                .phoff
                .checked_add(i.checked_mul(phentsize).ok_or(ElfError::OutOfBounds {
                    offset: header.phoff,
                    needed: PHDR_SIZE,
                })?)
                .ok_or(ElfError::OutOfBounds {
                    offset: header.phoff,
                    needed: PHDR_SIZE,
                })?;

            let end = entry_offset.saturating_add(phentsize);
            if end > data.len() as u64 {
                return Err(ElfError::OutOfBounds {
                    offset: entry_offset,
                    needed: PHDR_SIZE,
                });
            }

            entries.push(decode_entry(data, entry_offset as usize, header.ident.encoding)?);
        }

        debug!(count = entries.len(), "program header table decoded");
        Ok(Self { entries })
    }

    /// All entries, index-ascending as they appear on disk.
    pub fn entries(&self) -> &[ProgramHeaderEntry] {
        &self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Only the LOAD segments.
    pub fn load_segments(&self) -> impl Iterator<Item = &ProgramHeaderEntry> {
        self.entries
            .iter()
            .filter(|e| e.kind == SegmentKind::Load)
    }

    pub fn into_entries(self) -> Vec<ProgramHeaderEntry> {
        self.entries
    }
}

/// Decode a single Elf64_Phdr at `offset`.
fn decode_entry(
    data: &[u8],
    offset: usize,
    encoding: DataEncoding,
) -> Result<ProgramHeaderEntry> {
    Ok(ProgramHeaderEntry {
        kind: SegmentKind::from(data.read_u32(offset, encoding)?),
        flags: SegmentFlags::from_bits_retain(data.read_u32(offset + 4, encoding)?),
        offset: data.read_u64(offset + 8, encoding)?,
        vaddr: data.read_u64(offset + 16, encoding)?,
        paddr: data.read_u64(offset + 24, encoding)?,
        filesz: data.read_u64(offset + 32, encoding)?,
        memsz: data.read_u64(offset + 40, encoding)?,
        align: data.read_u64(offset + 48, encoding)?,
    })
}
