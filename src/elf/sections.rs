//! Section header table decoding.

use crate::elf::cursor::EndianRead;
use crate::elf::types::{
    DataEncoding, FileHeader, SectionFlags, SectionHeaderEntry, SectionKind, SHDR_SIZE,
};
use crate::error::{ElfError, Result};
use tracing::debug;

/// The decoded section header table, in on-disk order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionTable {
    entries: Vec<SectionHeaderEntry>,
}

impl SectionTable {
    /// Decode all `e_shnum` entries starting at `e_shoff`.
    ///
    /// Bounds are enforced per entry, exactly like the program header
    /// decoder. Section names stay unresolved `sh_name` offsets; this layer
    /// never joins them against a string table.
    pub fn decode(data: &[u8], header: &FileHeader) -> Result<Self> {
        let shnum = header.shnum as u64;
        let shentsize = header.shentsize as u64;

        if shnum == 0 || header.shoff == 0 {
            return Ok(Self {
                entries: Vec::new(),
            });
        }

        let mut entries = Vec::with_capacity(header.shnum as usize);
        for i in 0..shnum {
            let entry_offset = header
                .shoff
                .checked_add(i.checked_mul(shentsize).ok_or(ElfError::OutOfBounds {
                    offset: header.shoff,
                    needed: SHDR_SIZE,
                })?)
                .ok_or(ElfError::OutOfBounds {
                    offset: header.shoff,
                    needed: SHDR_SIZE,
                })?;

            let end = entry_offset.saturating_add(shentsize);
            if end > data.len() as u64 {
                return Err(ElfError::OutOfBounds {
                    offset: entry_offset,
                    needed: SHDR_SIZE,
                });
            }

            entries.push(decode_entry(data, entry_offset as usize, header.ident.encoding)?);
        }

        debug!(count = entries.len(), "section header table decoded");
        Ok(Self { entries })
    }

    /// All entries, index-ascending as they appear on disk.
    pub fn entries(&self) -> &[SectionHeaderEntry] {
        &self.entries
    }

    pub fn by_index(&self, index: usize) -> Option<&SectionHeaderEntry> {
        self.entries.get(index)
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Sections of a given kind, with their table indices.
    pub fn by_kind(
        &self,
        kind: SectionKind,
    ) -> impl Iterator<Item = (usize, &SectionHeaderEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.kind == kind)
    }

    pub fn into_entries(self) -> Vec<SectionHeaderEntry> {
        self.entries
    }
}

/// Decode a single Elf64_Shdr at `offset`.
fn decode_entry(
    data: &[u8],
    offset: usize,
    encoding: DataEncoding,
) -> Result<SectionHeaderEntry> {
    Ok(SectionHeaderEntry {
        name: data.read_u32(offset, encoding)?,
        kind: SectionKind::from(data.read_u32(offset + 4, encoding)?),
        flags: SectionFlags::from_bits_retain(data.read_u64(offset + 8, encoding)?),
        addr: data.read_u64(offset + 16, encoding)?,
        offset: data.read_u64(offset + 24, encoding)?,
        size: data.read_u64(offset + 32, encoding)?,
        link: data.read_u32(offset + 40, encoding)?,
        info: data.read_u32(offset + 44, encoding)?,
        addralign: data.read_u64(offset + 48, encoding)?,
        entsize: data.read_u64(offset + 56, encoding)?,
    })
}
