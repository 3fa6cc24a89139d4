//! String table extraction.

use crate::elf::sections::SectionTable;
use crate::elf::types::{SectionHeaderEntry, SectionKind};
use crate::error::{ElfError, Result};
use memchr::memchr;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// The decoded contents of one STRTAB section.
///
/// Maps each string's starting offset within the section to its text. The
/// strings are copied out, so the table owns its data and outlives the
/// image buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringTable {
    /// Index of the STRTAB section this table was extracted from.
    pub section: usize,
    pub strings: BTreeMap<u64, String>,
}

impl StringTable {
    /// Look up the string starting exactly at `offset`.
    pub fn get(&self, offset: u64) -> Option<&str> {
        self.strings.get(&offset).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Extract one [`StringTable`] per STRTAB section.
pub fn extract(data: &[u8], sections: &SectionTable) -> Result<Vec<StringTable>> {
    let mut tables = Vec::new();
    for (index, entry) in sections.by_kind(SectionKind::Strtab) {
        tables.push(extract_one(data, index, entry)?);
    }
    debug!(count = tables.len(), "string tables extracted");
    Ok(tables)
}

/// Scan one STRTAB section, splitting on nul bytes.
///
/// The scan is confined to `sh_offset..sh_offset + sh_size`. A table whose
/// range falls outside the image fails with [`ElfError::OutOfBounds`]; a
/// final run with no terminating nul, or a run that is not valid UTF-8,
/// rejects the whole table with [`ElfError::MalformedStringTable`] rather
/// than guessing at partial content.
fn extract_one(data: &[u8], index: usize, entry: &SectionHeaderEntry) -> Result<StringTable> {
    let end = entry
        .offset
        .checked_add(entry.size)
        .ok_or(ElfError::OutOfBounds {
            offset: entry.offset,
            needed: entry.size as usize,
        })?;
    if end > data.len() as u64 {
        return Err(ElfError::OutOfBounds {
            offset: entry.offset,
            needed: entry.size as usize,
        });
    }

    let bytes = &data[entry.offset as usize..end as usize];
    let mut strings = BTreeMap::new();
    let mut start = 0usize;
    while start < bytes.len() {
        let rel = memchr(0, &bytes[start..]).ok_or(ElfError::MalformedStringTable {
            section: index,
            offset: start as u64,
        })?;
        let text = std::str::from_utf8(&bytes[start..start + rel]).map_err(|_| {
            ElfError::MalformedStringTable {
                section: index,
                offset: start as u64,
            }
        })?;
        strings.insert(start as u64, text.to_string());
        start += rel + 1;
    }

    Ok(StringTable {
        section: index,
        strings,
    })
}
