//! ELF64 image decoding.
//!
//! [`ElfReader`] borrows the image and decodes pieces on demand;
//! [`Analysis`] runs the whole pipeline once and returns an owned,
//! serializable record of everything it found. Both are read-only: the
//! image is never copied wholesale and never mutated.

pub mod cursor;
pub mod header;
pub mod ident;
pub mod sections;
pub mod segments;
pub mod strtab;
pub mod types;

use crate::error::{IntegrityWarning, Result};
use sections::SectionTable;
use segments::SegmentTable;
use serde::{Deserialize, Serialize};
pub use strtab::StringTable;
pub use types::*;

/// On-demand decoder over a borrowed ELF64 image.
pub struct ElfReader<'data> {
    data: &'data [u8],
    header: FileHeader,
}

impl<'data> ElfReader<'data> {
    /// Validate identification and decode the file header.
    ///
    /// Nothing past the file header is touched until the table accessors
    /// are called.
    pub fn parse(data: &'data [u8]) -> Result<Self> {
        let ident = ident::validate(data)?;
        let header = header::decode(data, &ident)?;
        Ok(Self { data, header })
    }

    pub fn identification(&self) -> &Identification {
        &self.header.ident
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn data(&self) -> &'data [u8] {
        self.data
    }

    /// Decode the program header table.
    pub fn segments(&self) -> Result<SegmentTable> {
        SegmentTable::decode(self.data, &self.header)
    }

    /// Decode the section header table.
    pub fn sections(&self) -> Result<SectionTable> {
        SectionTable::decode(self.data, &self.header)
    }

    /// Extract every STRTAB section's contents.
    pub fn string_tables(&self) -> Result<Vec<StringTable>> {
        let sections = self.sections()?;
        strtab::extract(self.data, &sections)
    }

    /// Collect non-fatal findings across everything that decodes.
    ///
    /// Tables that fail to decode structurally are skipped here; their
    /// errors belong to the accessors above.
    pub fn integrity_warnings(&self) -> Vec<IntegrityWarning> {
        let segments = self.segments().map(SegmentTable::into_entries).ok();
        let sections = self.sections().map(SectionTable::into_entries).ok();
        collect_warnings(
            &self.header,
            segments.as_deref().unwrap_or(&[]),
            sections.as_deref().unwrap_or(&[]),
            self.data.len() as u64,
        )
    }
}

/// The complete, owned result of analyzing one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub identification: Identification,
    pub header: FileHeader,
    pub segments: Vec<ProgramHeaderEntry>,
    pub sections: Vec<SectionHeaderEntry>,
    pub string_tables: Vec<StringTable>,
    pub warnings: Vec<IntegrityWarning>,
}

impl Analysis {
    /// Decode everything in one pass.
    ///
    /// Structural errors in any table abort the run; non-fatal findings are
    /// collected in `warnings`. Running twice over the same buffer yields
    /// identical records.
    pub fn run(data: &[u8]) -> Result<Self> {
        let reader = ElfReader::parse(data)?;
        let segments = reader.segments()?.into_entries();
        let sections = reader.sections()?;
        let string_tables = strtab::extract(data, &sections)?;
        let sections = sections.into_entries();

        let warnings = collect_warnings(&reader.header, &segments, &sections, data.len() as u64);

        Ok(Self {
            identification: reader.header.ident,
            header: reader.header,
            segments,
            sections,
            string_tables,
            warnings,
        })
    }
}

fn collect_warnings(
    header: &FileHeader,
    segments: &[ProgramHeaderEntry],
    sections: &[SectionHeaderEntry],
    file_len: u64,
) -> Vec<IntegrityWarning> {
    let mut warnings = Vec::new();

    let padding_sum: u32 = header.ident.padding.iter().map(|&b| b as u32).sum();
    if padding_sum != 0 {
        warnings.push(IntegrityWarning::NonZeroIdentPadding { sum: padding_sum });
    }

    if header.ident.abi_version != 0 {
        warnings.push(IntegrityWarning::UnexpectedAbiVersion {
            value: header.ident.abi_version,
        });
    }

    if let IdentVersion::Invalid(value) = header.ident.version {
        warnings.push(IntegrityWarning::IdentVersionNotCurrent { value });
    }

    if header.version != 1 {
        warnings.push(IntegrityWarning::FileVersionNotCurrent {
            value: header.version,
        });
    }

    for (index, segment) in segments.iter().enumerate() {
        let end = segment.offset.saturating_add(segment.filesz);
        if end > file_len {
            warnings.push(IntegrityWarning::SegmentPastEndOfFile {
                index,
                end,
                file_len,
            });
        }
        if segment.kind == SegmentKind::Load && segment.filesz > segment.memsz {
            warnings.push(IntegrityWarning::LoadFileSizeExceedsMemSize {
                index,
                filesz: segment.filesz,
                memsz: segment.memsz,
            });
        }
    }

    for (index, section) in sections.iter().enumerate() {
        if section.kind == SectionKind::Nobits {
            continue;
        }
        let end = section.offset.saturating_add(section.size);
        if end > file_len {
            warnings.push(IntegrityWarning::SectionPastEndOfFile {
                index,
                end,
                file_len,
            });
        }
    }

    warnings
}
