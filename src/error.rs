//! Error taxonomy for ELF decoding.
//!
//! Structural problems abort the decode of the affected table and surface as
//! an [`ElfError`]; suspicious-but-plausible field combinations are collected
//! as [`IntegrityWarning`]s next to the decoded data instead of blocking it.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Fatal decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElfError {
    /// The buffer is shorter than the identification block or the magic
    /// bytes do not match.
    #[error("not an ELF file: no ELF magic in {len}-byte buffer")]
    NotAnElfFile { len: usize },

    /// The buffer ends before the fixed-size file header does.
    #[error("truncated header: need {needed} bytes, buffer holds {len}")]
    TruncatedHeader { needed: usize, len: usize },

    /// The image declares a class, encoding, or entry size this decoder
    /// cannot stride through.
    #[error("unsupported file layout: {0}")]
    UnsupportedLayout(String),

    /// A computed offset/width pair would read past the end of the buffer.
    #[error("read of {needed} bytes at offset {offset:#x} is out of bounds")]
    OutOfBounds { offset: u64, needed: usize },

    /// A string table section is not a clean sequence of nul-terminated
    /// strings.
    #[error("malformed string table in section {section}: unterminated or non-UTF-8 run at offset {offset:#x}")]
    MalformedStringTable { section: usize, offset: u64 },
}

pub type Result<T> = std::result::Result<T, ElfError>;

/// Non-fatal findings collected during analysis.
///
/// These never stop a decode; they travel with the decoded records so the
/// caller can decide how loudly to complain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrityWarning {
    /// Identification padding bytes 9..16 are not all zero.
    NonZeroIdentPadding { sum: u32 },
    /// ABI version byte is not the expected 0.
    UnexpectedAbiVersion { value: u8 },
    /// Identification version byte is not the current version (1).
    IdentVersionNotCurrent { value: u8 },
    /// `e_version` is not the current version (1).
    FileVersionNotCurrent { value: u32 },
    /// A segment's file range runs past the end of the image.
    SegmentPastEndOfFile { index: usize, end: u64, file_len: u64 },
    /// A LOAD segment occupies more file bytes than memory bytes.
    LoadFileSizeExceedsMemSize { index: usize, filesz: u64, memsz: u64 },
    /// A non-NOBITS section's file range runs past the end of the image.
    SectionPastEndOfFile { index: usize, end: u64, file_len: u64 },
}

impl fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonZeroIdentPadding { sum } => {
                write!(f, "identification padding is not zeroed (byte sum {})", sum)
            }
            Self::UnexpectedAbiVersion { value } => {
                write!(f, "ABI version is {} (expected 0)", value)
            }
            Self::IdentVersionNotCurrent { value } => {
                write!(f, "identification version is {} (expected 1)", value)
            }
            Self::FileVersionNotCurrent { value } => {
                write!(f, "file version is {} (expected 1)", value)
            }
            Self::SegmentPastEndOfFile {
                index,
                end,
                file_len,
            } => write!(
                f,
                "segment {} ends at {:#x}, past end of file ({:#x})",
                index, end, file_len
            ),
            Self::LoadFileSizeExceedsMemSize {
                index,
                filesz,
                memsz,
            } => write!(
                f,
                "LOAD segment {} has filesz {:#x} > memsz {:#x}",
                index, filesz, memsz
            ),
            Self::SectionPastEndOfFile {
                index,
                end,
                file_len,
            } => write!(
                f,
                "section {} ends at {:#x}, past end of file ({:#x})",
                index, end, file_len
            ),
        }
    }
}
