//! Fafnir is a read-only analyzer for 64-bit ELF images.
//!
//! The library takes an immutable byte buffer, validates the ELF
//! identification, decodes the file header, the program header table, the
//! section header table, and every string table, and hands the decoded
//! records back to the caller. Nothing is written, resolved, or relocated;
//! presentation is left to whoever consumes the records.
//!
//! File loading lives in [`io`], everything that interprets bytes lives in
//! [`elf`], and the error taxonomy lives in [`error`].

pub mod elf;
pub mod error;
pub mod io;
pub mod logging;

pub use elf::{Analysis, ElfReader};
pub use error::{ElfError, IntegrityWarning, Result};
