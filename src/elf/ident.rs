//! Identification block validation.

use crate::elf::types::{
    Class, DataEncoding, IdentVersion, Identification, OsAbi, ELF_MAGIC, IDENT_SIZE,
};
use crate::error::{ElfError, Result};
use tracing::debug;

/// Validate the identification bytes and classify their fields.
///
/// Fails only on a short buffer or a magic mismatch. Out-of-range class,
/// encoding, version, and OS ABI values are preserved in their
/// `Invalid`/`Unknown` variants rather than rejected here; the file header
/// decoder decides what it can actually stride through.
pub fn validate(data: &[u8]) -> Result<Identification> {
    if data.len() < IDENT_SIZE {
        return Err(ElfError::NotAnElfFile { len: data.len() });
    }

    if &data[0..4] != ELF_MAGIC {
        return Err(ElfError::NotAnElfFile { len: data.len() });
    }

    let mut padding = [0u8; 7];
    padding.copy_from_slice(&data[9..16]);

    let ident = Identification {
        class: Class::from(data[4]),
        encoding: DataEncoding::from(data[5]),
        version: IdentVersion::from(data[6]),
        os_abi: OsAbi::from(data[7]),
        abi_version: data[8],
        padding,
    };

    debug!(
        class = ?ident.class,
        encoding = ?ident.encoding,
        os_abi = ?ident.os_abi,
        "identification validated"
    );

    Ok(ident)
}
