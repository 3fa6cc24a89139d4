//! ELF64 file header decoding.

use crate::elf::cursor::EndianRead;
use crate::elf::types::{
    Class, DataEncoding, FileHeader, Identification, Machine, ObjectType, EHDR_SIZE, PHDR_SIZE,
    SHDR_SIZE,
};
use crate::error::{ElfError, Result};
use tracing::debug;

/// Decode the 64-byte file header.
///
/// Requires a previously validated [`Identification`]. Only the 64-bit
/// little/big-endian layouts are decodable; anything else is an
/// [`ElfError::UnsupportedLayout`]. Entry sizes are checked against the
/// architecturally fixed ones before anyone strides through a table with
/// them.
pub fn decode(data: &[u8], ident: &Identification) -> Result<FileHeader> {
    match ident.class {
        Class::Elf64 => {}
        other => {
            return Err(ElfError::UnsupportedLayout(format!(
                "only the 64-bit layout is decoded, class is {:?}",
                other
            )))
        }
    }

    let encoding = ident.encoding;
    if !matches!(encoding, DataEncoding::Little | DataEncoding::Big) {
        return Err(ElfError::UnsupportedLayout(format!(
            "data encoding {:?} does not select a byte order",
            encoding
        )));
    }

    if data.len() < EHDR_SIZE {
        return Err(ElfError::TruncatedHeader {
            needed: EHDR_SIZE,
            len: data.len(),
        });
    }

    let header = FileHeader {
        ident: *ident,
        object_type: ObjectType::from(data.read_u16(0x10, encoding)?),
        machine: Machine::from(data.read_u16(0x12, encoding)?),
        version: data.read_u32(0x14, encoding)?,
        entry: data.read_u64(0x18, encoding)?,
        phoff: data.read_u64(0x20, encoding)?,
        shoff: data.read_u64(0x28, encoding)?,
        flags: data.read_u32(0x30, encoding)?,
        ehsize: data.read_u16(0x34, encoding)?,
        phentsize: data.read_u16(0x36, encoding)?,
        phnum: data.read_u16(0x38, encoding)?,
        shentsize: data.read_u16(0x3a, encoding)?,
        shnum: data.read_u16(0x3c, encoding)?,
        shstrndx: data.read_u16(0x3e, encoding)?,
    };

    if header.ehsize as usize != EHDR_SIZE {
        return Err(ElfError::UnsupportedLayout(format!(
            "e_ehsize is {}, expected {}",
            header.ehsize, EHDR_SIZE
        )));
    }

    if header.phnum > 0 && header.phentsize as usize != PHDR_SIZE {
        return Err(ElfError::UnsupportedLayout(format!(
            "e_phentsize is {}, expected {}",
            header.phentsize, PHDR_SIZE
        )));
    }

    if header.shnum > 0 && header.shentsize as usize != SHDR_SIZE {
        return Err(ElfError::UnsupportedLayout(format!(
            "e_shentsize is {}, expected {}",
            header.shentsize, SHDR_SIZE
        )));
    }

    debug!(
        object_type = ?header.object_type,
        machine = ?header.machine,
        phnum = header.phnum,
        shnum = header.shnum,
        "file header decoded"
    );

    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elf::ident;

    fn minimal_elf64_header() -> Vec<u8> {
        let mut data = vec![0u8; 64];
        data[0..4].copy_from_slice(b"\x7fELF");
        data[4] = 2; // ELFCLASS64
        data[5] = 1; // ELFDATA2LSB
        data[6] = 1; // EV_CURRENT

        // e_type = ET_EXEC (2)
        data[16] = 2;
        // e_machine = EM_X86_64 (62)
        data[18] = 62;
        // e_version = 1
        data[20] = 1;
        // e_ehsize = 64
        data[52] = 64;
        // e_phentsize = 56
        data[54] = 56;
        // e_shentsize = 64
        data[58] = 64;

        data
    }

    #[test]
    fn test_decode_minimal() {
        let data = minimal_elf64_header();
        let ident = ident::validate(&data).unwrap();
        let header = decode(&data, &ident).unwrap();
        assert_eq!(header.object_type, ObjectType::Executable);
        assert_eq!(header.machine, Machine::X86_64);
        assert_eq!(header.version, 1);
        assert_eq!(header.ehsize, 64);
        assert_eq!(header.phentsize, 56);
        assert_eq!(header.shentsize, 64);
    }

    #[test]
    fn test_big_endian_fields() {
        let mut data = minimal_elf64_header();
        data[5] = 2; // ELFDATA2MSB
        data[16] = 0;
        data[17] = 2; // e_type = 2, big endian
        data[18] = 0;
        data[19] = 62; // e_machine = 62
        data[20] = 0;
        data[23] = 1; // e_version = 1
        data[52] = 0;
        data[53] = 64; // e_ehsize
        data[54] = 0;
        data[55] = 56; // e_phentsize
        data[58] = 0;
        data[59] = 64; // e_shentsize

        let ident = ident::validate(&data).unwrap();
        let header = decode(&data, &ident).unwrap();
        assert_eq!(header.object_type, ObjectType::Executable);
        assert_eq!(header.machine, Machine::X86_64);
    }

    #[test]
    fn test_truncated_header() {
        let mut data = minimal_elf64_header();
        data.truncate(40);
        let ident = ident::validate(&data).unwrap();
        assert!(matches!(
            decode(&data, &ident),
            Err(ElfError::TruncatedHeader { needed: 64, len: 40 })
        ));
    }

    #[test]
    fn test_elf32_is_unsupported() {
        let mut data = minimal_elf64_header();
        data[4] = 1; // ELFCLASS32
        let ident = ident::validate(&data).unwrap();
        assert!(matches!(
            decode(&data, &ident),
            Err(ElfError::UnsupportedLayout(_))
        ));
    }

    #[test]
    fn test_entry_size_mismatch() {
        let mut data = minimal_elf64_header();
        data[54] = 48; // bogus e_phentsize
        data[56] = 1; // e_phnum = 1 makes it load-bearing
        let ident = ident::validate(&data).unwrap();
        assert!(matches!(
            decode(&data, &ident),
            Err(ElfError::UnsupportedLayout(_))
        ));

        // With e_phnum = 0 the bogus value is never used to stride.
        let mut data = minimal_elf64_header();
        data[54] = 48;
        data[56] = 0;
        let ident = ident::validate(&data).unwrap();
        assert!(decode(&data, &ident).is_ok());
    }

    #[test]
    fn test_unknown_type_and_machine_preserved() {
        let mut data = minimal_elf64_header();
        data[16] = 0x34;
        data[17] = 0x12; // e_type = 0x1234
        data[18] = 0xcd;
        data[19] = 0xab; // e_machine = 0xabcd
        let ident = ident::validate(&data).unwrap();
        let header = decode(&data, &ident).unwrap();
        assert_eq!(header.object_type, ObjectType::Unknown(0x1234));
        assert_eq!(header.machine, Machine::Unknown(0xabcd));
    }
}
