//! Decoded ELF64 records, classification enums, and layout constants.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// ELF magic number
pub const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

/// Size of the identification block.
pub const IDENT_SIZE: usize = 16;
/// Size of an Elf64_Ehdr.
pub const EHDR_SIZE: usize = 64;
/// Size of an Elf64_Phdr.
pub const PHDR_SIZE: usize = 56;
/// Size of an Elf64_Shdr.
pub const SHDR_SIZE: usize = 64;

/// ELF class (word size)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Class {
    None,
    Elf32,
    Elf64,
    Invalid(u8),
}

impl From<u8> for Class {
    fn from(val: u8) -> Self {
        match val {
            0 => Class::None,
            1 => Class::Elf32,
            2 => Class::Elf64,
            other => Class::Invalid(other),
        }
    }
}

/// ELF data encoding (endianness)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataEncoding {
    None,
    Little,
    Big,
    Invalid(u8),
}

impl From<u8> for DataEncoding {
    fn from(val: u8) -> Self {
        match val {
            0 => DataEncoding::None,
            1 => DataEncoding::Little,
            2 => DataEncoding::Big,
            other => DataEncoding::Invalid(other),
        }
    }
}

/// Identification version byte (EV_CURRENT is the only defined value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentVersion {
    Current,
    Invalid(u8),
}

impl From<u8> for IdentVersion {
    fn from(val: u8) -> Self {
        match val {
            1 => IdentVersion::Current,
            other => IdentVersion::Invalid(other),
        }
    }
}

/// Operating system / ABI identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OsAbi {
    SysV,
    HpUx,
    NetBsd,
    Gnu,
    Solaris,
    Aix,
    Irix,
    FreeBsd,
    Tru64,
    Modesto,
    OpenBsd,
    Unknown(u8),
}

impl From<u8> for OsAbi {
    fn from(val: u8) -> Self {
        match val {
            0 => OsAbi::SysV,
            1 => OsAbi::HpUx,
            2 => OsAbi::NetBsd,
            3 => OsAbi::Gnu,
            6 => OsAbi::Solaris,
            7 => OsAbi::Aix,
            8 => OsAbi::Irix,
            9 => OsAbi::FreeBsd,
            10 => OsAbi::Tru64,
            11 => OsAbi::Modesto,
            12 => OsAbi::OpenBsd,
            other => OsAbi::Unknown(other),
        }
    }
}

/// ELF object file type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectType {
    None,
    Relocatable,
    Executable,
    SharedObject,
    Core,
    Unknown(u16),
}

impl From<u16> for ObjectType {
    fn from(val: u16) -> Self {
        match val {
            0 => ObjectType::None,
            1 => ObjectType::Relocatable,
            2 => ObjectType::Executable,
            3 => ObjectType::SharedObject,
            4 => ObjectType::Core,
            other => ObjectType::Unknown(other),
        }
    }
}

impl ObjectType {
    pub fn raw(&self) -> u16 {
        match self {
            ObjectType::None => 0,
            ObjectType::Relocatable => 1,
            ObjectType::Executable => 2,
            ObjectType::SharedObject => 3,
            ObjectType::Core => 4,
            ObjectType::Unknown(raw) => *raw,
        }
    }
}

/// Machine architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Machine {
    None,
    M32,
    Sparc,
    X86,
    M68k,
    Mips,
    PaRisc,
    Sparc32Plus,
    PowerPC,
    PowerPC64,
    S390,
    Arm,
    SuperH,
    SparcV9,
    Ia64,
    X86_64,
    AArch64,
    RiscV,
    Bpf,
    LoongArch,
    Unknown(u16),
}

impl From<u16> for Machine {
    fn from(val: u16) -> Self {
        match val {
            0 => Machine::None,
            1 => Machine::M32,
            2 => Machine::Sparc,
            3 => Machine::X86,
            4 => Machine::M68k,
            8 => Machine::Mips,
            15 => Machine::PaRisc,
            18 => Machine::Sparc32Plus,
            20 => Machine::PowerPC,
            21 => Machine::PowerPC64,
            22 => Machine::S390,
            40 => Machine::Arm,
            42 => Machine::SuperH,
            43 => Machine::SparcV9,
            50 => Machine::Ia64,
            62 => Machine::X86_64,
            183 => Machine::AArch64,
            243 => Machine::RiscV,
            247 => Machine::Bpf,
            258 => Machine::LoongArch,
            other => Machine::Unknown(other),
        }
    }
}

/// Segment types
pub const PT_NULL: u32 = 0;
pub const PT_LOAD: u32 = 1;
pub const PT_DYNAMIC: u32 = 2;
pub const PT_INTERP: u32 = 3;
pub const PT_NOTE: u32 = 4;
pub const PT_SHLIB: u32 = 5;
pub const PT_PHDR: u32 = 6;
pub const PT_TLS: u32 = 7;
pub const PT_GNU_EH_FRAME: u32 = 0x6474e550;
pub const PT_GNU_STACK: u32 = 0x6474e551;
pub const PT_GNU_RELRO: u32 = 0x6474e552;
pub const PT_LOPROC: u32 = 0x70000000;
pub const PT_HIPROC: u32 = 0x7fffffff;

/// Segment (program header) classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    Null,
    Load,
    Dynamic,
    Interp,
    Note,
    Shlib,
    Phdr,
    Tls,
    GnuEhFrame,
    GnuStack,
    GnuRelro,
    ProcessorSpecific(u32),
    Unknown(u32),
}

impl From<u32> for SegmentKind {
    fn from(val: u32) -> Self {
        match val {
            PT_NULL => SegmentKind::Null,
            PT_LOAD => SegmentKind::Load,
            PT_DYNAMIC => SegmentKind::Dynamic,
            PT_INTERP => SegmentKind::Interp,
            PT_NOTE => SegmentKind::Note,
            PT_SHLIB => SegmentKind::Shlib,
            PT_PHDR => SegmentKind::Phdr,
            PT_TLS => SegmentKind::Tls,
            PT_GNU_EH_FRAME => SegmentKind::GnuEhFrame,
            PT_GNU_STACK => SegmentKind::GnuStack,
            PT_GNU_RELRO => SegmentKind::GnuRelro,
            PT_LOPROC..=PT_HIPROC => SegmentKind::ProcessorSpecific(val),
            other => SegmentKind::Unknown(other),
        }
    }
}

/// Section types
pub const SHT_NULL: u32 = 0;
pub const SHT_PROGBITS: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_RELA: u32 = 4;
pub const SHT_HASH: u32 = 5;
pub const SHT_DYNAMIC: u32 = 6;
pub const SHT_NOTE: u32 = 7;
pub const SHT_NOBITS: u32 = 8;
pub const SHT_REL: u32 = 9;
pub const SHT_SHLIB: u32 = 10;
pub const SHT_DYNSYM: u32 = 11;
pub const SHT_INIT_ARRAY: u32 = 14;
pub const SHT_FINI_ARRAY: u32 = 15;

/// Section classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionKind {
    Null,
    Progbits,
    Symtab,
    Strtab,
    Rela,
    Hash,
    Dynamic,
    Note,
    Nobits,
    Rel,
    Shlib,
    Dynsym,
    InitArray,
    FiniArray,
    Unknown(u32),
}

impl From<u32> for SectionKind {
    fn from(val: u32) -> Self {
        match val {
            SHT_NULL => SectionKind::Null,
            SHT_PROGBITS => SectionKind::Progbits,
            SHT_SYMTAB => SectionKind::Symtab,
            SHT_STRTAB => SectionKind::Strtab,
            SHT_RELA => SectionKind::Rela,
            SHT_HASH => SectionKind::Hash,
            SHT_DYNAMIC => SectionKind::Dynamic,
            SHT_NOTE => SectionKind::Note,
            SHT_NOBITS => SectionKind::Nobits,
            SHT_REL => SectionKind::Rel,
            SHT_SHLIB => SectionKind::Shlib,
            SHT_DYNSYM => SectionKind::Dynsym,
            SHT_INIT_ARRAY => SectionKind::InitArray,
            SHT_FINI_ARRAY => SectionKind::FiniArray,
            other => SectionKind::Unknown(other),
        }
    }
}

bitflags! {
    /// Segment permission flags (`p_flags`).
    ///
    /// Unknown bits are retained, so `bits()` always recovers the raw value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SegmentFlags: u32 {
        const EXEC = 0x1;
        const WRITE = 0x2;
        const READ = 0x4;
    }
}

bitflags! {
    /// Section attribute flags (`sh_flags`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SectionFlags: u64 {
        const WRITE = 0x1;
        const ALLOC = 0x2;
        const EXECINSTR = 0x4;
    }
}

/// Special section indices
pub const SHN_UNDEF: u16 = 0;
pub const SHN_XINDEX: u16 = 0xffff;

/// Classified `e_shstrndx` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionNameTableRef {
    /// No section name string table.
    None,
    /// The real index is stored in section 0's `sh_link`.
    Extended,
    Index(u16),
}

/// Decoded identification block (first 16 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    pub class: Class,
    pub encoding: DataEncoding,
    pub version: IdentVersion,
    pub os_abi: OsAbi,
    pub abi_version: u8,
    /// Raw padding bytes 9..16, kept for integrity checking.
    pub padding: [u8; 7],
}

/// Decoded ELF64 file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHeader {
    pub ident: Identification,
    pub object_type: ObjectType,
    pub machine: Machine,
    pub version: u32,
    pub entry: u64,
    pub phoff: u64,
    pub shoff: u64,
    pub flags: u32,
    pub ehsize: u16,
    pub phentsize: u16,
    pub phnum: u16,
    pub shentsize: u16,
    pub shnum: u16,
    pub shstrndx: u16,
}

impl FileHeader {
    /// Classify `e_shstrndx` against its sentinel values.
    pub fn section_name_table(&self) -> SectionNameTableRef {
        match self.shstrndx {
            SHN_UNDEF => SectionNameTableRef::None,
            SHN_XINDEX => SectionNameTableRef::Extended,
            idx => SectionNameTableRef::Index(idx),
        }
    }
}

/// One decoded program header table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramHeaderEntry {
    pub kind: SegmentKind,
    pub flags: SegmentFlags,
    pub offset: u64,
    pub vaddr: u64,
    pub paddr: u64,
    pub filesz: u64,
    pub memsz: u64,
    pub align: u64,
}

impl ProgramHeaderEntry {
    pub fn is_readable(&self) -> bool {
        self.flags.contains(SegmentFlags::READ)
    }

    pub fn is_writable(&self) -> bool {
        self.flags.contains(SegmentFlags::WRITE)
    }

    pub fn is_executable(&self) -> bool {
        self.flags.contains(SegmentFlags::EXEC)
    }
}

/// One decoded section header table entry.
///
/// `name` stays an unresolved offset into the linked string table; joining
/// it against the actual table is the caller's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionHeaderEntry {
    pub name: u32,
    pub kind: SectionKind,
    pub flags: SectionFlags,
    pub addr: u64,
    pub offset: u64,
    pub size: u64,
    pub link: u32,
    pub info: u32,
    pub addralign: u64,
    pub entsize: u64,
}

impl SectionHeaderEntry {
    pub fn is_writable(&self) -> bool {
        self.flags.contains(SectionFlags::WRITE)
    }

    pub fn is_allocated(&self) -> bool {
        self.flags.contains(SectionFlags::ALLOC)
    }

    pub fn is_executable(&self) -> bool {
        self.flags.contains(SectionFlags::EXECINSTR)
    }
}
