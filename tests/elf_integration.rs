//! End-to-end decoding tests over synthetic ELF64 images.

use fafnir::elf::{Analysis, ElfReader, Machine, ObjectType, SectionKind, SegmentKind};
use fafnir::{ElfError, IntegrityWarning};

const PHOFF: usize = 0x40;
const SHOFF: usize = 0x100;
const STRTAB_OFF: usize = 0x300;
const STRTAB: &[u8] = b"abc\0def\0";

fn put_u16(data: &mut [u8], offset: usize, value: u16, big: bool) {
    let bytes = if big {
        value.to_be_bytes()
    } else {
        value.to_le_bytes()
    };
    data[offset..offset + 2].copy_from_slice(&bytes);
}

fn put_u32(data: &mut [u8], offset: usize, value: u32, big: bool) {
    let bytes = if big {
        value.to_be_bytes()
    } else {
        value.to_le_bytes()
    };
    data[offset..offset + 4].copy_from_slice(&bytes);
}

fn put_u64(data: &mut [u8], offset: usize, value: u64, big: bool) {
    let bytes = if big {
        value.to_be_bytes()
    } else {
        value.to_le_bytes()
    };
    data[offset..offset + 8].copy_from_slice(&bytes);
}

/// A small executable image: two segments, three sections, one string
/// table holding `"abc\0def\0"`.
fn sample_image(big: bool) -> Vec<u8> {
    let mut data = vec![0u8; 0x400];

    data[0..4].copy_from_slice(b"\x7fELF");
    data[4] = 2; // ELFCLASS64
    data[5] = if big { 2 } else { 1 };
    data[6] = 1; // EV_CURRENT

    put_u16(&mut data, 0x10, 2, big); // ET_EXEC
    put_u16(&mut data, 0x12, 0x3e, big); // EM_X86_64
    put_u32(&mut data, 0x14, 1, big);
    put_u64(&mut data, 0x18, 0x401000, big); // e_entry
    put_u64(&mut data, 0x20, PHOFF as u64, big);
    put_u64(&mut data, 0x28, SHOFF as u64, big);
    put_u16(&mut data, 0x34, 64, big); // e_ehsize
    put_u16(&mut data, 0x36, 56, big); // e_phentsize
    put_u16(&mut data, 0x38, 2, big); // e_phnum
    put_u16(&mut data, 0x3a, 64, big); // e_shentsize
    put_u16(&mut data, 0x3c, 3, big); // e_shnum
    put_u16(&mut data, 0x3e, 2, big); // e_shstrndx

    // Segment 0: PT_LOAD, R+X, whole first page.
    let ph0 = PHOFF;
    put_u32(&mut data, ph0, 1, big);
    put_u32(&mut data, ph0 + 4, 5, big);
    put_u64(&mut data, ph0 + 8, 0, big);
    put_u64(&mut data, ph0 + 16, 0x400000, big);
    put_u64(&mut data, ph0 + 24, 0x400000, big);
    put_u64(&mut data, ph0 + 32, 0x400, big);
    put_u64(&mut data, ph0 + 40, 0x400, big);
    put_u64(&mut data, ph0 + 48, 0x1000, big);

    // Segment 1: PT_GNU_STACK, R+W.
    let ph1 = PHOFF + 56;
    put_u32(&mut data, ph1, 0x6474e551, big);
    put_u32(&mut data, ph1 + 4, 6, big);

    // Section 0: SHT_NULL (all zeros).

    // Section 1: PROGBITS, ALLOC|EXECINSTR.
    let sh1 = SHOFF + 64;
    put_u32(&mut data, sh1, 1, big); // sh_name
    put_u32(&mut data, sh1 + 4, 1, big);
    put_u64(&mut data, sh1 + 8, 6, big);
    put_u64(&mut data, sh1 + 16, 0x401000, big);
    put_u64(&mut data, sh1 + 24, 0x200, big);
    put_u64(&mut data, sh1 + 32, 0x40, big);

    // Section 2: STRTAB.
    let sh2 = SHOFF + 128;
    put_u32(&mut data, sh2 + 4, 3, big);
    put_u64(&mut data, sh2 + 24, STRTAB_OFF as u64, big);
    put_u64(&mut data, sh2 + 32, STRTAB.len() as u64, big);

    data[STRTAB_OFF..STRTAB_OFF + STRTAB.len()].copy_from_slice(STRTAB);

    data
}

#[test]
fn minimal_executable_classifies() {
    let data = sample_image(false);
    let analysis = Analysis::run(&data).unwrap();

    assert_eq!(analysis.header.object_type, ObjectType::Executable);
    assert_eq!(analysis.header.machine, Machine::X86_64);
    assert_eq!(analysis.header.entry, 0x401000);
    assert!(analysis.warnings.is_empty());
}

#[test]
fn header_fields_match_raw_bytes_both_endiannesses() {
    for big in [false, true] {
        let data = sample_image(big);
        let reader = ElfReader::parse(&data).unwrap();
        let header = reader.header();

        assert_eq!(header.phoff, PHOFF as u64);
        assert_eq!(header.shoff, SHOFF as u64);
        assert_eq!(header.phnum, 2);
        assert_eq!(header.shnum, 3);
        assert_eq!(header.object_type, ObjectType::Executable);
        assert_eq!(header.machine, Machine::X86_64);
    }
}

#[test]
fn load_segment_flags_decode_and_round_trip() {
    let data = sample_image(false);
    let analysis = Analysis::run(&data).unwrap();

    let load = &analysis.segments[0];
    assert_eq!(load.kind, SegmentKind::Load);
    assert!(load.is_readable());
    assert!(load.is_executable());
    assert!(!load.is_writable());
    assert_eq!(load.flags.bits(), 5);

    let stack = &analysis.segments[1];
    assert_eq!(stack.kind, SegmentKind::GnuStack);
    assert_eq!(stack.flags.bits(), 6);
}

#[test]
fn string_table_maps_offsets_to_strings() {
    let data = sample_image(false);
    let analysis = Analysis::run(&data).unwrap();

    assert_eq!(analysis.string_tables.len(), 1);
    let table = &analysis.string_tables[0];
    assert_eq!(table.section, 2);
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(0), Some("abc"));
    assert_eq!(table.get(4), Some("def"));
}

#[test]
fn phoff_past_end_of_file_is_out_of_bounds() {
    let mut data = sample_image(false);
    let new_phoff = data.len() as u64 + 1;
    put_u64(&mut data, 0x20, new_phoff, false);

    let reader = ElfReader::parse(&data).unwrap();
    assert!(matches!(
        reader.segments(),
        Err(ElfError::OutOfBounds { .. })
    ));
    // Sections still decode; only the affected table aborts.
    assert_eq!(reader.sections().unwrap().count(), 3);
}

#[test]
fn short_and_non_elf_buffers_are_rejected_early() {
    for data in [&b""[..], &b"\x7fEL"[..], &[0u8; 15][..]] {
        assert!(matches!(
            ElfReader::parse(data),
            Err(ElfError::NotAnElfFile { .. })
        ));
    }

    let mut data = sample_image(false);
    data[3] = b'f';
    assert!(matches!(
        ElfReader::parse(&data),
        Err(ElfError::NotAnElfFile { .. })
    ));
}

#[test]
fn table_boundary_is_exact() {
    // Truncate so the section table's last entry ends exactly at EOF.
    let mut data = sample_image(false);
    put_u64(&mut data, 0x28, 0x200, false); // move shoff past the tables
    let sh_end = 0x200 + 3 * 64;
    // Rebuild section entries at the new offset, then cut the buffer there.
    let entries: Vec<u8> = data[SHOFF..SHOFF + 3 * 64].to_vec();
    data[0x200..sh_end].copy_from_slice(&entries);
    data.truncate(sh_end);

    let reader = ElfReader::parse(&data).unwrap();
    assert_eq!(reader.sections().unwrap().count(), 3);

    data.truncate(sh_end - 1);
    let reader = ElfReader::parse(&data).unwrap();
    assert!(matches!(
        reader.sections(),
        Err(ElfError::OutOfBounds { .. })
    ));
}

#[test]
fn analysis_is_deterministic() {
    let data = sample_image(true);
    let first = Analysis::run(&data).unwrap();
    let second = Analysis::run(&data).unwrap();
    assert_eq!(first, second);
}

#[test]
fn analysis_serializes_to_json() {
    let data = sample_image(false);
    let analysis = Analysis::run(&data).unwrap();
    let json = serde_json::to_string(&analysis).unwrap();
    assert!(json.contains("\"Executable\""));
    assert!(json.contains("\"abc\""));
}

#[test]
fn truncated_payload_warns_but_decodes() {
    let mut data = sample_image(false);
    // Segment 0 claims 0x800 file bytes; the image holds 0x400.
    put_u64(&mut data, PHOFF + 32, 0x800, false);
    put_u64(&mut data, PHOFF + 40, 0x800, false);

    let analysis = Analysis::run(&data).unwrap();
    assert_eq!(analysis.segments.len(), 2);
    assert!(analysis.warnings.contains(&IntegrityWarning::SegmentPastEndOfFile {
        index: 0,
        end: 0x800,
        file_len: 0x400,
    }));
}

#[test]
fn load_segment_filesz_over_memsz_warns() {
    let mut data = sample_image(false);
    put_u64(&mut data, PHOFF + 40, 0x200, false); // memsz below filesz

    let analysis = Analysis::run(&data).unwrap();
    assert!(analysis
        .warnings
        .contains(&IntegrityWarning::LoadFileSizeExceedsMemSize {
            index: 0,
            filesz: 0x400,
            memsz: 0x200,
        }));
}

#[test]
fn unterminated_string_table_is_malformed() {
    let mut data = sample_image(false);
    // Shrink the table so it ends mid-string.
    put_u64(&mut data, SHOFF + 128 + 32, 6, false);

    let reader = ElfReader::parse(&data).unwrap();
    assert!(matches!(
        reader.string_tables(),
        Err(ElfError::MalformedStringTable { section: 2, offset: 4 })
    ));
}

#[test]
fn progbits_sections_classify() {
    let data = sample_image(false);
    let analysis = Analysis::run(&data).unwrap();

    assert_eq!(analysis.sections[0].kind, SectionKind::Null);
    let text = &analysis.sections[1];
    assert_eq!(text.kind, SectionKind::Progbits);
    assert!(text.is_allocated());
    assert!(text.is_executable());
    assert_eq!(text.name, 1);
}
