//! Dump the structure of an ELF64 file.
//!
//! Thin shell around the library: validate the arguments, map the file,
//! run the analysis, render. All decoding errors surface as distinct
//! non-zero exit codes.

use anyhow::{Context, Result};
use clap::Parser;
use fafnir::elf::{Analysis, SegmentKind};
use fafnir::io::{IOLimits, SafeReader};
use fafnir::ElfError;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "elfdump",
    about = "Decode and display the headers, segments, sections, and string tables of an ELF64 file",
    version
)]
struct Cli {
    /// Path to the ELF file
    file: PathBuf,

    /// Emit the full analysis as JSON
    #[arg(long)]
    json: bool,

    /// Maximum file size to map, in bytes
    #[arg(long)]
    limit: Option<u64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    // JSON output mode keeps the stderr log machine-readable too.
    if cli.json {
        fafnir::logging::init_tracing_json();
    } else {
        fafnir::logging::init_tracing();
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("elfdump: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut limits = IOLimits::default();
    if let Some(limit) = cli.limit {
        limits.max_file_size = limit;
    }

    let reader = SafeReader::open(&cli.file, limits)
        .with_context(|| format!("cannot load {}", cli.file.display()))?;

    let analysis = Analysis::run(reader.bytes())
        .with_context(|| format!("cannot analyze {}", cli.file.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        render_text(&analysis);
    }

    Ok(())
}

/// Map each fatal error category to its own exit code; anything that is not
/// a decoding error (I/O, bad arguments) exits 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ElfError>() {
        Some(ElfError::NotAnElfFile { .. }) => 2,
        Some(ElfError::TruncatedHeader { .. }) => 3,
        Some(ElfError::UnsupportedLayout(_)) => 4,
        Some(ElfError::OutOfBounds { .. }) => 5,
        Some(ElfError::MalformedStringTable { .. }) => 6,
        None => 1,
    }
}

fn render_text(analysis: &Analysis) {
    let ident = &analysis.identification;
    let header = &analysis.header;

    println!("ELF Header:");
    println!("  {:<22} {:?}", "Class:", ident.class);
    println!("  {:<22} {:?}", "Data:", ident.encoding);
    println!("  {:<22} {:?}", "OS/ABI:", ident.os_abi);
    println!("  {:<22} {}", "ABI Version:", ident.abi_version);
    println!("  {:<22} {:?}", "Type:", header.object_type);
    println!("  {:<22} {:?}", "Machine:", header.machine);
    println!("  {:<22} {:#x}", "Entry point:", header.entry);
    println!(
        "  {:<22} {} (at offset {:#x})",
        "Program headers:", header.phnum, header.phoff
    );
    println!(
        "  {:<22} {} (at offset {:#x})",
        "Section headers:", header.shnum, header.shoff
    );
    println!("  {:<22} {:?}", "Name table:", header.section_name_table());

    if !analysis.segments.is_empty() {
        println!();
        println!("Program Headers:");
        println!(
            "  {:<20} {:>5} {:>18} {:>18} {:>10} {:>10}",
            "Type", "Flags", "Offset", "VirtAddr", "FileSiz", "MemSiz"
        );
        for segment in &analysis.segments {
            println!(
                "  {:<20} {:>5} {:>#18x} {:>#18x} {:>#10x} {:>#10x}",
                format!("{:?}", segment.kind),
                flags_string(segment.is_readable(), segment.is_writable(), segment.is_executable()),
                segment.offset,
                segment.vaddr,
                segment.filesz,
                segment.memsz,
            );
        }
        let loads = analysis
            .segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Load)
            .count();
        println!("  {} segments, {} LOAD", analysis.segments.len(), loads);
    }

    if !analysis.sections.is_empty() {
        println!();
        println!("Section Headers:");
        println!(
            "  {:>4} {:<14} {:>8} {:>18} {:>10} {:>10}",
            "Idx", "Type", "Name", "Addr", "Offset", "Size"
        );
        for (index, section) in analysis.sections.iter().enumerate() {
            println!(
                "  {:>4} {:<14} {:>8} {:>#18x} {:>#10x} {:>#10x}",
                index,
                format!("{:?}", section.kind),
                section.name,
                section.addr,
                section.offset,
                section.size,
            );
        }
    }

    for table in &analysis.string_tables {
        println!();
        println!(
            "String table in section {} ({} strings):",
            table.section,
            table.len()
        );
        for (offset, text) in &table.strings {
            println!("  [{:#8x}]  {}", offset, text);
        }
    }

    if !analysis.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &analysis.warnings {
            println!("  {}", warning);
        }
    }
}

fn flags_string(r: bool, w: bool, x: bool) -> String {
    format!(
        "{}{}{}",
        if r { 'R' } else { '-' },
        if w { 'W' } else { '-' },
        if x { 'X' } else { '-' }
    )
}
