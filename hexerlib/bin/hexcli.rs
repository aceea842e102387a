#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]

use clap::{Args, Parser, Subcommand};
use hexerlib::{
    DataType, Interval, RegistryEntry, SearchType, Workbench, WorkbenchConfig, address_to_string,
    known_data_types_and_separators, parse_str_into_bytes, string_to_address,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hexcli", version)]
#[command(about = "Hex workbench utility: inspect, search, annotate and edit binary files")]
#[command(after_help = "Offsets are byte offsets in hex, with or without a 0x prefix.\n\n\
Examples:\n  hexcli info firmware.bin\n  hexcli decode firmware.bin 0x10 --type uint32\n  \
hexcli search firmware.bin --typed float --value 1.5\n  \
hexcli markers add firmware.hmf 0x10 uint32 --note length")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON file with workbench settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Displayed bytes per line (overrides the config file)
    #[arg(long, global = true)]
    bytes_per_line: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Show size and line count of a file
    Info {
        input: PathBuf,
        /// Marker file to summarise
        #[arg(long)]
        markers: Option<PathBuf>,
    },
    /// List the known data types
    Types,
    /// Decode the bytes at an offset (all types unless --type is given)
    Decode {
        input: PathBuf,
        offset: String,
        #[arg(long = "type")]
        type_name: Option<String>,
    },
    /// Encode a value and print its bytes
    Encode { type_name: String, value: String },
    /// Find every occurrence of a pattern
    Search {
        input: PathBuf,
        #[command(flatten)]
        pattern: PatternArgs,
    },
    /// Hex dump with marker annotations
    Dump {
        input: PathBuf,
        #[arg(long, default_value = "0")]
        offset: String,
        #[arg(long, default_value_t = 16)]
        lines: usize,
        #[arg(long)]
        markers: Option<PathBuf>,
    },
    /// Overwrite the bytes at an offset with an encoded value
    Edit {
        input: PathBuf,
        offset: String,
        type_name: String,
        value: String,
        /// Write the result here instead of the input file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Manage a marker file
    #[command(subcommand)]
    Markers(MarkersCommand),
}

#[derive(Args)]
struct PatternArgs {
    /// Hex bytes, e.g. DEADBEEF
    #[arg(long)]
    hex: Option<String>,
    #[arg(long)]
    ascii: Option<String>,
    #[arg(long)]
    regex: Option<String>,
    /// Data type used to encode --value
    #[arg(long, requires = "value")]
    typed: Option<String>,
    #[arg(long, requires = "typed")]
    value: Option<String>,
}

#[derive(Subcommand)]
enum MarkersCommand {
    /// Add a marker (the file is created if missing)
    Add {
        file: PathBuf,
        offset: String,
        type_name: String,
        #[arg(long)]
        note: Option<String>,
        /// Width in bytes for variable-width types
        #[arg(long)]
        num_bytes: Option<usize>,
    },
    /// Remove the marker starting at an offset
    Remove { file: PathBuf, offset: String },
    /// Print all markers
    List { file: PathBuf },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Dispatch and immediately handle results
    if let Err(e) = run_dispatch(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run_dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => WorkbenchConfig::from_file(path)?,
        None => WorkbenchConfig::default(),
    };
    if let Some(bpl) = cli.bytes_per_line {
        config.bytes_per_line = bpl;
    }
    config.validate()?;

    match cli.command {
        Command::Info { input, markers } => run_info(config, &input, markers.as_deref()),
        Command::Types => {
            run_types();
            Ok(())
        }
        Command::Decode {
            input,
            offset,
            type_name,
        } => run_decode(config, &input, &offset, type_name.as_deref()),
        Command::Encode { type_name, value } => run_encode(&type_name, &value),
        Command::Search { input, pattern } => run_search(config, &input, pattern),
        Command::Dump {
            input,
            offset,
            lines,
            markers,
        } => run_dump(config, &input, &offset, lines, markers.as_deref()),
        Command::Edit {
            input,
            offset,
            type_name,
            value,
            output,
        } => run_edit(config, &input, &offset, &type_name, &value, output.as_deref()),
        Command::Markers(cmd) => run_markers(config, cmd),
    }
}

fn run_info(
    config: WorkbenchConfig,
    path: &Path,
    markers: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let wb = open(config, path, markers)?;
    let size = wb.document().map_or(0, hexerlib::HexDocument::len);

    println!("File Path:   {}", path.display());
    println!("Data Size:   {} bytes", format_with_commas(size));
    println!(
        "Lines:       {} x {} bytes",
        wb.viewport().total_lines(),
        wb.viewport().bytes_per_line()
    );
    if markers.is_some() {
        println!("Markers:     {}", wb.markers().len());
    }
    Ok(())
}

fn run_types() {
    for entry in known_data_types_and_separators() {
        match entry {
            RegistryEntry::Separator(label) => println!("{label}:"),
            RegistryEntry::Type(dt) => {
                let width = if dt.is_variable_width() {
                    format!("{} bytes (variable)", dt.num_bytes())
                } else {
                    format!("{} bytes", dt.num_bytes())
                };
                println!("  {:<8} {:<6} {width}", dt.name(), dt.short_name());
            }
        }
    }
}

fn run_decode(
    config: WorkbenchConfig,
    path: &Path,
    offset: &str,
    type_name: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let wb = open(config, path, None)?;
    let address = parse_offset(offset)?;
    let fragment = wb.fragment_at(address)?;

    if let Some(name) = type_name {
        println!("{}", wb.decode(name, &fragment)?);
        return Ok(());
    }

    println!("Offset:      {}", address_to_string(address / 8));
    for (dt, value) in wb.inspect(address)? {
        println!("  {:<8} {value}", dt.name());
    }
    Ok(())
}

fn run_encode(type_name: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let fragment = DataType::from_name(type_name)?.encode_string(0, value)?;
    println!("{}", format_bytes(fragment.bytes()));
    Ok(())
}

fn run_search(
    config: WorkbenchConfig,
    path: &Path,
    pattern: PatternArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let search_type = if let Some(hex) = pattern.hex {
        let bytes = parse_str_into_bytes(&hex).ok_or_else(|| format!("Invalid hex: {hex}"))?;
        SearchType::Hex(bytes)
    } else if let Some(text) = pattern.ascii {
        SearchType::Ascii(text)
    } else if let Some(re) = pattern.regex {
        SearchType::Regex(re)
    } else if let (Some(name), Some(value)) = (pattern.typed, pattern.value) {
        let needle = DataType::from_name(&name)?.encode_to_fit(0, &value)?;
        SearchType::Hex(needle.bytes().to_vec())
    } else {
        return Err("Missing search pattern".into());
    };

    let wb = open(config, path, None)?;
    let hits = wb.search_all(&search_type)?;

    for address in &hits {
        println!("{}", address_to_string(address / 8));
    }
    println!("{} match(es)", hits.len());
    Ok(())
}

fn run_dump(
    config: WorkbenchConfig,
    path: &Path,
    offset: &str,
    lines: usize,
    markers: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let wb = open(config, path, markers)?;
    let bytes = wb.document().map_or(&[][..], hexerlib::HexDocument::bytes);
    let viewport = wb.viewport();
    let bpl = viewport.bytes_per_line();
    let first_line = parse_offset(offset)? / 8 / bpl;

    for line in first_line..first_line.saturating_add(lines).min(viewport.total_lines()) {
        let line_addr = viewport.line_address(line);
        let start = line_addr / 8;
        let chunk = &bytes[start.min(bytes.len())..(start + bpl).min(bytes.len())];
        if chunk.is_empty() {
            break;
        }

        let ascii: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        println!(
            "{}  {:<width$}  {ascii}",
            address_to_string(start),
            format_bytes(chunk),
            width = bpl * 3 - 1
        );

        let span = Interval::new(line_addr, line_addr + bpl * 8 - 1);
        for marker in wb.markers().markers_in(span) {
            println!(
                "            ^ {} at {}: {} ({} bytes)",
                marker.data_type,
                address_to_string(marker.address / 8),
                marker.note,
                marker.num_bytes
            );
        }
    }
    Ok(())
}

fn run_edit(
    config: WorkbenchConfig,
    path: &Path,
    offset: &str,
    type_name: &str,
    value: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wb = open(config, path, None)?;
    let address = parse_offset(offset)?;

    let fragment = wb.encode(type_name, address, value)?;
    wb.apply_edit(&fragment)?;
    wb.save_file(output)?;

    println!(
        "Wrote {} byte(s) at {} -> {}",
        fragment.len(),
        address_to_string(address / 8),
        output.unwrap_or(path).display()
    );
    Ok(())
}

fn run_markers(
    config: WorkbenchConfig,
    cmd: MarkersCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wb = Workbench::new(config);

    match cmd {
        MarkersCommand::Add {
            file,
            offset,
            type_name,
            note,
            num_bytes,
        } => {
            if file.exists() {
                wb.load_markers(&file)?;
            }
            let address = parse_offset(&offset)?;
            let mut marker = wb.add_marker(address, &type_name)?.clone();
            if let Some(note) = note {
                marker.note = note;
            }
            if let Some(n) = num_bytes {
                marker.num_bytes = n;
            }
            wb.update_marker(marker)?;
            wb.save_markers(Some(file.as_path()))?;
            println!("Added marker at {}", address_to_string(address / 8));
        }
        MarkersCommand::Remove { file, offset } => {
            wb.load_markers(&file)?;
            let address = parse_offset(&offset)?;
            wb.remove_marker(address)?;
            wb.save_markers(Some(file.as_path()))?;
            println!("Removed marker at {}", address_to_string(address / 8));
        }
        MarkersCommand::List { file } => {
            wb.load_markers(&file)?;
            for marker in wb.list_markers() {
                println!(
                    "{}  {:<8} {:>4} bytes  {}",
                    address_to_string(marker.address / 8),
                    marker.data_type,
                    marker.num_bytes,
                    marker.note
                );
            }
        }
    }
    Ok(())
}

// =============================== HELPER FUNCTIONS ===============================

/// Open a file (and optionally its marker file) in a new workbench
fn open(
    config: WorkbenchConfig,
    path: &Path,
    markers: Option<&Path>,
) -> Result<Workbench, Box<dyn std::error::Error>> {
    let mut wb = Workbench::new(config);
    wb.open_file(path)?;
    if let Some(markers) = markers {
        wb.load_markers(markers)?;
    }
    Ok(wb)
}

/// Parse a hex byte offset into a bit address
fn parse_offset(s: &str) -> Result<usize, Box<dyn std::error::Error>> {
    let byte = string_to_address(s)?;
    byte.checked_mul(8)
        .ok_or_else(|| format!("Offset out of range: {s}").into())
}

fn format_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_with_commas(n: usize) -> String {
    let s = n.to_string();
    s.as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",")
}
