//! Command-line front end for the carrier layer.
//!
//! Thin glue only: pattern resolution, payload file I/O, and report
//! formatting over the core's read-only accessors. All parsing and region
//! arithmetic lives in `sevenz-format`; all staging and commit logic lives
//! in the `sevenz-steg` library.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sevenz_format::ParseOptions;
use sevenz_steg::{Carrier, CarrierFile, Slot, resolve_pattern};

#[derive(Parser)]
#[command(
    name = "sevenz-steg",
    version,
    about = "Inject or extract steganographic payloads in 7z container files"
)]
struct Cli {
    /// Skip the magic-byte check when opening containers
    #[arg(long, global = true)]
    ignore_magic: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report parsed metadata for a single container
    Inspect {
        /// Container file to parse
        file: PathBuf,
        /// Show only the leading descriptor
        #[arg(short = 'H', long)]
        descriptor: bool,
        /// Show only the trailer metadata
        #[arg(short = 'T', long)]
        trailer: bool,
        /// Show only the computed regions
        #[arg(short = 'R', long)]
        regions: bool,
    },
    /// Recover a payload striped across matching containers
    Extract {
        /// File pattern; multiple matches are read in natural order
        pattern: String,
        /// Payload slot to read
        #[arg(short, long, value_enum, default_value_t = SlotArg::Center)]
        slot: SlotArg,
        /// Write the payload here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Treat PATTERN as a regular expression over the file stem
        #[arg(short, long)]
        regex: bool,
    },
    /// Inject a payload, striping it across matching containers
    Inject {
        /// File pattern; multiple matches are written in natural order
        pattern: String,
        /// File whose bytes become the payload
        #[arg(short, long)]
        data: PathBuf,
        /// Payload slot to fill
        #[arg(short, long, value_enum, default_value_t = SlotArg::Center)]
        slot: SlotArg,
        /// Treat PATTERN as a regular expression over the file stem
        #[arg(short, long)]
        regex: bool,
    },
    /// Recompute checksums and write a well-formed copy
    Fix {
        /// Container file to repair
        file: PathBuf,
        /// Output file name
        #[arg(short, long, default_value = "out.7z")]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SlotArg {
    Center,
    Bottom,
}

impl From<SlotArg> for Slot {
    fn from(slot: SlotArg) -> Self {
        match slot {
            SlotArg::Center => Self::Center,
            SlotArg::Bottom => Self::Bottom,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = ParseOptions {
        ignore_magic: cli.ignore_magic,
    };

    match cli.command {
        Command::Inspect {
            file,
            descriptor,
            trailer,
            regions,
        } => inspect(&file, &options, descriptor, trailer, regions),
        Command::Extract {
            pattern,
            slot,
            out,
            regex,
        } => extract(&pattern, slot.into(), out, regex, options),
        Command::Inject {
            pattern,
            data,
            slot,
            regex,
        } => inject(&pattern, &data, slot.into(), regex, options),
        Command::Fix { file, out } => fix(&file, &out, &options),
    }
}

fn inspect(
    path: &Path,
    options: &ParseOptions,
    only_descriptor: bool,
    only_trailer: bool,
    only_regions: bool,
) -> Result<()> {
    let file = CarrierFile::open(path, options)?;
    let archive = file.archive();
    let all = !(only_descriptor || only_trailer || only_regions);

    if all || only_descriptor {
        let descriptor = archive.descriptor();
        println!("descriptor:");
        println!("  version:        {}", descriptor.version);
        println!(
            "  header crc:     {:08X} ({})",
            descriptor.header_crc,
            validity(archive.header_crc_valid())
        );
        println!(
            "  trailer start:  {} (relative {})",
            descriptor.trailer_start(),
            descriptor.trailer_start_relative
        );
        println!("  trailer length: {}", descriptor.trailer_length);
        println!(
            "  trailer crc:    {:08X} ({})",
            descriptor.trailer_crc,
            validity(archive.trailer_crc_valid())
        );
    }

    if all || only_trailer {
        let trailer = archive.trailer();
        println!("trailer:");
        println!("  kind:           {:?}", trailer.kind);
        println!("  data offset:    {}", trailer.data_offset);
        println!("  pack sizes:     {:?}", trailer.pack_sizes);
        println!("  folders:        {}", trailer.folder_count);
        for encoder in archive.encoders() {
            println!("  encoder:        {encoder}");
        }
        if let Some(size) = trailer.encoder_unpack_size {
            println!("  unpack size:    {size}");
        }
        if !trailer.digests.is_empty() {
            let digests: Vec<String> = trailer.digests.iter().map(|d| format!("{d:08X}")).collect();
            println!("  digests:        {}", digests.join(", "));
        }
        if let Some(count) = trailer.file_count {
            println!("  files:          {count}");
        }
        if !trailer.file_names.is_empty() {
            println!("  names:          {}", trailer.file_names.join(", "));
        }
        if trailer.anomaly_skipped > 0 {
            println!("  stray bytes:    {} (before digest)", trailer.anomaly_skipped);
        }
    }

    if all || only_regions {
        println!("regions:");
        let body = archive.body();
        let center = archive.center();
        let bottom = archive.bottom();
        println!("  body:   [{}, {}) length {}", body.start, body.end(), body.len);
        println!(
            "  center: [{}, {}) length {}",
            center.start,
            center.end(),
            center.len
        );
        println!(
            "  bottom: [{}, {}) length {}",
            bottom.start,
            bottom.end(),
            bottom.len
        );
    }

    Ok(())
}

const fn validity(valid: bool) -> &'static str {
    if valid { "valid" } else { "MISMATCH" }
}

fn extract(
    pattern: &str,
    slot: Slot,
    out: Option<PathBuf>,
    use_regex: bool,
    options: ParseOptions,
) -> Result<()> {
    let files = resolve_pattern(pattern, use_regex)?;
    let carrier = Carrier::open(files, options)?;
    let payload = carrier.extract(slot);
    match out {
        Some(path) => fs::write(&path, &payload)
            .with_context(|| format!("writing payload to {}", path.display()))?,
        None => std::io::stdout()
            .lock()
            .write_all(&payload)
            .context("writing payload to stdout")?,
    }
    Ok(())
}

fn inject(
    pattern: &str,
    data: &Path,
    slot: Slot,
    use_regex: bool,
    options: ParseOptions,
) -> Result<()> {
    let payload =
        fs::read(data).with_context(|| format!("reading payload from {}", data.display()))?;
    let files = resolve_pattern(pattern, use_regex)?;
    let mut carrier = Carrier::open(files, options)?;
    carrier.inject(&payload, slot);
    carrier.commit()?;
    println!(
        "injected {} bytes into the {} slot of {} file(s)",
        payload.len(),
        slot,
        carrier.len()
    );
    Ok(())
}

fn fix(path: &Path, out: &Path, options: &ParseOptions) -> Result<()> {
    let file = CarrierFile::open(path, options)?;
    let fixed = file.rebuild()?;
    fs::write(out, &fixed).with_context(|| format!("writing fixed file to {}", out.display()))?;
    println!("fixed file written to {}", out.display());
    Ok(())
}
