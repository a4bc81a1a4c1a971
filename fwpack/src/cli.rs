//! Command line interface for fwpack

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;
use serde::Serialize;

use crate::builder::BundleBuilder;
use crate::config::PackConfig;
use crate::error::{PackError, Result};
use crate::extract::{ElfLayout, ExtractOptions, warn_ignored_addresses};
use crate::format::InputFormat;
use crate::header::{DEFAULT_VERSION, PackedHeader};
use crate::number::{parse_address, parse_fill_byte};
use crate::pack::{PackOptions, pack_firmware};
use crate::{VERSION, logger};

/// Command line arguments for fwpack
#[derive(Parser, Debug)]
#[command(name = "fwpack")]
#[command(version = VERSION)]
#[command(
    about = "Pack firmware with 32-byte header (magic,size,crc,ver,load,start,reserved)",
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Print debug output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        logger::level_for(self.verbose, self.quiet)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pack an .elf, .hex or .bin file into a firmware bundle
    Pack(PackArgs),
    /// Print the header of a packed bundle
    Inspect(InspectArgs),
    /// Check magic, size and CRC32 of a packed bundle
    Verify(VerifyArgs),
}

#[derive(Parser, Debug)]
pub struct PackArgs {
    /// Input firmware file (.bin/.elf/.hex)
    pub input: PathBuf,

    /// Output packed file name (default: <input>_packed.bin)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Firmware version (hex or int) [default: 0x00010001]
    #[arg(short = 'v', long = "version")]
    pub fw_version: Option<String>,

    /// Load address (hex or int), required for .bin only
    #[arg(short, long)]
    pub load: Option<String>,

    /// Start address (hex or int), required for .bin only
    #[arg(short, long)]
    pub start: Option<String>,

    /// Byte written into address gaps [default: 0xFF]
    #[arg(long)]
    pub fill: Option<String>,

    /// Payload layout for ELF segments [default: concatenate]
    #[arg(long, value_enum)]
    pub elf_layout: Option<ElfLayout>,

    /// TOML file with default version, addresses and layout
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Packed bundle to examine
    pub bundle: PathBuf,

    /// Print in JSON format
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Packed bundle to verify
    pub bundle: PathBuf,
}

impl PackArgs {
    /// Merge flags over the optional config file.
    ///
    /// Load and start addresses are only parsed for raw input; ELF and HEX
    /// files carry their own, so any given there are dropped with a warning.
    pub fn to_options(&self) -> Result<PackOptions> {
        let config = match &self.config {
            Some(path) => PackConfig::load(path)?,
            None => PackConfig::default(),
        };

        let embedded = InputFormat::from_path(&self.input)
            .ok()
            .filter(|format| format.embeds_addresses());
        let (load, start) = if let Some(format) = embedded {
            let given = self.load.is_some()
                || self.start.is_some()
                || config.load.is_some()
                || config.start.is_some();
            if given {
                warn_ignored_addresses(format);
            }
            (None, None)
        } else {
            let load = match &self.load {
                Some(s) => Some(parse_address("load address", s)?),
                None => config.load_address()?,
            };
            let start = match &self.start {
                Some(s) => Some(parse_address("start address", s)?),
                None => config.start_address()?,
            };
            (load, start)
        };
        let fill = match &self.fill {
            Some(s) => Some(parse_fill_byte(s)?),
            None => config.fill_byte()?,
        };

        let mut extract = ExtractOptions {
            load,
            start,
            ..ExtractOptions::default()
        };
        if let Some(fill) = fill {
            extract.fill_byte = fill;
        }
        if let Some(layout) = self.elf_layout.or(config.elf_layout) {
            extract.elf_layout = layout;
        }

        Ok(PackOptions {
            input: self.input.clone(),
            output: self.output.clone(),
            version: self
                .fw_version
                .clone()
                .or_else(|| config.version())
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            extract,
        })
    }
}

/// Header fields as printed by `inspect --json`
#[derive(Debug, Serialize)]
struct BundleInfo {
    magic: String,
    size: u32,
    crc32: String,
    version: String,
    load_address: String,
    start_address: String,
    reserved_zero: bool,
}

impl From<&PackedHeader> for BundleInfo {
    fn from(header: &PackedHeader) -> Self {
        Self {
            magic: format!("0x{:08X}", header.magic),
            size: header.size,
            crc32: format!("0x{:08X}", header.crc32),
            version: format!("0x{:08X}", header.version),
            load_address: format!("0x{:08X}", header.load_address),
            start_address: format!("0x{:08X}", header.start_address),
            reserved_zero: header.reserved_is_zero(),
        }
    }
}

/// Main CLI handler
pub fn run_cli(args: Args) -> Result<()> {
    match args.command {
        Commands::Pack(pack_args) => handle_pack(pack_args),
        Commands::Inspect(inspect_args) => handle_inspect(inspect_args),
        Commands::Verify(verify_args) => handle_verify(verify_args),
    }
}

fn handle_pack(args: PackArgs) -> Result<()> {
    let options = args.to_options()?;
    pack_firmware(&options)?;
    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<()> {
    let data = std::fs::read(&args.bundle).map_err(|e| PackError::io(&args.bundle, e))?;
    let header = PackedHeader::from_bytes(&data)?;

    if args.json {
        let json = serde_json::to_string_pretty(&BundleInfo::from(&header))
            .map_err(|e| PackError::invalid_bundle(e.to_string()))?;
        println!("{json}");
    } else {
        for line in header.summary_lines() {
            println!("{line}");
        }
        println!("File Size  = {} bytes", data.len());
    }

    if !header.reserved_is_zero() {
        warn!("Reserved header bytes are not zero: {:02X?}", header.reserved);
    }
    if data.len() as u64 != header.total_size() {
        warn!(
            "File is {} bytes, header describes {}",
            data.len(),
            header.total_size()
        );
    }

    Ok(())
}

fn handle_verify(args: VerifyArgs) -> Result<()> {
    let data = std::fs::read(&args.bundle).map_err(|e| PackError::io(&args.bundle, e))?;
    let builder = BundleBuilder::from_bundle(&data)?;

    info!(
        "Payload CRC32: 0x{:08X} - OK ({} bytes)",
        builder.header().crc32,
        builder.header().size
    );
    info!("Bundle verification successful: {}", args.bundle.display());
    Ok(())
}
