//! Turning an input file into a [`FirmwareImage`]
//!
//! Each source format has its own extractor. ELF and Intel HEX decoding sit
//! behind the `elf` and `hex` cargo features; a build without one of them
//! reports [`PackError::MissingParserCapability`] for that format.

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::{PackError, Result};
use crate::format::InputFormat;
use crate::image::FirmwareImage;

#[cfg(feature = "elf")]
pub mod elf;
#[cfg(feature = "hex")]
pub mod hex;
pub mod raw;

/// Byte written into address gaps that no input data covers (erased flash)
pub const DEFAULT_FILL_BYTE: u8 = 0xFF;

/// How loadable ELF segments are laid out in the payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ElfLayout {
    /// Segments back to back in program-header order, gaps dropped
    #[default]
    Concatenate,
    /// Segments at their address offsets, gaps filled with the fill byte
    Fill,
}

/// Everything an extractor may need besides the file bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Caller supplied load address (required for raw input)
    pub load: Option<u32>,
    /// Caller supplied start address (required for raw input)
    pub start: Option<u32>,
    pub fill_byte: u8,
    pub elf_layout: ElfLayout,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            load: None,
            start: None,
            fill_byte: DEFAULT_FILL_BYTE,
            elf_layout: ElfLayout::default(),
        }
    }
}

impl ExtractOptions {
    pub fn with_addresses(load: u32, start: u32) -> Self {
        Self {
            load: Some(load),
            start: Some(start),
            ..Self::default()
        }
    }

    pub fn has_addresses(&self) -> bool {
        self.load.is_some() || self.start.is_some()
    }
}

/// A source-format decoder
pub trait Extractor {
    fn extract(&self, data: &[u8], options: &ExtractOptions) -> Result<FirmwareImage>;
}

/// Run the extractor for `format` over `data`.
pub fn extract(
    format: InputFormat,
    data: &[u8],
    options: &ExtractOptions,
) -> Result<FirmwareImage> {
    if format.embeds_addresses() && options.has_addresses() {
        warn_ignored_addresses(format);
    }

    match format {
        #[cfg(feature = "elf")]
        InputFormat::Elf => elf::ElfExtractor.extract(data, options),
        #[cfg(not(feature = "elf"))]
        InputFormat::Elf => Err(PackError::MissingParserCapability { format }),

        #[cfg(feature = "hex")]
        InputFormat::Hex => hex::HexExtractor.extract(data, options),
        #[cfg(not(feature = "hex"))]
        InputFormat::Hex => Err(PackError::MissingParserCapability { format }),

        InputFormat::Bin => raw::RawExtractor.extract(data, options),
    }
}

pub(crate) fn warn_ignored_addresses(format: InputFormat) {
    let name = format.name().to_uppercase();
    warn!("For {name} input, load/start addresses are ignored, parsed from {name} file.");
}

/// A run of bytes placed at an absolute address
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Chunk<'a> {
    pub address: u64,
    pub data: std::borrow::Cow<'a, [u8]>,
}

impl Chunk<'_> {
    /// Only valid once the address is known to fit in 32 bits.
    pub fn end(&self) -> u64 {
        self.address + self.data.len() as u64
    }
}

/// Lay `chunks` out over `[lowest, highest)` with gaps set to `fill`.
///
/// Returns the base address and the flattened bytes. `chunks` must be
/// non-empty and is sorted in place; overlapping chunks are reported
/// through `overlap`.
pub(crate) fn flatten(
    chunks: &mut [Chunk<'_>],
    fill: u8,
    overlap: impl Fn(&Chunk<'_>, &Chunk<'_>) -> PackError,
) -> Result<(u32, Vec<u8>)> {
    for chunk in chunks.iter() {
        PackError::check_u32("data address", chunk.address)?;
    }
    chunks.sort_by_key(|chunk| chunk.address);

    for pair in chunks.windows(2) {
        if pair[0].end() > pair[1].address {
            return Err(overlap(&pair[0], &pair[1]));
        }
    }

    let (Some(first), Some(last_end)) = (chunks.first(), chunks.iter().map(Chunk::end).max())
    else {
        return Err(PackError::EmptyImage);
    };

    let base = PackError::check_u32("load address", first.address)?;
    PackError::check_u32("end address", last_end - 1)?;

    let span = last_end - first.address;
    crate::image::check_payload_size(span)?;

    let mut payload = vec![fill; span as usize];
    for chunk in chunks.iter() {
        let offset = (chunk.address - first.address) as usize;
        payload[offset..offset + chunk.data.len()].copy_from_slice(&chunk.data);
    }

    Ok((base, payload))
}
