//! Intel HEX input

use std::borrow::Cow;

use ihex::{Reader, Record};

use crate::error::{PackError, Result};
use crate::extract::{Chunk, ExtractOptions, Extractor, flatten};
use crate::image::FirmwareImage;

/// Builds the payload from Intel HEX data records.
///
/// The payload covers the lowest to the highest data address inclusive;
/// holes are filled with [`ExtractOptions::fill_byte`]. The entry address
/// comes from a start linear address record (type 05), falling back to the
/// load address.
pub struct HexExtractor;

/// Records decoded into absolute addresses
#[derive(Debug, Default)]
struct HexImage {
    chunks: Vec<Chunk<'static>>,
    start_linear: Option<u32>,
}

impl HexImage {
    fn parse(text: &str) -> Result<Self> {
        let mut image = Self::default();
        let mut base: u64 = 0;

        for (index, record) in Reader::new(text).enumerate() {
            let record = record
                .map_err(|e| PackError::malformed_hex(format!("record {}: {e}", index + 1)))?;

            match record {
                Record::Data { offset, value } => {
                    if !value.is_empty() {
                        image.chunks.push(Chunk {
                            address: base + offset as u64,
                            data: Cow::Owned(value),
                        });
                    }
                }
                Record::EndOfFile => break,
                Record::ExtendedSegmentAddress(segment) => base = (segment as u64) << 4,
                Record::ExtendedLinearAddress(upper) => base = (upper as u64) << 16,
                Record::StartSegmentAddress { cs, ip } => {
                    debug!("Ignoring start segment address {cs:04X}:{ip:04X}");
                }
                Record::StartLinearAddress(eip) => match image.start_linear {
                    Some(previous) if previous != eip => {
                        return Err(PackError::malformed_hex(format!(
                            "conflicting start addresses 0x{previous:08X} and 0x{eip:08X}"
                        )));
                    }
                    _ => image.start_linear = Some(eip),
                },
            }
        }

        Ok(image)
    }
}

impl Extractor for HexExtractor {
    fn extract(&self, data: &[u8], options: &ExtractOptions) -> Result<FirmwareImage> {
        let text = std::str::from_utf8(data)
            .map_err(|e| PackError::malformed_hex(format!("not a text file: {e}")))?;

        let mut image = HexImage::parse(text)?;
        if image.chunks.is_empty() {
            return Err(PackError::EmptyImage);
        }

        let (load, payload) = flatten(&mut image.chunks, options.fill_byte, |a, b| {
            PackError::malformed_hex(format!(
                "data at 0x{:08X} overlaps data at 0x{:08X}",
                b.address, a.address
            ))
        })?;

        let entry = image.start_linear.unwrap_or(load);
        debug!(
            "HEX data spans 0x{:08X}..0x{:08X}, entry 0x{:08X}",
            load,
            load as u64 + payload.len() as u64,
            entry
        );

        FirmwareImage::new(load, entry, payload)
    }
}
