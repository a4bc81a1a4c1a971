//! ELF input

use std::borrow::Cow;

use object::{BinaryFormat, Object, ObjectSegment};

use crate::error::{PackError, Result};
use crate::extract::{Chunk, ElfLayout, ExtractOptions, Extractor, flatten};
use crate::image::{FirmwareImage, check_payload_size};

/// Builds the payload from the PT_LOAD segments of an ELF executable.
///
/// The entry address is `e_entry`. The load address is the virtual address
/// of the first PT_LOAD segment in program-header order, which is not
/// necessarily the lowest one.
pub struct ElfExtractor;

/// File bytes of one PT_LOAD segment
#[derive(Debug)]
struct LoadSegment<'data> {
    /// Position among the PT_LOAD segments
    index: usize,
    address: u64,
    data: &'data [u8],
}

impl LoadSegment<'_> {
    /// Cannot overflow, `load_segments` rejects segments that wrap.
    fn end(&self) -> u64 {
        self.address + self.data.len() as u64
    }
}

impl Extractor for ElfExtractor {
    fn extract(&self, data: &[u8], options: &ExtractOptions) -> Result<FirmwareImage> {
        let file =
            object::File::parse(data).map_err(|e| PackError::malformed_elf(e.to_string()))?;
        if file.format() != BinaryFormat::Elf {
            return Err(PackError::malformed_elf(format!(
                "expected an ELF file, found {:?}",
                file.format()
            )));
        }

        let entry = PackError::check_u32("entry address", file.entry())?;
        let segments = load_segments(&file)?;
        if segments.is_empty() {
            return Err(PackError::NoLoadableSegment);
        }

        for segment in &segments {
            debug!(
                "PT_LOAD #{}: vaddr 0x{:08X}, {} bytes in file",
                segment.index,
                segment.address,
                segment.data.len()
            );
        }

        let (load, payload) = match options.elf_layout {
            ElfLayout::Concatenate => concatenate(&segments)?,
            ElfLayout::Fill => fill(&segments, options.fill_byte)?,
        };

        FirmwareImage::new(load, entry, payload)
    }
}

fn load_segments<'data>(file: &object::File<'data>) -> Result<Vec<LoadSegment<'data>>> {
    // For ELF, `segments()` only yields PT_LOAD program headers, in table order.
    file.segments()
        .enumerate()
        .map(|(index, segment)| {
            let data = segment.data().map_err(|e| {
                PackError::malformed_elf(format!("PT_LOAD #{index} data unreadable: {e}"))
            })?;
            let address = segment.address();
            if address.checked_add(data.len() as u64).is_none() {
                return Err(PackError::malformed_elf(format!(
                    "PT_LOAD #{index} at 0x{address:X} ({} bytes) wraps past the end of the address space",
                    data.len()
                )));
            }
            Ok(LoadSegment {
                index,
                address,
                data,
            })
        })
        .collect()
}

/// Segments end to end; address gaps between them are dropped.
fn concatenate(segments: &[LoadSegment<'_>]) -> Result<(u32, Vec<u8>)> {
    let first = segments.first().ok_or(PackError::NoLoadableSegment)?;
    let load = PackError::check_u32("load address", first.address)?;

    let with_data: Vec<&LoadSegment<'_>> =
        segments.iter().filter(|s| !s.data.is_empty()).collect();
    for pair in with_data.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if prev.end() != next.address {
            warn!(
                "PT_LOAD #{} at 0x{:08X} does not follow PT_LOAD #{} (ends at 0x{:08X}); \
                 segments are concatenated without padding, use --elf-layout fill to keep their addresses",
                next.index,
                next.address,
                prev.index,
                prev.end()
            );
        }
    }

    let size: u64 = segments.iter().map(|s| s.data.len() as u64).sum();
    check_payload_size(size)?;

    let mut payload = Vec::with_capacity(size as usize);
    for segment in segments {
        payload.extend_from_slice(segment.data);
    }

    Ok((load, payload))
}

/// Segments at their offsets from the lowest address, gaps set to `fill_byte`.
fn fill(segments: &[LoadSegment<'_>], fill_byte: u8) -> Result<(u32, Vec<u8>)> {
    let mut chunks: Vec<Chunk<'_>> = segments
        .iter()
        .filter(|s| !s.data.is_empty())
        .map(|s| Chunk {
            address: s.address,
            data: Cow::Borrowed(s.data),
        })
        .collect();

    flatten(&mut chunks, fill_byte, |a, b| {
        PackError::malformed_elf(format!(
            "segments at 0x{:08X} and 0x{:08X} overlap",
            a.address, b.address
        ))
    })
}
