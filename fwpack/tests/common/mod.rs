//! Fixture writers shared by the integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// One PT_LOAD segment of a test executable
pub struct Segment<'a> {
    pub vaddr: u32,
    pub data: &'a [u8],
}

/// Minimal 32-bit little-endian ELF executable with program headers only.
pub fn elf32(entry: u32, segments: &[Segment<'_>]) -> Vec<u8> {
    const EHSIZE: u32 = 52;
    const PHENTSIZE: u32 = 32;

    let mut out = Vec::new();
    out.extend_from_slice(&[0x7F, b'E', b'L', b'F', 1, 1, 1, 0]);
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(&2u16.to_le_bytes()); // ET_EXEC
    out.extend_from_slice(&40u16.to_le_bytes()); // EM_ARM
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&entry.to_le_bytes());
    out.extend_from_slice(&EHSIZE.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&(EHSIZE as u16).to_le_bytes());
    out.extend_from_slice(&(PHENTSIZE as u16).to_le_bytes());
    out.extend_from_slice(&(segments.len() as u16).to_le_bytes());
    out.extend_from_slice(&40u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());

    let mut offset = EHSIZE + PHENTSIZE * segments.len() as u32;
    for segment in segments {
        let size = segment.data.len() as u32;
        for field in [1, offset, segment.vaddr, segment.vaddr, size, size, 5, 4] {
            out.extend_from_slice(&field.to_le_bytes());
        }
        offset += size;
    }
    for segment in segments {
        out.extend_from_slice(segment.data);
    }
    out
}

/// Intel HEX data record (type 00) with its checksum
pub fn hex_data(offset: u16, data: &[u8]) -> String {
    hex_record(offset, 0x00, data)
}

pub fn hex_record(offset: u16, kind: u8, data: &[u8]) -> String {
    let mut bytes = vec![data.len() as u8, (offset >> 8) as u8, offset as u8, kind];
    bytes.extend_from_slice(data);
    let checksum = bytes
        .iter()
        .fold(0u8, |acc, b| acc.wrapping_add(*b))
        .wrapping_neg();
    bytes.push(checksum);

    let body: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
    format!(":{body}\n")
}

pub const HEX_EOF: &str = ":00000001FF\n";

pub fn write(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}
