//! Bundle builder: header plus payload

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::crc::calculate_crc32;
use crate::error::{PackError, Result};
use crate::header::{FW_HEADER_SIZE, PackedHeader};
use crate::image::{FirmwareImage, check_payload_size};
use crate::number::parse_version;

/// Builder for firmware bundles
///
/// Size and CRC are derived from the payload whenever it is set, so a
/// builder always describes a consistent bundle.
#[derive(Debug, Clone, Default)]
pub struct BundleBuilder {
    header: PackedHeader,
    payload: Vec<u8>,
}

impl BundleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an extracted image: addresses and payload are taken over.
    pub fn from_image(image: FirmwareImage) -> Result<Self> {
        let mut builder = Self::new()
            .load_address(image.load_address())
            .start_address(image.entry_address());
        builder.set_payload(image.into_payload())?;
        Ok(builder)
    }

    pub fn version(mut self, version: u32) -> Self {
        self.header.version = version;
        self
    }

    /// Set the version from a decimal or `0x` hex string
    pub fn version_str(self, version: &str) -> Result<Self> {
        Ok(self.version(parse_version(version)?))
    }

    pub fn load_address(mut self, addr: u32) -> Self {
        self.header.load_address = addr;
        self
    }

    pub fn start_address(mut self, addr: u32) -> Self {
        self.header.start_address = addr;
        self
    }

    pub fn set_payload(&mut self, payload: Vec<u8>) -> Result<()> {
        check_payload_size(payload.len() as u64)?;

        self.header.size = payload.len() as u32;
        self.header.crc32 = calculate_crc32(&payload);
        self.payload = payload;
        Ok(())
    }

    pub fn header(&self) -> &PackedHeader {
        &self.header
    }

    pub fn get_payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn validate(&self) -> Result<()> {
        self.header.validate()?;

        if self.header.size as usize != self.payload.len() {
            return Err(PackError::invalid_bundle(format!(
                "header size ({}) doesn't match payload size ({})",
                self.header.size,
                self.payload.len()
            )));
        }

        let actual = calculate_crc32(&self.payload);
        if self.header.crc32 != actual {
            return Err(PackError::CrcMismatch {
                expected: self.header.crc32,
                actual,
            });
        }

        Ok(())
    }

    /// The complete bundle bytes
    pub fn build(&self) -> Result<Vec<u8>> {
        self.validate()?;

        let mut bundle = Vec::with_capacity(FW_HEADER_SIZE + self.payload.len());
        bundle.extend_from_slice(&self.header.to_bytes());
        bundle.extend_from_slice(&self.payload);
        Ok(bundle)
    }

    /// Write the bundle to `path`, creating or truncating it.
    ///
    /// The header and payload are written sequentially; on failure a
    /// partial file may be left behind.
    pub fn build_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.validate()?;

        let file = File::create(path).map_err(|e| PackError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.build_to_writer(&mut writer)
            .and_then(|_| writer.flush())
            .map_err(|e| PackError::io(path, e))
    }

    pub fn build_to_writer<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.header.write_to(writer)?;
        writer.write_all(&self.payload)
    }

    /// Parse an existing bundle, checking magic, length and CRC.
    pub fn from_bundle(data: &[u8]) -> Result<Self> {
        let header = PackedHeader::from_bytes(data)?;

        let payload = &data[FW_HEADER_SIZE..];
        if payload.len() as u64 != header.size as u64 {
            return Err(PackError::invalid_bundle(format!(
                "header says {} payload bytes, file has {}",
                header.size,
                payload.len()
            )));
        }

        let builder = Self {
            header,
            payload: payload.to_vec(),
        };
        builder.validate()?;
        Ok(builder)
    }
}
