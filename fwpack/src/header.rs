//! Firmware bundle header structure and serialization

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

use crate::error::{PackError, Result};

/// Magic number at offset 0 of every bundle ('FWMG')
pub const FW_MAGIC: u32 = 0x4657_4D47;

/// Size of the bundle header in bytes
pub const FW_HEADER_SIZE: usize = 32;

/// Length of the zeroed reserved area at the end of the header
pub const FW_RESERVED_LEN: usize = 8;

/// Version written when none is given on the command line
pub const DEFAULT_VERSION: &str = "0x00010001";

/// Fixed 32-byte little-endian header placed in front of the payload.
///
/// ```text
///  0  magic          u32
///  4  size           u32  payload length
///  8  crc32          u32  CRC-32 of the payload
/// 12  version        u32
/// 16  load_address   u32
/// 20  start_address  u32
/// 24  reserved       [u8; 8], zero
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedHeader {
    pub magic: u32,
    pub size: u32,
    pub crc32: u32,
    pub version: u32,
    pub load_address: u32,
    pub start_address: u32,
    pub reserved: [u8; FW_RESERVED_LEN],
}

impl Default for PackedHeader {
    fn default() -> Self {
        Self {
            magic: FW_MAGIC,
            size: 0,
            crc32: 0,
            version: 0,
            load_address: 0,
            start_address: 0,
            reserved: [0; FW_RESERVED_LEN],
        }
    }
}

impl PackedHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the magic number
    pub fn validate(&self) -> Result<()> {
        if self.magic != FW_MAGIC {
            return Err(PackError::invalid_bundle(format!(
                "bad magic 0x{:08X} (expected 0x{FW_MAGIC:08X})",
                self.magic
            )));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> [u8; FW_HEADER_SIZE] {
        let mut buffer = [0u8; FW_HEADER_SIZE];
        // A fixed-size slice cannot run out of room for a fixed-size header.
        let mut cursor = &mut buffer[..];
        let _ = self.write_to(&mut cursor);
        buffer
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.magic)?;
        writer.write_u32::<LittleEndian>(self.size)?;
        writer.write_u32::<LittleEndian>(self.crc32)?;
        writer.write_u32::<LittleEndian>(self.version)?;
        writer.write_u32::<LittleEndian>(self.load_address)?;
        writer.write_u32::<LittleEndian>(self.start_address)?;
        writer.write_all(&self.reserved)?;
        Ok(())
    }

    /// Parse and validate a header from the start of `data`
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < FW_HEADER_SIZE {
            return Err(PackError::invalid_bundle(format!(
                "header too short: {} bytes (expected at least {})",
                data.len(),
                FW_HEADER_SIZE
            )));
        }

        let header = Self::read_from(&mut &data[..FW_HEADER_SIZE])
            .map_err(|e| PackError::invalid_bundle(e.to_string()))?;
        header.validate()?;
        Ok(header)
    }

    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let magic = reader.read_u32::<LittleEndian>()?;
        let size = reader.read_u32::<LittleEndian>()?;
        let crc32 = reader.read_u32::<LittleEndian>()?;
        let version = reader.read_u32::<LittleEndian>()?;
        let load_address = reader.read_u32::<LittleEndian>()?;
        let start_address = reader.read_u32::<LittleEndian>()?;
        let mut reserved = [0u8; FW_RESERVED_LEN];
        reader.read_exact(&mut reserved)?;

        Ok(Self {
            magic,
            size,
            crc32,
            version,
            load_address,
            start_address,
            reserved,
        })
    }

    /// Header plus payload length
    pub fn total_size(&self) -> u64 {
        FW_HEADER_SIZE as u64 + self.size as u64
    }

    pub fn reserved_is_zero(&self) -> bool {
        self.reserved.iter().all(|&b| b == 0)
    }

    /// Field listing in the `[INFO]` layout the packer prints
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Magic      = 0x{:08X} ('FWMG')", self.magic),
            format!("Size       = {} bytes", self.size),
            format!("CRC32      = 0x{:08X}", self.crc32),
            format!("Version    = 0x{:08X}", self.version),
            format!("Load Addr  = 0x{:08X}", self.load_address),
            format!("Start Addr = 0x{:08X}", self.start_address),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_default() {
        let header = PackedHeader::default();
        assert_eq!(header.magic, FW_MAGIC);
        assert_eq!(header.size, 0);
        assert!(header.reserved_is_zero());
        assert!(header.validate().is_ok());
    }

    #[test]
    fn test_header_layout() {
        let header = PackedHeader {
            size: 4,
            crc32: 0xAABB_CCDD,
            version: 0x0001_0001,
            load_address: 0x0800_0000,
            start_address: 0x0800_0100,
            ..PackedHeader::default()
        };

        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), FW_HEADER_SIZE);
        assert_eq!(&bytes[0..4], &[0x47, 0x4D, 0x57, 0x46]);
        assert_eq!(&bytes[4..8], &[0x04, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[8..12], &[0xDD, 0xCC, 0xBB, 0xAA]);
        assert_eq!(&bytes[12..16], &[0x01, 0x00, 0x01, 0x00]);
        assert_eq!(&bytes[16..20], &[0x00, 0x00, 0x00, 0x08]);
        assert_eq!(&bytes[20..24], &[0x00, 0x01, 0x00, 0x08]);
        assert_eq!(&bytes[24..32], &[0u8; 8]);
    }

    #[test]
    fn test_header_parse() {
        let mut header = PackedHeader::new();
        header.size = 1024;
        header.crc32 = 0x1234_5678;
        header.load_address = 0x8000;
        header.start_address = 0x8004;

        let parsed = PackedHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.total_size(), 1056);
    }

    #[test]
    fn test_header_invalid_magic() {
        let mut bytes = PackedHeader::default().to_bytes();
        bytes[0] = 0x27;
        let err = PackedHeader::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, PackError::InvalidBundle(_)));
    }

    #[test]
    fn test_header_too_short() {
        let bytes = PackedHeader::default().to_bytes();
        let err = PackedHeader::from_bytes(&bytes[..31]).unwrap_err();
        assert!(err.to_string().contains("header too short"));
    }

    #[test]
    fn test_header_summary() {
        let header = PackedHeader {
            version: 0x10,
            ..PackedHeader::default()
        };
        let lines = header.summary_lines();
        assert_eq!(lines[0], "Magic      = 0x46574D47 ('FWMG')");
        assert_eq!(lines[3], "Version    = 0x00000010");
    }
}
