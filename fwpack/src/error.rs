//! Error types for the firmware packer

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::format::InputFormat;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, PackError>;

/// Every way a packing, inspection or verification run can fail.
///
/// All variants are terminal: the command handler reports the message and
/// exits with status 1.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("Unsupported file format '{}'. Only .bin, .elf, .hex supported.", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("{format} support is not compiled in (enable the '{format}' feature)")]
    MissingParserCapability { format: InputFormat },

    #[error("No PT_LOAD segment found in ELF")]
    NoLoadableSegment,

    #[error("Malformed ELF file: {0}")]
    MalformedElf(String),

    #[error("Input contains no firmware data")]
    EmptyImage,

    #[error("Failed to load HEX file: {0}")]
    MalformedHex(String),

    #[error("For .bin input, {missing} must be provided.")]
    MissingAddress { missing: &'static str },

    #[error("Invalid version '{value}': expected decimal or 0x-prefixed hex u32")]
    InvalidVersion { value: String },

    #[error("Invalid {what} '{value}': expected decimal or 0x-prefixed hex number")]
    InvalidAddress { what: &'static str, value: String },

    #[error("{what} 0x{address:x} does not fit in a 32-bit header field")]
    AddressOverflow { what: &'static str, address: u64 },

    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: u64, max: u64 },

    #[error("Invalid config file {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("Invalid firmware bundle: {0}")]
    InvalidBundle(String),

    #[error("CRC mismatch: header says 0x{expected:08X}, payload is 0x{actual:08X}")]
    CrcMismatch { expected: u32, actual: u32 },

    #[error("I/O error on {}: {source}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PackError {
    pub fn malformed_elf(msg: impl Into<String>) -> Self {
        Self::MalformedElf(msg.into())
    }

    pub fn malformed_hex(msg: impl Into<String>) -> Self {
        Self::MalformedHex(msg.into())
    }

    pub fn invalid_bundle(msg: impl Into<String>) -> Self {
        Self::InvalidBundle(msg.into())
    }

    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::IoFailure {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Fails with [`PackError::AddressOverflow`] if `address` needs more than 32 bits.
    pub fn check_u32(what: &'static str, address: u64) -> Result<u32> {
        u32::try_from(address).map_err(|_| Self::AddressOverflow { what, address })
    }
}
