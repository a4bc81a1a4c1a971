//! # fwpack
//!
//! Packs a firmware image given as ELF, Intel HEX or raw binary into a
//! bundle a bootloader can consume: a 32-byte little-endian header
//! (magic, size, CRC32, version, load address, start address, reserved)
//! followed by the payload.
//!
//! ## Example
//!
//! ```rust
//! use fwpack::{BundleBuilder, FirmwareImage};
//!
//! let image = FirmwareImage::new(0x0800_0000, 0x0800_0000, vec![0, 1, 2, 3])?;
//! let bundle = BundleBuilder::from_image(image)?
//!     .version_str("0x00010001")?
//!     .build()?;
//!
//! assert_eq!(bundle.len(), fwpack::FW_HEADER_SIZE + 4);
//! assert_eq!(&bundle[..4], &[0x47, 0x4D, 0x57, 0x46]);
//! # Ok::<(), fwpack::PackError>(())
//! ```

#[macro_use]
extern crate log;

pub mod builder;
pub mod cli;
pub mod config;
pub mod crc;
pub mod error;
pub mod extract;
pub mod format;
pub mod header;
pub mod image;
pub mod logger;
pub mod number;
pub mod pack;

// Re-export main types for convenience
pub use builder::BundleBuilder;
pub use crc::calculate_crc32;
pub use error::{PackError, Result};
pub use extract::{ElfLayout, ExtractOptions};
pub use format::InputFormat;
pub use header::{DEFAULT_VERSION, FW_HEADER_SIZE, FW_MAGIC, PackedHeader};
pub use image::FirmwareImage;
pub use pack::{PackOptions, PackReport, pack_firmware};

/// Current version of fwpack
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
