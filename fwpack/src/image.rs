//! The format-agnostic result of extraction

use crate::error::{PackError, Result};

/// Largest payload the packer will build (1 GiB)
pub const MAX_PAYLOAD_SIZE: u64 = 1024 * 1024 * 1024;

/// Fail with [`PackError::PayloadTooLarge`] before allocating `size` bytes.
pub fn check_payload_size(size: u64) -> Result<()> {
    if size > MAX_PAYLOAD_SIZE {
        return Err(PackError::PayloadTooLarge {
            size,
            max: MAX_PAYLOAD_SIZE,
        });
    }
    Ok(())
}

/// A firmware payload and the addresses it runs at.
///
/// Produced by one of the extractors and consumed once by
/// [`BundleBuilder`](crate::BundleBuilder). The payload is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareImage {
    load_address: u32,
    entry_address: u32,
    payload: Vec<u8>,
}

impl FirmwareImage {
    pub fn new(load_address: u32, entry_address: u32, payload: Vec<u8>) -> Result<Self> {
        if payload.is_empty() {
            return Err(PackError::EmptyImage);
        }
        check_payload_size(payload.len() as u64)?;

        Ok(Self {
            load_address,
            entry_address,
            payload,
        })
    }

    /// Address the payload is placed at in target memory
    pub fn load_address(&self) -> u32 {
        self.load_address
    }

    /// Address execution begins at
    pub fn entry_address(&self) -> u32 {
        self.entry_address
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let image = FirmwareImage::new(0x8000_0000, 0x8000_0100, vec![1, 2, 3]).unwrap();
        assert_eq!(image.load_address(), 0x8000_0000);
        assert_eq!(image.entry_address(), 0x8000_0100);
        assert_eq!(image.payload(), &[1, 2, 3]);
    }

    #[test]
    fn test_empty_payload_rejected() {
        let err = FirmwareImage::new(0, 0, Vec::new()).unwrap_err();
        assert!(matches!(err, PackError::EmptyImage));
    }

    #[test]
    fn test_payload_size_limit() {
        assert!(check_payload_size(MAX_PAYLOAD_SIZE).is_ok());
        let err = check_payload_size(MAX_PAYLOAD_SIZE + 1).unwrap_err();
        assert!(matches!(err, PackError::PayloadTooLarge { .. }));
    }
}
