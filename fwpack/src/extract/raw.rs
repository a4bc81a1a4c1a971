//! Raw binary input

use crate::error::{PackError, Result};
use crate::extract::{ExtractOptions, Extractor};
use crate::image::FirmwareImage;

/// Passes the file through untouched; addresses must come from the caller.
pub struct RawExtractor;

impl Extractor for RawExtractor {
    fn extract(&self, data: &[u8], options: &ExtractOptions) -> Result<FirmwareImage> {
        let (load, start) = match (options.load, options.start) {
            (Some(load), Some(start)) => (load, start),
            (None, None) => {
                return Err(PackError::MissingAddress {
                    missing: "load and start addresses",
                });
            }
            (None, Some(_)) => {
                return Err(PackError::MissingAddress {
                    missing: "load address (--load)",
                });
            }
            (Some(_), None) => {
                return Err(PackError::MissingAddress {
                    missing: "start address (--start)",
                });
            }
        };

        FirmwareImage::new(load, start, data.to_vec())
    }
}
