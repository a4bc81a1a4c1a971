//! Input format detection

use std::fmt;
use std::path::Path;

use crate::error::{PackError, Result};

/// Source formats the packer accepts, selected by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputFormat {
    Elf,
    Hex,
    Bin,
}

impl InputFormat {
    /// Classify `path` by its extension (`.elf`, `.hex`, `.bin`, any case).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match ext.as_deref() {
            Some("elf") => Ok(Self::Elf),
            Some("hex") => Ok(Self::Hex),
            Some("bin") => Ok(Self::Bin),
            _ => Err(PackError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Whether load and start addresses come from the file itself
    pub fn embeds_addresses(&self) -> bool {
        !matches!(self, Self::Bin)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Elf => "elf",
            Self::Hex => "hex",
            Self::Bin => "bin",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(InputFormat::from_path("app.elf").unwrap(), InputFormat::Elf);
        assert_eq!(InputFormat::from_path("app.hex").unwrap(), InputFormat::Hex);
        assert_eq!(InputFormat::from_path("app.bin").unwrap(), InputFormat::Bin);
        assert_eq!(
            InputFormat::from_path("build/out/rtthread.elf").unwrap(),
            InputFormat::Elf
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(InputFormat::from_path("APP.ELF").unwrap(), InputFormat::Elf);
        assert_eq!(InputFormat::from_path("app.Hex").unwrap(), InputFormat::Hex);
        assert_eq!(InputFormat::from_path("app.BIN").unwrap(), InputFormat::Bin);
    }

    #[test]
    fn test_unsupported() {
        for path in ["app.srec", "app", "app.elf.gz", ".bin"] {
            let err = InputFormat::from_path(path).unwrap_err();
            assert!(
                matches!(err, PackError::UnsupportedFormat { .. }),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn test_embeds_addresses() {
        assert!(InputFormat::Elf.embeds_addresses());
        assert!(InputFormat::Hex.embeds_addresses());
        assert!(!InputFormat::Bin.embeds_addresses());
    }
}
