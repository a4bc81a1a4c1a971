//! Optional TOML file with packing defaults
//!
//! ```toml
//! version = "0x00020000"
//! load = 0x08000000
//! start = "0x08000000"
//! fill = 0xFF
//! elf_layout = "fill"
//! ```
//!
//! Numbers may be TOML integers or strings in decimal / `0x` hex form.
//! Command-line flags take precedence over the file.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{PackError, Result};
use crate::extract::ElfLayout;
use crate::number::{parse_address, parse_fill_byte};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ConfigNumber {
    Integer(i64),
    Text(String),
}

impl ConfigNumber {
    /// The value in the textual form accepted on the command line
    pub fn as_text(&self) -> String {
        match self {
            Self::Integer(value) => value.to_string(),
            Self::Text(value) => value.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackConfig {
    pub version: Option<ConfigNumber>,
    pub load: Option<ConfigNumber>,
    pub start: Option<ConfigNumber>,
    pub fill: Option<ConfigNumber>,
    pub elf_layout: Option<ElfLayout>,
}

impl PackConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| PackError::io(path, e))?;
        let config = Self::from_toml(&text, path)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|e| PackError::Config {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    pub fn version(&self) -> Option<String> {
        self.version.as_ref().map(ConfigNumber::as_text)
    }

    pub fn load_address(&self) -> Result<Option<u32>> {
        self.load
            .as_ref()
            .map(|v| parse_address("load address", &v.as_text()))
            .transpose()
    }

    pub fn start_address(&self) -> Result<Option<u32>> {
        self.start
            .as_ref()
            .map(|v| parse_address("start address", &v.as_text()))
            .transpose()
    }

    pub fn fill_byte(&self) -> Result<Option<u8>> {
        self.fill
            .as_ref()
            .map(|v| parse_fill_byte(&v.as_text()))
            .transpose()
    }
}
