//! Parsing of numeric command-line values

use std::num::ParseIntError;

use crate::error::{PackError, Result};

/// Parse a u32 written as decimal or with a `0x`/`0X` hex prefix.
pub fn parse_u32(s: &str) -> std::result::Result<u32, ParseIntError> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse::<u32>()
    }
}

/// Parse a firmware version string for the header's version field.
pub fn parse_version(s: &str) -> Result<u32> {
    parse_u32(s).map_err(|_| PackError::InvalidVersion {
        value: s.to_string(),
    })
}

/// Parse a load or start address given on the command line or in a config file.
pub fn parse_address(what: &'static str, s: &str) -> Result<u32> {
    parse_u32(s).map_err(|_| PackError::InvalidAddress {
        what,
        value: s.to_string(),
    })
}

/// Parse the gap fill byte (`0xFF`, `255`, ...).
pub fn parse_fill_byte(s: &str) -> Result<u8> {
    parse_u32(s)
        .ok()
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(|| PackError::InvalidAddress {
            what: "fill byte",
            value: s.to_string(),
        })
}
