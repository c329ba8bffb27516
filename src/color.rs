//! Hex color parsing for marker fills

use serde::{Serialize, Serializer};
use std::fmt;

/// An opaque RGB color written as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl HexColor {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parse `RRGGBB` or shorthand `RGB`, with or without a leading `#`
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        match hex.len() {
            6 => {
                let value = u32::from_str_radix(hex, 16).ok()?;
                Some(Self::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8))
            }
            3 => {
                // Shorthand: each nibble is doubled (#D00 -> #DD0000)
                let value = u16::from_str_radix(hex, 16).ok()?;
                let expand = |nibble: u16| (nibble as u8 & 0x0F) * 0x11;
                Some(Self::rgb(expand(value >> 8), expand(value >> 4), expand(value)))
            }
            _ => None,
        }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
