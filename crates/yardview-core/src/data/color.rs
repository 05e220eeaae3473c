use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;

/// Linear RGB color with channels in `0.0..=1.0`.
///
/// Serialized as a `#RRGGBB` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`, `RRGGBB` or the short `#RGB` form.
    pub fn from_hex(hex: &str) -> Result<Self, DataError> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || DataError::InvalidColor(hex.to_string());

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        let (r, g, b) = match digits.len() {
            6 => (
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            ),
            3 => {
                let expand = |i: usize| channel(&digits[i..=i]).map(|v| v * 17);
                (expand(0)?, expand(1)?, expand(2)?)
            }
            _ => return Err(invalid()),
        };

        Ok(Self::from_bytes(r, g, b))
    }

    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn to_bytes(self) -> [u8; 3] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Uppercase `#RRGGBB`.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_bytes();
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn with_alpha(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_and_short_forms() {
        let c = Rgb::from_hex("#4FC3F7").unwrap();
        assert_eq!(c.to_bytes(), [0x4F, 0xC3, 0xF7]);

        let c = Rgb::from_hex("4fc3f7").unwrap();
        assert_eq!(c.to_hex(), "#4FC3F7");

        let c = Rgb::from_hex("#F80").unwrap();
        assert_eq!(c.to_bytes(), [0xFF, 0x88, 0x00]);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Rgb::from_hex("").is_err());
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#GG0000").is_err());
        assert!("#+12345".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Rgb::from_bytes(255, 0, 16)).unwrap();
        assert_eq!(json, "\"#FF0010\"");

        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_bytes(), [255, 0, 16]);

        assert!(serde_json::from_str::<Rgb>("\"nope\"").is_err());
    }

    #[test]
    fn test_to_bytes_clamps() {
        assert_eq!(Rgb::new(1.5, -0.2, 0.5).to_bytes(), [255, 0, 128]);
    }
}
