use std::fmt;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{AdcraftError, AdcraftResult};

/// Opaque sRGB color with 8-bit channels.
///
/// Serializes as an uppercase `#RRGGBB` string; accepts `#RRGGBB`, `RRGGBB` and `#RGB` on input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Pure white.
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Construct from channel values.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string.
    pub fn from_hex(s: &str) -> AdcraftResult<Self> {
        parse_hex(s).map_err(AdcraftError::validation)
    }

    /// Format as uppercase `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Mix toward white by `fraction` (0 keeps the color, 1 yields white).
    pub fn lighten(self, fraction: f64) -> Self {
        let f = fraction.clamp(0.0, 1.0);
        let mix = |c: u8| -> u8 {
            let c = f64::from(c);
            (c + (255.0 - c) * f).round().clamp(0.0, 255.0) as u8
        };
        Self::new(mix(self.r), mix(self.g), mix(self.b))
    }

    /// Perceptual luma in `0..=255`.
    pub fn luma(self) -> f64 {
        luma(f64::from(self.r), f64::from(self.g), f64::from(self.b))
    }

    /// `(max - min) / max` over the channels; 0 for black.
    pub fn chroma_ratio(self) -> f64 {
        chroma_ratio(f64::from(self.r), f64::from(self.g), f64::from(self.b))
    }

    /// Opaque RGBA8 bytes.
    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// ITU-R BT.601 luma weighting.
pub(crate) fn luma(r: f64, g: f64, b: f64) -> f64 {
    0.299 * r + 0.587 * g + 0.114 * b
}

pub(crate) fn chroma_ratio(r: f64, g: f64, b: f64) -> f64 {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max <= 0.0 {
        return 0.0;
    }
    (max - min) / max
}

fn parse_hex(s: &str) -> Result<Rgb8, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !s.is_ascii() {
        return Err("hex color must be ASCII".to_owned());
    }

    match s.len() {
        6 => Ok(Rgb8::new(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        3 => {
            let nibble = |i: usize| -> Result<u8, String> {
                let v = hex_byte(&s[i..i + 1])?;
                Ok(v * 17)
            };
            Ok(Rgb8::new(nibble(0)?, nibble(1)?, nibble(2)?))
        }
        _ => Err("hex color must be #RRGGBB or #RGB (case-insensitive)".to_owned()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
