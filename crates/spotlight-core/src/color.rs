#![forbid(unsafe_code)]

//! Packed RGBA colors.
//!
//! Hosts commonly describe colors as `#AARRGGBB` strings or 32-bit ARGB
//! integers; [`Rgba`] accepts both and stores them as `0xRRGGBBAA`.

use std::fmt;
use std::str::FromStr;

/// A packed RGBA color (`0xRRGGBBAA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Rgba(u32);

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::rgba(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    /// Opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Convert from a 32-bit `0xAARRGGBB` integer.
    #[inline]
    pub const fn from_argb(argb: u32) -> Self {
        Self(argb.rotate_left(8))
    }

    /// Convert to a 32-bit `0xAARRGGBB` integer.
    #[inline]
    pub const fn to_argb(self) -> u32 {
        self.0.rotate_right(8)
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Same color with a different alpha channel.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self((self.0 & 0xFFFF_FF00) | a as u32)
    }

    /// Multiply the alpha channel by `factor` (clamped to [0, 1]).
    #[must_use]
    pub fn fade(self, factor: f32) -> Self {
        let factor = if factor.is_nan() {
            0.0
        } else {
            factor.clamp(0.0, 1.0)
        };
        self.with_alpha((self.a() as f32 * factor).round() as u8)
    }

    /// Parse `#RGB`, `#RRGGBB`, or `#AARRGGBB` (leading `#` optional).
    pub fn parse_hex(input: &str) -> Result<Self, ParseColorError> {
        let digits = input.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseColorError::InvalidDigit(input.to_string()));
        }
        let value = |s: &str| {
            u32::from_str_radix(s, 16).map_err(|_| ParseColorError::InvalidDigit(input.to_string()))
        };
        match digits.len() {
            3 => {
                let v = value(digits)?;
                let expand = |n: u32| ((n & 0xF) * 0x11) as u8;
                Ok(Self::rgb(expand(v >> 8), expand(v >> 4), expand(v)))
            }
            6 => Ok(Self::from_argb(0xFF00_0000 | value(digits)?)),
            8 => Ok(Self::from_argb(value(digits)?)),
            len => Err(ParseColorError::InvalidLength(len)),
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.to_argb())
    }
}

impl FromStr for Rgba {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl TryFrom<String> for Rgba {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value)
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_string()
    }
}

/// Errors raised when parsing a hex color string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseColorError {
    InvalidDigit(String),
    InvalidLength(usize),
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDigit(input) => write!(f, "invalid hex color: {input:?}"),
            Self::InvalidLength(len) => {
                write!(f, "hex color must have 3, 6 or 8 digits, got {len}")
            }
        }
    }
}

impl std::error::Error for ParseColorError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_round_trip_through_argb() {
        let color = Rgba::from_argb(0xB300_0000);
        assert_eq!(color.a(), 0xB3);
        assert_eq!((color.r(), color.g(), color.b()), (0, 0, 0));
        assert_eq!(color.to_argb(), 0xB300_0000);
    }

    #[test]
    fn parse_android_style_hex() {
        assert_eq!(
            Rgba::parse_hex("#CC333333").unwrap(),
            Rgba::rgba(0x33, 0x33, 0x33, 0xCC)
        );
        assert_eq!(Rgba::parse_hex("ff0000").unwrap(), Rgba::rgb(255, 0, 0));
        assert_eq!(Rgba::parse_hex("#fff").unwrap(), Rgba::WHITE);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(
            Rgba::parse_hex("#12345"),
            Err(ParseColorError::InvalidLength(5))
        );
        assert!(matches!(
            Rgba::parse_hex("#GG0000"),
            Err(ParseColorError::InvalidDigit(_))
        ));
    }

    #[test]
    fn display_is_argb_hex() {
        assert_eq!(Rgba::rgba(0x33, 0x33, 0x33, 0xCC).to_string(), "#CC333333");
    }

    #[test]
    fn fade_scales_alpha() {
        let color = Rgba::rgba(10, 20, 30, 200);
        assert_eq!(color.fade(0.5).a(), 100);
        assert_eq!(color.fade(2.0).a(), 200);
        assert_eq!(color.fade(f32::NAN).a(), 0);
        assert_eq!(color.fade(0.5).r(), 10);
    }
}
