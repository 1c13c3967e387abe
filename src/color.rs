//! RGB color type: parsing from user text, canonical formatting, shades.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Brightness factors for the shade row, darkest to lightest.
pub const SHADE_FACTORS: [f32; 5] = [0.5, 0.75, 1.0, 1.25, 1.5];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseColorError {
    #[error("Invalid color format. Use HEX (#RRGGBB), RGB (r,g,b), or comma-separated values.")]
    InvalidFormat,
    #[error("Color component {0} is out of range (0-255).")]
    OutOfRange(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a trimmed user input string. Accepted forms, tried in order:
    /// HEX (`#RRGGBB` or `RRGGBB`), `rgb(r, g, b)` with optional prefix and
    /// parentheses, and a bare `r, g, b` triple. No partial parses.
    pub fn parse(input: &str) -> Result<Self, ParseColorError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(ParseColorError::InvalidFormat);
        }
        if let Some(rgb) = Self::parse_hex(text) {
            return Ok(rgb);
        }
        Self::parse_components(text)
    }

    fn parse_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
        let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
        let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
        Some(Self::new(r, g, b))
    }

    /// `rgb(r, g, b)` and the bare `r, g, b` form share one code path: the
    /// `rgb` prefix and the parentheses are each optional.
    fn parse_components(text: &str) -> Result<Self, ParseColorError> {
        let mut body = text.strip_prefix("rgb").unwrap_or(text).trim();
        body = body.strip_prefix('(').unwrap_or(body);
        body = body.strip_suffix(')').unwrap_or(body);

        let parts: Vec<&str> = body.split(',').collect();
        if parts.len() != 3 {
            return Err(ParseColorError::InvalidFormat);
        }
        let mut channels = [0u8; 3];
        for (slot, part) in channels.iter_mut().zip(&parts) {
            let value: i64 = part
                .trim()
                .parse()
                .map_err(|_| ParseColorError::InvalidFormat)?;
            if !(0..=255).contains(&value) {
                return Err(ParseColorError::OutOfRange(value));
            }
            *slot = value as u8;
        }
        Ok(Self::new(channels[0], channels[1], channels[2]))
    }

    /// Canonical hex form, lowercase with a leading `#`.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn rgb_string(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    pub fn values_string(&self) -> String {
        format!("{}, {}, {}", self.r, self.g, self.b)
    }

    /// Scale each channel by `factor`, clamp at 255, floor to integer.
    pub fn shade(&self, factor: f32) -> Self {
        let scale = |c: u8| (c as f32 * factor).min(255.0) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }

    /// The five brightness variants of this color, darkest first.
    pub fn shades(&self) -> [Self; 5] {
        SHADE_FACTORS.map(|f| self.shade(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_hex_with_hash() {
        assert_eq!(Rgb::parse("#FF0000"), Ok(Rgb::new(255, 0, 0)));
        assert_eq!(Rgb::parse("#cbb6ac"), Ok(Rgb::new(203, 182, 172)));
    }

    #[test]
    fn parses_hex_without_hash() {
        assert_eq!(Rgb::parse("00ff7f"), Ok(Rgb::new(0, 255, 127)));
    }

    #[test]
    fn rejects_short_and_long_hex() {
        assert_eq!(Rgb::parse("#fff"), Err(ParseColorError::InvalidFormat));
        assert_eq!(Rgb::parse("#ff00000"), Err(ParseColorError::InvalidFormat));
    }

    #[test]
    fn parses_rgb_function() {
        assert_eq!(Rgb::parse("rgb(10, 20, 30)"), Ok(Rgb::new(10, 20, 30)));
        assert_eq!(Rgb::parse("rgb(0,0,0)"), Ok(Rgb::new(0, 0, 0)));
    }

    #[test]
    fn parses_bare_triple() {
        assert_eq!(Rgb::parse("255, 0, 0"), Ok(Rgb::new(255, 0, 0)));
        assert_eq!(Rgb::parse(" 1 , 2 , 3 "), Ok(Rgb::new(1, 2, 3)));
    }

    #[test]
    fn rejects_out_of_range_component() {
        assert_eq!(Rgb::parse("300,0,0"), Err(ParseColorError::OutOfRange(300)));
        assert_eq!(
            Rgb::parse("rgb(0, 256, 0)"),
            Err(ParseColorError::OutOfRange(256))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Rgb::parse(""), Err(ParseColorError::InvalidFormat));
        assert_eq!(Rgb::parse("red"), Err(ParseColorError::InvalidFormat));
        assert_eq!(Rgb::parse("1,2"), Err(ParseColorError::InvalidFormat));
        assert_eq!(Rgb::parse("1,2,3,4"), Err(ParseColorError::InvalidFormat));
    }

    #[test]
    fn hex_round_trips() {
        let color = Rgb::new(18, 52, 86);
        assert_eq!(Rgb::parse(&color.hex()), Ok(color));
    }

    #[test]
    fn formats_canonical_strings() {
        let color = Rgb::new(255, 0, 15);
        assert_eq!(color.hex(), "#ff000f");
        assert_eq!(color.rgb_string(), "rgb(255, 0, 15)");
        assert_eq!(color.values_string(), "255, 0, 15");
    }

    #[test]
    fn shade_identity_at_factor_one() {
        let color = Rgb::new(12, 200, 99);
        assert_eq!(color.shade(1.0), color);
    }

    #[test]
    fn shades_clamp_and_match_reference() {
        let red = Rgb::new(255, 0, 0);
        let expected = [
            Rgb::new(127, 0, 0),
            Rgb::new(191, 0, 0),
            Rgb::new(255, 0, 0),
            Rgb::new(255, 0, 0),
            Rgb::new(255, 0, 0),
        ];
        assert_eq!(red.shades(), expected);
    }

    #[test]
    fn shades_are_monotonic_below_clamp() {
        let color = Rgb::new(80, 120, 40);
        let shades = color.shades();
        for pair in shades.windows(2) {
            assert!(pair[0].r <= pair[1].r);
            assert!(pair[0].g <= pair[1].g);
            assert!(pair[0].b <= pair[1].b);
        }
    }
}
