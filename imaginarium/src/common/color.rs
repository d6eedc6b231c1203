//! RGBA color type for fills and backgrounds.

use std::str::FromStr;

use crate::common::color_format::ChannelCount;
use crate::common::error::Error;

/// RGBA color with f32 components in range [0.0, 1.0].
///
/// Parses from and serializes to `#rrggbb` / `#rrggbbaa` or one of the
/// named colors (`white`, `black`, `gray`, `red`, `green`, `blue`,
/// `transparent`).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create a new color from RGBA components.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a new opaque color from RGB components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from RGBA u8 values (0-255).
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Convert to luminance (grayscale) using Rec. 709 weights.
    pub fn luminance(&self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    /// True when the color is fully opaque.
    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// Return a new color with modified alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Convert to RGBA u8 values, rounding to nearest.
    pub fn to_rgba_u8(&self) -> [u8; 4] {
        [
            unit_to_u8(self.r),
            unit_to_u8(self.g),
            unit_to_u8(self.b),
            unit_to_u8(self.a),
        ]
    }

    /// Pixel bytes for an 8-bit image with `channels` channels.
    /// Only the first `channels.channel_count()` bytes are meaningful.
    pub fn to_pixel_u8(&self, channels: ChannelCount) -> [u8; 4] {
        let [r, g, b, a] = self.to_rgba_u8();
        let l = unit_to_u8(self.luminance());
        match channels {
            ChannelCount::L => [l, 0, 0, 0],
            ChannelCount::LA => [l, a, 0, 0],
            ChannelCount::Rgb => [r, g, b, 0],
            ChannelCount::Rgba => [r, g, b, a],
        }
    }

    // Common colors
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let named = match s.to_ascii_lowercase().as_str() {
            "white" => Some(Color::WHITE),
            "black" => Some(Color::BLACK),
            "gray" | "grey" => Some(Color::GRAY),
            "red" => Some(Color::RED),
            "green" => Some(Color::GREEN),
            "blue" => Some(Color::BLUE),
            "transparent" => Some(Color::TRANSPARENT),
            _ => None,
        };
        if let Some(color) = named {
            return Ok(color);
        }

        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| Error::InvalidColor(s.to_string()))?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(Error::InvalidColor(s.to_string()));
        }

        let byte = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| Error::InvalidColor(s.to_string()))
        };
        let a = if hex.len() == 8 { byte(6)? } else { 255 };

        Ok(Color::from_u8(byte(0)?, byte(2)?, byte(4)?, a))
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b, a] = self.to_rgba_u8();
        if a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_u8() {
        let c = Color::from_u8(255, 128, 0, 128);
        assert!((c.r - 1.0).abs() < 0.01);
        assert!((c.g - 0.502).abs() < 0.01);
        assert_eq!(c.b, 0.0);
        assert!((c.a - 0.502).abs() < 0.01);
    }

    #[test]
    fn test_luminance() {
        assert!((Color::WHITE.luminance() - 1.0).abs() < 0.001);
        assert_eq!(Color::BLACK.luminance(), 0.0);
        assert!(Color::GREEN.luminance() > Color::RED.luminance());
    }

    #[test]
    fn test_pixel_bytes_per_layout() {
        let c = Color::from_u8(10, 20, 30, 40);
        assert_eq!(c.to_pixel_u8(ChannelCount::Rgba), [10, 20, 30, 40]);
        assert_eq!(c.to_pixel_u8(ChannelCount::Rgb)[..3], [10, 20, 30]);
        assert_eq!(Color::WHITE.to_pixel_u8(ChannelCount::L)[0], 255);
        assert_eq!(Color::TRANSPARENT.to_pixel_u8(ChannelCount::LA)[..2], [0, 0]);
    }

    #[test]
    fn test_parse_named() {
        assert_eq!("White".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("transparent".parse::<Color>().unwrap(), Color::TRANSPARENT);
        assert!(!Color::TRANSPARENT.is_opaque());
    }

    #[test]
    fn test_parse_hex() {
        let c: Color = "#0a0a0a".parse().unwrap();
        assert_eq!(c.to_rgba_u8(), [10, 10, 10, 255]);

        let c: Color = "#ff000080".parse().unwrap();
        assert_eq!(c.to_rgba_u8(), [255, 0, 0, 128]);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!("#12".parse::<Color>(), Err(Error::InvalidColor(_))));
        assert!(matches!("#gggggg".parse::<Color>(), Err(Error::InvalidColor(_))));
        assert!(matches!("beige".parse::<Color>(), Err(Error::InvalidColor(_))));
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["#ffffff", "#000000", "#12345678"] {
            let c: Color = text.parse().unwrap();
            assert_eq!(c.to_string(), text);
        }
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Color::RED).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        let back: Color = serde_json::from_str("\"#00ff00\"").unwrap();
        assert_eq!(back, Color::GREEN);
    }
}
