// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RGBA colors and their KML / COLLADA encodings

use serde::{Deserialize, Serialize};

/// 8-bit RGBA color, serialized as `[r, g, b, a]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 4]", into = "[u8; 4]")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Opaque white, used wherever a color is required but none was given
    pub const WHITE: Color = Color::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Decode a KML color string.
    ///
    /// KML orders the channels alpha, blue, green, red: `"ff0000ff"` is
    /// opaque red. A leading `#` is tolerated. Returns `None` unless the
    /// string holds exactly eight hex digits.
    pub fn from_kml_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 8 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self {
            a: channel(0)?,
            b: channel(2)?,
            g: channel(4)?,
            r: channel(6)?,
        })
    }

    /// Encode as a KML `aabbggrr` string
    pub fn to_kml_hex(&self) -> String {
        format!("{:02x}{:02x}{:02x}{:02x}", self.a, self.b, self.g, self.r)
    }

    /// Build from COLLADA-style floats in `0.0..=1.0`, values are clamped.
    pub fn from_unit_floats(rgba: [f64; 4]) -> Self {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(channel(rgba[0]), channel(rgba[1]), channel(rgba[2]), channel(rgba[3]))
    }

    /// Channels as floats in `0.0..=1.0`
    pub fn to_unit_floats(&self) -> [f64; 4] {
        [self.r, self.g, self.b, self.a].map(|c| c as f64 / 255.0)
    }

    /// Stable key for caching one style/material per distinct color
    pub fn key(&self) -> String {
        format!("{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[u8; 4]> for Color {
    fn from(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<Color> for [u8; 4] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kml_hex_is_aabbggrr() {
        assert_eq!(Color::from_kml_hex("ff0000ff"), Some(Color::new(255, 0, 0, 255)));
        assert_eq!(Color::from_kml_hex("7fff0000"), Some(Color::new(0, 0, 255, 127)));
        assert_eq!(Color::from_kml_hex("#ff00ff00"), Some(Color::new(0, 255, 0, 255)));
    }

    #[test]
    fn kml_hex_rejects_malformed() {
        assert_eq!(Color::from_kml_hex("ff0000"), None);
        assert_eq!(Color::from_kml_hex("gg0000ff"), None);
        assert_eq!(Color::from_kml_hex(""), None);
    }

    #[test]
    fn kml_hex_round_trip() {
        let c = Color::new(12, 34, 56, 78);
        assert_eq!(Color::from_kml_hex(&c.to_kml_hex()), Some(c));
    }

    #[test]
    fn unit_floats() {
        assert_eq!(Color::from_unit_floats([1.0, 0.0, 0.5, 1.0]), Color::new(255, 0, 128, 255));
        assert_eq!(Color::from_unit_floats([2.0, -1.0, 0.0, 1.0]), Color::new(255, 0, 0, 255));
        assert_eq!(Color::WHITE.to_unit_floats(), [1.0; 4]);
    }

    #[test]
    fn serializes_as_array() {
        let json = serde_json::to_string(&Color::new(1, 2, 3, 4)).unwrap();
        assert_eq!(json, "[1,2,3,4]");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::new(1, 2, 3, 4));
    }
}
