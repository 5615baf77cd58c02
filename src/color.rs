use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::Error;

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#?(?P<argb>[0-9a-fA-F]{8}|[0-9a-fA-F]{6})$").expect("valid color pattern")
});

/// The color painted behind the page before it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct BackgroundColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel. Only used to flatten the color over white.
    pub a: u8,
}

impl BackgroundColor {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// The color composited over white, so the canvas never carries alpha.
    pub fn flattened(&self) -> tiny_skia::Color {
        let blend = |c: u8| {
            let c = u16::from(c) * u16::from(self.a) + 255 * (255 - u16::from(self.a));
            ((c + 127) / 255) as u8
        };

        tiny_skia::Color::from_rgba8(blend(self.r), blend(self.g), blend(self.b), 255)
    }
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for BackgroundColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = HEX_COLOR
            .captures(s.trim())
            .ok_or_else(|| Error::InvalidColor(s.to_string()))?;
        let hex = &caps["argb"];
        let value =
            u32::from_str_radix(hex, 16).map_err(|_| Error::InvalidColor(s.to_string()))?;

        let a = if hex.len() == 8 { (value >> 24) as u8 } else { 255 };
        Ok(Self {
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
            a,
        })
    }
}

impl TryFrom<String> for BackgroundColor {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
    }
}
