//! Display colors.

use std::collections::HashMap;

use serde::Deserialize;

/// An RGB color for the pixel display.
///
/// Deserializes from a three-element array, e.g. `[255, 0, 0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const GRAY: Rgb = Rgb::new(128, 128, 128);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// Line name → color lookup.
///
/// Lines without an explicit color get the fallback color (gray unless
/// configured otherwise); lookups never fail.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMapping {
    lines: HashMap<String, Rgb>,
    fallback: Rgb,
}

impl ColorMapping {
    /// Create a mapping with the given per-line colors and a gray fallback.
    pub fn new(lines: HashMap<String, Rgb>) -> Self {
        Self {
            lines,
            fallback: Rgb::GRAY,
        }
    }

    /// Set the color used for lines missing from the mapping.
    pub fn with_fallback(mut self, fallback: Rgb) -> Self {
        self.fallback = fallback;
        self
    }

    /// Color for a line, falling back to the default.
    pub fn color_for(&self, line: &str) -> Rgb {
        self.lines.get(line).copied().unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> Rgb {
        self.fallback
    }
}

impl Default for ColorMapping {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_line_falls_back_to_gray() {
        let mut lines = HashMap::new();
        lines.insert("Bus 60".to_string(), Rgb::new(128, 0, 128));
        let colors = ColorMapping::new(lines);

        assert_eq!(colors.color_for("Bus 60"), Rgb::new(128, 0, 128));
        assert_eq!(colors.color_for("STR 15"), Rgb::GRAY);
    }

    #[test]
    fn custom_fallback() {
        let colors = ColorMapping::default().with_fallback(Rgb::WHITE);
        assert_eq!(colors.color_for("anything"), Rgb::WHITE);
    }

    #[test]
    fn deserializes_from_array() {
        #[derive(Deserialize)]
        struct Wrapper {
            color: Rgb,
        }

        let w: Wrapper = toml::from_str("color = [0, 100, 255]").unwrap();
        assert_eq!(w.color, Rgb::new(0, 100, 255));

        let too_big: Result<Wrapper, _> = toml::from_str("color = [0, 100, 256]");
        assert!(too_big.is_err());
    }
}
