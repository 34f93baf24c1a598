//! Value types for image operations.
//!
//! These types describe *what* to do; the argument builders in
//! [`operations`](super::operations) turn them into tokens for the external
//! tool. None of them carry behavior beyond parsing and rendering.
//!
//! ## Types
//!
//! - [`OutputFormat`] — The two encodings every operation can produce (PNG, JPEG). Defaults to PNG.
//! - [`Gravity`] — One of nine compass anchors used when stacking. Defaults to `Center`.
//! - [`Colour`] — RGBA colour. Channels are clamped when rendered, never on construction.
//! - [`StrokeSpec`] — Stroke width plus colour for drawing.
//! - [`Point`], [`Size`], [`Rectangle`] — Plain geometry.
//! - [`StackDirection`] — Vertical or horizontal append.

use super::pipeline::MagickError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Encoded output format accepted by every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless.
    #[default]
    Png,
    /// Lossy.
    Jpg,
}

impl OutputFormat {
    /// Prefix understood by the tool in `<format>:<path>` output tokens.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = MagickError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            _ => Err(MagickError::Configuration(format!(
                "Invalid output format {s:?}. Valid formats are png and jpg."
            ))),
        }
    }
}

/// Anchor position used to align images of different sizes when stacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gravity {
    NorthWest,
    North,
    NorthEast,
    West,
    #[default]
    Center,
    East,
    SouthWest,
    South,
    SouthEast,
}

impl Gravity {
    pub const ALL: [Gravity; 9] = [
        Self::NorthWest,
        Self::North,
        Self::NorthEast,
        Self::West,
        Self::Center,
        Self::East,
        Self::SouthWest,
        Self::South,
        Self::SouthEast,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NorthWest => "NorthWest",
            Self::North => "North",
            Self::NorthEast => "NorthEast",
            Self::West => "West",
            Self::Center => "Center",
            Self::East => "East",
            Self::SouthWest => "SouthWest",
            Self::South => "South",
            Self::SouthEast => "SouthEast",
        }
    }
}

impl fmt::Display for Gravity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gravity {
    type Err = MagickError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| MagickError::Configuration(format!("Unknown gravity {s:?}")))
    }
}

/// RGBA colour.
///
/// Red, green and blue are nominally 0–255 and alpha 0–1. Values outside those
/// ranges are kept as given and clamped only when rendered for the tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Colour {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Colour {
    pub const RED: Colour = Colour::rgb(255.0, 0.0, 0.0);
    pub const GREEN: Colour = Colour::rgb(0.0, 255.0, 0.0);
    pub const BLUE: Colour = Colour::rgb(0.0, 0.0, 255.0);
    pub const TRANSPARENT: Colour = Colour::rgba(0.0, 0.0, 0.0, 0.0);

    /// Opaque colour.
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

/// Renders `rgba(r,g,b,a)` with every channel clamped into range.
impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({},{},{},{})",
            clamp_channel(self.red, 255.0),
            clamp_channel(self.green, 255.0),
            clamp_channel(self.blue, 255.0),
            clamp_channel(self.alpha, 1.0),
        )
    }
}

/// Parses `r,g,b` or `r,g,b,a` (the CLI colour syntax).
impl FromStr for Colour {
    type Err = MagickError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let channels = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| MagickError::Configuration(format!("Invalid colour {s:?}: {e}")))?;
        match channels[..] {
            [r, g, b] => Ok(Self::rgb(r, g, b)),
            [r, g, b, a] => Ok(Self::rgba(r, g, b, a)),
            _ => Err(MagickError::Configuration(format!(
                "Invalid colour {s:?}: expected r,g,b or r,g,b,a"
            ))),
        }
    }
}

// NaN compares false on both bounds, so map it to the lower bound explicitly.
fn clamp_channel(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

/// Stroke used when drawing outlines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSpec {
    pub width: f64,
    pub colour: Colour,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Pixel dimensions as reported by the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }
}

/// Direction in which stacked images are appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackDirection {
    /// Top to bottom (`-append`).
    Vertical,
    /// Left to right (`+append`).
    Horizontal,
}

impl StackDirection {
    pub fn append_flag(self) -> &'static str {
        match self {
            Self::Vertical => "-append",
            Self::Horizontal => "+append",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_renders_in_range_values_verbatim() {
        assert_eq!(Colour::RED.to_string(), "rgba(255,0,0,1)");
        assert_eq!(Colour::rgba(10.0, 20.0, 30.0, 0.5).to_string(), "rgba(10,20,30,0.5)");
        assert_eq!(Colour::TRANSPARENT.to_string(), "rgba(0,0,0,0)");
    }

    #[test]
    fn colour_clamps_out_of_range_channels() {
        let colour = Colour::rgba(300.0, -5.0, 256.5, 2.0);
        assert_eq!(colour.to_string(), "rgba(255,0,255,1)");

        let colour = Colour::rgba(0.0, 0.0, 0.0, -0.25);
        assert_eq!(colour.to_string(), "rgba(0,0,0,0)");
    }

    #[test]
    fn colour_clamping_does_not_alter_stored_values() {
        let colour = Colour::rgb(999.0, 0.0, 0.0);
        let _ = colour.to_string();
        assert_eq!(colour.red, 999.0);
    }

    #[test]
    fn colour_nan_renders_as_zero() {
        assert_eq!(Colour::rgb(f64::NAN, 1.0, 2.0).to_string(), "rgba(0,1,2,1)");
    }

    #[test]
    fn colour_parses_cli_syntax() {
        assert_eq!("255,0,0".parse::<Colour>().unwrap(), Colour::RED);
        assert_eq!(
            "0, 0, 0, 0".parse::<Colour>().unwrap(),
            Colour::TRANSPARENT
        );
        assert!("1,2".parse::<Colour>().is_err());
        assert!("red".parse::<Colour>().is_err());
    }

    #[test]
    fn output_format_defaults_to_png() {
        assert_eq!(OutputFormat::default(), OutputFormat::Png);
    }

    #[test]
    fn output_format_parses_case_insensitively() {
        assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpg);
        assert_eq!("jpeg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpg);
    }

    #[test]
    fn output_format_rejects_unsupported() {
        let err = "gif".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, MagickError::Configuration(_)));
    }

    #[test]
    fn gravity_round_trips_through_text() {
        for gravity in Gravity::ALL {
            assert_eq!(gravity.to_string().parse::<Gravity>().unwrap(), gravity);
        }
        assert_eq!("southeast".parse::<Gravity>().unwrap(), Gravity::SouthEast);
        assert!("Middle".parse::<Gravity>().is_err());
    }

    #[test]
    fn gravity_defaults_to_center() {
        assert_eq!(Gravity::default(), Gravity::Center);
    }

    #[test]
    fn size_deserializes_from_identify_template() {
        let size: Size = serde_json::from_str(r#"{"width": 257,"height": 388}"#).unwrap();
        assert_eq!(
            size,
            Size {
                width: 257,
                height: 388
            }
        );
        assert_eq!(size.to_string(), "257x388");
    }

    #[test]
    fn rectangle_from_origin_and_extent() {
        let rect = Rectangle::new(Point { x: 3.0, y: 4.0 }, 10.0, 20.0);
        assert_eq!(rect.origin(), Point { x: 3.0, y: 4.0 });
        assert_eq!((rect.width, rect.height), (10.0, 20.0));
    }

    #[test]
    fn stack_direction_flags() {
        assert_eq!(StackDirection::Vertical.append_flag(), "-append");
        assert_eq!(StackDirection::Horizontal.append_flag(), "+append");
    }
}
