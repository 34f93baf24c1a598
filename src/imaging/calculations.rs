//! Pure functions that render geometry into the tool's argument syntax.
//!
//! All functions here are pure and testable without any I/O or processes.

use super::params::{OutputFormat, Rectangle};
use std::ffi::OsString;
use std::path::Path;

/// Crop geometry `WxH+X+Y`.
///
/// Extent is floored and origin rounded up, so a fractional region never
/// reaches outside the pixels the caller asked for.
///
/// # Examples
/// ```
/// # use magick_ops::imaging::crop_geometry;
/// assert_eq!(crop_geometry(10.2, 10.0, 200.9, 300.0), "200x300+11+10");
/// ```
pub fn crop_geometry(x: f64, y: f64, width: f64, height: f64) -> String {
    format!(
        "{}x{}{:+}{:+}",
        width.floor() as i64,
        height.floor() as i64,
        x.ceil() as i64,
        y.ceil() as i64
    )
}

/// Resize geometry for an aspect-preserving fit.
///
/// Returns `None` when neither dimension is given; the tool needs at least one.
///
/// # Examples
/// ```
/// # use magick_ops::imaging::resize_geometry;
/// assert_eq!(resize_geometry(Some(128.5), Some(194.0)).as_deref(), Some("128x194"));
/// assert_eq!(resize_geometry(Some(128.0), None).as_deref(), Some("128"));
/// assert_eq!(resize_geometry(None, Some(194.0)).as_deref(), Some("x194"));
/// assert_eq!(resize_geometry(None, None), None);
/// ```
pub fn resize_geometry(width: Option<f64>, height: Option<f64>) -> Option<String> {
    let width = width.and_then(pixel_extent);
    let height = height.and_then(pixel_extent);
    match (width, height) {
        (Some(w), Some(h)) => Some(format!("{w}x{h}")),
        (Some(w), None) => Some(w.to_string()),
        (None, Some(h)) => Some(format!("x{h}")),
        (None, None) => None,
    }
}

/// Floor a requested extent; zero, negative and NaN count as "not given".
fn pixel_extent(value: f64) -> Option<i64> {
    let floored = value.floor();
    (floored >= 1.0).then_some(floored as i64)
}

/// Draw primitive for a rectangle: `rectangle X0,Y0 X1,Y1`.
///
/// The top-left corner is rounded up and the bottom-right corner down, so the
/// drawn shape always lies within the requested area.
pub fn rectangle_draw_spec(rect: &Rectangle) -> String {
    format!(
        "rectangle {},{} {},{}",
        rect.x.ceil() as i64,
        rect.y.ceil() as i64,
        (rect.x + rect.width).floor() as i64,
        (rect.y + rect.height).floor() as i64
    )
}

/// Output token `<format>:<path>` that forces the encoding regardless of the
/// path's (absent) extension.
pub fn output_spec(format: OutputFormat, path: &Path) -> OsString {
    let mut spec = OsString::from(format!("{format}:"));
    spec.push(path);
    spec
}
