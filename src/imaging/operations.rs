//! Public image operations.
//!
//! Each operation validates its own parameters, then hands the pipeline an
//! argument builder. The `plan_*` functions are those builders, exposed so
//! argument generation can be tested without launching anything.

use super::calculations::{crop_geometry, output_spec, rectangle_draw_spec, resize_geometry};
use super::params::{Colour, Gravity, OutputFormat, Rectangle, Size, StackDirection, StrokeSpec};
use super::pipeline::{MagickError, Pipeline, Result, Tool};
use super::runner::ToolRunner;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// `-format` template for `identify`; the output is a JSON object.
pub const SIZE_FORMAT: &str = r#"{"width": %w,"height": %h}"#;

fn path_arg(path: &Path) -> OsString {
    path.as_os_str().to_owned()
}

/// Arguments for a plain re-encode.
pub fn plan_convert(input: &Path, output: &Path, format: OutputFormat) -> Vec<OsString> {
    vec![path_arg(input), output_spec(format, output)]
}

/// Arguments for cropping `width`×`height` pixels starting at (`x`, `y`).
pub fn plan_crop(
    input: &Path,
    output: &Path,
    region: &Rectangle,
    format: OutputFormat,
) -> Vec<OsString> {
    vec![
        path_arg(input),
        "-crop".into(),
        crop_geometry(region.x, region.y, region.width, region.height).into(),
        output_spec(format, output),
    ]
}

/// Arguments for an aspect-preserving resize; `geometry` comes from
/// [`resize_geometry`].
pub fn plan_resample(
    input: &Path,
    output: &Path,
    geometry: &str,
    format: OutputFormat,
) -> Vec<OsString> {
    vec![
        path_arg(input),
        "-resize".into(),
        geometry.into(),
        output_spec(format, output),
    ]
}

/// Arguments for drawing a filled, stroked rectangle.
pub fn plan_draw_rectangle(
    input: &Path,
    output: &Path,
    rectangle: &Rectangle,
    fill: Colour,
    stroke: StrokeSpec,
    format: OutputFormat,
) -> Vec<OsString> {
    vec![
        path_arg(input),
        "-stroke".into(),
        stroke.colour.to_string().into(),
        "-strokewidth".into(),
        stroke.width.to_string().into(),
        "-fill".into(),
        fill.to_string().into(),
        "-draw".into(),
        rectangle_draw_spec(rectangle).into(),
        output_spec(format, output),
    ]
}

/// Arguments for appending all `inputs`, in order, into one image.
pub fn plan_stack(
    inputs: &[PathBuf],
    output: &Path,
    direction: StackDirection,
    gravity: Gravity,
    format: OutputFormat,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = inputs.iter().map(|p| path_arg(p)).collect();
    args.extend([
        "-gravity".into(),
        gravity.as_str().into(),
        direction.append_flag().into(),
        output_spec(format, output),
    ]);
    args
}

/// Arguments for reading dimensions without decoding pixel data.
pub fn plan_image_size(input: &Path) -> Vec<OsString> {
    vec![
        "-ping".into(),
        "-format".into(),
        SIZE_FORMAT.into(),
        path_arg(input),
    ]
}

/// Decode the output of [`SIZE_FORMAT`].
pub fn parse_size(text: &str) -> Result<Size> {
    serde_json::from_str(text.trim())
        .map_err(|e| MagickError::UnexpectedOutput(format!("{e}: {:?}", text.trim())))
}

/// Re-encode `input` as `format`.
pub async fn convert(
    pipeline: &Pipeline<impl ToolRunner>,
    input: &[u8],
    format: OutputFormat,
) -> Result<Vec<u8>> {
    pipeline
        .run_file_result(Tool::Convert, &[input], |inputs, output| {
            plan_convert(&inputs[0], output, format)
        })
        .await
}

/// Crop `region` out of `input`.
///
/// The origin is rounded up and the extent down to whole pixels. A region
/// outside the image is reported by the tool as
/// [`MagickError::ToolFailed`]; nothing is clamped here.
pub async fn crop(
    pipeline: &Pipeline<impl ToolRunner>,
    input: &[u8],
    region: Rectangle,
    format: OutputFormat,
) -> Result<Vec<u8>> {
    pipeline
        .run_file_result(Tool::Convert, &[input], |inputs, output| {
            plan_crop(&inputs[0], output, &region, format)
        })
        .await
}

/// Resize `input` to fit within `width`×`height`, keeping its aspect ratio.
///
/// Either dimension may be omitted, but not both: that fails with
/// [`MagickError::Configuration`] before anything is written or launched.
pub async fn resample(
    pipeline: &Pipeline<impl ToolRunner>,
    input: &[u8],
    width: Option<f64>,
    height: Option<f64>,
    format: OutputFormat,
) -> Result<Vec<u8>> {
    let geometry = resize_geometry(width, height).ok_or_else(|| {
        MagickError::Configuration("Specify either width or height or both".into())
    })?;
    pipeline
        .run_file_result(Tool::Convert, &[input], |inputs, output| {
            plan_resample(&inputs[0], output, &geometry, format)
        })
        .await
}

/// Draw `rectangle` onto `input` with the given fill and stroke.
pub async fn draw_rectangle(
    pipeline: &Pipeline<impl ToolRunner>,
    input: &[u8],
    rectangle: Rectangle,
    fill: Colour,
    stroke: StrokeSpec,
    format: OutputFormat,
) -> Result<Vec<u8>> {
    pipeline
        .run_file_result(Tool::Convert, &[input], |inputs, output| {
            plan_draw_rectangle(&inputs[0], output, &rectangle, fill, stroke, format)
        })
        .await
}

/// Append `images` in order along `direction`, aligning them by `gravity`.
///
/// Requires at least one image.
pub async fn stack(
    pipeline: &Pipeline<impl ToolRunner>,
    images: &[&[u8]],
    direction: StackDirection,
    gravity: Gravity,
    format: OutputFormat,
) -> Result<Vec<u8>> {
    if images.is_empty() {
        return Err(MagickError::Configuration(
            "At least one image is required to stack".into(),
        ));
    }
    pipeline
        .run_file_result(Tool::Convert, images, |inputs, output| {
            plan_stack(inputs, output, direction, gravity, format)
        })
        .await
}

/// Stack `images` top to bottom.
pub async fn stack_vertically(
    pipeline: &Pipeline<impl ToolRunner>,
    images: &[&[u8]],
    gravity: Gravity,
    format: OutputFormat,
) -> Result<Vec<u8>> {
    stack(pipeline, images, StackDirection::Vertical, gravity, format).await
}

/// Stack `images` left to right.
pub async fn stack_horizontally(
    pipeline: &Pipeline<impl ToolRunner>,
    images: &[&[u8]],
    gravity: Gravity,
    format: OutputFormat,
) -> Result<Vec<u8>> {
    stack(pipeline, images, StackDirection::Horizontal, gravity, format).await
}

/// Pixel dimensions of `image`.
pub async fn image_size(pipeline: &Pipeline<impl ToolRunner>, image: &[u8]) -> Result<Size> {
    pipeline
        .run_stdout_result(Tool::Identify, image, plan_image_size, parse_size)
        .await
}
