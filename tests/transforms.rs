//! End-to-end tests against the real ImageMagick tools.
//!
//! Each test builds its fixture with the `image` crate, runs an operation
//! through a pipeline rooted in a private temp directory, and checks both the
//! result and that the temp directory is empty afterwards.
//!
//! Tests print a note and return early when `convert`/`identify` are not
//! installed.
//!
//! Run with: cargo test --test transforms -- --nocapture

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use magick_ops::config::ToolConfig;
use magick_ops::imaging::{
    self, Colour, Gravity, MagickError, OutputFormat, Pipeline, Rectangle, Size, StrokeSpec,
    SubprocessRunner,
};
use std::io::Cursor;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const FIXTURE: Size = Size {
    width: 257,
    height: 388,
};

fn magick_available() -> bool {
    let ok = |tool: &str| Command::new(tool).arg("-version").output().is_ok();
    if ok("convert") && ok("identify") {
        true
    } else {
        eprintln!("ImageMagick not found - skipping");
        false
    }
}

/// Gradient fixture, encoded as PNG.
fn fixture_png() -> Vec<u8> {
    let img = RgbImage::from_fn(FIXTURE.width, FIXTURE.height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn pipeline_in(tmp: &TempDir) -> Pipeline {
    Pipeline::with_runner(
        &ToolConfig::default(),
        tmp.path().to_path_buf(),
        SubprocessRunner,
    )
    .unwrap()
}

fn assert_no_leftovers(dir: &Path) {
    let left: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert!(left.is_empty(), "temp files left behind: {left:?}");
}

#[tokio::test]
async fn reads_image_size() {
    if !magick_available() {
        return;
    }
    let tmp = TempDir::new().unwrap();
    let pipeline = pipeline_in(&tmp);

    let size = imaging::image_size(&pipeline, &fixture_png()).await.unwrap();

    assert_eq!(size, FIXTURE);
    assert_no_leftovers(tmp.path());
}

#[tokio::test]
async fn crops_to_requested_size() {
    if !magick_available() {
        return;
    }
    let tmp = TempDir::new().unwrap();
    let pipeline = pipeline_in(&tmp);
    let region = Rectangle {
        x: 10.0,
        y: 10.0,
        width: 200.0,
        height: 300.0,
    };

    for format in [OutputFormat::Png, OutputFormat::Jpg] {
        let cropped = imaging::crop(&pipeline, &fixture_png(), region, format)
            .await
            .unwrap();
        let size = imaging::image_size(&pipeline, &cropped).await.unwrap();
        assert_eq!(
            size,
            Size {
                width: 200,
                height: 300
            }
        );
    }
    assert_no_leftovers(tmp.path());
}

#[tokio::test]
async fn crop_outside_image_fails() {
    if !magick_available() {
        return;
    }
    let tmp = TempDir::new().unwrap();
    let pipeline = pipeline_in(&tmp);
    let region = Rectangle {
        x: 1000.0,
        y: 10.0,
        width: 500.0,
        height: 600.0,
    };

    let result = imaging::crop(&pipeline, &fixture_png(), region, OutputFormat::Png).await;

    assert!(matches!(result, Err(MagickError::ToolFailed { .. })));
    assert_no_leftovers(tmp.path());
}

#[tokio::test]
async fn resamples_by_width_height_or_both() {
    if !magick_available() {
        return;
    }
    let tmp = TempDir::new().unwrap();
    let pipeline = pipeline_in(&tmp);
    let target_w = FIXTURE.width as f64 * 0.5;
    let target_h = FIXTURE.height as f64 * 0.5;

    let cases = [
        (Some(target_w), Some(target_h)),
        (Some(target_w), None),
        (None, Some(target_h)),
    ];
    for (width, height) in cases {
        let resampled =
            imaging::resample(&pipeline, &fixture_png(), width, height, OutputFormat::Png)
                .await
                .unwrap();
        let size = imaging::image_size(&pipeline, &resampled).await.unwrap();
        assert!(
            (size.width as f64 - target_w).abs() <= 1.0,
            "{width:?}x{height:?} gave {size}"
        );
        assert!(
            (size.height as f64 - target_h).abs() <= 1.0,
            "{width:?}x{height:?} gave {size}"
        );
    }
    assert_no_leftovers(tmp.path());
}

#[tokio::test]
async fn resample_without_dimensions_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let pipeline = pipeline_in(&tmp);

    let result = imaging::resample(&pipeline, &fixture_png(), None, None, OutputFormat::Png).await;

    assert!(matches!(result, Err(MagickError::Configuration(_))));
    assert_no_leftovers(tmp.path());
}

#[tokio::test]
async fn converts_png_to_jpg_and_back() {
    if !magick_available() {
        return;
    }
    let tmp = TempDir::new().unwrap();
    let pipeline = pipeline_in(&tmp);

    let jpg = imaging::convert(&pipeline, &fixture_png(), OutputFormat::Jpg)
        .await
        .unwrap();
    assert_eq!(image::guess_format(&jpg).unwrap(), ImageFormat::Jpeg);

    let png = imaging::convert(&pipeline, &jpg, OutputFormat::Png)
        .await
        .unwrap();
    assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
    assert_no_leftovers(tmp.path());
}

#[tokio::test]
async fn stacks_vertically_and_horizontally() {
    if !magick_available() {
        return;
    }
    let tmp = TempDir::new().unwrap();
    let pipeline = pipeline_in(&tmp);
    let png = fixture_png();
    let images = [png.as_slice(), png.as_slice()];

    let vertical = imaging::stack_vertically(&pipeline, &images, Gravity::Center, OutputFormat::Png)
        .await
        .unwrap();
    let size = imaging::image_size(&pipeline, &vertical).await.unwrap();
    assert_eq!(
        size,
        Size {
            width: FIXTURE.width,
            height: FIXTURE.height * 2
        }
    );

    let horizontal =
        imaging::stack_horizontally(&pipeline, &images, Gravity::Center, OutputFormat::Png)
            .await
            .unwrap();
    let size = imaging::image_size(&pipeline, &horizontal).await.unwrap();
    assert_eq!(
        size,
        Size {
            width: FIXTURE.width * 2,
            height: FIXTURE.height
        }
    );
    assert_no_leftovers(tmp.path());
}

#[tokio::test]
async fn draws_rectangle_stroke_in_exact_colour() {
    if !magick_available() {
        return;
    }
    let tmp = TempDir::new().unwrap();
    let pipeline = pipeline_in(&tmp);
    let rectangle = Rectangle {
        x: 20.0,
        y: 20.0,
        width: FIXTURE.width as f64 - 40.0,
        height: FIXTURE.height as f64 - 40.0,
    };
    let stroke = StrokeSpec {
        width: 4.0,
        colour: Colour::RED,
    };

    let drawn = imaging::draw_rectangle(
        &pipeline,
        &fixture_png(),
        rectangle,
        Colour::TRANSPARENT,
        stroke,
        OutputFormat::Png,
    )
    .await
    .unwrap();

    let pixel = *image::load_from_memory(&drawn)
        .unwrap()
        .to_rgb8()
        .get_pixel(20, 20);
    assert_eq!(pixel, Rgb([255, 0, 0]));
    assert_no_leftovers(tmp.path());
}

#[tokio::test]
async fn corrupt_input_fails_without_leftovers() {
    if !magick_available() {
        return;
    }
    let tmp = TempDir::new().unwrap();
    let pipeline = pipeline_in(&tmp);

    let result = imaging::convert(&pipeline, b"definitely not an image", OutputFormat::Png).await;
    assert!(matches!(result, Err(MagickError::ToolFailed { .. })));

    let result = imaging::image_size(&pipeline, b"definitely not an image").await;
    assert!(matches!(result, Err(MagickError::ToolFailed { .. })));

    assert_no_leftovers(tmp.path());
}

#[tokio::test]
async fn missing_tool_is_a_tool_failure() {
    let tmp = TempDir::new().unwrap();
    let mut config = ToolConfig::default();
    config.tools.convert = "magick-ops-no-such-convert".into();
    let pipeline =
        Pipeline::with_runner(&config, tmp.path().to_path_buf(), SubprocessRunner).unwrap();

    let result = imaging::convert(&pipeline, &fixture_png(), OutputFormat::Jpg).await;

    assert!(matches!(result, Err(MagickError::ToolFailed { .. })));
    assert_no_leftovers(tmp.path());
}
