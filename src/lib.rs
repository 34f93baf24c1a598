//! # magick-ops
//!
//! Async image transforms (convert, crop, resample, draw, stack, size) on
//! in-memory byte buffers, executed by the ImageMagick command-line tools.
//!
//! # Architecture: Buffer → Temp File → Tool → Buffer
//!
//! The tools only speak files, while callers hold bytes. Every operation goes
//! through one [`Pipeline`](imaging::Pipeline):
//!
//! ```text
//! 1. Write   buffers  →  temp inputs      (one random path per buffer)
//! 2. Run     tool     →  exit status      (stderr captured, stdout captured or discarded)
//! 3. Read    output   →  bytes | value    (result file, or parsed stdout)
//! 4. Clean   scope    →  nothing left     (always, before the call returns)
//! ```
//!
//! Operations themselves are thin: they validate parameters and build an
//! argument vector, then hand both to the pipeline.
//!
//! ```no_run
//! use magick_ops::config::ToolConfig;
//! use magick_ops::imaging::{self, OutputFormat, Pipeline, Rectangle};
//!
//! # async fn demo(png: &[u8]) -> Result<(), magick_ops::imaging::MagickError> {
//! let pipeline = Pipeline::from_config(&ToolConfig::default())?;
//! let region = Rectangle { x: 10.0, y: 10.0, width: 200.0, height: 300.0 };
//! let cropped = imaging::crop(&pipeline, png, region, OutputFormat::Png).await?;
//! let size = imaging::image_size(&pipeline, &cropped).await?;
//! assert_eq!((size.width, size.height), (200, 300));
//! # Ok(())
//! # }
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Temp store, process runner, pipeline, value types and the public operations |
//! | [`config`] | `magick-ops.toml` loading, validation, temp-root resolution |
//!
//! # Design Decisions
//!
//! ## Cleanup Is a Destructor
//!
//! Temp paths are tracked by a [`TempScope`](imaging::TempScope) whose `Drop`
//! removes them. That covers the success path, every `?` early return, and a
//! caller dropping the future mid-flight (the child is killed on drop too).
//! Removal errors are logged, never returned: the call's own result wins.
//!
//! ## Random Names, No Locks
//!
//! Temp names are v4 UUIDs under a shared root, so concurrent calls never
//! contend for a name and need no coordination.
//!
//! ## Environment Read Once
//!
//! The temp root comes from config or `TMPDIR`/`TMP`/`TEMP`, resolved when a
//! pipeline is built. Nothing inside [`imaging`] reads the environment.

pub mod config;
pub mod imaging;
