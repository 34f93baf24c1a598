//! Image operations delegated to the ImageMagick command-line tools.
//!
//! | Operation | Tool | Arguments |
//! |---|---|---|
//! | **convert** | `convert` | `IN png:OUT` |
//! | **crop** | `convert` | `IN -crop WxH+X+Y png:OUT` |
//! | **resample** | `convert` | `IN -resize WxH png:OUT` (`W` or `xH` for one side) |
//! | **draw_rectangle** | `convert` | `IN -stroke C -strokewidth K -fill C -draw "rectangle ..." png:OUT` |
//! | **stack** | `convert` | `IN... -gravity G -append\|+append png:OUT` |
//! | **image_size** | `identify` | `-ping -format {"width": %w,"height": %h} IN` |
//!
//! The module is split into:
//! - **Temp**: [`TempStore`] / [`TempScope`], auto-deleting temp paths
//! - **Runner**: [`ToolRunner`] trait + [`SubprocessRunner`]
//! - **Pipeline**: [`Pipeline`], the write → run → read protocol
//! - **Calculations**: Pure geometry-to-argument functions (unit testable)
//! - **Parameters**: Value types (formats, colours, geometry)
//! - **Operations**: Public async operations built on the pipeline

mod calculations;
pub mod operations;
mod params;
pub mod pipeline;
pub mod runner;
pub mod temp;

pub use calculations::{crop_geometry, rectangle_draw_spec, resize_geometry};
pub use operations::{
    convert, crop, draw_rectangle, image_size, resample, stack, stack_horizontally,
    stack_vertically,
};
pub use params::{
    Colour, Gravity, OutputFormat, Point, Rectangle, Size, StackDirection, StrokeSpec,
};
pub use pipeline::{MagickError, Pipeline, Result, Tool};
pub use runner::{Invocation, StdoutMode, SubprocessRunner, ToolOutput, ToolRunner};
pub use temp::{TempScope, TempStore};
