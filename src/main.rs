use clap::{Args, Parser, Subcommand};
use magick_ops::config::{self, ToolConfig};
use magick_ops::imaging::{
    self, Colour, Gravity, OutputFormat, Pipeline, Rectangle, StackDirection, StrokeSpec,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "magick-ops")]
#[command(about = "Image transforms backed by the ImageMagick command-line tools")]
#[command(long_about = "\
Image transforms backed by the ImageMagick command-line tools

Every command reads its input files into memory, runs the tool on private
temp copies, and writes the result. Temp files are removed whether the
command succeeds or fails.

Temp root (first available wins):
  [temp] dir in the config file → $TMPDIR → $TMP → $TEMP → /tmp

Run 'magick-ops gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every tool invocation
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Output format flag shared by the transform commands.
#[derive(Args, Clone)]
struct FormatArgs {
    /// Output format: png or jpg (defaults to [output] format from config)
    #[arg(long)]
    format: Option<OutputFormat>,
}

#[derive(Args, Clone)]
struct RegionArgs {
    #[arg(long, allow_negative_numbers = true)]
    x: f64,
    #[arg(long, allow_negative_numbers = true)]
    y: f64,
    #[arg(long)]
    width: f64,
    #[arg(long)]
    height: f64,
}

impl RegionArgs {
    fn rectangle(&self) -> Rectangle {
        Rectangle {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Re-encode an image
    Convert {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Cut a rectangular region out of an image
    Crop {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        region: RegionArgs,
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Resize an image, keeping its aspect ratio
    Resample {
        input: PathBuf,
        output: PathBuf,
        /// Maximum width in pixels
        #[arg(long)]
        width: Option<f64>,
        /// Maximum height in pixels
        #[arg(long)]
        height: Option<f64>,
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Draw a filled, stroked rectangle
    DrawRect {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        region: RegionArgs,
        /// Fill colour as r,g,b[,a]
        #[arg(long, default_value = "0,0,0,0")]
        fill: Colour,
        /// Stroke colour as r,g,b[,a]
        #[arg(long, default_value = "255,0,0")]
        stroke: Colour,
        /// Stroke width in pixels
        #[arg(long, default_value_t = 1.0)]
        stroke_width: f64,
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Append images top to bottom (or left to right with --horizontal)
    Stack {
        output: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long)]
        horizontal: bool,
        /// NorthWest, North, NorthEast, West, Center, East, SouthWest, South, SouthEast
        #[arg(long, default_value = "Center")]
        gravity: Gravity,
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Print image dimensions as WIDTHxHEIGHT
    Size { input: PathBuf },
    /// Print a stock config file with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let tool_config = config::load_config(cli.config.as_deref())?;
    let pipeline = Pipeline::from_config(&tool_config)?;
    let format = |args: &FormatArgs| resolve_format(args, &tool_config);

    match cli.command {
        Command::Convert {
            input,
            output,
            format: f,
        } => {
            let bytes = read(&input).await?;
            let result = imaging::convert(&pipeline, &bytes, format(&f)).await?;
            write(&output, &result).await?;
        }
        Command::Crop {
            input,
            output,
            region,
            format: f,
        } => {
            let bytes = read(&input).await?;
            let result = imaging::crop(&pipeline, &bytes, region.rectangle(), format(&f)).await?;
            write(&output, &result).await?;
        }
        Command::Resample {
            input,
            output,
            width,
            height,
            format: f,
        } => {
            let bytes = read(&input).await?;
            let result = imaging::resample(&pipeline, &bytes, width, height, format(&f)).await?;
            write(&output, &result).await?;
        }
        Command::DrawRect {
            input,
            output,
            region,
            fill,
            stroke,
            stroke_width,
            format: f,
        } => {
            let bytes = read(&input).await?;
            let stroke = StrokeSpec {
                width: stroke_width,
                colour: stroke,
            };
            let result = imaging::draw_rectangle(
                &pipeline,
                &bytes,
                region.rectangle(),
                fill,
                stroke,
                format(&f),
            )
            .await?;
            write(&output, &result).await?;
        }
        Command::Stack {
            output,
            inputs,
            horizontal,
            gravity,
            format: f,
        } => {
            let mut images = Vec::with_capacity(inputs.len());
            for input in &inputs {
                images.push(read(input).await?);
            }
            let images: Vec<&[u8]> = images.iter().map(Vec::as_slice).collect();
            let direction = if horizontal {
                StackDirection::Horizontal
            } else {
                StackDirection::Vertical
            };
            let result =
                imaging::stack(&pipeline, &images, direction, gravity, format(&f)).await?;
            write(&output, &result).await?;
        }
        Command::Size { input } => {
            let bytes = read(&input).await?;
            let size = imaging::image_size(&pipeline, &bytes).await?;
            println!("{size}");
        }
        Command::GenConfig => unreachable!("handled before loading config"),
    }

    Ok(())
}

/// Logs go to stderr so `size` output stays clean on stdout.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_format(args: &FormatArgs, config: &ToolConfig) -> OutputFormat {
    args.format.unwrap_or(config.output.format)
}

async fn read(path: &Path) -> std::io::Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        std::io::Error::new(e.kind(), format!("{}: {e}", path.display()))
    })
}

async fn write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(path, bytes).await.map_err(|e| {
        std::io::Error::new(e.kind(), format!("{}: {e}", path.display()))
    })
}
