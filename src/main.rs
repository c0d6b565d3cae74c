use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use asciify::config::Config;
use asciify::encode::ImageSequenceSink;
use asciify::pipeline::{Options, Pipeline, Progress};
use asciify::render::DEFAULT_RAMP;
use asciify::source::ImageSequenceSource;

/// Parse and validate output geometry (WIDTHxHEIGHT format)
fn parse_geometry(s: &str) -> Result<(u32, u32), String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid geometry format '{}'. Use WIDTHxHEIGHT (e.g., 1280x720)",
            s
        ));
    }
    let width: u32 = parts[0]
        .parse()
        .map_err(|_| format!("Invalid width '{}' in geometry", parts[0]))?;
    let height: u32 = parts[1]
        .parse()
        .map_err(|_| format!("Invalid height '{}' in geometry", parts[1]))?;
    if width == 0 || height == 0 {
        return Err("Geometry width and height must be greater than 0".to_string());
    }
    if width > 16384 || height > 16384 {
        return Err("Geometry exceeds maximum supported (16384x16384)".to_string());
    }
    Ok((width, height))
}

/// Parse and validate color level count (2-256)
fn parse_color_levels(s: &str) -> Result<u32, String> {
    let levels: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid color level count", s))?;
    if !(2..=256).contains(&levels) {
        return Err(format!(
            "Color levels must be between 2 and 256, got {}",
            levels
        ));
    }
    Ok(levels)
}

/// Parse and validate glyph cell size (1-256 pixels)
fn parse_cell_size(s: &str) -> Result<u32, String> {
    let size: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid cell size", s))?;
    if !(1..=256).contains(&size) {
        return Err(format!(
            "Cell size must be between 1 and 256 pixels, got {}",
            size
        ));
    }
    Ok(size)
}

/// Parse and validate output framerate
fn parse_fps(s: &str) -> Result<f64, String> {
    let fps: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid framerate", s))?;
    if !fps.is_finite() || fps <= 0.0 || fps > 240.0 {
        return Err(format!("Framerate must be between 0 and 240 fps, got {}", s));
    }
    Ok(fps)
}

/// asciify: Convert images and frame sequences to ASCII art
#[derive(Parser)]
#[command(name = "asciify")]
#[command(version, about = "Convert images and frame sequences to ASCII art")]
#[command(after_help = "EXAMPLES:
    # Convert a photo, writing photo_ascii.jpg next to it
    asciify image photo.jpg

    # More color fidelity, finer glyph grid
    asciify image photo.jpg --color-levels 64 --cell-size 8 -o out.png

    # Fixed output resolution regardless of the source
    asciify image photo.jpg --geometry 1280x720

    # Convert extracted video frames (frames/*.png) to ASCII frames
    asciify video frames/ -o frames_ascii --fps 24

Settings not given on the command line come from ~/.config/asciify/config.toml.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Rendering settings shared by both subcommands.
#[derive(Args)]
struct RenderArgs {
    /// Number of color levels per channel (2-256)
    #[arg(long, value_parser = parse_color_levels)]
    color_levels: Option<u32>,

    /// Glyph cell size in pixels; also the sampling stride
    #[arg(long, value_parser = parse_cell_size)]
    cell_size: Option<u32>,

    /// Output resolution (WIDTHxHEIGHT, e.g. 1280x720); defaults to the source resolution
    #[arg(long, value_parser = parse_geometry)]
    geometry: Option<(u32, u32)>,

    /// Character ramp, ordered from emptiest to densest
    #[arg(long)]
    charset: Option<String>,

    /// Font file to render glyphs with (defaults to a system monospace font)
    #[arg(long)]
    font: Option<PathBuf>,

    /// Custom config file path (default: ~/.config/asciify/config.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a still image to ASCII art
    Image {
        /// Input image path
        input: PathBuf,

        /// Output image path (defaults to <input>_ascii.<ext>)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Convert a directory of video frames to ASCII art frames
    Video {
        /// Directory of numbered frame images
        input: PathBuf,

        /// Output directory for converted frames (defaults to <input>_ascii)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// File format for the converted frames
        #[arg(long, default_value = "png")]
        format: String,

        /// Output framerate hint (defaults to the source's, then 30)
        #[arg(long, value_parser = parse_fps)]
        fps: Option<f64>,

        #[command(flatten)]
        render: RenderArgs,
    },
}

/// Merge settings: CLI args > config file > built-in defaults
fn build_options(args: &RenderArgs, fps: Option<f64>) -> Result<Options, String> {
    // An explicit --config must load; the default path may be absent or
    // broken, in which case we warn and continue with defaults.
    let cfg = if let Some(ref path) = args.config {
        Config::load(Some(path)).map_err(|e| e.to_string())?
    } else {
        match Config::load(None) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Warning: Failed to load config file: {}", e);
                eprintln!("Using default settings.\n");
                Config::default()
            }
        }
    };

    let geometry = match args.geometry {
        Some(g) => Some(g),
        None => cfg
            .output
            .geometry
            .as_deref()
            .map(parse_geometry)
            .transpose()?,
    };

    Ok(Options {
        ramp: args
            .charset
            .clone()
            .or(cfg.render.charset)
            .unwrap_or_else(|| DEFAULT_RAMP.to_string()),
        color_levels: args.color_levels.or(cfg.render.color_levels).unwrap_or(32),
        cell_size: args.cell_size.or(cfg.render.cell_size).unwrap_or(12),
        geometry,
        fps: fps.or(cfg.output.fps),
        font: args.font.clone().or(cfg.render.font),
    })
}

/// Default image output path: `photo.jpg` becomes `photo_ascii.jpg`,
/// extensions we don't encode to fall back to jpg.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let ext = match input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "png",
        Some("jpg") => "jpg",
        Some("jpeg") => "jpeg",
        _ => "jpg",
    };
    input.with_file_name(format!("{}_ascii.{}", stem, ext))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn run_image(input: PathBuf, output: Option<PathBuf>, render: RenderArgs) -> Result<(), String> {
    let options = build_options(&render, None)?;
    let output = output.unwrap_or_else(|| default_output_path(&input));

    let mut pipeline = Pipeline::new(&options).map_err(|e| e.to_string())?;
    pipeline
        .convert_image(&input, &output)
        .map_err(|e| e.to_string())?;

    print!("\r{} - 100% | 1/1", display_name(&input));
    std::io::stdout().flush().ok();
    println!("\nImage conversion complete!");
    Ok(())
}

fn run_video(
    input: PathBuf,
    output: Option<PathBuf>,
    format: String,
    fps: Option<f64>,
    render: RenderArgs,
) -> Result<(), String> {
    let options = build_options(&render, fps)?;
    let output = output.unwrap_or_else(|| {
        let name = display_name(&input);
        input.with_file_name(format!("{}_ascii", name.trim_end_matches('/')))
    });

    let mut source = ImageSequenceSource::open(&input, None).map_err(|e| e.to_string())?;
    let mut sink = ImageSequenceSink::create(&output, &format).map_err(|e| e.to_string())?;
    let mut pipeline = Pipeline::new(&options).map_err(|e| e.to_string())?;

    let name = display_name(&input);
    let mut report = |p: Progress| {
        match p.frames_total {
            Some(total) if total > 0 => {
                let pct = p.frames_done as f64 / total as f64 * 100.0;
                print!("\r{} - {:.2}% | {}/{}", name, pct, p.frames_done, total);
            }
            _ => print!("\r{} - {} frames", name, p.frames_done),
        }
        std::io::stdout().flush().ok();
    };

    pipeline
        .convert_frames(&mut source, &mut sink, &mut report)
        .map_err(|e| e.to_string())?;

    println!("\nVideo conversion complete!");
    Ok(())
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Image {
            input,
            output,
            render,
        } => run_image(input, output, render),
        Commands::Video {
            input,
            output,
            format,
            fps,
            render,
        } => run_video(input, output, format, fps, render),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
