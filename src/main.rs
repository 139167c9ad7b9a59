use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use glam::dvec2;
use miette::IntoDiagnostic;
use uvtt_convert::config::{DEFAULT_ASPECT_RATIO_TOLERANCE, DEFAULT_PIXELS_PER_GRID};
use uvtt_convert::{ConvertError, ConvertOptions, ScenePredicate, Strategy, convert_str};

/// Convert a scene export into a Universal VTT (.uvtt) document
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Line-delimited JSON container holding the scene (.db or .json)
    input: PathBuf,

    /// Where to write the document; defaults to INPUT with a .uvtt extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// How to derive the pixel to grid transform
    #[arg(long, value_enum, default_value_t = StrategyArg::Declared)]
    strategy: StrategyArg,

    /// Only accept scene records with width, height, grid.size and background.src
    #[arg(long)]
    strict: bool,

    /// Keep the nominal map size even if walls run past it
    #[arg(long)]
    no_expand: bool,

    /// Cell size to use when the scene does not declare one
    #[arg(long, default_value_t = DEFAULT_PIXELS_PER_GRID)]
    pixels_per_grid: f64,

    /// Target image width in pixels (fit strategy; defaults to the scene width)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    image_width: Option<u32>,

    /// Target image height in pixels (fit strategy; defaults to the scene height)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    image_height: Option<u32>,

    /// Relative height error tolerated by the fit before warning
    #[arg(long, default_value_t = DEFAULT_ASPECT_RATIO_TOLERANCE)]
    aspect_tolerance: f64,

    /// Grid units added to every x coordinate after the transform
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    correction_x: f64,

    /// Grid units added to every y coordinate after the transform
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    correction_y: f64,

    /// Also write the conversion summary as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    /// Trust the scene's padding, background and grid shift
    Declared,
    /// Fit the wall bounding box to the target image size
    Fit,
}

impl Args {
    fn options(&self) -> ConvertOptions {
        let strategy = match self.strategy {
            StrategyArg::Declared => Strategy::DeclaredOffset,
            StrategyArg::Fit => Strategy::BoundingBoxFit,
        };
        let predicate = if self.strict {
            ScenePredicate::Strict
        } else {
            ScenePredicate::HasWalls
        };
        ConvertOptions::new()
            .with_strategy(strategy)
            .with_scene_predicate(predicate)
            .with_default_pixels_per_grid(self.pixels_per_grid)
            .with_expand_map_size(!self.no_expand)
            .with_aspect_ratio_tolerance(self.aspect_tolerance)
            .with_target_image_size(self.image_width, self.image_height)
            .with_correction_offset(dvec2(self.correction_x, self.correction_y))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ConvertError + '_ {
    move |source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ConvertError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    fs::write(path, contents).map_err(io_error(path))
}

fn main() -> miette::Result<()> {
    // Logs go to stderr; stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let options = args.options();
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("uvtt"));

    tracing::info!(input = %args.input.display(), strategy = %options.strategy, "converting");

    let text = fs::read_to_string(&args.input).map_err(io_error(&args.input))?;
    let conversion = convert_str(&text, &options)?;

    eprintln!("\n--- transform summary ---");
    eprint!("{}", conversion.summary);
    eprintln!("-------------------------\n");

    let mut json = conversion.document.to_json_pretty()?;
    json.push('\n');
    write_file(&output, &json)?;

    if let Some(path) = &args.summary_json {
        let summary = serde_json::to_string_pretty(&conversion.summary).into_diagnostic()?;
        write_file(path, &summary)?;
    }

    tracing::info!(output = %output.display(), "conversion complete");
    Ok(())
}
