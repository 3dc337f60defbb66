//! AREA converter.
//!
//! Reads a McIDAS AREA file and writes calibrated samples, optional
//! per-pixel latitude/longitude and a JSON metadata sidecar.

mod sink;

use std::path::PathBuf;

use anyhow::{Context, Result};
use area_common::CalibrationType;
use clap::Parser;
use conversion::{ConversionConfig, ConversionPipeline, LogFormat, PipelineContext};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use sink::FlatFileSink;

#[derive(Parser, Debug)]
#[command(name = "area-converter")]
#[command(about = "Convert McIDAS AREA images to calibrated, navigated flat files")]
struct Args {
    /// Input AREA file
    input: PathBuf,

    /// Output base name (default: the input name). Files get .img, .lat,
    /// .lon and .json suffixes.
    output: Option<PathBuf>,

    /// Output calibration type: RAD, TEMP, BRIT, ALB or RAW
    #[arg(long = "cal", value_name = "TYPE")]
    cal: Option<CalibrationType>,

    /// Do not write latitude/longitude
    #[arg(long)]
    no_latlon: bool,

    /// Use CF-convention attributes
    #[arg(long)]
    cf: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Configuration file
    #[arg(short, long, env = "AREA_CONFIG")]
    config: Option<PathBuf>,

    /// Calibration coefficient library (YAML)
    #[arg(long)]
    coefficients: Option<PathBuf>,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    /// Command-line flags take precedence over file and environment.
    fn apply(&self, config: &mut ConversionConfig) {
        if let Some(cal) = self.cal {
            config.cal_type = cal;
        }
        if self.no_latlon {
            config.include_navigation = false;
        }
        if self.cf {
            config.cf = true;
        }
        if let Some(path) = &self.coefficients {
            config.coefficients = Some(path.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.quiet {
            config.logging.level = "warn".to_string();
        }
    }
}

fn init_tracing(config: &ConversionConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn load_config(args: &Args) -> Result<ConversionConfig> {
    let mut config = match &args.config {
        Some(path) => ConversionConfig::from_yaml_file(path)?,
        None => ConversionConfig::default(),
    };
    config.apply_env()?;
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = load_config(&args)?;
    init_tracing(&config);

    let output = args.output.clone().unwrap_or_else(|| args.input.clone());
    info!(
        input = %args.input.display(),
        output = %output.display(),
        cal_type = %config.cal_type,
        navigation = config.include_navigation,
        "Starting conversion"
    );

    let context = PipelineContext::from_config(&config)
        .context("Failed to load calibration coefficients")?;
    let image = area_reader::open_area(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;

    let mut pipeline = ConversionPipeline::open_image(image, &context)?;
    let mut sink = FlatFileSink::new(&output);
    let summary = pipeline
        .run(&mut sink, config.cal_type, config.include_navigation)
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;

    for warning in &summary.warnings {
        warn!(%warning, "Conversion warning");
    }
    info!(
        lines = summary.lines,
        bands = ?summary.bands,
        projection = summary.projection.as_ref().map(|p| p.proj_name),
        output = %sink.path("img").display(),
        "Done"
    );

    Ok(())
}
