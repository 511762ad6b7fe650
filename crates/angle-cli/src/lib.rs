//! AngleNet command line front end
//!
//! Decodes text line crops from disk, classifies them as one batch and prints
//! one report per image.

use angle_net::{AngleClassifier, AngleError, AngleResult, ClassifierConfig, DirModelLoader};
use clap::{Parser, ValueEnum};
use image::DynamicImage;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "anglenet")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Classify text line crops as upright or rotated 180 degrees", long_about = None)]
pub struct Cli {
    /// Text line crops, classified together as one batch
    #[arg(required = true)]
    pub images: Vec<PathBuf>,

    /// Directory holding the angle model
    #[arg(long = "model-dir", env = "ANGLENET_MODEL_DIR", default_value = "models")]
    pub model_dir: PathBuf,

    /// Classifier configuration file (TOML, JSON or YAML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Inference threads, overrides the configuration file
    #[arg(long)]
    pub threads: Option<usize>,

    /// Skip classification and report every line as unclassified
    #[arg(long = "no-angle")]
    pub no_angle: bool,

    /// Force the batch to its majority orientation
    #[arg(long = "most-angle")]
    pub most_angle: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Pretty,
}

/// CLI error types
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Angle(#[from] AngleError),

    #[error("Failed to read image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

/// One line of output
#[derive(Debug, Serialize)]
pub struct LineReport {
    pub path: String,
    #[serde(flatten)]
    pub result: AngleResult,
    pub degrees: Option<u32>,
}

impl LineReport {
    pub fn new(path: &Path, result: AngleResult) -> Self {
        Self {
            path: path.display().to_string(),
            degrees: result.label.degrees(),
            result,
        }
    }
}

/// Initialize logging to stderr, filtered by `RUST_LOG` (default `info`)
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Run one classification batch as described by `cli`
pub fn run(cli: &Cli) -> Result<(), CliError> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            ClassifierConfig::load(path)?
        }
        None => ClassifierConfig::from_env()?,
    };
    if let Some(threads) = cli.threads {
        config.num_threads = threads;
    }

    let images = load_images(&cli.images, config.channels())?;

    info!("Initializing classifier from {}...", cli.model_dir.display());
    let loader = DirModelLoader::new(&cli.model_dir);
    let mut classifier = AngleClassifier::new(&config, &loader)?;

    let start = Instant::now();
    let results = classifier.classify(&images, !cli.no_angle, cli.most_angle)?;
    info!(
        "Classified {} lines in {:.2}ms",
        results.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    let reports: Vec<LineReport> = cli
        .images
        .iter()
        .zip(results)
        .map(|(path, result)| LineReport::new(path, result))
        .collect();

    println!("{}", render(&reports, cli.format)?);
    Ok(())
}

/// Decode every path and convert it to the layout the model consumes
fn load_images(paths: &[PathBuf], channels: usize) -> Result<Vec<DynamicImage>, CliError> {
    paths
        .iter()
        .map(|path| {
            let image = image::open(path).map_err(|source| CliError::Image {
                path: path.clone(),
                source,
            })?;
            debug!(
                "Loaded {} ({}x{}, {:?})",
                path.display(),
                image.width(),
                image.height(),
                image.color()
            );
            Ok(to_channels(image, channels))
        })
        .collect()
}

/// Convert to 8-bit gray, RGB or RGBA; other channel counts pass through and
/// are rejected by the preprocessor
fn to_channels(image: DynamicImage, channels: usize) -> DynamicImage {
    match channels {
        1 => DynamicImage::ImageLuma8(image.to_luma8()),
        3 => DynamicImage::ImageRgb8(image.to_rgb8()),
        4 => DynamicImage::ImageRgba8(image.to_rgba8()),
        _ => image,
    }
}

/// Render reports in the requested format
pub fn render(reports: &[LineReport], format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(reports)?),
        OutputFormat::Pretty => {
            let mut out = String::from("=== Text Line Orientation ===\n");
            for (idx, report) in reports.iter().enumerate() {
                let angle = report
                    .degrees
                    .map(|d| format!("{}°", d))
                    .unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "[{}] {} -> {} ({:.1}%, {:.2}ms)\n",
                    idx + 1,
                    report.path,
                    angle,
                    report.result.confidence * 100.0,
                    report.result.elapsed.as_secs_f64() * 1000.0
                ));
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use angle_net::{AngleLabel, Preprocessor};
    use image::{GrayImage, Luma, Rgba, RgbaImage};
    use std::time::Duration;
    use tempfile::tempdir;

    fn reports() -> Vec<LineReport> {
        vec![
            LineReport::new(
                Path::new("a.png"),
                AngleResult::new(AngleLabel::Flipped, 0.75, Duration::from_millis(2)),
            ),
            LineReport::new(Path::new("b.png"), AngleResult::unclassified()),
        ]
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "anglenet",
            "--model-dir",
            "m",
            "--most-angle",
            "--threads",
            "2",
            "x.png",
            "y.png",
        ])
        .unwrap();

        assert_eq!(cli.images.len(), 2);
        assert_eq!(cli.model_dir, PathBuf::from("m"));
        assert!(cli.most_angle);
        assert!(!cli.no_angle);
        assert_eq!(cli.threads, Some(2));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_images_required() {
        assert!(Cli::try_parse_from(["anglenet", "--model-dir", "m"]).is_err());
    }

    #[test]
    fn test_render_json() {
        let json = render(&reports(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["path"], "a.png");
        assert_eq!(value[0]["label"], "flipped");
        assert_eq!(value[0]["degrees"], 180);
        assert_eq!(value[1]["label"], "unclassified");
        assert!(value[1]["degrees"].is_null());
    }

    #[test]
    fn test_render_pretty() {
        let text = render(&reports(), OutputFormat::Pretty).unwrap();
        assert!(text.contains("[1] a.png -> 180° (75.0%, 2.00ms)"));
        assert!(text.contains("[2] b.png -> - (0.0%, 0.00ms)"));
    }

    #[test]
    fn test_missing_image_reported_with_path() {
        let err = load_images(&[PathBuf::from("/nonexistent/line.png")], 3).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/line.png"));
    }

    #[test]
    fn test_rgba_and_gray_pngs_match_default_config() {
        let dir = tempdir().unwrap();
        let rgba = dir.path().join("rgba.png");
        let gray = dir.path().join("gray.png");
        RgbaImage::from_pixel(40, 12, Rgba([30, 60, 90, 255]))
            .save(&rgba)
            .unwrap();
        GrayImage::from_pixel(40, 12, Luma([200])).save(&gray).unwrap();

        let config = ClassifierConfig::default();
        let images = load_images(&[rgba, gray], config.channels()).unwrap();
        assert!(images
            .iter()
            .all(|image| matches!(image, DynamicImage::ImageRgb8(_))));

        let pre = Preprocessor::from_config(&config);
        for image in &images {
            let tensor = pre.run(image).unwrap();
            assert_eq!(tensor.shape(), &[1, 3, 32, 192]);
        }
    }

    #[test]
    fn test_single_channel_config_loads_gray() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("line.png");
        RgbaImage::from_pixel(40, 12, Rgba([255, 255, 255, 255]))
            .save(&path)
            .unwrap();

        let images = load_images(&[path], 1).unwrap();
        match &images[0] {
            DynamicImage::ImageLuma8(buf) => assert_eq!(buf.get_pixel(0, 0), &Luma([255])),
            other => panic!("expected 8-bit gray, got {:?}", other.color()),
        }
    }
}
