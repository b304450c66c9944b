use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use symbolscan::annotate::DEFAULT_THICKNESS;
use symbolscan::features::FeatureConfig;
use symbolscan::image::io::{load_color_image, save_rgb_image};
use symbolscan::{
    annotations, render_annotations, AlignConfig, ColorSpace, ComparisonMethod, Detection,
    ScanConfig, ScoreConfig, SymbolScanner,
};
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Locate a map symbol in a scanned map (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ColorSpaceConfig {
    Gray,
    Red,
    Rgb,
    Hue,
    HueSaturation,
    Hsv,
}

impl From<ColorSpaceConfig> for ColorSpace {
    fn from(value: ColorSpaceConfig) -> Self {
        match value {
            ColorSpaceConfig::Gray => ColorSpace::Gray,
            ColorSpaceConfig::Red => ColorSpace::Red,
            ColorSpaceConfig::Rgb => ColorSpace::Rgb,
            ColorSpaceConfig::Hue => ColorSpace::Hue,
            ColorSpaceConfig::HueSaturation => ColorSpace::HueSaturation,
            ColorSpaceConfig::Hsv => ColorSpace::Hsv,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MethodConfig {
    Correlation,
    ChiSquare,
    Intersection,
    Bhattacharyya,
}

impl From<MethodConfig> for ComparisonMethod {
    fn from(value: MethodConfig) -> Self {
        match value {
            MethodConfig::Correlation => ComparisonMethod::Correlation,
            MethodConfig::ChiSquare => ComparisonMethod::ChiSquare,
            MethodConfig::Intersection => ComparisonMethod::Intersection,
            MethodConfig::Bhattacharyya => ComparisonMethod::Bhattacharyya,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct AlignConfigJson {
    uniqueness_threshold: f32,
    min_inliers: usize,
    scale_tolerance: f32,
    orientation_tolerance_deg: f32,
    homography_residual_px: f32,
    ransac_iterations: usize,
    ransac_seed: u64,
    fast_threshold: u8,
    max_keypoints: usize,
    octaves: usize,
    patch_size: usize,
}

impl Default for AlignConfigJson {
    fn default() -> Self {
        let cfg = AlignConfig::default();
        Self {
            uniqueness_threshold: cfg.uniqueness_threshold,
            min_inliers: cfg.min_inliers,
            scale_tolerance: cfg.scale_tolerance,
            orientation_tolerance_deg: cfg.orientation_tolerance_deg,
            homography_residual_px: cfg.homography_residual_px,
            ransac_iterations: cfg.ransac_iterations,
            ransac_seed: cfg.ransac_seed,
            fast_threshold: cfg.features.fast_threshold,
            max_keypoints: cfg.features.max_keypoints,
            octaves: cfg.features.octaves,
            patch_size: cfg.features.patch_size,
        }
    }
}

impl From<AlignConfigJson> for AlignConfig {
    fn from(value: AlignConfigJson) -> Self {
        Self {
            uniqueness_threshold: value.uniqueness_threshold,
            min_inliers: value.min_inliers,
            scale_tolerance: value.scale_tolerance,
            orientation_tolerance_deg: value.orientation_tolerance_deg,
            homography_residual_px: value.homography_residual_px,
            ransac_iterations: value.ransac_iterations,
            ransac_seed: value.ransac_seed,
            features: FeatureConfig {
                fast_threshold: value.fast_threshold,
                max_keypoints: value.max_keypoints,
                octaves: value.octaves,
                patch_size: value.patch_size,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ScanConfigJson {
    window_size_factor: usize,
    score_accept_threshold: f32,
    color_space: ColorSpaceConfig,
    method: MethodConfig,
    bins_per_channel: Option<usize>,
    cluster_width: Option<usize>,
    cluster_height: Option<usize>,
    require_alignment: bool,
    parallel: bool,
    max_consolidation_passes: Option<usize>,
    align: AlignConfigJson,
}

impl Default for ScanConfigJson {
    fn default() -> Self {
        let cfg = ScanConfig::default();
        Self {
            window_size_factor: cfg.window_size_factor,
            score_accept_threshold: cfg.score_accept_threshold,
            color_space: ColorSpaceConfig::Gray,
            method: MethodConfig::Correlation,
            bins_per_channel: cfg.score.bins_per_channel,
            cluster_width: cfg.cluster_width,
            cluster_height: cfg.cluster_height,
            require_alignment: cfg.require_alignment,
            parallel: cfg.parallel,
            max_consolidation_passes: cfg.max_consolidation_passes,
            align: AlignConfigJson::default(),
        }
    }
}

impl From<ScanConfigJson> for ScanConfig {
    fn from(value: ScanConfigJson) -> Self {
        Self {
            window_size_factor: value.window_size_factor,
            align: value.align.into(),
            score: ScoreConfig {
                color_space: value.color_space.into(),
                method: value.method.into(),
                bins_per_channel: value.bins_per_channel,
            },
            score_accept_threshold: value.score_accept_threshold,
            cluster_width: value.cluster_width,
            cluster_height: value.cluster_height,
            require_alignment: value.require_alignment,
            parallel: value.parallel,
            max_consolidation_passes: value.max_consolidation_passes,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    template_path: String,
    target_path: String,
    output_path: Option<String>,
    annotated_path: Option<String>,
    scan: ScanConfigJson,
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    x: usize,
    y: usize,
    score: f32,
}

impl From<&Detection> for DetectionRecord {
    fn from(value: &Detection) -> Self {
        Self {
            x: value.x,
            y: value.y,
            score: value.score,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    detections: Vec<DetectionRecord>,
    raw_count: usize,
    windows_scanned: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("symbolscan=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.template_path.is_empty() || config.target_path.is_empty() {
        return Err("template_path and target_path must be set in the config".into());
    }

    let template = load_color_image(&config.template_path)?;
    let target = load_color_image(&config.target_path)?;
    let scanner = SymbolScanner::new(config.scan.into())?;
    let outcome = scanner.scan(&template, &target)?;
    tracing::info!(
        detections = outcome.detections.len(),
        raw = outcome.raw_detections.len(),
        windows = outcome.windows_scanned,
        "scan finished"
    );

    if let Some(path) = &config.annotated_path {
        let rects = annotations(&outcome.detections, template.width(), template.height());
        let rendered = render_annotations(&target, &rects, DEFAULT_THICKNESS)?;
        save_rgb_image(&rendered, path)?;
    }

    let output = Output {
        detections: outcome.detections.iter().map(DetectionRecord::from).collect(),
        raw_count: outcome.raw_detections.len(),
        windows_scanned: outcome.windows_scanned,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
