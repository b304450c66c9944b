//! Feature-based geometric alignment of a template against a region.
//!
//! Alignment extracts keypoints from both images, matches region descriptors
//! against template descriptors (k = 2), filters the matches by a uniqueness
//! vote and a size/orientation vote, and fits a homography mapping template
//! coordinates to region coordinates with RANSAC. A failed alignment is a
//! normal outcome reported through [`AlignResult::success`], not an error.

pub mod homography;
pub(crate) mod ransac;
pub(crate) mod vote;

pub use homography::Homography;

use crate::features::{extract_features, knn_match, FeatureConfig, FeatureSet};
use crate::image::ImageView;
use crate::trace::trace_event;
use crate::util::{SymbolScanError, SymbolScanResult};
use nalgebra::Point2;

/// Default RANSAC seed; any fixed value keeps runs reproducible.
pub const DEFAULT_RANSAC_SEED: u64 = 0x5359_4d42_4f4c;

/// Alignment parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignConfig {
    /// Maximum best-to-second-best distance ratio kept by the uniqueness vote.
    pub uniqueness_threshold: f32,
    /// Minimum surviving matches after each vote stage.
    pub min_inliers: usize,
    /// Scale bin factor of the size/orientation vote (must exceed 1).
    pub scale_tolerance: f32,
    /// Rotation bin width of the size/orientation vote, in degrees.
    pub orientation_tolerance_deg: f32,
    /// Maximum reprojection error of a RANSAC inlier, in pixels.
    pub homography_residual_px: f32,
    /// Number of RANSAC hypotheses.
    pub ransac_iterations: usize,
    /// Seed of the RANSAC sampler.
    pub ransac_seed: u64,
    /// Keypoint detector and descriptor parameters.
    pub features: FeatureConfig,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            uniqueness_threshold: 1.0,
            min_inliers: 10,
            scale_tolerance: 1.5,
            orientation_tolerance_deg: 20.0,
            homography_residual_px: 2.0,
            ransac_iterations: 500,
            ransac_seed: DEFAULT_RANSAC_SEED,
            features: FeatureConfig::default(),
        }
    }
}

impl AlignConfig {
    /// Checks parameter ranges.
    pub fn validate(&self) -> SymbolScanResult<()> {
        if !self.uniqueness_threshold.is_finite() || self.uniqueness_threshold < 0.0 {
            return Err(SymbolScanError::InvalidConfiguration {
                reason: "uniqueness_threshold must be finite and non-negative",
            });
        }
        if self.min_inliers == 0 {
            return Err(SymbolScanError::InvalidConfiguration {
                reason: "min_inliers must be at least 1",
            });
        }
        if !(self.scale_tolerance.is_finite() && self.scale_tolerance > 1.0) {
            return Err(SymbolScanError::InvalidConfiguration {
                reason: "scale_tolerance must be greater than 1",
            });
        }
        if !(self.orientation_tolerance_deg.is_finite() && self.orientation_tolerance_deg > 0.0) {
            return Err(SymbolScanError::InvalidConfiguration {
                reason: "orientation_tolerance_deg must be positive",
            });
        }
        if !(self.homography_residual_px.is_finite() && self.homography_residual_px > 0.0) {
            return Err(SymbolScanError::InvalidConfiguration {
                reason: "homography_residual_px must be positive",
            });
        }
        if self.ransac_iterations == 0 {
            return Err(SymbolScanError::InvalidConfiguration {
                reason: "ransac_iterations must be at least 1",
            });
        }
        self.features.validate()
    }
}

/// Outcome of one alignment attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignResult {
    /// True when a homography was established.
    pub success: bool,
    /// Template-to-region transform, present only on success.
    pub transform: Option<Homography>,
    /// RANSAC inliers on success; survivors of the last vote stage otherwise.
    pub inlier_count: usize,
}

impl AlignResult {
    fn failed(inlier_count: usize) -> Self {
        Self {
            success: false,
            transform: None,
            inlier_count,
        }
    }
}

/// Registers a template against regions.
///
/// `prepare` runs once per scan so per-template work is not repeated for
/// every window.
pub trait Aligner: Sync {
    type Model: Sync;

    /// Precomputes template state. Fails with `NoFeatures` when the template
    /// cannot be aligned against anything.
    fn prepare(&self, template: ImageView<'_, u8>) -> SymbolScanResult<Self::Model>;

    /// Attempts to register the prepared template inside `region`.
    fn align(&self, model: &Self::Model, region: ImageView<'_, u8>)
        -> SymbolScanResult<AlignResult>;
}

/// FAST/BRIEF feature aligner with vote filtering and RANSAC.
#[derive(Clone, Debug)]
pub struct FeatureAligner {
    cfg: AlignConfig,
}

impl FeatureAligner {
    /// Creates an aligner after validating `cfg`.
    pub fn new(cfg: AlignConfig) -> SymbolScanResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the alignment parameters.
    pub fn config(&self) -> &AlignConfig {
        &self.cfg
    }
}

impl Aligner for FeatureAligner {
    type Model = FeatureSet;

    fn prepare(&self, template: ImageView<'_, u8>) -> SymbolScanResult<FeatureSet> {
        let features = extract_features(template, &self.cfg.features)?;
        if features.is_empty() {
            return Err(SymbolScanError::NoFeatures);
        }
        Ok(features)
    }

    fn align(&self, model: &FeatureSet, region: ImageView<'_, u8>) -> SymbolScanResult<AlignResult> {
        let cfg = &self.cfg;
        let observed = extract_features(region, &cfg.features)?;
        if observed.is_empty() {
            return Ok(AlignResult::failed(0));
        }

        let matches = knn_match(observed.descriptors(), model.descriptors());
        let unique = vote::vote_uniqueness(&matches, cfg.uniqueness_threshold);
        if unique.len() < cfg.min_inliers {
            trace_event!("align_rejected", stage = "uniqueness", survivors = unique.len());
            return Ok(AlignResult::failed(unique.len()));
        }

        let consistent = vote::vote_size_orientation(
            &unique,
            model.keypoints(),
            observed.keypoints(),
            cfg.scale_tolerance,
            cfg.orientation_tolerance_deg,
        );
        if consistent.len() < cfg.min_inliers {
            trace_event!("align_rejected", stage = "size_orientation", survivors = consistent.len());
            return Ok(AlignResult::failed(consistent.len()));
        }

        let (src, dst): (Vec<_>, Vec<_>) = consistent
            .iter()
            .map(|m| {
                let t = &model.keypoints()[m.train_idx];
                let r = &observed.keypoints()[m.query_idx];
                (
                    Point2::new(f64::from(t.x), f64::from(t.y)),
                    Point2::new(f64::from(r.x), f64::from(r.y)),
                )
            })
            .unzip();

        match ransac::fit_homography(
            &src,
            &dst,
            cfg.ransac_iterations,
            f64::from(cfg.homography_residual_px),
            cfg.ransac_seed,
        ) {
            Some(fit) => {
                trace_event!("align_accepted", inliers = fit.inliers);
                Ok(AlignResult {
                    success: true,
                    transform: Some(fit.homography),
                    inlier_count: fit.inliers,
                })
            }
            None => Ok(AlignResult::failed(consistent.len())),
        }
    }
}

/// One-shot alignment of `template` against `region`.
pub fn align_images(
    template: ImageView<'_, u8>,
    region: ImageView<'_, u8>,
    cfg: &AlignConfig,
) -> SymbolScanResult<AlignResult> {
    let aligner = FeatureAligner::new(cfg.clone())?;
    let model = aligner.prepare(template)?;
    aligner.align(&model, region)
}
