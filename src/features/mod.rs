//! Local feature extraction: FAST-9 keypoints with rotated BRIEF descriptors.
//!
//! Keypoints are detected on every octave of a 2x box pyramid and reported in
//! base-level coordinates. A keypoint's `size` grows with its octave, which is
//! what the alignment scale vote compares.

pub mod brief;
pub(crate) mod fast;
pub mod matching;

pub use brief::{hamming, Descriptor};
pub use matching::{knn_match, KnnMatch};

use crate::image::pyramid::ImagePyramid;
use crate::image::ImageView;
use crate::trace::trace_event;
use crate::util::{SymbolScanError, SymbolScanResult};
use std::cmp::Ordering;

/// Keypoint detector and descriptor parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureConfig {
    /// FAST intensity threshold.
    pub fast_threshold: u8,
    /// Maximum keypoints kept per image (strongest responses first).
    pub max_keypoints: usize,
    /// Number of pyramid octaves searched for keypoints.
    pub octaves: usize,
    /// Diameter of the descriptor and orientation patch in pixels.
    pub patch_size: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            fast_threshold: 20,
            max_keypoints: 500,
            octaves: 2,
            patch_size: 15,
        }
    }
}

impl FeatureConfig {
    /// Checks parameter ranges.
    pub fn validate(&self) -> SymbolScanResult<()> {
        if self.max_keypoints == 0 {
            return Err(SymbolScanError::InvalidConfiguration {
                reason: "max_keypoints must be at least 1",
            });
        }
        if self.octaves == 0 {
            return Err(SymbolScanError::InvalidConfiguration {
                reason: "octaves must be at least 1",
            });
        }
        if self.patch_size < 7 {
            return Err(SymbolScanError::InvalidConfiguration {
                reason: "patch_size must be at least 7",
            });
        }
        Ok(())
    }

    fn radius(&self) -> usize {
        self.patch_size / 2
    }

    /// Distance from the level edge inside which no keypoint is reported.
    ///
    /// Covers the descriptor disc plus the blur footprint around its rim.
    fn border(&self) -> usize {
        (self.radius() + 2).max(3)
    }
}

/// Oriented keypoint in base-level image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keypoint {
    /// X coordinate (column).
    pub x: f32,
    /// Y coordinate (row).
    pub y: f32,
    /// Support diameter in base-level pixels.
    pub size: f32,
    /// Orientation in degrees, `[0, 360)`.
    pub angle_deg: f32,
    /// FAST response.
    pub response: f32,
    /// Pyramid octave the keypoint was detected on.
    pub octave: usize,
}

/// Keypoints with their descriptors (index-aligned).
#[derive(Clone, Debug, Default)]
pub struct FeatureSet {
    keypoints: Vec<Keypoint>,
    descriptors: Vec<Descriptor>,
}

impl FeatureSet {
    /// Returns the keypoints.
    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    /// Returns the descriptors, index-aligned with `keypoints`.
    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    /// Returns the number of features.
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    /// Returns true when no keypoint was found.
    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

fn keypoint_cmp_desc(a: &(Keypoint, Descriptor), b: &(Keypoint, Descriptor)) -> Ordering {
    b.0.response
        .total_cmp(&a.0.response)
        .then_with(|| a.0.octave.cmp(&b.0.octave))
        .then_with(|| a.0.y.total_cmp(&b.0.y))
        .then_with(|| a.0.x.total_cmp(&b.0.x))
}

/// Detects and describes keypoints on a grayscale image.
///
/// An image too small for the detector border yields an empty set, not an
/// error.
pub fn extract_features(
    image: ImageView<'_, u8>,
    cfg: &FeatureConfig,
) -> SymbolScanResult<FeatureSet> {
    let radius = cfg.radius();
    let border = cfg.border();
    let pyramid = ImagePyramid::build_u8(image, cfg.octaves, 2 * border + 1)?;

    let mut found: Vec<(Keypoint, Descriptor)> = Vec::new();
    for (octave, level) in pyramid.levels().iter().enumerate() {
        let view = level.view();
        let corners = fast::detect_fast9(view, cfg.fast_threshold, border);
        if corners.is_empty() {
            continue;
        }
        let smoothed = brief::box_blur_3x3(view);
        let scale = (1usize << octave) as f32;
        for corner in corners {
            let angle_deg = fast::centroid_orientation(view, corner.x, corner.y, radius);
            let descriptor = brief::describe(smoothed.view(), corner.x, corner.y, radius, angle_deg);
            let keypoint = Keypoint {
                x: (corner.x as f32 + 0.5) * scale - 0.5,
                y: (corner.y as f32 + 0.5) * scale - 0.5,
                size: cfg.patch_size as f32 * scale,
                angle_deg,
                response: corner.response,
                octave,
            };
            found.push((keypoint, descriptor));
        }
    }

    found.sort_by(keypoint_cmp_desc);
    found.truncate(cfg.max_keypoints);
    trace_event!("features_extracted", count = found.len());

    let (keypoints, descriptors) = found.into_iter().unzip();
    Ok(FeatureSet {
        keypoints,
        descriptors,
    })
}

#[cfg(test)]
mod tests {
    use super::{extract_features, FeatureConfig};
    use crate::image::ImageView;

    fn cell_value(cx: usize, cy: usize) -> u8 {
        let h = (cx as u32).wrapping_mul(0x9E37_79B1) ^ (cy as u32).wrapping_mul(0x85EB_CA77);
        let h = (h ^ (h >> 15)).wrapping_mul(0x2C1B_3C6D);
        let h = h ^ (h >> 12);
        40 + (h % 200) as u8
    }

    fn checkerboard(width: usize, height: usize, cell: usize) -> Vec<u8> {
        (0..width * height)
            .map(|i| cell_value((i % width) / cell, (i / width) / cell))
            .collect()
    }

    #[test]
    fn textured_image_has_features_and_flat_image_has_none() {
        let cfg = FeatureConfig::default();
        let data = checkerboard(64, 64, 6);
        let view = ImageView::from_slice(&data, 64, 64).unwrap();
        let set = extract_features(view, &cfg).unwrap();
        assert!(set.len() > 10);
        assert_eq!(set.keypoints().len(), set.descriptors().len());
        assert!(set
            .keypoints()
            .windows(2)
            .all(|w| w[0].response >= w[1].response));

        let flat = vec![128u8; 64 * 64];
        let view = ImageView::from_slice(&flat, 64, 64).unwrap();
        assert!(extract_features(view, &cfg).unwrap().is_empty());
    }

    #[test]
    fn max_keypoints_caps_output() {
        let cfg = FeatureConfig {
            max_keypoints: 5,
            ..FeatureConfig::default()
        };
        let data = checkerboard(64, 64, 6);
        let view = ImageView::from_slice(&data, 64, 64).unwrap();
        assert_eq!(extract_features(view, &cfg).unwrap().len(), 5);
    }

    #[test]
    fn validate_rejects_small_patch() {
        let cfg = FeatureConfig {
            patch_size: 5,
            ..FeatureConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
