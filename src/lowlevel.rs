//! Low-level building blocks for custom scanning pipelines.
//!
//! These re-exports cover keypoint extraction, descriptor matching, the
//! homography solver, histogram layouts and score maps, window geometry and
//! the merge primitives. Most users should prefer [`crate::run_scan`] or
//! [`crate::SymbolScanner`].

pub use crate::align::Homography;
pub use crate::consolidate::{is_close, sort_detections};
pub use crate::features::{
    extract_features, hamming, knn_match, Descriptor, FeatureConfig, FeatureSet, Keypoint,
    KnnMatch,
};
pub use crate::image::pyramid::ImagePyramid;
pub use crate::image::OwnedImage;
pub use crate::scan::{accepts, ScanGrid, Window, WindowReport};
pub use crate::score::{best_match, BinLayout, ChannelRange, RegionMatch, ScoreMap, TemplateReference};
