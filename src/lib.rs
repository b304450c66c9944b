//! symbolscan locates a small symbol template inside a large scanned map.
//!
//! The target is scanned in half-overlapping windows. Each window is first
//! registered against the template with FAST/BRIEF features and a RANSAC
//! homography, then scored by joint color histogram back-projection; accepted
//! window matches are merged into a deduplicated set of detections.
//! Parallelism over windows is available through the `rayon` feature and file
//! IO plus annotation rendering through `image-io`.

pub mod align;
pub mod annotate;
pub mod consolidate;
pub mod features;
pub mod image;
pub mod lowlevel;
pub mod scan;
pub mod score;
mod trace;
pub mod util;

pub use align::{align_images, AlignConfig, AlignResult, Aligner, FeatureAligner, Homography};
pub use annotate::{annotations, Annotation};
pub use consolidate::{consolidate, Consolidator, Detection};
pub use image::{ColorImage, ImageView};
pub use scan::{run_scan, CancelToken, ScanConfig, ScanOutcome, SymbolScanner};
pub use score::{ColorSpace, ComparisonMethod, Polarity, RegionScorer, ScoreConfig};
pub use util::{SymbolScanError, SymbolScanResult};

#[cfg(feature = "image-io")]
pub use annotate::render_annotations;
