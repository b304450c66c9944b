//! Error types for symbolscan.

use thiserror::Error;

/// Result alias for symbolscan operations.
pub type SymbolScanResult<T> = std::result::Result<T, SymbolScanError>;

/// Errors that can occur while preparing or running a symbol scan.
///
/// Per-window outcomes (a failed alignment, a sub-threshold score) are not
/// errors; only template-level and configuration-level failures abort a run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SymbolScanError {
    /// Width or height is zero or overflows the addressable range.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("stride {stride} is smaller than width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the declared layout requires.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Requested region of interest leaves the image.
    #[error("roi ({x}, {y}, {width}x{height}) out of bounds for {img_width}x{img_height} image")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// The template yields no detectable keypoints.
    #[error("template has no detectable keypoints")]
    NoFeatures,
    /// The scored region is smaller than the template on some axis.
    #[error(
        "region {region_width}x{region_height} is smaller than template {template_width}x{template_height}"
    )]
    RegionTooSmall {
        region_width: usize,
        region_height: usize,
        template_width: usize,
        template_height: usize,
    },
    /// A configuration parameter is out of range.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: &'static str },
    /// The scan was aborted through its cancellation token.
    #[error("scan cancelled")]
    Cancelled,
    /// Image decoding, encoding, or file access failed.
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}
