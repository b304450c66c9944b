//! Convenience helpers for loading and saving images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::ColorImage;
use crate::util::{SymbolScanError, SymbolScanResult};
use std::path::Path;

/// Creates an owned color image from an RGB image buffer.
pub fn color_from_rgb_image(img: &image::RgbImage) -> SymbolScanResult<ColorImage> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    ColorImage::new(img.as_raw().clone(), width, height)
}

/// Creates an owned color image from a dynamic image of any pixel format.
pub fn color_from_dynamic_image(img: &image::DynamicImage) -> SymbolScanResult<ColorImage> {
    color_from_rgb_image(&img.to_rgb8())
}

/// Converts a color image back into an `image` RGB buffer.
pub fn rgb_image_from_color(img: &ColorImage) -> SymbolScanResult<image::RgbImage> {
    let width = u32::try_from(img.width()).map_err(|_| SymbolScanError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    let height = u32::try_from(img.height()).map_err(|_| SymbolScanError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    image::RgbImage::from_raw(width, height, img.data().to_vec()).ok_or(
        SymbolScanError::BufferTooSmall {
            needed: img.width() * img.height() * 3,
            got: img.data().len(),
        },
    )
}

/// Loads an image from disk as an RGB color image.
pub fn load_color_image<P: AsRef<Path>>(path: P) -> SymbolScanResult<ColorImage> {
    let img = image::open(path).map_err(|err| SymbolScanError::ImageIo {
        reason: err.to_string(),
    })?;
    color_from_dynamic_image(&img)
}

/// Saves an RGB buffer to disk; the format follows the file extension.
pub fn save_rgb_image<P: AsRef<Path>>(img: &image::RgbImage, path: P) -> SymbolScanResult<()> {
    img.save(path).map_err(|err| SymbolScanError::ImageIo {
        reason: err.to_string(),
    })
}
