//! Interleaved RGB images and per-pixel color conversions.

use crate::image::OwnedImage;
use crate::util::{SymbolScanError, SymbolScanResult};

/// Owned interleaved RGB8 image (`[r, g, b]` per pixel, row-major).
#[derive(Clone, Debug, PartialEq)]
pub struct ColorImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl ColorImage {
    /// Creates a color image from an interleaved RGB8 buffer.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> SymbolScanResult<Self> {
        if width == 0 || height == 0 {
            return Err(SymbolScanError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(3))
            .ok_or(SymbolScanError::InvalidDimensions { width, height })?;
        if data.len() != needed {
            return Err(SymbolScanError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Replicates a gray image into all three channels.
    pub fn from_gray(gray: &OwnedImage) -> Self {
        let mut data = Vec::with_capacity(gray.data().len() * 3);
        for &v in gray.data() {
            data.extend_from_slice(&[v, v, v]);
        }
        Self {
            data,
            width: gray.width(),
            height: gray.height(),
        }
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the interleaved RGB8 buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the `[r, g, b]` triple at `(x, y)` if it is within bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 3;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Converts to a single-channel intensity image.
    pub fn to_gray(&self) -> OwnedImage {
        self.map_channel(|[r, g, b]| luma(r, g, b))
    }

    /// Builds a single plane by applying `f` to every pixel.
    pub(crate) fn map_channel(&self, f: impl Fn([u8; 3]) -> u8) -> OwnedImage {
        let data: Vec<u8> = self
            .data
            .chunks_exact(3)
            .map(|px| f([px[0], px[1], px[2]]))
            .collect();
        OwnedImage::new(data, self.width, self.height)
            .expect("plane matches validated color dimensions")
    }
}

/// Intensity with the ITU-R BT.601 weights, rounded to nearest.
pub(crate) fn luma(r: u8, g: u8, b: u8) -> u8 {
    // Fixed point with 14 fractional bits: 0.299, 0.587, 0.114.
    let v = 4899 * u32::from(r) + 9617 * u32::from(g) + 1868 * u32::from(b);
    ((v + (1 << 13)) >> 14).min(255) as u8
}

/// Converts RGB to 8-bit HSV with hue in `0..180` and S, V in `0..=255`.
pub(crate) fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let rf = f32::from(r);
    let gf = f32::from(g);
    let bf = f32::from(b);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };
    let mut h = if delta <= 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    let h8 = ((h / 2.0).round() as u32 % 180) as u8;
    [h8, s.round().min(255.0) as u8, v as u8]
}

#[cfg(test)]
mod tests {
    use super::{luma, rgb_to_hsv};

    #[test]
    fn luma_matches_reference_weights() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn hsv_primary_hues() {
        assert_eq!(rgb_to_hsv(255, 0, 0), [0, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 255, 0), [60, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 0, 255), [120, 255, 255]);
        assert_eq!(rgb_to_hsv(40, 40, 40), [0, 0, 40]);
    }
}
