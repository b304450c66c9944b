//! Image pyramid construction for grayscale `u8` images.
//!
//! Downsampling uses a 2x2 box filter with integer rounding:
//! `dst = ((a + b + c + d) + 2) / 4`. Keypoint octaves are detected on these
//! levels, so a keypoint found on level `k` has a support size `2^k` times
//! the base patch size.

use crate::image::{ImageView, OwnedImage};
use crate::util::SymbolScanResult;

/// Owned image pyramid built from a base level.
pub struct ImagePyramid {
    levels: Vec<OwnedImage>,
}

impl ImagePyramid {
    /// Builds a pyramid from a base grayscale view.
    ///
    /// `max_levels` is clamped to at least 1 so the base level is always
    /// present. Building stops early once a level would drop below
    /// `min_side` pixels on either axis.
    pub fn build_u8(
        base: ImageView<'_, u8>,
        max_levels: usize,
        min_side: usize,
    ) -> SymbolScanResult<Self> {
        let max_levels = max_levels.max(1);
        let mut levels = vec![base.to_owned_image()];

        while levels.len() < max_levels {
            let Some(prev) = levels.last() else {
                break;
            };
            let src = prev.view();
            let dst_width = src.width() / 2;
            let dst_height = src.height() / 2;
            if dst_width < min_side.max(1) || dst_height < min_side.max(1) {
                break;
            }

            let mut dst = vec![0u8; dst_width * dst_height];
            let data = src.as_slice();
            let stride = src.stride();
            for y in 0..dst_height {
                let row0 = &data[(2 * y) * stride..];
                let row1 = &data[(2 * y + 1) * stride..];
                for x in 0..dst_width {
                    let a = row0[2 * x];
                    let b = row0[2 * x + 1];
                    let c = row1[2 * x];
                    let d = row1[2 * x + 1];
                    let sum = u16::from(a) + u16::from(b) + u16::from(c) + u16::from(d);
                    dst[y * dst_width + x] = ((sum + 2) / 4) as u8;
                }
            }

            levels.push(OwnedImage::new(dst, dst_width, dst_height)?);
        }

        Ok(Self { levels })
    }

    /// Returns all pyramid levels (level 0 is the base resolution).
    pub fn levels(&self) -> &[OwnedImage] {
        &self.levels
    }

    /// Returns a view for a specific pyramid level.
    pub fn level(&self, index: usize) -> Option<ImageView<'_, u8>> {
        self.levels.get(index).map(|level| level.view())
    }
}
