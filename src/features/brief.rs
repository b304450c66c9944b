//! Rotated BRIEF binary descriptors.
//!
//! The sampling pattern is 256 point pairs drawn once from a seeded RNG inside
//! the unit disc. At description time the pattern is scaled by the patch
//! radius and rotated by the keypoint orientation, so rotated samples never
//! leave the disc the detector border reserves.

use crate::image::{ImageView, OwnedImage};
use crate::util::math::sin_cos_deg;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::OnceLock;

/// 256-bit binary descriptor.
pub type Descriptor = [u8; 32];

const PATTERN_SEED: u64 = 0x5EED_B41E_F0B5_2010;
const PAIRS: usize = 256;

fn pattern() -> &'static [[f32; 4]] {
    static PATTERN: OnceLock<Vec<[f32; 4]>> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let mut rng = StdRng::seed_from_u64(PATTERN_SEED);
        let mut sample = move || loop {
            let x = rng.random_range(-1.0f32..=1.0);
            let y = rng.random_range(-1.0f32..=1.0);
            if x * x + y * y <= 1.0 {
                return (x, y);
            }
        };
        (0..PAIRS)
            .map(|_| {
                let (x1, y1) = sample();
                let (x2, y2) = sample();
                [x1, y1, x2, y2]
            })
            .collect()
    })
}

/// Computes the descriptor of the keypoint at level coordinates `(x, y)`.
///
/// `image` should be the smoothed level; the disc of radius `radius` around
/// `(x, y)` must lie inside it.
pub(crate) fn describe(
    image: ImageView<'_, u8>,
    x: usize,
    y: usize,
    radius: usize,
    angle_deg: f32,
) -> Descriptor {
    let (sin_a, cos_a) = sin_cos_deg(angle_deg);
    let r = radius as f32;
    let max_x = image.width() as isize - 1;
    let max_y = image.height() as isize - 1;
    let sample = |ux: f32, uy: f32| -> u8 {
        let rx = (cos_a * ux - sin_a * uy) * r;
        let ry = (sin_a * ux + cos_a * uy) * r;
        let px = (x as isize + rx.round() as isize).clamp(0, max_x) as usize;
        let py = (y as isize + ry.round() as isize).clamp(0, max_y) as usize;
        image.get(px, py).copied().unwrap_or(0)
    };

    let mut descriptor = [0u8; 32];
    for (bit, p) in pattern().iter().enumerate() {
        if sample(p[0], p[1]) < sample(p[2], p[3]) {
            descriptor[bit / 8] |= 1 << (bit % 8);
        }
    }
    descriptor
}

/// Hamming distance between two descriptors.
pub fn hamming(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x ^ y).count_ones()).sum()
}

/// 3x3 box blur with edge clamping, used to stabilise the intensity tests.
pub(crate) fn box_blur_3x3(image: ImageView<'_, u8>) -> OwnedImage {
    let width = image.width();
    let height = image.height();
    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0u32;
            for dy in -1isize..=1 {
                let sy = (y as isize + dy).clamp(0, height as isize - 1) as usize;
                for dx in -1isize..=1 {
                    let sx = (x as isize + dx).clamp(0, width as isize - 1) as usize;
                    sum += u32::from(image.get(sx, sy).copied().unwrap_or(0));
                }
            }
            out[y * width + x] = ((sum + 4) / 9) as u8;
        }
    }
    OwnedImage::new(out, width, height).expect("blur output matches input dimensions")
}

#[cfg(test)]
mod tests {
    use super::{describe, hamming, pattern};
    use crate::image::ImageView;

    fn textured(width: usize, height: usize) -> Vec<u8> {
        (0..width * height)
            .map(|i| {
                let x = i % width;
                let y = i / width;
                (((x * 37) ^ (y * 91) ^ (x * y * 7)) & 0xFF) as u8
            })
            .collect()
    }

    #[test]
    fn pattern_is_stable_and_inside_unit_disc() {
        let p = pattern();
        assert_eq!(p.len(), 256);
        assert!(p
            .iter()
            .all(|q| q[0] * q[0] + q[1] * q[1] <= 1.0 && q[2] * q[2] + q[3] * q[3] <= 1.0));
        assert_eq!(p.as_ptr(), pattern().as_ptr());
    }

    #[test]
    fn identical_neighbourhoods_give_identical_descriptors() {
        let data = textured(40, 40);
        let view = ImageView::from_slice(&data, 40, 40).unwrap();
        let roi = view.roi(5, 3, 30, 30).unwrap();
        let a = describe(view, 20, 18, 7, 33.0);
        let b = describe(roi, 15, 15, 7, 33.0);
        assert_eq!(hamming(&a, &b), 0);
    }

    #[test]
    fn different_neighbourhoods_differ() {
        let data = textured(40, 40);
        let view = ImageView::from_slice(&data, 40, 40).unwrap();
        let a = describe(view, 12, 12, 7, 0.0);
        let b = describe(view, 27, 25, 7, 0.0);
        assert!(hamming(&a, &b) > 16);
    }
}
