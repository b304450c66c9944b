//! FAST-9 segment-test corner detection with intensity-centroid orientation.

use crate::image::ImageView;
use crate::util::math::wrap_deg_360;

/// Bresenham circle of radius 3, clockwise from twelve o'clock.
const CIRCLE: [(isize, isize); 16] = [
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
];

/// Minimum arc length of the segment test.
const ARC_LEN: usize = 9;

/// Corner candidate in level coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Corner {
    pub(crate) x: usize,
    pub(crate) y: usize,
    pub(crate) response: f32,
}

/// Detects FAST-9 corners at least `border` pixels away from every edge.
///
/// Returned corners survive 3x3 non-maximum suppression on the response and
/// are ordered row-major.
pub(crate) fn detect_fast9(image: ImageView<'_, u8>, threshold: u8, border: usize) -> Vec<Corner> {
    let width = image.width();
    let height = image.height();
    let border = border.max(3);
    if width <= 2 * border || height <= 2 * border {
        return Vec::new();
    }

    let data = image.as_slice();
    let stride = image.stride() as isize;
    let mut responses = vec![0.0f32; width * height];
    for y in border..height - border {
        for x in border..width - border {
            let center = y as isize * stride + x as isize;
            if let Some(response) = segment_test(data, center, stride, threshold) {
                responses[y * width + x] = response;
            }
        }
    }

    let mut corners = Vec::new();
    for y in border..height - border {
        for x in border..width - border {
            let response = responses[y * width + x];
            if response > 0.0 && is_local_max(&responses, width, x, y, response) {
                corners.push(Corner { x, y, response });
            }
        }
    }
    corners
}

fn segment_test(data: &[u8], center: isize, stride: isize, threshold: u8) -> Option<f32> {
    let c = i16::from(data[center as usize]);
    let t = i16::from(threshold);

    let mut diffs = [0i16; 16];
    for (slot, &(dx, dy)) in diffs.iter_mut().zip(CIRCLE.iter()) {
        let idx = center + dy * stride + dx;
        *slot = i16::from(data[idx as usize]) - c;
    }

    let bright = longest_arc(&diffs, |d| d > t);
    let dark = longest_arc(&diffs, |d| d < -t);
    if bright < ARC_LEN && dark < ARC_LEN {
        return None;
    }

    let response: i32 = if bright >= dark {
        diffs
            .iter()
            .filter(|&&d| d > t)
            .map(|&d| i32::from(d - t))
            .sum()
    } else {
        diffs
            .iter()
            .filter(|&&d| d < -t)
            .map(|&d| i32::from(-d - t))
            .sum()
    };
    Some(response.max(1) as f32)
}

fn longest_arc(diffs: &[i16; 16], pred: impl Fn(i16) -> bool) -> usize {
    let mut best = 0usize;
    let mut run = 0usize;
    // Two laps so arcs wrapping past index 15 are counted.
    for i in 0..32 {
        if pred(diffs[i % 16]) {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best.min(16)
}

fn is_local_max(responses: &[f32], width: usize, x: usize, y: usize, response: f32) -> bool {
    for ny in y - 1..=y + 1 {
        for nx in x - 1..=x + 1 {
            if nx == x && ny == y {
                continue;
            }
            let other = responses[ny * width + nx];
            if other > response {
                return false;
            }
            // Plateaus keep their first pixel in row-major order.
            if other == response && (ny, nx) < (y, x) {
                return false;
            }
        }
    }
    true
}

/// Orientation in degrees, `[0, 360)`, from the intensity centroid of the
/// disc of radius `radius` around `(x, y)`.
///
/// The caller guarantees the disc lies inside the image.
pub(crate) fn centroid_orientation(image: ImageView<'_, u8>, x: usize, y: usize, radius: usize) -> f32 {
    let r = radius as isize;
    let r2 = r * r;
    let mut m10 = 0.0f64;
    let mut m01 = 0.0f64;
    for dy in -r..=r {
        let Some(row) = image.row((y as isize + dy) as usize) else {
            continue;
        };
        for dx in -r..=r {
            if dx * dx + dy * dy > r2 {
                continue;
            }
            let value = f64::from(row[(x as isize + dx) as usize]);
            m10 += dx as f64 * value;
            m01 += dy as f64 * value;
        }
    }
    if m10 == 0.0 && m01 == 0.0 {
        return 0.0;
    }
    wrap_deg_360(m01.atan2(m10).to_degrees() as f32)
}
