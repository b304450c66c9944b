//! Match filtering votes run before the homography fit.

use crate::features::{KnnMatch, Keypoint};
use crate::util::math::wrap_deg_360;

/// Keeps matches whose best-to-second-best distance ratio is at most
/// `threshold`.
pub(crate) fn vote_uniqueness(matches: &[KnnMatch], threshold: f32) -> Vec<KnnMatch> {
    matches
        .iter()
        .copied()
        .filter(|m| m.distance_ratio() <= threshold)
        .collect()
}

/// Keeps matches that agree with the dominant scale and rotation change.
///
/// Every match votes into a 2-D histogram of `log10(region size / template
/// size)` (bin width `log10(scale_tolerance)`) against the rotation
/// difference in `[0, 360)` (bin width `orientation_tolerance_deg`). Matches
/// in bins holding no more than half of the peak count are dropped.
pub(crate) fn vote_size_orientation(
    matches: &[KnnMatch],
    template: &[Keypoint],
    region: &[Keypoint],
    scale_tolerance: f32,
    orientation_tolerance_deg: f32,
) -> Vec<KnnMatch> {
    if matches.is_empty() {
        return Vec::new();
    }

    let coords: Vec<(f32, f32)> = matches
        .iter()
        .map(|m| {
            let t = &template[m.train_idx];
            let r = &region[m.query_idx];
            let log_scale = (r.size / t.size).log10();
            let rotation = wrap_deg_360(t.angle_deg - r.angle_deg);
            (log_scale, rotation)
        })
        .collect();

    let min_scale = coords.iter().map(|c| c.0).fold(f32::INFINITY, f32::min);
    let max_scale = coords.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max);
    let scale_step = scale_tolerance.log10();
    let scale_bins = (((max_scale - min_scale) / scale_step).ceil() as usize).max(1);
    let rotation_bins = ((360.0 / orientation_tolerance_deg).ceil() as usize).max(1);

    let bin_of = |(s, r): (f32, f32)| -> usize {
        let si = (((s - min_scale) / scale_step) as usize).min(scale_bins - 1);
        let ri = ((r / orientation_tolerance_deg) as usize).min(rotation_bins - 1);
        si * rotation_bins + ri
    };

    let mut hist = vec![0usize; scale_bins * rotation_bins];
    for &c in &coords {
        hist[bin_of(c)] += 1;
    }
    let peak = hist.iter().copied().max().unwrap_or(0);

    matches
        .iter()
        .zip(coords.iter())
        .filter(|(_, c)| hist[bin_of(**c)] * 2 > peak)
        .map(|(m, _)| *m)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{vote_size_orientation, vote_uniqueness};
    use crate::features::{KnnMatch, Keypoint};

    fn kp(size: f32, angle_deg: f32) -> Keypoint {
        Keypoint {
            x: 0.0,
            y: 0.0,
            size,
            angle_deg,
            response: 1.0,
            octave: 0,
        }
    }

    fn m(idx: usize, distance: u32, second: Option<u32>) -> KnnMatch {
        KnnMatch {
            query_idx: idx,
            train_idx: idx,
            distance,
            second_distance: second,
        }
    }

    #[test]
    fn uniqueness_filters_ambiguous_matches() {
        let matches = [m(0, 10, Some(40)), m(1, 30, Some(32)), m(2, 5, None)];
        let kept = vote_uniqueness(&matches, 0.8);
        assert_eq!(kept.iter().map(|k| k.query_idx).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(vote_uniqueness(&matches, 1.0).len(), 3);
    }

    #[test]
    fn outlying_rotation_is_voted_out() {
        let template: Vec<_> = (0..6).map(|_| kp(15.0, 40.0)).collect();
        let mut region: Vec<_> = (0..5).map(|i| kp(15.0, 40.0 - i as f32)).collect();
        region.push(kp(15.0, 220.0));
        let matches: Vec<_> = (0..6).map(|i| m(i, 1, Some(50))).collect();
        let kept = vote_size_orientation(&matches, &template, &region, 1.5, 20.0);
        assert_eq!(kept.len(), 5);
        assert!(kept.iter().all(|k| k.query_idx != 5));
    }

    #[test]
    fn outlying_scale_is_voted_out() {
        let template: Vec<_> = (0..5).map(|_| kp(15.0, 0.0)).collect();
        let mut region: Vec<_> = (0..4).map(|_| kp(15.0, 0.0)).collect();
        region.push(kp(60.0, 0.0));
        let matches: Vec<_> = (0..5).map(|i| m(i, 1, Some(50))).collect();
        let kept = vote_size_orientation(&matches, &template, &region, 1.5, 20.0);
        assert_eq!(kept.len(), 4);
    }
}
