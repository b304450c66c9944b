//! Seeded RANSAC homography fit.

use crate::align::homography::Homography;
use nalgebra::Point2;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Minimal sample size of a homography.
const SAMPLE: usize = 4;

/// Robust fit result.
#[derive(Clone, Debug)]
pub(crate) struct RansacFit {
    pub(crate) homography: Homography,
    pub(crate) inliers: usize,
}

/// Fits `dst ~ H * src` by RANSAC over 4-point samples, then refits on the
/// consensus set.
///
/// The consensus set of the best hypothesis must hold at least four
/// correspondences; ties keep the earliest hypothesis.
pub(crate) fn fit_homography(
    src: &[Point2<f64>],
    dst: &[Point2<f64>],
    iterations: usize,
    tolerance: f64,
    seed: u64,
) -> Option<RansacFit> {
    let n = src.len();
    if n < SAMPLE || dst.len() != n {
        return None;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut best: Option<(Homography, usize)> = None;
    for _ in 0..iterations {
        let idx = rand::seq::index::sample(&mut rng, n, SAMPLE);
        let s = [src[idx.index(0)], src[idx.index(1)], src[idx.index(2)], src[idx.index(3)]];
        let d = [dst[idx.index(0)], dst[idx.index(1)], dst[idx.index(2)], dst[idx.index(3)]];
        let Some(h) = Homography::from_four(&s, &d) else {
            continue;
        };
        let count = count_inliers(&h, src, dst, tolerance);
        if best.as_ref().map_or(true, |(_, c)| count > *c) {
            best = Some((h, count));
            if count == n {
                break;
            }
        }
    }

    let (hypothesis, count) = best?;
    if count < SAMPLE {
        return None;
    }

    let (inlier_src, inlier_dst): (Vec<_>, Vec<_>) = src
        .iter()
        .zip(dst.iter())
        .filter(|(s, d)| hypothesis.reprojection_error(**s, **d) <= tolerance)
        .map(|(s, d)| (*s, *d))
        .unzip();

    let refined = Homography::estimate(&inlier_src, &inlier_dst)
        .map(|h| (count_inliers(&h, src, dst, tolerance), h))
        .filter(|(refined_count, _)| *refined_count >= count);
    Some(match refined {
        Some((inliers, homography)) => RansacFit {
            homography,
            inliers,
        },
        None => RansacFit {
            homography: hypothesis,
            inliers: count,
        },
    })
}

fn count_inliers(h: &Homography, src: &[Point2<f64>], dst: &[Point2<f64>], tolerance: f64) -> usize {
    src.iter()
        .zip(dst.iter())
        .filter(|(s, d)| h.reprojection_error(**s, **d) <= tolerance)
        .count()
}

#[cfg(test)]
mod tests {
    use super::fit_homography;
    use crate::align::homography::Homography;
    use nalgebra::Point2;

    #[test]
    fn recovers_translation_despite_outliers() {
        let src: Vec<_> = (0..20)
            .map(|i| Point2::new((i % 5) as f64 * 9.0 + 1.0, (i / 5) as f64 * 7.0 + 2.0))
            .collect();
        let truth = Homography::translation(31.0, 17.0);
        let mut dst: Vec<_> = src.iter().map(|&p| truth.apply(p).unwrap()).collect();
        dst[3] = Point2::new(0.0, 90.0);
        dst[11] = Point2::new(70.0, 2.0);
        dst[17] = Point2::new(-40.0, 5.0);

        let fit = fit_homography(&src, &dst, 500, 2.0, 7).unwrap();
        assert_eq!(fit.inliers, 17);
        let p = fit.homography.apply(Point2::new(10.0, 10.0)).unwrap();
        assert!((p - Point2::new(41.0, 27.0)).norm() < 1e-6);
    }

    #[test]
    fn same_seed_same_result() {
        let src: Vec<_> = (0..12)
            .map(|i| Point2::new((i * 7 % 11) as f64, (i * 5 % 13) as f64))
            .collect();
        let dst: Vec<_> = src
            .iter()
            .enumerate()
            .map(|(i, p)| Point2::new(p.x + 3.0 + (i % 3) as f64, p.y - 1.0))
            .collect();
        let a = fit_homography(&src, &dst, 100, 2.0, 42).map(|f| (f.inliers, f.homography));
        let b = fit_homography(&src, &dst, 100, 2.0, 42).map(|f| (f.inliers, f.homography));
        assert_eq!(a, b);
    }

    #[test]
    fn too_few_points_fail() {
        let pts = [Point2::new(0.0, 0.0); 3];
        assert!(fit_homography(&pts, &pts, 10, 2.0, 1).is_none());
    }
}
