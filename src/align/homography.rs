//! Planar homographies and their estimation from point correspondences.
//!
//! Both solvers work on Hartley-normalized coordinates: the 4-point solver
//! fixes `h33 = 1` and solves the 8x8 system by LU, the overdetermined solver
//! takes the smallest right singular vector of the DLT matrix.

use nalgebra::{DMatrix, Matrix3, Point2, SMatrix, SVector, Vector3};

/// 3x3 projective transform mapping template coordinates to region
/// coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    matrix: Matrix3<f64>,
}

impl Homography {
    /// Wraps a matrix, scaled so that `h33 == 1`.
    ///
    /// Returns `None` when `h33` vanishes.
    pub fn from_matrix(matrix: Matrix3<f64>) -> Option<Self> {
        let s = matrix[(2, 2)];
        if s.abs() < 1e-12 || !matrix.iter().all(|v| v.is_finite()) {
            return None;
        }
        Some(Self { matrix: matrix / s })
    }

    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// Pure translation by `(tx, ty)`.
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            matrix: Matrix3::new(1.0, 0.0, tx, 0.0, 1.0, ty, 0.0, 0.0, 1.0),
        }
    }

    /// Returns the underlying matrix.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Returns the matrix as row-major rows.
    pub fn to_rows(&self) -> [[f64; 3]; 3] {
        let m = &self.matrix;
        [
            [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
            [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
            [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
        ]
    }

    /// Maps a point; `None` for points sent to infinity.
    pub fn apply(&self, p: Point2<f64>) -> Option<Point2<f64>> {
        let v = self.matrix * Vector3::new(p.x, p.y, 1.0);
        if v[2].abs() < 1e-12 {
            return None;
        }
        Some(Point2::new(v[0] / v[2], v[1] / v[2]))
    }

    /// Returns the inverse transform, if the matrix is invertible.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().and_then(Self::from_matrix)
    }

    /// Euclidean reprojection error of `src -> dst`; infinite when `src`
    /// maps to infinity.
    pub fn reprojection_error(&self, src: Point2<f64>, dst: Point2<f64>) -> f64 {
        match self.apply(src) {
            Some(p) => (p - dst).norm(),
            None => f64::INFINITY,
        }
    }

    /// Estimates `H` with `dst ~ H * src` from at least four correspondences.
    ///
    /// Exactly four points use the minimal solver; more use the normalized
    /// DLT. Degenerate configurations return `None`.
    pub fn estimate(src: &[Point2<f64>], dst: &[Point2<f64>]) -> Option<Self> {
        if src.len() != dst.len() || src.len() < 4 {
            return None;
        }
        if let (Ok(s), Ok(d)) = (
            <&[Point2<f64>; 4]>::try_from(src),
            <&[Point2<f64>; 4]>::try_from(dst),
        ) {
            return Self::from_four(s, d);
        }

        let (src_n, t_src) = normalize(src)?;
        let (dst_n, t_dst) = normalize(dst)?;

        let mut a = DMatrix::<f64>::zeros(2 * src.len(), 9);
        for (k, (s, d)) in src_n.iter().zip(dst_n.iter()).enumerate() {
            let (x, y, u, v) = (s.x, s.y, d.x, d.y);
            let r = 2 * k;
            a[(r, 0)] = -x;
            a[(r, 1)] = -y;
            a[(r, 2)] = -1.0;
            a[(r, 6)] = u * x;
            a[(r, 7)] = u * y;
            a[(r, 8)] = u;
            a[(r + 1, 3)] = -x;
            a[(r + 1, 4)] = -y;
            a[(r + 1, 5)] = -1.0;
            a[(r + 1, 6)] = v * x;
            a[(r + 1, 7)] = v * y;
            a[(r + 1, 8)] = v;
        }

        let svd = a.svd(false, true);
        let v_t = svd.v_t?;
        // nalgebra does not sort singular values; pick the smallest explicitly.
        let (min_idx, _) = svd
            .singular_values
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))?;
        let h = v_t.row(min_idx);
        let hn = Matrix3::from_row_slice(&[h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]]);
        denormalize(hn, t_src, t_dst)
    }

    /// Minimal solver for four correspondences.
    pub fn from_four(src: &[Point2<f64>; 4], dst: &[Point2<f64>; 4]) -> Option<Self> {
        let (src_n, t_src) = normalize(src)?;
        let (dst_n, t_dst) = normalize(dst)?;

        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();
        for k in 0..4 {
            let (x, y) = (src_n[k].x, src_n[k].y);
            let (u, v) = (dst_n[k].x, dst_n[k].y);
            let r = 2 * k;
            a[(r, 0)] = x;
            a[(r, 1)] = y;
            a[(r, 2)] = 1.0;
            a[(r, 6)] = -u * x;
            a[(r, 7)] = -u * y;
            b[r] = u;
            a[(r + 1, 3)] = x;
            a[(r + 1, 4)] = y;
            a[(r + 1, 5)] = 1.0;
            a[(r + 1, 6)] = -v * x;
            a[(r + 1, 7)] = -v * y;
            b[r + 1] = v;
        }

        let x = a.lu().solve(&b)?;
        let hn = Matrix3::new(x[0], x[1], x[2], x[3], x[4], x[5], x[6], x[7], 1.0);
        denormalize(hn, t_src, t_dst)
    }
}

/// Translates points to their centroid and scales the mean distance to
/// `sqrt(2)`. Returns `None` when all points coincide.
fn normalize(pts: &[Point2<f64>]) -> Option<(Vec<Point2<f64>>, Matrix3<f64>)> {
    let n = pts.len() as f64;
    let cx = pts.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = pts.iter().map(|p| p.y).sum::<f64>() / n;
    let mean_dist = pts
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;
    if mean_dist < 1e-12 {
        return None;
    }
    let s = std::f64::consts::SQRT_2 / mean_dist;
    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let out = pts
        .iter()
        .map(|p| Point2::new(s * (p.x - cx), s * (p.y - cy)))
        .collect();
    Some((out, t))
}

fn denormalize(hn: Matrix3<f64>, t_src: Matrix3<f64>, t_dst: Matrix3<f64>) -> Option<Homography> {
    let t_dst_inv = t_dst.try_inverse()?;
    Homography::from_matrix(t_dst_inv * hn * t_src)
}
