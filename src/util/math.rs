//! Mathematical helpers for orientation handling.

/// Wraps an angle in degrees to the range [0, 360).
pub(crate) fn wrap_deg_360(angle_deg: f32) -> f32 {
    let wrapped = angle_deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Computes sine and cosine for an angle in degrees.
pub(crate) fn sin_cos_deg(angle_deg: f32) -> (f32, f32) {
    angle_deg.to_radians().sin_cos()
}

#[cfg(test)]
mod tests {
    use super::{sin_cos_deg, wrap_deg_360};

    #[test]
    fn wrap_deg_360_maps_to_expected_range() {
        assert!((wrap_deg_360(370.0) - 10.0).abs() < 1e-4);
        assert!((wrap_deg_360(-10.0) - 350.0).abs() < 1e-4);
        assert!(wrap_deg_360(720.0).abs() < 1e-4);
        assert!(wrap_deg_360(-1e-9) < 360.0);
    }

    #[test]
    fn sin_cos_deg_matches_quadrants() {
        let (sin, cos) = sin_cos_deg(90.0);
        assert!(sin > 0.999);
        assert!(cos.abs() < 1e-6);
    }
}
