//! Mathematical primitives for navigation.
//!
//! Angle normalization and the variance statistic used for
//! moving-obstacle classification.

use std::f32::consts::PI;

/// Normalize angle to [-π, π].
///
/// # Example
/// ```
/// use disha_nav::core::math::normalize_angle;
/// use std::f32::consts::PI;
///
/// assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-6);
/// assert!((normalize_angle(-3.0 * PI) - (-PI)).abs() < 1e-6);
/// ```
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a < -PI {
        a += 2.0 * PI;
    }
    a
}

/// Population variance of a sample window.
///
/// Returns 0.0 for windows with fewer than two values; a single
/// reading carries no motion information.
pub fn variance(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_angle_identity_range() {
        assert_relative_eq!(normalize_angle(0.0), 0.0);
        assert_relative_eq!(normalize_angle(1.0), 1.0);
        assert_relative_eq!(normalize_angle(-1.0), -1.0);
    }

    #[test]
    fn test_normalize_angle_wraps() {
        assert_relative_eq!(normalize_angle(2.0 * PI), 0.0, epsilon = 1e-6);
        assert_relative_eq!(normalize_angle(3.0 * PI), PI, epsilon = 1e-6);
        assert_relative_eq!(normalize_angle(-3.0 * PI), -PI, epsilon = 1e-6);
    }

    #[test]
    fn test_variance_constant_window() {
        let values = [1.5, 1.5, 1.5, 1.5, 1.5];
        assert_relative_eq!(variance(&values), 0.0);
    }

    #[test]
    fn test_variance_alternating_window() {
        // Population variance of [1, 2, 1, 2] is 0.25
        let values = [1.0, 2.0, 1.0, 2.0];
        assert_relative_eq!(variance(&values), 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_variance_short_window() {
        assert_relative_eq!(variance(&[]), 0.0);
        assert_relative_eq!(variance(&[3.0]), 0.0);
    }
}
