//! Angle helpers.
//!
//! Every angular residual (heading in state space, bearing in radar space)
//! must go through [`normalize_angle`] before it enters a weighted sum or an
//! outer product. Wrapping after aggregation is wrong.

use std::f64::consts::{PI, TAU};

/// Half-width of the band around ±π where the bearing discontinuity fix applies.
pub const BEARING_WINDOW: f64 = 0.2;

/// Wrap an angle into (−π, π].
///
/// The result is congruent to the input modulo 2π. Non-finite input is
/// returned unchanged.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    if angle > -PI && angle <= PI {
        return angle;
    }
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Shift a predicted bearing by ±2π when the measured bearing sits just
/// inside ±π and the prediction lies on the other side of the cut, so that
/// the residual measures the short way round.
pub fn unwrap_predicted_bearing(measured: f64, predicted: f64) -> f64 {
    if measured > PI - BEARING_WINDOW && predicted < 0.0 {
        predicted + TAU
    } else if measured < -PI + BEARING_WINDOW && predicted > 0.0 {
        predicted - TAU
    } else {
        predicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn congruent(a: f64, b: f64) -> bool {
        let k = ((a - b) / TAU).round();
        (a - b - k * TAU).abs() < 1e-9
    }

    #[test]
    fn stays_in_half_open_interval() {
        for &a in &[0.0, 1.0, -1.0, PI, -PI, 3.5, -3.5, 7.0 * PI, -7.0 * PI, 100.0, -1234.5, 1e6] {
            let w = normalize_angle(a);
            assert!(w > -PI && w <= PI, "{a} wrapped to {w}");
            assert!(congruent(w, a), "{a} wrapped to {w}");
        }
    }

    #[test]
    fn minus_pi_maps_to_pi() {
        assert_abs_diff_eq!(normalize_angle(-PI), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_angle(PI), PI, epsilon = 1e-12);
    }

    #[test]
    fn small_angles_untouched() {
        assert_eq!(normalize_angle(0.3), 0.3);
        assert_eq!(normalize_angle(-2.9), -2.9);
    }

    #[test]
    fn bearing_unwrap_near_plus_pi() {
        let measured = PI - 0.05;
        let predicted = -PI + 0.05;
        let residual = normalize_angle(measured - unwrap_predicted_bearing(measured, predicted));
        assert!(residual.abs() <= 0.2, "residual {residual}");
    }

    #[test]
    fn bearing_unwrap_near_minus_pi() {
        let measured = -PI + 0.05;
        let predicted = PI - 0.05;
        let shifted = unwrap_predicted_bearing(measured, predicted);
        assert_abs_diff_eq!(shifted, predicted - TAU, epsilon = 1e-12);
        assert!((measured - shifted).abs() <= 0.2);
    }

    #[test]
    fn bearing_unwrap_leaves_interior_alone() {
        assert_eq!(unwrap_predicted_bearing(0.5, -0.4), -0.4);
    }
}
