//! Radar measurement geometry with the near-origin guards.

use std::f64::consts::FRAC_PI_2;

/// Below this magnitude (on both axes) the target is treated as sitting on the sensor.
pub const NEAR_ORIGIN_EPS: f64 = 0.01;

/// Bearing of a point as seen from the origin.
///
/// Falls back to ±π/2 on the y axis and to 0 at the origin itself.
pub fn bearing(px: f64, py: f64) -> f64 {
    if px != 0.0 {
        py.atan2(px)
    } else if py > 0.0 {
        FRAC_PI_2
    } else if py < 0.0 {
        -FRAC_PI_2
    } else {
        0.0
    }
}

/// Radial velocity of a CTRV target (speed `v`, heading `yaw`) at (px, py).
///
/// Positions inside the near-origin box are pushed to (0.01, 0.01) before the
/// division so the result stays finite.
pub fn range_rate(px: f64, py: f64, v: f64, yaw: f64) -> f64 {
    let (px, py) = if px.abs() < NEAR_ORIGIN_EPS && py.abs() < NEAR_ORIGIN_EPS {
        (NEAR_ORIGIN_EPS, NEAR_ORIGIN_EPS)
    } else {
        (px, py)
    };
    let range = (px * px + py * py).sqrt();
    let vx = v * yaw.cos();
    let vy = v * yaw.sin();
    (px * vx + py * vy) / range
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearing_on_axes() {
        assert_eq!(bearing(0.0, 3.0), FRAC_PI_2);
        assert_eq!(bearing(0.0, -3.0), -FRAC_PI_2);
        assert_eq!(bearing(0.0, 0.0), 0.0);
        assert!((bearing(-1.0, 0.0) - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn range_rate_is_finite_at_origin() {
        let rr = range_rate(0.0, 0.0, 5.0, 0.7);
        assert!(rr.is_finite());
    }

    #[test]
    fn tangential_motion_has_zero_range_rate() {
        // On the +x axis moving along +y
        let rr = range_rate(10.0, 0.0, 3.0, FRAC_PI_2);
        assert!(rr.abs() < 1e-12);
    }
}
