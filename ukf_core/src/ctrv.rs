//! CTRV process model: sigma-point propagation and moment recovery.
//!
//! ## State vector
//! x = [px, py, v, ψ, ψ̇]ᵀ  with augmentation noise [νa, νψ̈]
//!
//! ## Transition (ψ̇ ≠ 0)
//! px' = px + v/ψ̇ · (sin(ψ + ψ̇Δt) − sin ψ)
//! py' = py + v/ψ̇ · (cos ψ − cos(ψ + ψ̇Δt))
//! v', ψ' = v, ψ + ψ̇Δt;  ψ̇' = ψ̇
//!
//! ## Noise
//! px' += ½Δt²·cos ψ·νa,  py' += ½Δt²·sin ψ·νa
//! v'  += Δt·νa,  ψ' += ½Δt²·νψ̈,  ψ̇' += Δt·νψ̈

use crate::angle::normalize_angle;
use crate::types::{
    AugSigmaPoints, SigmaPoints, StateCov, StateVec, Weights, N_AUG, N_SIG, YAW,
};
use nalgebra::SVector;

/// Positions inside this box (on both axes) are treated as degenerate.
pub const ORIGIN_EPS: f64 = 0.01;
/// Replacement for both coordinates of a degenerate position.
pub const ORIGIN_SUBSTITUTE: f64 = 0.1;
/// Below this |ψ̇| the straight-line motion is used.
pub const YAW_RATE_EPS: f64 = 1e-3;

/// Propagate one augmented sigma point by `dt` seconds.
pub fn ctrv_step(aug: &SVector<f64, N_AUG>, dt: f64) -> StateVec {
    let (mut px, mut py) = (aug[0], aug[1]);
    let v = aug[2];
    let yaw = aug[3];
    let yaw_rate = aug[4];
    let nu_a = aug[5];
    let nu_yawdd = aug[6];

    if px.abs() < ORIGIN_EPS && py.abs() < ORIGIN_EPS {
        px = ORIGIN_SUBSTITUTE;
        py = ORIGIN_SUBSTITUTE;
    }

    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    let (mut px_p, mut py_p) = if yaw_rate.abs() < YAW_RATE_EPS {
        (px + v * cos_yaw * dt, py + v * sin_yaw * dt)
    } else {
        let yaw_end = yaw + yaw_rate * dt;
        (
            px + v / yaw_rate * (yaw_end.sin() - sin_yaw),
            py + v / yaw_rate * (cos_yaw - yaw_end.cos()),
        )
    };

    let half_dt2 = 0.5 * dt * dt;
    px_p += half_dt2 * cos_yaw * nu_a;
    py_p += half_dt2 * sin_yaw * nu_a;
    let v_p = v + dt * nu_a;
    let yaw_p = yaw + yaw_rate * dt + half_dt2 * nu_yawdd;
    let yaw_rate_p = yaw_rate + dt * nu_yawdd;

    StateVec::new(px_p, py_p, v_p, yaw_p, yaw_rate_p)
}

/// Propagate every column of the augmented sigma matrix.
pub fn propagate(sigma_aug: &AugSigmaPoints, dt: f64) -> SigmaPoints {
    let mut predicted = SigmaPoints::zeros();
    for i in 0..N_SIG {
        let column: SVector<f64, N_AUG> = sigma_aug.column(i).into_owned();
        predicted.set_column(i, &ctrv_step(&column, dt));
    }
    predicted
}

/// Weighted mean of the predicted sigma points.
///
/// The heading is averaged as a plain weighted sum and wrapped afterwards.
pub fn predicted_mean(sigma: &SigmaPoints, weights: &Weights) -> StateVec {
    let mut x = sigma * weights;
    x[YAW] = normalize_angle(x[YAW]);
    x
}

/// Weighted covariance of the predicted sigma points about `mean`.
///
/// The heading residual of each column is wrapped before the outer product.
pub fn predicted_covariance(sigma: &SigmaPoints, weights: &Weights, mean: &StateVec) -> StateCov {
    let mut p = StateCov::zeros();
    for i in 0..N_SIG {
        let mut diff = sigma.column(i) - mean;
        diff[YAW] = normalize_angle(diff[YAW]);
        p += diff * diff.transpose() * weights[i];
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sigma::SigmaPointGenerator;
    use crate::types::ProcessCov;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn aug(px: f64, py: f64, v: f64, yaw: f64, yaw_rate: f64) -> SVector<f64, N_AUG> {
        SVector::<f64, N_AUG>::from_column_slice(&[px, py, v, yaw, yaw_rate, 0.0, 0.0])
    }

    #[test]
    fn straight_line_when_yaw_rate_small() {
        let out = ctrv_step(&aug(1.0, 2.0, 10.0, 0.0, 0.0), 0.5);
        assert_abs_diff_eq!(out[0], 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[1], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[2], 10.0, epsilon = 1e-12);
    }

    #[test]
    fn quarter_turn_closed_form() {
        // v = 1, ψ̇ = π/2 for 1 s: quarter circle of radius 2/π starting east
        let r = 2.0 / PI;
        let out = ctrv_step(&aug(5.0, 5.0, 1.0, 0.0, PI / 2.0), 1.0);
        assert_abs_diff_eq!(out[0], 5.0 + r, epsilon = 1e-12);
        assert_abs_diff_eq!(out[1], 5.0 + r, epsilon = 1e-12);
        assert_abs_diff_eq!(out[3], PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[4], PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn noise_terms_enter_every_component() {
        let mut a = aug(10.0, 10.0, 2.0, 0.0, 0.0);
        a[5] = 1.0;
        a[6] = 2.0;
        let out = ctrv_step(&a, 1.0);
        assert_abs_diff_eq!(out[0], 10.0 + 2.0 + 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(out[2], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[3], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[4], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn origin_is_pushed_off() {
        let out = ctrv_step(&aug(0.0, 0.005, 0.0, 0.0, 0.0), 0.1);
        assert_eq!(out[0], ORIGIN_SUBSTITUTE);
        assert_eq!(out[1], ORIGIN_SUBSTITUTE);
    }

    #[test]
    fn zero_dt_is_identity_on_mean() {
        let gen = SigmaPointGenerator::new();
        let x = StateVec::new(5.0, 3.0, 1.2, 0.4, 0.1);
        let p = StateCov::identity();
        let q = ProcessCov::from_diagonal(&nalgebra::Vector2::new(0.64, 0.36));
        let sigma = propagate(&gen.generate(&x, &p, &q).unwrap(), 0.0);
        let mean = predicted_mean(&sigma, gen.weights());
        assert_abs_diff_eq!(mean, x, epsilon = 1e-9);
        let cov = predicted_covariance(&sigma, gen.weights(), &mean);
        assert_abs_diff_eq!(cov, p, epsilon = 1e-9);
    }

    #[test]
    fn heading_residuals_are_wrapped() {
        // Two sigma columns straddling ±π must not produce a ~2π spread
        let mut sigma = SigmaPoints::zeros();
        let weights = crate::sigma::sigma_weights(crate::types::LAMBDA);
        for i in 0..N_SIG {
            sigma[(YAW, i)] = if i % 2 == 0 { PI - 0.01 } else { -PI + 0.01 };
        }
        let mean = StateVec::new(0.0, 0.0, 0.0, PI, 0.0);
        let cov = predicted_covariance(&sigma, &weights, &mean);
        assert!(cov[(YAW, YAW)] < 1e-3, "heading variance {}", cov[(YAW, YAW)]);
    }
}
