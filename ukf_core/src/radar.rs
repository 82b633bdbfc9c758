//! Unscented Kalman correction against a radar (range, bearing, range-rate)
//! measurement.
//!
//! Reuses the sigma points propagated by the prediction of the same cycle:
//! 1. Project each predicted sigma point through h(x)
//! 2. Recover the predicted measurement mean and innovation covariance S
//! 3. Cross-covariance T between state and measurement residuals
//! 4. K = T·S⁻¹,  x' = x + K·ν,  P' = P − K·S·Kᵀ
//!
//! Heading residuals (state) and bearing residuals (measurement) are wrapped
//! before they are weighted.

use crate::angle::{normalize_angle, unwrap_predicted_bearing};
use crate::error::FilterResult;
use crate::nis::{invert_innovation, normalized_innovation_squared};
use crate::types::{
    RadarSigmaPoints, SensorKind, SigmaPoints, StateCov, StateVec, Weights, BEARING, N_SIG, YAW,
};
use nalgebra::{Matrix3, Matrix5x3, Vector3};
use sensor_models::{ObservationModel, RadarModel};

/// Result of a radar update step, exposed for diagnostics.
#[derive(Clone, Debug)]
pub struct RadarUpdate {
    pub state: StateVec,
    pub cov: StateCov,
    /// Predicted measurement z̄ (bearing wrapped, before the ±π fix)
    pub predicted_measurement: Vector3<f64>,
    /// Innovation ν = z − z̄ (bearing wrapped)
    pub innovation: Vector3<f64>,
    /// Innovation covariance S
    pub innovation_cov: Matrix3<f64>,
    /// Kalman gain K
    pub kalman_gain: Matrix5x3<f64>,
    /// νᵀ·S⁻¹·ν
    pub nis: f64,
}

/// Project every predicted sigma point into radar measurement space.
pub fn project(sigma: &SigmaPoints, model: &RadarModel) -> RadarSigmaPoints {
    let mut z_sigma = RadarSigmaPoints::zeros();
    for i in 0..N_SIG {
        let column: StateVec = sigma.column(i).into_owned();
        z_sigma.set_column(i, &model.apply(&column));
    }
    z_sigma
}

/// Compute the radar correction of (x, P) for the observation `z`.
///
/// Pure: the caller decides whether to commit the result.
pub fn update(
    state: &StateVec,
    cov: &StateCov,
    sigma: &SigmaPoints,
    weights: &Weights,
    z: &Vector3<f64>,
    model: &RadarModel,
) -> FilterResult<RadarUpdate> {
    let z_sigma = project(sigma, model);

    // Predicted measurement mean
    let mut z_pred: Vector3<f64> = z_sigma * weights;
    z_pred[BEARING] = normalize_angle(z_pred[BEARING]);

    // Innovation covariance S and cross-covariance T
    let mut s = model.r_matrix();
    let mut t = Matrix5x3::<f64>::zeros();
    for i in 0..N_SIG {
        let mut dz = z_sigma.column(i) - z_pred;
        dz[BEARING] = normalize_angle(dz[BEARING]);
        let mut dx = sigma.column(i) - state;
        dx[YAW] = normalize_angle(dx[YAW]);

        s += dz * dz.transpose() * weights[i];
        t += dx * dz.transpose() * weights[i];
    }

    let s_inv = invert_innovation(&s, SensorKind::Radar)?;
    let k = t * s_inv;

    let mut z_ref = z_pred;
    z_ref[BEARING] = unwrap_predicted_bearing(z[BEARING], z_pred[BEARING]);

    let mut innovation = z - z_ref;
    innovation[BEARING] = normalize_angle(innovation[BEARING]);

    let new_state = state + k * innovation;
    let new_cov = cov - k * s * k.transpose();

    Ok(RadarUpdate {
        state: new_state,
        cov: new_cov,
        predicted_measurement: z_pred,
        innovation,
        innovation_cov: s,
        kalman_gain: k,
        nis: normalized_innovation_squared(&innovation, &s_inv),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
