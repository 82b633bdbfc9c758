//! Linear Kalman correction against a lidar position fix.
//!
//! The lidar observes [px, py] directly, so no sigma points are needed:
//!
//! ν = z − H·x
//! S = H·P·Hᵀ + R
//! K = P·Hᵀ·S⁻¹
//! x' = x + K·ν
//! P' = (I − K·H)·P
//!
//! Both observed components are linear positions; nothing is wrapped.

use crate::error::FilterResult;
use crate::nis::{invert_innovation, normalized_innovation_squared};
use crate::types::{SensorKind, StateCov, StateVec};
use nalgebra::{Matrix2, Matrix2x5, Matrix5x2, Vector2};

/// Result of a lidar update step, exposed for diagnostics.
#[derive(Clone, Debug)]
pub struct LidarUpdate {
    pub state: StateVec,
    pub cov: StateCov,
    /// Innovation ν = z − H·x
    pub innovation: Vector2<f64>,
    /// Innovation covariance S = H·P·Hᵀ + R
    pub innovation_cov: Matrix2<f64>,
    /// Kalman gain K
    pub kalman_gain: Matrix5x2<f64>,
    /// νᵀ·S⁻¹·ν
    pub nis: f64,
}

/// Compute the lidar correction of (x, P) for the observation `z`.
///
/// Pure: the caller decides whether to commit the result.
pub fn update(
    state: &StateVec,
    cov: &StateCov,
    z: &Vector2<f64>,
    h: &Matrix2x5<f64>,
    r: &Matrix2<f64>,
) -> FilterResult<LidarUpdate> {
    let innovation = z - h * state;

    let ht = h.transpose();
    let s = h * cov * ht + r;
    let s_inv = invert_innovation(&s, SensorKind::Lidar)?;

    let k = cov * ht * s_inv;

    let new_state = state + k * innovation;

    // Joseph form of (I − K·H)·P keeps P' symmetric under rounding.
    let i_kh = StateCov::identity() - k * h;
    let new_cov = i_kh * cov * i_kh.transpose() + k * r * k.transpose();

    Ok(LidarUpdate {
        state: new_state,
        cov: new_cov,
        innovation,
        innovation_cov: s,
        kalman_gain: k,
        nis: normalized_innovation_squared(&innovation, &s_inv),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
