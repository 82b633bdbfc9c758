//! Observation models: H matrix, R matrix, state → measurement projection.
//!
//! # Measurement types supported
//! - **Lidar**: z = [px, py], H is the constant 2×5 selector matrix
//! - **Radar**: z = [range, bearing, range_rate], projected through h(x)
//!
//! State layout shared with the filter: x = [px, py, v, yaw, yaw_rate]ᵀ.

use crate::radar::{bearing, range_rate};
use nalgebra::{Matrix2, Matrix2x5, Matrix3, SMatrix, SVector, Vector2, Vector3, Vector5};
use serde::{Deserialize, Serialize};

/// Trait for a sensor observation model with an `M`-dimensional measurement.
pub trait ObservationModel<const M: usize> {
    /// Measurement noise covariance R
    fn r_matrix(&self) -> SMatrix<f64, M, M>;
    /// Map state to expected measurement h(x)
    fn apply(&self, state: &Vector5<f64>) -> SVector<f64, M>;
}

// ---------------------------------------------------------------------------
// Lidar
// ---------------------------------------------------------------------------

/// Lidar observation model: direct position measurement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LidarModel {
    /// Std deviation in x (meters)
    pub std_px: f64,
    /// Std deviation in y (meters)
    pub std_py: f64,
}

impl Default for LidarModel {
    fn default() -> Self {
        Self {
            std_px: 0.15,
            std_py: 0.15,
        }
    }
}

impl LidarModel {
    pub fn new(std_px: f64, std_py: f64) -> Self {
        Self { std_px, std_py }
    }

    /// Observation matrix H selecting [px, py].
    pub fn h_matrix(&self) -> Matrix2x5<f64> {
        Matrix2x5::new(
            1., 0., 0., 0., 0., //
            0., 1., 0., 0., 0.,
        )
    }

    pub fn std_devs(&self) -> [f64; 2] {
        [self.std_px, self.std_py]
    }
}

impl ObservationModel<2> for LidarModel {
    fn r_matrix(&self) -> Matrix2<f64> {
        Matrix2::from_diagonal(&Vector2::new(
            self.std_px * self.std_px,
            self.std_py * self.std_py,
        ))
    }

    fn apply(&self, state: &Vector5<f64>) -> Vector2<f64> {
        self.h_matrix() * state
    }
}

// ---------------------------------------------------------------------------
// Radar (range + bearing + range rate)
// ---------------------------------------------------------------------------

/// Radar observation model. The sensor sits at the world origin and
/// bearing is measured counter-clockwise from the +x axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RadarModel {
    /// Range noise std dev (meters)
    pub std_range: f64,
    /// Bearing noise std dev (radians)
    pub std_bearing: f64,
    /// Range-rate noise std dev (m/s)
    pub std_range_rate: f64,
}

impl Default for RadarModel {
    fn default() -> Self {
        Self {
            std_range: 0.3,
            std_bearing: 0.03,
            std_range_rate: 0.3,
        }
    }
}

impl RadarModel {
    pub fn new(std_range: f64, std_bearing: f64, std_range_rate: f64) -> Self {
        Self {
            std_range,
            std_bearing,
            std_range_rate,
        }
    }

    /// Convert polar [range, bearing] to cartesian [x, y].
    pub fn polar_to_cartesian(range: f64, bearing: f64) -> (f64, f64) {
        (range * bearing.cos(), range * bearing.sin())
    }

    pub fn std_devs(&self) -> [f64; 3] {
        [self.std_range, self.std_bearing, self.std_range_rate]
    }
}

impl ObservationModel<3> for RadarModel {
    fn r_matrix(&self) -> Matrix3<f64> {
        Matrix3::from_diagonal(&Vector3::new(
            self.std_range * self.std_range,
            self.std_bearing * self.std_bearing,
            self.std_range_rate * self.std_range_rate,
        ))
    }

    fn apply(&self, state: &Vector5<f64>) -> Vector3<f64> {
        let (px, py, v, yaw) = (state[0], state[1], state[2], state[3]);
        let range = (px * px + py * py).sqrt();
        Vector3::new(range, bearing(px, py), range_rate(px, py, v, yaw))
    }
}
