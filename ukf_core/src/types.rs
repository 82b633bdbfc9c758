//! Fundamental types used across the filter.

use nalgebra::{Matrix2, Matrix5, SMatrix, SVector, Vector2, Vector3, Vector5};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Dimensions
// ---------------------------------------------------------------------------

/// State dimension: [px, py, v, yaw, yaw_rate]
pub const N_X: usize = 5;
/// Augmented dimension: state + [nu_a, nu_yawdd]
pub const N_AUG: usize = 7;
/// Number of sigma points: 2·n_aug + 1
pub const N_SIG: usize = 2 * N_AUG + 1;
/// Sigma-point spreading parameter λ = 3 − n_aug
pub const LAMBDA: f64 = 3.0 - N_AUG as f64;

/// Index of the heading component in the state vector.
pub const YAW: usize = 3;
/// Index of the bearing component in a radar measurement.
pub const BEARING: usize = 1;

// ---------------------------------------------------------------------------
// Matrix aliases: f64 throughout, fixed sizes so dimensions are checked at
// compile time.
// ---------------------------------------------------------------------------

/// CTRV state vector: [px, py, v, yaw, yaw_rate]
pub type StateVec = Vector5<f64>;

/// 5×5 state covariance
pub type StateCov = Matrix5<f64>;

/// Augmented state [px, py, v, yaw, yaw_rate, nu_a, nu_yawdd]
pub type AugStateVec = SVector<f64, N_AUG>;

/// 7×7 augmented covariance
pub type AugStateCov = SMatrix<f64, N_AUG, N_AUG>;

/// 2×2 process noise covariance Q
pub type ProcessCov = Matrix2<f64>;

/// Augmented sigma points, one per column (7×15)
pub type AugSigmaPoints = SMatrix<f64, N_AUG, N_SIG>;

/// Propagated sigma points, one per column (5×15)
pub type SigmaPoints = SMatrix<f64, N_X, N_SIG>;

/// Radar sigma points projected into measurement space (3×15)
pub type RadarSigmaPoints = SMatrix<f64, 3, N_SIG>;

/// Sigma-point weights
pub type Weights = SVector<f64, N_SIG>;

// ---------------------------------------------------------------------------
// Measurements
// ---------------------------------------------------------------------------

/// Direct position observation (meters).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LidarMeasurement {
    pub px: f64,
    pub py: f64,
}

impl LidarMeasurement {
    pub fn new(px: f64, py: f64) -> Self {
        Self { px, py }
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.px, self.py)
    }
}

/// Polar observation from a radar at the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RadarMeasurement {
    /// Range (meters)
    pub range: f64,
    /// Bearing (radians, counter-clockwise from +x)
    pub bearing: f64,
    /// Range rate (m/s)
    pub range_rate: f64,
}

impl RadarMeasurement {
    pub fn new(range: f64, bearing: f64, range_rate: f64) -> Self {
        Self {
            range,
            bearing,
            range_rate,
        }
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.range, self.bearing, self.range_rate)
    }
}

/// The observation carried by a [`MeasurementPackage`]. The variant fixes the
/// dimensionality.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Measurement {
    Lidar(LidarMeasurement),
    Radar(RadarMeasurement),
}

impl Measurement {
    pub fn sensor(&self) -> SensorKind {
        match self {
            Measurement::Lidar(_) => SensorKind::Lidar,
            Measurement::Radar(_) => SensorKind::Radar,
        }
    }
}

/// A single timestamped measurement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPackage {
    /// Measurement time in microseconds, non-decreasing across calls
    pub timestamp_us: i64,
    pub measurement: Measurement,
}

impl MeasurementPackage {
    pub fn lidar(timestamp_us: i64, px: f64, py: f64) -> Self {
        Self {
            timestamp_us,
            measurement: Measurement::Lidar(LidarMeasurement::new(px, py)),
        }
    }

    pub fn radar(timestamp_us: i64, range: f64, bearing: f64, range_rate: f64) -> Self {
        Self {
            timestamp_us,
            measurement: Measurement::Radar(RadarMeasurement::new(range, bearing, range_rate)),
        }
    }
}

/// Sensor modality tag, used for logging and error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    Lidar,
    Radar,
}

impl SensorKind {
    /// Measurement dimension, i.e. the NIS degrees of freedom.
    pub fn dim(&self) -> usize {
        match self {
            SensorKind::Lidar => 2,
            SensorKind::Radar => 3,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Lidar => write!(f, "lidar"),
            SensorKind::Radar => write!(f, "radar"),
        }
    }
}
