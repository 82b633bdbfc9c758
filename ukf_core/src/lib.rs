//! `ukf_core`: CTRV unscented Kalman filter for fused lidar/radar tracking.
//!
//! # Module layout
//! - [`types`]: State/measurement types and fixed matrix sizes
//! - [`angle`]: Angle wrapping and the bearing ±π fix
//! - [`sigma`]: Sigma-point weights and augmented sigma generation
//! - [`ctrv`]: CTRV propagation and moment recovery
//! - [`lidar`]: Linear lidar update
//! - [`radar`]: Unscented radar update
//! - [`nis`]: NIS scoring and consistency statistics
//! - [`filter`]: The `Ukf` orchestrator (process / predict / update / forecast)
//! - [`metrics`]: RMSE against ground truth
//! - [`error`]: `FilterError`

pub mod angle;
pub mod ctrv;
pub mod error;
pub mod filter;
pub mod lidar;
pub mod metrics;
pub mod nis;
pub mod radar;
pub mod sigma;
pub mod types;

pub use error::{FilterError, FilterResult};
pub use filter::{ProcessNoise, Ukf, UkfConfig};
pub use nis::ConsistencyMonitor;
pub use types::{
    LidarMeasurement, Measurement, MeasurementPackage, RadarMeasurement, SensorKind, StateCov,
    StateVec,
};
