//! `sensor_models`: Lidar/radar observation models and measurement geometry.

pub mod observation;
pub mod radar;

pub use observation::{LidarModel, ObservationModel, RadarModel};
