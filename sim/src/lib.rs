//! `sim`: scenario simulator with a ground-truth target, lidar/radar measurements
//! and in-memory recordings.

pub mod recording;
pub mod scenarios;
pub mod sensor_sim;
pub mod target;

pub use recording::{RecordedSample, Recording, RunReport};
pub use scenarios::{Scenario, ScenarioKind};
pub use sensor_sim::{ScanSchedule, SensorSimulator};
pub use target::{MotionSpec, Target};
