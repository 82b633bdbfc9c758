//! Scenario definitions.
//!
//! Each scenario is a single target, a lidar and a radar co-located at the
//! origin, and their scan rates. All scenarios are deterministic given the
//! same seed.

use crate::recording::{RecordedSample, Recording};
use crate::sensor_sim::{ScanSchedule, SensorSimulator};
use crate::target::{MotionSpec, Target};
use rand_distr::NormalError;
use sensor_models::{LidarModel, RadarModel};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which pre-defined scenario to load.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenarioKind {
    /// Constant speed and heading, passing the sensor at a few meters
    Straight,
    /// Constant turn around a circle that crosses the −x axis
    Circle,
    /// Straight, left turn, right turn, straight
    SCurve,
}

/// A fully configured simulation scenario.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    /// seconds
    pub duration: f64,
    /// Simulation tick (µs) between ground-truth steps
    pub tick_us: i64,
    pub lidar_rate_hz: f64,
    pub radar_rate_hz: f64,
    /// First radar scan time (µs), so the two sensors interleave
    pub radar_offset_us: i64,
    pub target: Target,
    pub lidar: LidarModel,
    pub radar: RadarModel,
}

impl Scenario {
    /// Build the named scenario. Uses `seed` for repeatability.
    pub fn build(kind: ScenarioKind, seed: u64) -> Self {
        match kind {
            ScenarioKind::Straight => Self::straight(seed),
            ScenarioKind::Circle => Self::circle(seed),
            ScenarioKind::SCurve => Self::s_curve(seed),
        }
    }

    fn with_target(name: &str, seed: u64, duration: f64, target: Target) -> Self {
        Scenario {
            name: name.into(),
            seed,
            duration,
            tick_us: 25_000,
            lidar_rate_hz: 20.0,
            radar_rate_hz: 20.0,
            radar_offset_us: 25_000,
            target,
            lidar: LidarModel::default(),
            radar: RadarModel::default(),
        }
    }

    fn straight(seed: u64) -> Self {
        let target = Target::new((-10.0, 3.0), 3.0, 0.1, MotionSpec::Straight);
        Self::with_target("straight", seed, 25.0, target)
    }

    // Radius v/ω = 20 m around (−10, 0): the track passes behind the sensor
    // through (−30, 0), where the bearing wraps.
    fn circle(seed: u64) -> Self {
        let target = Target::new(
            (10.0, 0.0),
            5.0,
            std::f64::consts::FRAC_PI_2,
            MotionSpec::ConstantTurn { yaw_rate: 0.25 },
        );
        Self::with_target("circle", seed, 30.0, target)
    }

    fn s_curve(seed: u64) -> Self {
        let motion = MotionSpec::Segmented {
            segments: vec![
                (0.0, Box::new(MotionSpec::Straight)),
                (5.0, Box::new(MotionSpec::ConstantTurn { yaw_rate: 0.4 })),
                (10.0, Box::new(MotionSpec::ConstantTurn { yaw_rate: -0.4 })),
                (15.0, Box::new(MotionSpec::Straight)),
            ],
        };
        let target = Target::new((-15.0, -5.0), 4.0, 0.0, motion);
        Self::with_target("s-curve", seed, 25.0, target)
    }

    /// Run the ground truth forward and sample both sensors.
    ///
    /// Each package is paired with the true kinematics at its timestamp.
    pub fn record(&self) -> Result<Recording, NormalError> {
        let mut target = self.target.clone();
        let mut sensors = SensorSimulator::new(
            self.lidar.clone(),
            self.radar.clone(),
            ScanSchedule::from_rate(self.lidar_rate_hz, 0),
            ScanSchedule::from_rate(self.radar_rate_hz, self.radar_offset_us),
            self.seed,
        )?;

        let dt = self.tick_us as f64 / 1_000_000.0;
        let end_us = (self.duration * 1_000_000.0).round() as i64;
        let mut samples = Vec::new();
        let mut t_us = 0i64;

        while t_us <= end_us {
            let truth = target.ground_truth();
            for package in sensors.sample(&target, t_us) {
                samples.push(RecordedSample { package, truth });
            }
            target.step(t_us as f64 / 1_000_000.0, dt);
            t_us += self.tick_us;
        }

        debug!(
            scenario = %self.name,
            seed = self.seed,
            samples = samples.len(),
            "scenario recorded"
        );

        Ok(Recording {
            scenario_name: self.name.clone(),
            seed: self.seed,
            samples,
        })
    }
}
