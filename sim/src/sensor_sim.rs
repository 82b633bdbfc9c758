//! Lidar and radar measurement simulator.
//!
//! Generates asynchronous measurements of one target with:
//! - Gaussian noise per channel, using the same standard deviations the
//!   filter assumes
//! - Independent lidar and radar scan schedules (integer microseconds)
//!
//! All randomness comes from a single seeded `ChaCha8Rng`, so a run is fully
//! reproducible from its seed.

use crate::target::Target;
use nalgebra::Vector5;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Normal, NormalError};
use sensor_models::{LidarModel, ObservationModel, RadarModel};
use serde::{Deserialize, Serialize};
use ukf_core::angle::normalize_angle;
use ukf_core::MeasurementPackage;

/// Fixed-period scan schedule of one sensor.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ScanSchedule {
    /// Scan period (µs). Zero or negative disables the sensor.
    pub period_us: i64,
    /// Next scheduled scan time (µs)
    pub next_us: i64,
}

impl ScanSchedule {
    /// Schedule at `rate_hz`, first scan at `offset_us`.
    pub fn from_rate(rate_hz: f64, offset_us: i64) -> Self {
        let period_us = if rate_hz > 0.0 {
            (1_000_000.0 / rate_hz).round() as i64
        } else {
            0
        };
        Self {
            period_us,
            next_us: offset_us,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.period_us > 0
    }

    /// Check if this sensor should fire at time `t_us`.
    pub fn should_scan(&self, t_us: i64) -> bool {
        self.is_enabled() && t_us >= self.next_us
    }

    /// Advance the schedule by one scan interval.
    pub fn advance(&mut self) {
        self.next_us += self.period_us;
    }
}

/// Per-channel noise distributions of the two sensors.
#[derive(Clone, Debug)]
struct NoiseBank {
    lidar: [Normal<f64>; 2],
    radar: [Normal<f64>; 3],
}

impl NoiseBank {
    fn new(lidar: &LidarModel, radar: &RadarModel) -> Result<Self, NormalError> {
        let [sx, sy] = lidar.std_devs();
        let [sr, sb, srr] = radar.std_devs();
        Ok(Self {
            lidar: [Normal::new(0.0, sx)?, Normal::new(0.0, sy)?],
            radar: [
                Normal::new(0.0, sr)?,
                Normal::new(0.0, sb)?,
                Normal::new(0.0, srr)?,
            ],
        })
    }
}

/// Generates noisy lidar and radar packages from a ground-truth target.
pub struct SensorSimulator {
    pub lidar: LidarModel,
    pub radar: RadarModel,
    pub lidar_schedule: ScanSchedule,
    pub radar_schedule: ScanSchedule,
    noise: NoiseBank,
    rng: ChaCha8Rng,
}

impl SensorSimulator {
    /// Fails if any standard deviation is negative or not finite.
    pub fn new(
        lidar: LidarModel,
        radar: RadarModel,
        lidar_schedule: ScanSchedule,
        radar_schedule: ScanSchedule,
        seed: u64,
    ) -> Result<Self, NormalError> {
        let noise = NoiseBank::new(&lidar, &radar)?;
        Ok(Self {
            lidar,
            radar,
            lidar_schedule,
            radar_schedule,
            noise,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// All packages due at or before `t_us`, lidar first when both fire.
    pub fn sample(&mut self, target: &Target, t_us: i64) -> Vec<MeasurementPackage> {
        let mut packages = Vec::new();

        if self.lidar_schedule.should_scan(t_us) {
            self.lidar_schedule.advance();
            packages.push(self.lidar_package(target, t_us));
        }
        if self.radar_schedule.should_scan(t_us) {
            self.radar_schedule.advance();
            packages.push(self.radar_package(target, t_us));
        }

        packages
    }

    /// Noisy position fix of `target`.
    pub fn lidar_package(&mut self, target: &Target, t_us: i64) -> MeasurementPackage {
        let z = self.lidar.apply(&Vector5::from(target.state));
        let [nx, ny] = &self.noise.lidar;
        MeasurementPackage::lidar(
            t_us,
            z[0] + nx.sample(&mut self.rng),
            z[1] + ny.sample(&mut self.rng),
        )
    }

    /// Noisy polar observation of `target` from a radar at the origin.
    /// The reported bearing is wrapped to (−π, π].
    pub fn radar_package(&mut self, target: &Target, t_us: i64) -> MeasurementPackage {
        let z = self.radar.apply(&Vector5::from(target.state));
        let [nr, nb, nrr] = &self.noise.radar;
        let range = (z[0] + nr.sample(&mut self.rng)).max(0.0);
        let bearing = normalize_angle(z[1] + nb.sample(&mut self.rng));
        let range_rate = z[2] + nrr.sample(&mut self.rng);
        MeasurementPackage::radar(t_us, range, bearing, range_rate)
    }
}
