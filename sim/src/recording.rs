//! In-memory recording of a simulated run and its offline evaluation.

use serde::{Deserialize, Serialize};
use ukf_core::metrics::{GroundTruth, RmseAccumulator};
use ukf_core::{FilterResult, MeasurementPackage, SensorKind, Ukf};

/// One measurement paired with the true kinematics at its timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedSample {
    pub package: MeasurementPackage,
    pub truth: GroundTruth,
}

/// A full recorded simulation, in chronological order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Recording {
    pub scenario_name: String,
    pub seed: u64,
    pub samples: Vec<RecordedSample>,
}

/// Summary of one filter pass over a recording.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub scenario: String,
    pub seed: u64,
    pub measurements: usize,
    /// RMSE of [px, py, vx, vy]
    pub rmse: [f64; 4],
    /// Final estimate [px, py, v, yaw, yaw_rate]
    pub final_state: [f64; 5],
    /// Share of lidar NIS values above the 95% χ² bound (2 dof)
    pub lidar_nis_exceedance: f64,
    /// Share of radar NIS values above the 95% χ² bound (3 dof)
    pub radar_nis_exceedance: f64,
    /// Raw squared errors, for pooling across runs
    pub errors: RmseAccumulator,
}

impl Recording {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of packages from `sensor`.
    pub fn count(&self, sensor: SensorKind) -> usize {
        self.samples
            .iter()
            .filter(|s| s.package.measurement.sensor() == sensor)
            .count()
    }

    pub fn packages(&self) -> impl Iterator<Item = &MeasurementPackage> + '_ {
        self.samples.iter().map(|s| &s.package)
    }

    /// Feed every package to `ukf` in order and accumulate the estimation
    /// error after each step. Stops at the first filter error.
    pub fn run_filter(&self, ukf: &mut Ukf) -> FilterResult<RmseAccumulator> {
        let mut acc = RmseAccumulator::new();
        for sample in &self.samples {
            ukf.process_measurement(&sample.package)?;
            acc.accumulate(ukf.state(), &sample.truth);
        }
        Ok(acc)
    }

    /// Run a fresh filter over the recording and summarize the result.
    pub fn evaluate(&self, ukf: &mut Ukf) -> FilterResult<RunReport> {
        let acc = self.run_filter(ukf)?;
        let x = ukf.state();
        let consistency = ukf.consistency();
        Ok(RunReport {
            scenario: self.scenario_name.clone(),
            seed: self.seed,
            measurements: self.samples.len(),
            rmse: acc.rmse(),
            final_state: [x[0], x[1], x[2], x[3], x[4]],
            lidar_nis_exceedance: consistency.track(SensorKind::Lidar).exceedance_ratio(),
            radar_nis_exceedance: consistency.track(SensorKind::Radar).exceedance_ratio(),
            errors: acc,
        })
    }
}
