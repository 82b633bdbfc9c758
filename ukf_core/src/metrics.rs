//! Estimation accuracy: RMSE of position and cartesian velocity.

use crate::types::StateVec;
use serde::{Deserialize, Serialize};

/// Ground-truth kinematics of the tracked object at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundTruth {
    pub px: f64,
    pub py: f64,
    pub vx: f64,
    pub vy: f64,
}

/// Accumulated squared errors over [px, py, vx, vy].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RmseAccumulator {
    /// Number of (estimate, truth) pairs accumulated
    pub n: u64,
    /// Per-component sums of squared errors
    pub sum_sq: [f64; 4],
}

impl RmseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one estimate. The CTRV speed/heading is converted to (vx, vy).
    pub fn accumulate(&mut self, estimate: &StateVec, truth: &GroundTruth) {
        let (v, yaw) = (estimate[2], estimate[3]);
        let est = [estimate[0], estimate[1], v * yaw.cos(), v * yaw.sin()];
        let gt = [truth.px, truth.py, truth.vx, truth.vy];
        for (acc, (e, g)) in self.sum_sq.iter_mut().zip(est.iter().zip(gt.iter())) {
            let d = e - g;
            *acc += d * d;
        }
        self.n += 1;
    }

    /// Root-mean-square error per component [px, py, vx, vy].
    pub fn rmse(&self) -> [f64; 4] {
        if self.n == 0 {
            return [0.0; 4];
        }
        self.sum_sq.map(|s| (s / self.n as f64).sqrt())
    }

    /// Merge another accumulator (e.g. from a parallel run).
    pub fn merge(&mut self, other: &RmseAccumulator) {
        self.n += other.n;
        for (a, b) in self.sum_sq.iter_mut().zip(other.sum_sq.iter()) {
            *a += b;
        }
    }
}
