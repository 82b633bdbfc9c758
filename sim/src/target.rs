//! Ground-truth target motion.
//!
//! Each target has a CTRV true state [px, py, v, yaw, yaw_rate] and a
//! `MotionSpec` describing how its speed and yaw rate evolve. The simulator
//! steps the target forward in time with the exact CTRV integral.

use serde::{Deserialize, Serialize};
use ukf_core::metrics::GroundTruth;

/// Describes how the target manoeuvres.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MotionSpec {
    /// Constant speed and heading.
    Straight,
    /// Constant yaw rate (rad/s).
    ConstantTurn { yaw_rate: f64 },
    /// Switch motion at given sim times.
    /// `segments` is sorted by time ascending: [(t_start, MotionSpec), ...].
    /// The active spec is the last one whose t_start <= current_t.
    Segmented {
        segments: Vec<(f64, Box<MotionSpec>)>,
    },
}

impl MotionSpec {
    /// Yaw rate commanded at time `t`.
    fn yaw_rate_at(&self, t: f64) -> f64 {
        match self {
            MotionSpec::Straight => 0.0,
            MotionSpec::ConstantTurn { yaw_rate } => *yaw_rate,
            MotionSpec::Segmented { segments } => segments
                .iter()
                .filter(|(t_start, _)| *t_start <= t)
                .last()
                .map(|(_, spec)| spec.yaw_rate_at(t))
                .unwrap_or(0.0),
        }
    }
}

/// A simulated target with ground-truth state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Target {
    /// True state [px, py, v, yaw, yaw_rate]
    pub state: [f64; 5],
    pub motion: MotionSpec,
}

impl Target {
    pub fn new(position: (f64, f64), speed: f64, heading: f64, motion: MotionSpec) -> Self {
        let yaw_rate = motion.yaw_rate_at(0.0);
        Self {
            state: [position.0, position.1, speed, heading, yaw_rate],
            motion,
        }
    }

    /// Propagate true state from `t` by `dt` seconds.
    pub fn step(&mut self, t: f64, dt: f64) {
        let s = &mut self.state;
        s[4] = self.motion.yaw_rate_at(t);
        let (v, yaw, yaw_rate) = (s[2], s[3], s[4]);

        if yaw_rate.abs() < 1e-9 {
            s[0] += v * yaw.cos() * dt;
            s[1] += v * yaw.sin() * dt;
        } else {
            let yaw_end = yaw + yaw_rate * dt;
            s[0] += v / yaw_rate * (yaw_end.sin() - yaw.sin());
            s[1] += v / yaw_rate * (yaw.cos() - yaw_end.cos());
        }
        s[3] = (yaw + yaw_rate * dt).sin().atan2((yaw + yaw_rate * dt).cos());
    }

    /// 2D position
    pub fn pos_2d(&self) -> (f64, f64) {
        (self.state[0], self.state[1])
    }

    /// Cartesian velocity (vx, vy)
    pub fn velocity(&self) -> (f64, f64) {
        let (v, yaw) = (self.state[2], self.state[3]);
        (v * yaw.cos(), v * yaw.sin())
    }

    pub fn ground_truth(&self) -> GroundTruth {
        let (vx, vy) = self.velocity();
        GroundTruth {
            px: self.state[0],
            py: self.state[1],
            vx,
            vy,
        }
    }
}
