//! Innovation consistency: Normalized Innovation Squared (NIS).
//!
//! # Statistic
//! ε = νᵀ S⁻¹ ν  where ν is the innovation and S its covariance.
//!
//! For a consistent filter ε is χ²-distributed with as many degrees of
//! freedom as the measurement has components, so about 5% of the values
//! should exceed χ²(0.95, dof).
//!
//! # Threshold table (95%)
//! dof=2 (lidar): 5.991
//! dof=3 (radar): 7.815

use crate::error::{FilterError, FilterResult};
use crate::types::SensorKind;
use nalgebra::{SMatrix, SVector};
use serde::{Deserialize, Serialize};

/// Pre-computed χ² values indexed by degrees of freedom [0..=5].
/// Value at index `d` is χ²(0.95, d).
pub const CHI2_95: [f64; 6] = [0.0, 3.841, 5.991, 7.815, 9.488, 11.070];

/// Smallest accepted ratio between the smallest and largest squared
/// Cholesky pivot of S. Scale-free, so small but well-conditioned S pass.
pub const MIN_PIVOT_RATIO: f64 = 1e-12;

/// ε = νᵀ S⁻¹ ν
pub fn normalized_innovation_squared<const M: usize>(
    innovation: &SVector<f64, M>,
    s_inv: &SMatrix<f64, M, M>,
) -> f64 {
    innovation.dot(&(s_inv * innovation))
}

/// Invert S, reporting a degenerate update instead of inverting blindly.
///
/// S must be symmetric positive definite and not ill-conditioned relative to
/// its own scale.
pub fn invert_innovation<const M: usize>(
    s: &SMatrix<f64, M, M>,
    sensor: SensorKind,
) -> FilterResult<SMatrix<f64, M, M>> {
    let degenerate = FilterError::DegenerateInnovation { sensor };
    if s.iter().any(|v| !v.is_finite()) {
        return Err(degenerate);
    }

    let sym = (s + s.transpose()) * 0.5;
    let chol = sym.cholesky().ok_or_else(|| degenerate.clone())?;

    let pivots = chol.l_dirty().diagonal();
    if pivots.iter().any(|d| !d.is_finite() || *d <= 0.0) {
        return Err(degenerate);
    }
    let (min, max) = (pivots.min(), pivots.max());
    if (min * min) / (max * max) < MIN_PIVOT_RATIO {
        return Err(degenerate);
    }

    let inv = chol.inverse();
    if inv.iter().any(|v| !v.is_finite()) {
        return Err(degenerate);
    }
    Ok(inv)
}

/// Running NIS record for one sensor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NisTrack {
    /// Most recent value (0 until the first update)
    pub last: f64,
    /// Number of updates scored
    pub count: u64,
    /// Number of values above the 95% χ² threshold
    pub exceedances: u64,
    /// Sum of all values, for the mean
    pub sum: f64,
}

impl NisTrack {
    fn record(&mut self, nis: f64, threshold: f64) {
        self.last = nis;
        self.count += 1;
        self.sum += nis;
        if nis > threshold {
            self.exceedances += 1;
        }
    }

    /// Fraction of values above the threshold; ≈0.05 for a well-tuned filter.
    pub fn exceedance_ratio(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.exceedances as f64 / self.count as f64
    }

    /// Mean NIS; ≈dof for a well-tuned filter.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }
}

/// Per-sensor NIS bookkeeping, fed after every successful update.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyMonitor {
    pub lidar: NisTrack,
    pub radar: NisTrack,
}

impl ConsistencyMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sensor: SensorKind, nis: f64) {
        let threshold = CHI2_95[sensor.dim()];
        match sensor {
            SensorKind::Lidar => self.lidar.record(nis, threshold),
            SensorKind::Radar => self.radar.record(nis, threshold),
        }
    }

    pub fn track(&self, sensor: SensorKind) -> &NisTrack {
        match sensor {
            SensorKind::Lidar => &self.lidar,
            SensorKind::Radar => &self.radar,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
