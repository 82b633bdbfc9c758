//! Filter orchestrator: the full cycle for one measurement package.
//!
//! # Processing steps per measurement
//! 1. First measurement: initialize x, P = I and the clock, then stop
//! 2. Δt = (timestamp − last timestamp) / 1e6
//! 3. Prediction: augmented sigma points → CTRV propagation → mean/covariance
//! 4. Update with the sensor that produced the measurement (if enabled)
//! 5. Record NIS
//!
//! Every step computes into locals and commits only on success. A failed
//! update in `process_measurement` also rolls back the prediction of that
//! cycle, so an `Err` leaves x, P and the timestamp as they were.

use crate::{
    angle::normalize_angle,
    ctrv::{predicted_covariance, predicted_mean, propagate},
    error::{FilterError, FilterResult},
    lidar::{self, LidarUpdate},
    nis::ConsistencyMonitor,
    radar::{self, RadarUpdate},
    sigma::SigmaPointGenerator,
    types::{
        LidarMeasurement, Measurement, MeasurementPackage, ProcessCov, RadarMeasurement,
        SensorKind, SigmaPoints, StateCov, StateVec, Weights, YAW,
    },
};
use nalgebra::{Matrix2, Matrix2x5, Vector2};
use sensor_models::{LidarModel, ObservationModel, RadarModel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Process noise of the CTRV model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessNoise {
    /// Longitudinal acceleration std dev (m/s²)
    pub std_a: f64,
    /// Yaw acceleration std dev (rad/s²)
    pub std_yawdd: f64,
}

impl Default for ProcessNoise {
    fn default() -> Self {
        Self {
            std_a: 0.8,
            std_yawdd: 0.6,
        }
    }
}

/// Configuration for the filter, fixed at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UkfConfig {
    /// When false, lidar measurements only initialize the filter.
    pub use_lidar: bool,
    /// When false, radar measurements only initialize the filter.
    pub use_radar: bool,
    pub process_noise: ProcessNoise,
    pub lidar: LidarModel,
    pub radar: RadarModel,
}

impl Default for UkfConfig {
    fn default() -> Self {
        Self {
            use_lidar: true,
            use_radar: true,
            process_noise: ProcessNoise::default(),
            lidar: LidarModel::default(),
            radar: RadarModel::default(),
        }
    }
}

impl UkfConfig {
    /// Reject noise settings the filter cannot run with.
    ///
    /// Process noise must be strictly positive (P_aug would be singular
    /// otherwise); measurement noise may be zero.
    pub fn validate(&self) -> FilterResult<()> {
        let process = [
            ("std_a", self.process_noise.std_a),
            ("std_yawdd", self.process_noise.std_yawdd),
        ];
        for (name, value) in process {
            if !value.is_finite() || value <= 0.0 {
                return Err(FilterError::InvalidConfig(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }

        let [lx, ly] = self.lidar.std_devs();
        let [rr, rb, rd] = self.radar.std_devs();
        let measurement = [
            ("lidar std_px", lx),
            ("lidar std_py", ly),
            ("radar std_range", rr),
            ("radar std_bearing", rb),
            ("radar std_range_rate", rd),
        ];
        for (name, value) in measurement {
            if !value.is_finite() || value < 0.0 {
                return Err(FilterError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// CTRV unscented Kalman filter for one tracked object.
#[derive(Clone, Debug)]
pub struct Ukf {
    pub config: UkfConfig,
    initialized: bool,
    /// State [px, py, v, yaw, yaw_rate]
    x: StateVec,
    /// State covariance
    p: StateCov,
    /// Time of the last processed measurement (µs)
    time_us: i64,
    /// Sigma points propagated by the last prediction, consumed by the radar
    /// update of the same cycle.
    predicted_sigma: Option<SigmaPoints>,
    generator: SigmaPointGenerator,
    q: ProcessCov,
    h_lidar: Matrix2x5<f64>,
    r_lidar: Matrix2<f64>,
    nis_lidar: f64,
    nis_radar: f64,
    consistency: ConsistencyMonitor,
}

impl Ukf {
    pub fn new(config: UkfConfig) -> FilterResult<Self> {
        config.validate()?;
        let q = ProcessCov::from_diagonal(&Vector2::new(
            config.process_noise.std_a.powi(2),
            config.process_noise.std_yawdd.powi(2),
        ));
        Ok(Self {
            initialized: false,
            x: StateVec::zeros(),
            p: StateCov::zeros(),
            time_us: 0,
            predicted_sigma: None,
            generator: SigmaPointGenerator::new(),
            q,
            h_lidar: config.lidar.h_matrix(),
            r_lidar: config.lidar.r_matrix(),
            nis_lidar: 0.0,
            nis_radar: 0.0,
            consistency: ConsistencyMonitor::new(),
            config,
        })
    }

    // -----------------------------------------------------------------------
    // Readouts
    // -----------------------------------------------------------------------

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn state(&self) -> &StateVec {
        &self.x
    }

    pub fn covariance(&self) -> &StateCov {
        &self.p
    }

    pub fn last_timestamp_us(&self) -> i64 {
        self.time_us
    }

    /// NIS of the last lidar update (0 before the first one).
    pub fn nis_lidar(&self) -> f64 {
        self.nis_lidar
    }

    /// NIS of the last radar update (0 before the first one).
    pub fn nis_radar(&self) -> f64 {
        self.nis_radar
    }

    pub fn consistency(&self) -> &ConsistencyMonitor {
        &self.consistency
    }

    pub fn weights(&self) -> &Weights {
        self.generator.weights()
    }

    // -----------------------------------------------------------------------
    // Cycle
    // -----------------------------------------------------------------------

    /// Advance the filter by exactly one measurement.
    ///
    /// Timestamps must be non-decreasing; this is not enforced. On `Err` the
    /// estimate, covariance and clock are restored to their values before
    /// the call.
    pub fn process_measurement(&mut self, pkg: &MeasurementPackage) -> FilterResult<()> {
        if !self.initialized {
            self.initialize(pkg);
            return Ok(());
        }

        let dt = (pkg.timestamp_us - self.time_us) as f64 / 1_000_000.0;
        if dt < 0.0 {
            warn!(dt, timestamp_us = pkg.timestamp_us, "time step goes backwards");
        } else if dt == 0.0 {
            debug!(timestamp_us = pkg.timestamp_us, "simultaneous measurement");
        }

        let snapshot = (self.x, self.p, self.time_us);
        let result = self.predict_and_update(pkg, dt);
        if result.is_err() {
            (self.x, self.p, self.time_us) = snapshot;
            self.predicted_sigma = None;
        }
        result
    }

    fn predict_and_update(&mut self, pkg: &MeasurementPackage, dt: f64) -> FilterResult<()> {
        self.prediction(dt)?;
        self.time_us = pkg.timestamp_us;

        match &pkg.measurement {
            Measurement::Lidar(z) if self.config.use_lidar => {
                self.update_lidar(z)?;
            }
            Measurement::Radar(z) if self.config.use_radar => {
                self.update_radar(z)?;
            }
            other => {
                debug!(sensor = %other.sensor(), "sensor disabled, update skipped");
                self.predicted_sigma = None;
            }
        }
        Ok(())
    }

    /// Initialize from the first measurement. Speed, heading and yaw rate are
    /// unobservable from a single fix and start at zero; P starts at I.
    fn initialize(&mut self, pkg: &MeasurementPackage) {
        let (px, py) = match &pkg.measurement {
            Measurement::Lidar(z) => (z.px, z.py),
            Measurement::Radar(z) => RadarModel::polar_to_cartesian(z.range, z.bearing),
        };
        self.initialize_with(
            StateVec::new(px, py, 0.0, 0.0, 0.0),
            StateCov::identity(),
            pkg.timestamp_us,
        );
        info!(
            sensor = %pkg.measurement.sensor(),
            px,
            py,
            timestamp_us = pkg.timestamp_us,
            "filter initialized"
        );
    }

    /// Set the estimate directly and mark the filter initialized.
    pub fn initialize_with(&mut self, x: StateVec, p: StateCov, timestamp_us: i64) {
        self.x = x;
        self.x[YAW] = normalize_angle(self.x[YAW]);
        self.p = p;
        self.time_us = timestamp_us;
        self.predicted_sigma = None;
        self.initialized = true;
    }

    /// Predict x and P forward by `dt` seconds and cache the propagated sigma
    /// points for a radar update.
    pub fn prediction(&mut self, dt: f64) -> FilterResult<()> {
        self.ensure_initialized()?;
        self.predicted_sigma = None;

        let sigma_aug = self.generator.generate(&self.x, &self.p, &self.q)?;
        let sigma = propagate(&sigma_aug, dt);
        let x = predicted_mean(&sigma, self.generator.weights());
        let p = predicted_covariance(&sigma, self.generator.weights(), &x);

        self.commit(x, p)?;
        self.predicted_sigma = Some(sigma);
        debug!(dt, px = self.x[0], py = self.x[1], "prediction");
        Ok(())
    }

    /// Linear correction with a lidar position fix.
    pub fn update_lidar(&mut self, z: &LidarMeasurement) -> FilterResult<LidarUpdate> {
        self.ensure_initialized()?;
        self.predicted_sigma = None;

        let res = lidar::update(&self.x, &self.p, &z.to_vector(), &self.h_lidar, &self.r_lidar)?;
        self.commit(res.state, res.cov)?;
        self.nis_lidar = res.nis;
        self.consistency.record(SensorKind::Lidar, res.nis);
        debug!(nis = res.nis, "lidar update");
        Ok(res)
    }

    /// Unscented correction with a radar measurement, using the sigma points
    /// of the prediction that preceded it.
    pub fn update_radar(&mut self, z: &RadarMeasurement) -> FilterResult<RadarUpdate> {
        self.ensure_initialized()?;
        let sigma = self
            .predicted_sigma
            .take()
            .ok_or(FilterError::MissingPrediction)?;

        let res = radar::update(
            &self.x,
            &self.p,
            &sigma,
            self.generator.weights(),
            &z.to_vector(),
            &self.config.radar,
        )?;
        self.commit(res.state, res.cov)?;
        self.nis_radar = res.nis;
        self.consistency.record(SensorKind::Radar, res.nis);
        debug!(nis = res.nis, "radar update");
        Ok(res)
    }

    /// Mean state `dt` seconds ahead of the current estimate.
    ///
    /// Read-only: x, P and the sigma cache are left untouched.
    pub fn predict_future(&self, dt: f64) -> FilterResult<StateVec> {
        self.ensure_initialized()?;
        let sigma_aug = self.generator.generate(&self.x, &self.p, &self.q)?;
        let sigma = propagate(&sigma_aug, dt);
        Ok(predicted_mean(&sigma, self.generator.weights()))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn ensure_initialized(&self) -> FilterResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(FilterError::NotInitialized)
        }
    }

    /// Wrap the heading, symmetrize P, screen for divergence, then store.
    fn commit(&mut self, mut x: StateVec, p: StateCov) -> FilterResult<()> {
        x[YAW] = normalize_angle(x[YAW]);
        let p = (p + p.transpose()) * 0.5;

        if x.iter().any(|v| !v.is_finite()) {
            return Err(FilterError::divergence("non-finite state"));
        }
        if p.iter().any(|v| !v.is_finite()) {
            return Err(FilterError::divergence("non-finite covariance"));
        }
        if let Some(i) = (0..p.nrows()).find(|&i| p[(i, i)] < 0.0) {
            return Err(FilterError::divergence(format!(
                "negative variance {} on diagonal {i}",
                p[(i, i)]
            )));
        }

        self.x = x;
        self.p = p;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn default_ukf() -> Ukf {
        Ukf::new(UkfConfig::default()).unwrap()
    }

    fn is_psd(p: &StateCov) -> bool {
        let sym = (p + p.transpose()) * 0.5;
        sym.symmetric_eigenvalues().iter().all(|&l| l > -1e-9)
    }

    #[test]
    fn first_lidar_measurement_initializes() {
        let mut ukf = default_ukf();
        assert!(!ukf.is_initialized());
        ukf.process_measurement(&MeasurementPackage::lidar(0, 5.0, 3.0)).unwrap();

        assert!(ukf.is_initialized());
        assert_eq!(*ukf.state(), StateVec::new(5.0, 3.0, 0.0, 0.0, 0.0));
        assert_eq!(*ukf.covariance(), StateCov::identity());
        assert_eq!(ukf.last_timestamp_us(), 0);
    }

    #[test]
    fn first_radar_measurement_converts_polar() {
        let mut ukf = default_ukf();
        ukf.process_measurement(&MeasurementPackage::radar(7, 2.0, PI / 2.0, 1.0)).unwrap();
        assert_abs_diff_eq!(ukf.state()[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ukf.state()[1], 2.0, epsilon = 1e-12);
        assert_eq!(ukf.state()[2], 0.0);
        assert_eq!(ukf.last_timestamp_us(), 7);
    }

    #[test]
    fn lidar_then_radar_cycle() {
        let mut ukf = default_ukf();
        ukf.process_measurement(&MeasurementPackage::lidar(0, 5.0, 3.0)).unwrap();
        ukf.process_measurement(&MeasurementPackage::radar(100_000, 6.0, 0.3, 1.0))
            .unwrap();

        assert!(ukf.nis_radar().is_finite());
        assert!(ukf.nis_radar() >= 0.0);
        assert_eq!(ukf.last_timestamp_us(), 100_000);
        let p = ukf.covariance();
        assert_abs_diff_eq!(*p, p.transpose(), epsilon = 1e-12);
        assert!(is_psd(p));
        assert_eq!(ukf.consistency().radar.count, 1);
    }

    #[test]
    fn predict_future_zero_is_identity_and_read_only() {
        let mut ukf = default_ukf();
        ukf.process_measurement(&MeasurementPackage::lidar(0, 5.0, 3.0)).unwrap();
        ukf.process_measurement(&MeasurementPackage::lidar(50_000, 5.1, 3.0)).unwrap();
        let x_before = *ukf.state();
        let p_before = *ukf.covariance();

        let future = ukf.predict_future(0.0).unwrap();
        assert_abs_diff_eq!(future, x_before, epsilon = 1e-9);

        let _ = ukf.predict_future(1.5).unwrap();
        assert_eq!(*ukf.state(), x_before);
        assert_eq!(*ukf.covariance(), p_before);
    }

    #[test]
    fn predict_future_does_not_disturb_next_cycle() {
        let mut a = default_ukf();
        a.process_measurement(&MeasurementPackage::lidar(0, 5.0, 3.0)).unwrap();
        let mut b = a.clone();

        let _ = b.predict_future(0.7).unwrap();
        let next = MeasurementPackage::radar(100_000, 6.0, 0.3, 1.0);
        a.process_measurement(&next).unwrap();
        b.process_measurement(&next).unwrap();
        assert_eq!(a.state(), b.state());
        assert_eq!(a.covariance(), b.covariance());
    }

    #[test]
    fn predict_future_moves_along_heading() {
        let mut ukf = default_ukf();
        let mut p = StateCov::identity() * 0.01;
        p[(4, 4)] = 1e-4;
        ukf.initialize_with(StateVec::new(10.0, 10.0, 2.0, 0.0, 0.0), p, 0);
        let future = ukf.predict_future(1.0).unwrap();
        assert_abs_diff_eq!(future[0], 12.0, epsilon = 0.05);
        assert_abs_diff_eq!(future[1], 10.0, epsilon = 0.05);
    }

    #[test]
    fn perfect_lidar_pins_position() {
        let config = UkfConfig {
            lidar: LidarModel::new(0.0, 0.0),
            ..Default::default()
        };
        let mut ukf = Ukf::new(config).unwrap();
        let mut p = StateCov::identity() * 3.0;
        p[(0, 3)] = 0.5;
        p[(3, 0)] = 0.5;
        ukf.initialize_with(StateVec::new(1.0, 2.0, 3.0, 0.2, 0.1), p, 0);
        ukf.update_lidar(&LidarMeasurement::new(4.0, -2.0)).unwrap();
        assert_abs_diff_eq!(ukf.state()[0], 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ukf.state()[1], -2.0, epsilon = 1e-9);
    }

    #[test]
    fn radar_update_needs_prediction() {
        let mut ukf = default_ukf();
        ukf.initialize_with(StateVec::new(5.0, 3.0, 0.0, 0.0, 0.0), StateCov::identity(), 0);
        let z = RadarMeasurement::new(6.0, 0.3, 1.0);
        assert_eq!(ukf.update_radar(&z).unwrap_err(), FilterError::MissingPrediction);

        ukf.prediction(0.1).unwrap();
        ukf.update_radar(&z).unwrap();
        // The cache is consumed by the update
        assert_eq!(ukf.update_radar(&z).unwrap_err(), FilterError::MissingPrediction);
    }

    #[test]
    fn lidar_update_invalidates_sigma_cache() {
        let mut ukf = default_ukf();
        ukf.initialize_with(StateVec::new(5.0, 3.0, 0.0, 0.0, 0.0), StateCov::identity(), 0);
        ukf.prediction(0.1).unwrap();
        ukf.update_lidar(&LidarMeasurement::new(5.0, 3.0)).unwrap();
        assert_eq!(
            ukf.update_radar(&RadarMeasurement::new(6.0, 0.3, 1.0)).unwrap_err(),
            FilterError::MissingPrediction
        );
    }

    #[test]
    fn uninitialized_calls_fail() {
        let mut ukf = default_ukf();
        assert_eq!(ukf.predict_future(1.0).unwrap_err(), FilterError::NotInitialized);
        assert_eq!(ukf.prediction(1.0).unwrap_err(), FilterError::NotInitialized);
        assert_eq!(
            ukf.update_lidar(&LidarMeasurement::new(1.0, 1.0)).unwrap_err(),
            FilterError::NotInitialized
        );
    }

    #[test]
    fn disabled_sensor_predicts_without_update() {
        let config = UkfConfig {
            use_radar: false,
            ..Default::default()
        };
        let mut ukf = Ukf::new(config).unwrap();
        // Radar may still initialize
        ukf.process_measurement(&MeasurementPackage::radar(0, 5.0, 0.0, 0.0)).unwrap();
        ukf.process_measurement(&MeasurementPackage::radar(100_000, 9.0, 0.0, 0.0))
            .unwrap();

        assert_eq!(ukf.consistency().radar.count, 0);
        assert_eq!(ukf.nis_radar(), 0.0);
        // Prediction ran: covariance grew from identity
        assert!(ukf.covariance()[(0, 0)] > 1.0);
        assert_abs_diff_eq!(ukf.state()[0], 5.0, epsilon = 0.2);
    }

    #[test]
    fn heading_is_wrapped_after_prediction() {
        let mut ukf = default_ukf();
        let mut p = StateCov::identity() * 0.01;
        p[(3, 3)] = 1e-4;
        ukf.initialize_with(StateVec::new(10.0, 0.0, 1.0, PI - 0.1, 1.0), p, 0);
        ukf.prediction(0.5).unwrap();
        let yaw = ukf.state()[YAW];
        assert!(yaw > -PI && yaw <= PI, "yaw {yaw}");
        assert!(yaw < 0.0, "heading should have crossed +π, got {yaw}");
    }

    #[test]
    fn failed_update_leaves_state_untouched() {
        let config = UkfConfig {
            lidar: LidarModel::new(0.0, 0.0),
            ..Default::default()
        };
        let mut ukf = Ukf::new(config).unwrap();
        // Zero position variance with zero lidar noise makes S singular
        let mut p = StateCov::identity();
        p[(0, 0)] = 0.0;
        p[(1, 1)] = 0.0;
        ukf.initialize_with(StateVec::new(1.0, 1.0, 0.0, 0.0, 0.0), p, 0);
        let err = ukf.update_lidar(&LidarMeasurement::new(2.0, 2.0)).unwrap_err();
        assert_eq!(err, FilterError::DegenerateInnovation { sensor: SensorKind::Lidar });
        assert_eq!(*ukf.state(), StateVec::new(1.0, 1.0, 0.0, 0.0, 0.0));
        assert_eq!(ukf.nis_lidar(), 0.0);
    }

    #[test]
    fn corrupted_covariance_is_divergence() {
        let mut ukf = default_ukf();
        let mut p = StateCov::identity();
        p[(2, 2)] = f64::NAN;
        ukf.initialize_with(StateVec::zeros(), p, 0);
        assert!(matches!(
            ukf.prediction(0.1).unwrap_err(),
            FilterError::Divergence { .. }
        ));
        assert!(ukf.covariance()[(2, 2)].is_nan());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = UkfConfig {
            process_noise: ProcessNoise {
                std_a: 0.0,
                std_yawdd: 0.6,
            },
            ..Default::default()
        };
        assert!(matches!(Ukf::new(config), Err(FilterError::InvalidConfig(_))));

        let config = UkfConfig {
            radar: RadarModel::new(0.3, -0.03, 0.3),
            ..Default::default()
        };
        assert!(matches!(Ukf::new(config), Err(FilterError::InvalidConfig(_))));
    }

    #[test]
    fn constant_velocity_track_converges() {
        let mut ukf = default_ukf();
        // Object moving along +x at 5 m/s, lidar every 50 ms, radar interleaved
        for k in 0..200i64 {
            let t = k * 50_000;
            let px = 1.0 + 5.0 * t as f64 / 1e6;
            let py = 2.0;
            let pkg = if k % 2 == 0 {
                MeasurementPackage::lidar(t, px, py)
            } else {
                let range = (px * px + py * py).sqrt();
                MeasurementPackage::radar(t, range, py.atan2(px), 5.0 * px / range)
            };
            ukf.process_measurement(&pkg).unwrap();
        }
        let x = ukf.state();
        assert_abs_diff_eq!(x[2], 5.0, epsilon = 0.3);
        assert_abs_diff_eq!(x[3], 0.0, epsilon = 0.1);
        assert!(is_psd(ukf.covariance()));
    }

    /// Filter at the origin with zero speed and a tight prior. Every sigma
    /// point lands on the same substituted position, so the predicted
    /// covariance has no spread in py (and none in px either when dt = 0).
    fn collapsed_at_origin(config: UkfConfig, v: f64) -> Ukf {
        let mut ukf = Ukf::new(config).unwrap();
        ukf.initialize_with(
            StateVec::new(0.0, 0.0, v, 0.0, 0.0),
            StateCov::identity() * 1e-6,
            0,
        );
        ukf
    }

    #[test]
    fn noise_free_lidar_pins_position_for_tight_prior() {
        for std in [0.0, 0.0005] {
            let config = UkfConfig {
                lidar: LidarModel::new(std, std),
                ..Default::default()
            };
            let mut ukf = Ukf::new(config).unwrap();
            ukf.initialize_with(
                StateVec::new(1.0, 2.0, 3.0, 0.2, 0.1),
                StateCov::identity() * 1e-7,
                0,
            );
            ukf.update_lidar(&LidarMeasurement::new(1.001, 2.001)).unwrap();
            if std == 0.0 {
                assert_abs_diff_eq!(ukf.state()[0], 1.001, epsilon = 1e-9);
                assert_abs_diff_eq!(ukf.state()[1], 2.001, epsilon = 1e-9);
            }
            assert!(ukf.nis_lidar().is_finite());
        }
    }

    #[test]
    fn failed_update_rolls_back_prediction() {
        let config = UkfConfig {
            lidar: LidarModel::new(0.0, 0.0),
            ..Default::default()
        };
        let mut ukf = collapsed_at_origin(config, 0.0);
        let x_before = *ukf.state();
        let p_before = *ukf.covariance();

        let err = ukf
            .process_measurement(&MeasurementPackage::lidar(100_000, 0.2, 0.1))
            .unwrap_err();
        assert_eq!(err, FilterError::DegenerateInnovation { sensor: SensorKind::Lidar });
        assert_eq!(*ukf.state(), x_before);
        assert_eq!(*ukf.covariance(), p_before);
        assert_eq!(ukf.last_timestamp_us(), 0);
        assert_eq!(ukf.consistency().lidar.count, 0);
        assert_eq!(
            ukf.update_radar(&RadarMeasurement::new(1.0, 0.5, 0.0)).unwrap_err(),
            FilterError::MissingPrediction
        );
    }

    #[test]
    fn degenerate_radar_update_leaves_prediction_untouched() {
        let config = UkfConfig {
            radar: RadarModel::new(0.0, 0.0, 0.0),
            ..Default::default()
        };
        let mut ukf = collapsed_at_origin(config, 1.0);
        ukf.prediction(0.0).unwrap();
        let x_pred = *ukf.state();
        let p_pred = *ukf.covariance();

        let err = ukf
            .update_radar(&RadarMeasurement::new(0.2, 0.7, 0.5))
            .unwrap_err();
        assert_eq!(err, FilterError::DegenerateInnovation { sensor: SensorKind::Radar });
        assert_eq!(*ukf.state(), x_pred);
        assert_eq!(*ukf.covariance(), p_pred);
        assert_eq!(ukf.nis_radar(), 0.0);
    }

    #[test]
    fn simultaneous_measurements_are_processed() {
        let mut ukf = default_ukf();
        ukf.process_measurement(&MeasurementPackage::lidar(0, 5.0, 3.0)).unwrap();
        ukf.process_measurement(&MeasurementPackage::lidar(50_000, 5.1, 3.0)).unwrap();
        ukf.process_measurement(&MeasurementPackage::radar(50_000, 6.0, 0.53, 1.0))
            .unwrap();
        assert_eq!(ukf.last_timestamp_us(), 50_000);
        assert_eq!(ukf.consistency().radar.count, 1);
    }
}
