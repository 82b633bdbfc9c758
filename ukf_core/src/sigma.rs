//! Sigma-point generation over the augmented state.
//!
//! # Augmentation
//! x_aug = [x; 0; 0],  P_aug = [[P, 0], [0, Q]]
//!
//! # Spread
//! X₀ = x_aug,  Xᵢ = x_aug + s·Aᵢ,  Xᵢ₊ₙ = x_aug − s·Aᵢ  (i = 1..n_aug)
//! with A the lower Cholesky factor of P_aug and s = √(λ + n_aug).
//!
//! The weights reproduce the first two moments of the input distribution
//! exactly; they are fixed once per filter.

use crate::error::{FilterError, FilterResult};
use crate::types::{
    AugSigmaPoints, AugStateCov, AugStateVec, ProcessCov, StateCov, StateVec, Weights, LAMBDA,
    N_AUG, N_SIG, N_X,
};

/// Weights for `2·n_aug + 1` sigma points with spreading parameter `lambda`.
///
/// w₀ = λ/(λ+n_aug), wᵢ = 1/(2(λ+n_aug)). They sum to one for any λ ≠ −n_aug.
pub fn sigma_weights(lambda: f64) -> Weights {
    let denom = lambda + N_AUG as f64;
    let mut w = Weights::from_element(0.5 / denom);
    w[0] = lambda / denom;
    w
}

/// Builds the augmented mean and covariance from (x, P) and the process noise Q.
pub fn augment(x: &StateVec, p: &StateCov, q: &ProcessCov) -> (AugStateVec, AugStateCov) {
    let mut x_aug = AugStateVec::zeros();
    x_aug.fixed_rows_mut::<N_X>(0).copy_from(x);

    let mut p_aug = AugStateCov::zeros();
    p_aug.fixed_view_mut::<N_X, N_X>(0, 0).copy_from(p);
    p_aug.fixed_view_mut::<2, 2>(N_X, N_X).copy_from(q);

    (x_aug, p_aug)
}

/// Deterministic sigma-point generator with the weights for λ = 3 − n_aug.
#[derive(Clone, Debug)]
pub struct SigmaPointGenerator {
    weights: Weights,
    spread: f64,
}

impl Default for SigmaPointGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SigmaPointGenerator {
    pub fn new() -> Self {
        Self {
            weights: sigma_weights(LAMBDA),
            spread: (LAMBDA + N_AUG as f64).sqrt(),
        }
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// s = √(λ + n_aug)
    pub fn spread(&self) -> f64 {
        self.spread
    }

    /// Generate the 7×15 augmented sigma matrix for (x, P, Q).
    pub fn generate(
        &self,
        x: &StateVec,
        p: &StateCov,
        q: &ProcessCov,
    ) -> FilterResult<AugSigmaPoints> {
        let (x_aug, p_aug) = augment(x, p, q);
        self.generate_augmented(&x_aug, &p_aug)
    }

    /// Generate sigma points from an already augmented mean and covariance.
    pub fn generate_augmented(
        &self,
        x_aug: &AugStateVec,
        p_aug: &AugStateCov,
    ) -> FilterResult<AugSigmaPoints> {
        check_covariance(p_aug)?;
        if x_aug.iter().any(|v| !v.is_finite()) {
            return Err(FilterError::divergence("non-finite state mean"));
        }

        let a = p_aug
            .cholesky()
            .ok_or_else(|| FilterError::divergence("augmented covariance is not positive definite"))?
            .l();

        let mut sigma = AugSigmaPoints::zeros();
        sigma.set_column(0, x_aug);
        for i in 0..N_AUG {
            let offset = a.column(i) * self.spread;
            sigma.set_column(i + 1, &(x_aug + &offset));
            sigma.set_column(i + 1 + N_AUG, &(x_aug - &offset));
        }
        debug_assert_eq!(sigma.ncols(), N_SIG);
        Ok(sigma)
    }
}

/// Fail-fast screen run before any decomposition.
fn check_covariance(p_aug: &AugStateCov) -> FilterResult<()> {
    if p_aug.iter().any(|v| !v.is_finite()) {
        return Err(FilterError::divergence("non-finite covariance entry"));
    }
    if let Some(i) = (0..N_AUG).find(|&i| p_aug[(i, i)] < 0.0) {
        return Err(FilterError::divergence(format!(
            "negative variance {} on diagonal {i}",
            p_aug[(i, i)]
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
