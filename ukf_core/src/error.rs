//! Filter error type.

use crate::types::SensorKind;

/// Failures the filter reports instead of producing silently invalid output.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("filter has not been initialized by a first measurement")]
    NotInitialized,

    #[error("filter divergence: {reason}")]
    Divergence { reason: String },

    #[error("degenerate {sensor} update: innovation covariance is singular")]
    DegenerateInnovation { sensor: SensorKind },

    #[error("radar update requires sigma points from a prediction in the same cycle")]
    MissingPrediction,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FilterError {
    pub(crate) fn divergence(reason: impl Into<String>) -> Self {
        FilterError::Divergence {
            reason: reason.into(),
        }
    }
}

pub type FilterResult<T> = Result<T, FilterError>;
