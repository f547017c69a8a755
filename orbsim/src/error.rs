//! Error types for orbsim
//!
//! Construction-time problems (bad planet lists, invalid parameters) and the
//! adaptive controller's bounded-retry abort are all reported through
//! [`SimError`]. Escape from a planetary system is not an error; see
//! [`crate::simulation::symplectic::Escape`].

use thiserror::Error;

/// Result alias used throughout the library
pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    /// Generic invalid configuration
    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("planet masses ({masses}) and semi-major axes ({axes}) differ in length")]
    MismatchedPlanets { masses: usize, axes: usize },

    #[error("star mass must be positive, got {0}")]
    NonPositiveStarMass(f64),

    #[error("semi-major axis of planet {index} must be positive, got {value}")]
    NonPositiveSemiMajorAxis { index: usize, value: f64 },

    #[error("eccentricity must lie in [0, 1), got {0}")]
    InvalidEccentricity(f64),

    /// Step sizes, tolerances and end times must be finite and positive
    #[error("parameter `{name}` must be finite and positive, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// The adaptive retry loop could not meet the tolerance
    #[error(
        "step size underflow at t = {t:.6e}: last dt = {dt:.6e}, error = {error:.6e} after {attempts} attempts"
    )]
    StepSizeUnderflow {
        t: f64,
        dt: f64,
        error: f64,
        attempts: usize,
    },

    #[error("non-finite state produced at t = {t:.6e}")]
    NonFiniteState { t: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SimError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        SimError::Config {
            message: message.into(),
        }
    }
}

/// Reject non-finite or non-positive values for a named parameter
pub(crate) fn require_positive(name: &'static str, value: f64) -> SimResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter { name, value })
    }
}
