//! Initialization errors
//!
//! The simulation itself never fails at runtime. Bad tuning is a programmer
//! error and is rejected once, when the world is built.

use thiserror::Error;

/// Errors raised while validating or loading a [`crate::Tuning`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} range is inverted or negative ({min}..{max})")]
    InvalidRange {
        field: &'static str,
        min: f32,
        max: f32,
    },

    #[error("{field} must lie in (0, 1] (got {value})")]
    InvalidFraction { field: &'static str, value: f32 },

    #[error("headroom clearance {clearance} cannot fit a body of height {body_height}")]
    InsufficientHeadroom { clearance: f32, body_height: f32 },

    #[error("{what}: needs {required}, physics only reaches {reachable}")]
    Unreachable {
        what: &'static str,
        required: f32,
        reachable: f32,
    },

    #[error("tuning json: {0}")]
    Json(#[from] serde_json::Error),
}
