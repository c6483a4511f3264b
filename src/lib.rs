//! Girder Climb - deterministic core of a vertical Donkey-Kong-style platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion body, collisions, chunk generation and streaming)
//! - `tuning`: Data-driven game balance
//! - `error`: Initialization errors

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use tuning::{Span, Tuning};

/// Fixed simulation constants
pub mod consts {
    /// Fixed simulation timestep (180 Hz keeps contact resolution reproducible)
    pub const SIM_DT: f32 = 1.0 / 180.0;

    /// Velocity components below this magnitude snap to zero (units/s)
    pub const VELOCITY_EPSILON: f32 = 0.5;
    /// Gap left after a side push so the next step doesn't re-collide
    pub const CONTACT_EPSILON: f32 = 0.5;
}
