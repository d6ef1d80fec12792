//! Error types for simulation operations.

use thiserror::Error;

use crate::components::PanelId;

/// Errors raised by the physics engine.
///
/// Structural-limit trips are not errors: they surface as
/// [`crate::components::FailSafeStatus::Tripped`] in the step output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("numeric divergence on panel {panel} at t={time_s:.6} s")]
    NumericDivergence { panel: PanelId, time_s: f64 },

    #[error("invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type SimResult<T> = Result<T, SimError>;
