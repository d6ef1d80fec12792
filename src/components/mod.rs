//! Per-panel physics components and the shared energy store.

/// Aggregate energy store fed by the fleet.
pub mod battery;
/// Composite linear, quadratic and electrical damping.
pub mod damping;
/// Structural displacement fail-safe.
pub mod failsafe;
/// Forced damped oscillator integration.
pub mod oscillator;
/// A panel and its per-tick advance.
pub mod panel;
/// Piezoelectric voltage and power conversion.
pub mod piezo;
pub mod types;
/// Wind load generation.
pub mod wind;

// Re-export the main types for convenience
pub use battery::BatteryStore;
pub use damping::DampingModel;
pub use failsafe::{FailSafeMonitor, FailSafeStatus};
pub use oscillator::{OscillatorIntegrator, StepInputs, StepPolicy};
pub use panel::{Panel, PanelReading, TickContext};
pub use piezo::PiezoelectricConverter;
pub use types::{
    Beaufort, ElectricalState, EnvironmentState, PanelId, PanelParameters, PanelState,
};
pub use wind::{Turbulence, WindForceGenerator, WindModel};
