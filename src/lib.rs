//! Wind-excited piezoelectric window panel simulator.

/// Panel physics, conversion, fail-safe and energy store.
pub mod components;
/// TOML scenarios and presets.
pub mod config;
pub mod error;
/// Telemetry export.
pub mod io {
    pub mod export;
}
/// Simulation engine, clock, parameter inbox and reporting.
pub mod sim;
