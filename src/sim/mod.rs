/// Simulation clock for tick management.
pub mod clock;
pub mod engine;
/// Scripted wind changes.
pub mod event;
/// Rolling power average.
pub mod history;
pub mod kpi;
/// Live parameter inbox and stop signal.
pub mod params;
pub mod types;
