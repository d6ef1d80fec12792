//! Core simulation types: run configuration and per-tick snapshots.

use std::fmt;

use crate::components::{FailSafeStatus, PanelReading};

/// Centralized run configuration shared by the engine and reporting.
///
/// # Examples
///
/// ```
/// use piezo_window_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(0.001, 1000, 42);
/// assert_eq!(cfg.windows_per_panel, 1);
/// assert!((cfg.duration_s() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Tick length in seconds.
    pub dt_s: f64,
    /// Number of ticks to run.
    pub ticks: usize,
    /// Master random seed; panel `i` uses `seed + i`.
    pub seed: u64,
    /// Identical windows each integrated panel stands for.
    pub windows_per_panel: u32,
    /// Length of the rolling power average (s).
    pub average_window_s: f64,
}

impl SimConfig {
    /// Creates a new run configuration.
    ///
    /// # Arguments
    ///
    /// * `dt_s` - Tick length in seconds (must be > 0)
    /// * `ticks` - Number of ticks to run
    /// * `seed` - Master random seed
    ///
    /// # Panics
    ///
    /// Panics if `dt_s` is not positive and finite.
    pub fn new(dt_s: f64, ticks: usize, seed: u64) -> Self {
        assert!(dt_s > 0.0 && dt_s.is_finite(), "dt_s must be > 0");
        Self {
            dt_s,
            ticks,
            seed,
            windows_per_panel: 1,
            average_window_s: 5.0,
        }
    }

    pub fn with_windows_per_panel(mut self, windows: u32) -> Self {
        self.windows_per_panel = windows.max(1);
        self
    }

    /// Simulated span of a full run (s).
    pub fn duration_s(&self) -> f64 {
        self.dt_s * self.ticks as f64
    }
}

/// Read-only snapshot of one completed tick, handed to the front end.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Tick index.
    pub tick: usize,
    /// Simulated time at the end of the tick (s).
    pub time_s: f64,
    /// Wind speed in effect for this tick (m/s).
    pub wind_speed: f64,
    /// One reading per panel, in arena order.
    pub panels: Vec<PanelReading>,
    /// Total power credited to the store this tick, fleet multiplier included (W).
    pub generated_w: f64,
    /// Stored energy after the tick (J).
    pub battery_j: f64,
    /// State of charge after the tick (0.0 to 1.0).
    pub soc: f64,
    /// Version of the parameter snapshot in effect.
    pub params_version: u64,
}

impl StepResult {
    /// Reading of the first panel, the one shown by single-panel front ends.
    pub fn primary(&self) -> Option<&PanelReading> {
        self.panels.first()
    }

    /// `Tripped` if any panel has tripped.
    pub fn status(&self) -> FailSafeStatus {
        if self
            .panels
            .iter()
            .any(|p| p.status == FailSafeStatus::Tripped)
        {
            FailSafeStatus::Tripped
        } else {
            FailSafeStatus::Running
        }
    }
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (y, v, p) = self
            .primary()
            .map(|r| (r.displacement, r.velocity, r.delivered_w))
            .unwrap_or_default();
        write!(
            f,
            "t={:>6} ({:>8.3}s) | wind={:>5.2} m/s | y={:>+9.4} mm  v={:>+8.4} m/s  \
             P={:>9.4} mW | fleet={:>8.4} W | E={:>10.3} J (SoC={:.3}%) | {}",
            self.tick,
            self.time_s,
            self.wind_speed,
            y * 1000.0,
            v,
            p * 1000.0,
            self.generated_w,
            self.battery_j,
            self.soc * 100.0,
            self.status(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ElectricalState;

    fn reading(status: FailSafeStatus) -> PanelReading {
        PanelReading {
            id: 0,
            time_s: 0.001,
            displacement: 0.002,
            velocity: -0.1,
            force: 1.0,
            damping: 6.0,
            electrical: ElectricalState::default(),
            delivered_w: 0.01,
            average_power_w: 0.01,
            status,
            fault: None,
        }
    }

    #[test]
    fn sim_config_basic() {
        let cfg = SimConfig::new(0.01, 100, 7);
        assert_eq!(cfg.dt_s, 0.01);
        assert_eq!(cfg.ticks, 100);
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.average_window_s, 5.0);
    }

    #[test]
    fn windows_per_panel_floor_is_one() {
        let cfg = SimConfig::new(0.01, 1, 0).with_windows_per_panel(0);
        assert_eq!(cfg.windows_per_panel, 1);
    }

    #[test]
    #[should_panic]
    fn sim_config_zero_dt_panics() {
        SimConfig::new(0.0, 1, 0);
    }

    #[test]
    fn status_is_tripped_if_any_panel_tripped() {
        let mut r = StepResult {
            tick: 0,
            time_s: 0.001,
            wind_speed: 5.0,
            panels: vec![reading(FailSafeStatus::Running)],
            generated_w: 1.0,
            battery_j: 0.001,
            soc: 0.0,
            params_version: 0,
        };
        assert_eq!(r.status(), FailSafeStatus::Running);
        r.panels.push(reading(FailSafeStatus::Tripped));
        assert_eq!(r.status(), FailSafeStatus::Tripped);
        let s = format!("{r}");
        assert!(s.contains("TRIPPED"));
    }
}
