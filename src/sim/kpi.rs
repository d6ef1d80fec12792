//! Post-hoc run summary computed from simulation results.

use std::collections::BTreeSet;
use std::fmt;

use crate::components::FailSafeStatus;

use super::types::StepResult;

/// Energy to light a 10 W LED for one hour (J).
pub const LED_HOUR_J: f64 = 36_000.0;
/// Energy for one smartphone charge (J).
pub const PHONE_CHARGE_J: f64 = 5_000.0;
/// Energy for one low-power IoT sensor transmission (J).
pub const IOT_SEND_J: f64 = 1.944;

/// Aggregate indicators derived from a complete simulation run.
///
/// Computed post-hoc from `Vec<StepResult>` so the summary always agrees with
/// the per-tick records.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Ticks executed.
    pub ticks: usize,
    /// Simulated span (s).
    pub duration_s: f64,
    /// Energy credited to the store over the run, fleet multiplier included (J).
    pub harvested_j: f64,
    /// Energy delivered by a single window, averaged over integrated panels (J).
    pub per_window_j: f64,
    /// Mean fleet power over the run (W).
    pub mean_power_w: f64,
    /// Peak fleet power in any tick (W).
    pub peak_power_w: f64,
    /// Largest `|y|` reached by any panel (m).
    pub peak_displacement_m: f64,
    /// Stored energy after the last tick (J).
    pub final_battery_j: f64,
    /// State of charge after the last tick.
    pub final_soc: f64,
    /// Panels that tripped during the run.
    pub tripped_panels: usize,
    /// Panels halted by numeric divergence.
    pub diverged_panels: usize,
}

impl RunReport {
    /// Computes the summary from the complete step record vector.
    ///
    /// # Arguments
    ///
    /// * `results` - Complete simulation step results
    /// * `dt_s` - Tick length in seconds
    /// * `windows_per_panel` - Fleet multiplier the run used
    pub fn from_results(results: &[StepResult], dt_s: f64, windows_per_panel: u32) -> Self {
        let Some(last) = results.last() else {
            return Self {
                ticks: 0,
                duration_s: 0.0,
                harvested_j: 0.0,
                per_window_j: 0.0,
                mean_power_w: 0.0,
                peak_power_w: 0.0,
                peak_displacement_m: 0.0,
                final_battery_j: 0.0,
                final_soc: 0.0,
                tripped_panels: 0,
                diverged_panels: 0,
            };
        };

        let mut harvested = 0.0_f64;
        let mut power_sum = 0.0_f64;
        let mut peak_power = 0.0_f64;
        let mut peak_y = 0.0_f64;
        let mut diverged = BTreeSet::new();

        for r in results {
            harvested += r.generated_w * dt_s;
            power_sum += r.generated_w;
            peak_power = peak_power.max(r.generated_w);
            for p in &r.panels {
                peak_y = peak_y.max(p.displacement.abs());
                if p.fault.is_some() {
                    diverged.insert(p.id);
                }
            }
        }

        let tripped = last
            .panels
            .iter()
            .filter(|p| p.status == FailSafeStatus::Tripped)
            .count();
        let windows = last.panels.len() as f64 * f64::from(windows_per_panel.max(1));
        let per_window = if windows > 0.0 {
            harvested / windows
        } else {
            0.0
        };

        Self {
            ticks: results.len(),
            duration_s: results.len() as f64 * dt_s,
            harvested_j: harvested,
            per_window_j: per_window,
            mean_power_w: power_sum / results.len() as f64,
            peak_power_w: peak_power,
            peak_displacement_m: peak_y,
            final_battery_j: last.battery_j,
            final_soc: last.soc,
            tripped_panels: tripped,
            diverged_panels: diverged.len(),
        }
    }

    /// Hours a 10 W LED could run on the harvested energy.
    pub fn led_hours(&self) -> f64 {
        self.harvested_j / LED_HOUR_J
    }

    pub fn phone_charges(&self) -> f64 {
        self.harvested_j / PHONE_CHARGE_J
    }

    pub fn iot_sends(&self) -> f64 {
        self.harvested_j / IOT_SEND_J
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Report ---")?;
        writeln!(
            f,
            "Simulated:             {} ticks ({:.3} s)",
            self.ticks, self.duration_s
        )?;
        writeln!(f, "Harvested:             {:.4} J", self.harvested_j)?;
        writeln!(f, "Per window:            {:.6} J", self.per_window_j)?;
        writeln!(
            f,
            "Fleet power:           {:.4} W mean, {:.4} W peak",
            self.mean_power_w, self.peak_power_w
        )?;
        writeln!(
            f,
            "Peak displacement:     {:.3} mm",
            self.peak_displacement_m * 1000.0
        )?;
        writeln!(
            f,
            "Store:                 {:.3} J (SoC {:.3}%)",
            self.final_battery_j,
            self.final_soc * 100.0
        )?;
        writeln!(
            f,
            "Equivalent to:         {:.3} LED hours, {:.2} phone charges, {:.0} IoT sends",
            self.led_hours(),
            self.phone_charges(),
            self.iot_sends()
        )?;
        write!(
            f,
            "Halted panels:         {} tripped, {} diverged",
            self.tripped_panels, self.diverged_panels
        )
    }
}
