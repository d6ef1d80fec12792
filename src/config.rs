//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::components::{
    BatteryStore, DampingModel, EnvironmentState, Panel, PanelParameters, PiezoelectricConverter,
    StepPolicy, Turbulence, WindModel,
};
use crate::sim::engine::Engine;
use crate::sim::event::{WindChange, WindSchedule};
use crate::sim::history::PowerHistory;
use crate::sim::types::SimConfig;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation timing and seed.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Fleet size and multiplier.
    #[serde(default)]
    pub fleet: FleetConfig,
    /// Mechanical panel parameters, shared by every panel.
    #[serde(default)]
    pub panel: PanelConfig,
    /// Initial wind conditions.
    #[serde(default)]
    pub environment: EnvironmentConfig,
    /// Wind load model.
    #[serde(default)]
    pub wind: WindConfig,
    /// Piezoelectric conversion and electrical damping.
    #[serde(default)]
    pub electrical: ElectricalConfig,
    /// Shared energy store.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Integrator step control.
    #[serde(default)]
    pub integrator: IntegratorConfig,
    /// Scripted wind changes.
    #[serde(default)]
    pub wind_schedule: Vec<WindChangeConfig>,
}

/// Simulation timing and seed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Tick length in seconds (must be > 0).
    pub dt_s: f64,
    /// Number of ticks to run (must be > 0).
    pub ticks: usize,
    /// Master random seed.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt_s: 0.001,
            ticks: 10_000,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FleetConfig {
    /// Independently integrated panels (must be > 0).
    pub panels: usize,
    /// Identical windows each integrated panel stands for (must be > 0).
    pub windows_per_panel: u32,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            panels: 1,
            windows_per_panel: 100,
        }
    }
}

/// Mechanical panel parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelConfig {
    pub mass_kg: f64,
    pub stiffness_n_per_m: f64,
    pub area_m2: f64,
    /// Linear damping `c1` (N·s/m).
    pub linear_damping: f64,
    /// Quadratic damping `c2` (N·s²/m²).
    pub quadratic_damping: f64,
    /// Structural displacement limit (m).
    pub max_displacement_m: f64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            mass_kg: 10.0,
            stiffness_n_per_m: 100_000.0,
            area_m2: 0.5,
            linear_damping: 10.0,
            quadratic_damping: 0.5,
            max_displacement_m: 0.01,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    pub wind_speed_mps: f64,
    /// Air density (kg/m³).
    pub air_density: f64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            wind_speed_mps: 5.0,
            air_density: 1.225,
        }
    }
}

/// Wind load model parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindConfig {
    /// Panel shape factor `k_shape`.
    pub shape_factor: f64,
    /// Turbulence: `"off"`, `"uniform"` or `"gaussian"`.
    pub noise: String,
    /// Noise scale as a fraction of the force amplitude.
    pub noise_fraction: f64,
    pub excitation_floor: f64,
    pub excitation_ceiling: f64,
    pub reference_speed_mps: f64,
}

impl Default for WindConfig {
    fn default() -> Self {
        let model = WindModel::default();
        Self {
            shape_factor: model.shape_factor,
            noise: "uniform".to_string(),
            noise_fraction: model.noise_fraction,
            excitation_floor: model.excitation_floor,
            excitation_ceiling: model.excitation_ceiling,
            reference_speed_mps: model.reference_speed,
        }
    }
}

/// Piezoelectric conversion and electrical damping parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElectricalConfig {
    /// Volts per m/s of panel velocity.
    pub piezo_constant: f64,
    pub resistance_ohm: f64,
    /// Conversion efficiency in `(0, 1]`.
    pub efficiency: f64,
    pub max_voltage: f64,
    pub max_power_w: f64,
    /// Electrical damping at full charge (N·s/m).
    pub min_damping: f64,
    /// Electrical damping at empty charge (N·s/m).
    pub max_damping: f64,
}

impl Default for ElectricalConfig {
    fn default() -> Self {
        let conv = PiezoelectricConverter::default();
        let damping = DampingModel::default();
        Self {
            piezo_constant: conv.piezo_constant,
            resistance_ohm: conv.resistance,
            efficiency: conv.efficiency,
            max_voltage: conv.max_voltage,
            max_power_w: conv.max_power,
            min_damping: damping.min_electrical,
            max_damping: damping.max_electrical,
        }
    }
}

/// Shared energy store parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Usable capacity (J, must be > 0).
    pub capacity_j: f64,
    /// Energy at start (J, within `[0, capacity_j]`).
    pub initial_energy_j: f64,
    /// Constant self-discharge (W, must be >= 0).
    pub discharge_w: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_j: 50_000.0,
            initial_energy_j: 0.0,
            discharge_w: 0.003,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntegratorConfig {
    /// Largest substep as a fraction of `1 / ω_eff`.
    pub stability_fraction: f64,
    pub abs_tol: f64,
    pub rel_tol: f64,
    /// Substeps per tick at the floor size. Floor-size substeps that miss the
    /// tolerance are still accepted, and the panel logs a warning.
    pub max_substeps: usize,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        let policy = StepPolicy::default();
        Self {
            stability_fraction: policy.stability_fraction,
            abs_tol: policy.abs_tol,
            rel_tol: policy.rel_tol,
            max_substeps: policy.max_substeps,
        }
    }
}

/// One `[[wind_schedule]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindChangeConfig {
    pub tick: usize,
    pub wind_speed_mps: f64,
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field} - {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.dt_s"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Largest phase of the wind excitation allowed to elapse in one tick (rad).
///
/// The harmonic load is sampled once per tick, and the excitation never
/// exceeds the natural frequency, so `dt·ω_n` bounds the phase step.
/// 0.2 rad keeps about 31 samples per period.
pub const MAX_PHASE_PER_TICK: f64 = 0.2;

fn positive(errors: &mut Vec<ConfigError>, field: &str, value: f64) {
    if value.is_nan() || value <= 0.0 || value.is_infinite() {
        errors.push(ConfigError::new(field, "must be > 0 and finite"));
    }
}

fn non_negative(errors: &mut Vec<ConfigError>, field: &str, value: f64) {
    if value.is_nan() || value < 0.0 || value.is_infinite() {
        errors.push(ConfigError::new(field, "must be >= 0 and finite"));
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: one 10 kg demo window standing in for 100.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            fleet: FleetConfig::default(),
            panel: PanelConfig::default(),
            environment: EnvironmentConfig::default(),
            wind: WindConfig::default(),
            electrical: ElectricalConfig::default(),
            battery: BatteryConfig::default(),
            integrator: IntegratorConfig::default(),
            wind_schedule: Vec::new(),
        }
    }

    /// Returns the bench preset: a light 1 kg panel in steady 10 m/s wind,
    /// no turbulence and no self-discharge.
    ///
    /// The structural limit is widened to 10 cm so the resonant response of
    /// roughly 1 cm stays untripped for the whole second.
    pub fn bench() -> Self {
        Self {
            simulation: SimulationConfig {
                dt_s: 0.001,
                ticks: 1000,
                ..SimulationConfig::default()
            },
            fleet: FleetConfig {
                panels: 1,
                windows_per_panel: 1,
            },
            panel: PanelConfig {
                mass_kg: 1.0,
                stiffness_n_per_m: 1000.0,
                area_m2: 1.0,
                linear_damping: 0.5,
                quadratic_damping: 0.0,
                max_displacement_m: 0.1,
            },
            environment: EnvironmentConfig {
                wind_speed_mps: 10.0,
                air_density: 1.2,
            },
            wind: WindConfig {
                noise: "off".to_string(),
                ..WindConfig::default()
            },
            electrical: ElectricalConfig {
                resistance_ohm: 100.0,
                efficiency: 0.8,
                ..ElectricalConfig::default()
            },
            battery: BatteryConfig {
                discharge_w: 0.0,
                ..BatteryConfig::default()
            },
            integrator: IntegratorConfig::default(),
            wind_schedule: Vec::new(),
        }
    }

    /// Returns the storm preset: a soft, wide panel in a gusting wind ramp
    /// that ends well past its structural limit.
    pub fn storm() -> Self {
        let ramp = [(0, 10.0), (2_000, 18.0), (4_000, 24.0), (6_000, 30.0)];
        Self {
            simulation: SimulationConfig {
                ticks: 20_000,
                ..SimulationConfig::default()
            },
            fleet: FleetConfig {
                panels: 4,
                windows_per_panel: 25,
            },
            panel: PanelConfig {
                stiffness_n_per_m: 20_000.0,
                area_m2: 1.5,
                ..PanelConfig::default()
            },
            environment: EnvironmentConfig {
                wind_speed_mps: 10.0,
                air_density: 1.2,
            },
            wind: WindConfig {
                noise: "gaussian".to_string(),
                noise_fraction: 0.15,
                ..WindConfig::default()
            },
            electrical: ElectricalConfig::default(),
            battery: BatteryConfig::default(),
            integrator: IntegratorConfig::default(),
            wind_schedule: ramp
                .iter()
                .map(|&(tick, wind_speed_mps)| WindChangeConfig {
                    tick,
                    wind_speed_mps,
                })
                .collect(),
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "bench", "storm"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "bench" => Ok(Self::bench()),
            "storm" => Ok(Self::storm()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    fn turbulence(&self) -> Option<Turbulence> {
        match self.wind.noise.as_str() {
            "off" => Some(Turbulence::Off),
            "uniform" => Some(Turbulence::Uniform),
            "gaussian" => Some(Turbulence::Gaussian),
            _ => None,
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let s = &self.simulation;
        positive(&mut errors, "simulation.dt_s", s.dt_s);
        if s.ticks == 0 {
            errors.push(ConfigError::new("simulation.ticks", "must be > 0"));
        }

        if self.fleet.panels == 0 {
            errors.push(ConfigError::new("fleet.panels", "must be > 0"));
        }
        if self.fleet.windows_per_panel == 0 {
            errors.push(ConfigError::new("fleet.windows_per_panel", "must be > 0"));
        }

        let p = &self.panel;
        positive(&mut errors, "panel.mass_kg", p.mass_kg);
        positive(&mut errors, "panel.stiffness_n_per_m", p.stiffness_n_per_m);
        positive(&mut errors, "panel.area_m2", p.area_m2);
        non_negative(&mut errors, "panel.linear_damping", p.linear_damping);
        non_negative(&mut errors, "panel.quadratic_damping", p.quadratic_damping);
        positive(&mut errors, "panel.max_displacement_m", p.max_displacement_m);

        let env = &self.environment;
        non_negative(&mut errors, "environment.wind_speed_mps", env.wind_speed_mps);
        positive(&mut errors, "environment.air_density", env.air_density);

        let w = &self.wind;
        if self.turbulence().is_none() {
            errors.push(ConfigError::new(
                "wind.noise",
                format!(
                    "must be \"off\", \"uniform\" or \"gaussian\", got \"{}\"",
                    w.noise
                ),
            ));
        }
        non_negative(&mut errors, "wind.shape_factor", w.shape_factor);
        non_negative(&mut errors, "wind.noise_fraction", w.noise_fraction);
        positive(&mut errors, "wind.reference_speed_mps", w.reference_speed_mps);
        if !(0.0 <= w.excitation_floor
            && w.excitation_floor <= w.excitation_ceiling
            && w.excitation_ceiling <= 1.0)
        {
            errors.push(ConfigError::new(
                "wind.excitation_floor",
                "must satisfy 0 <= excitation_floor <= excitation_ceiling <= 1",
            ));
        }

        let e = &self.electrical;
        non_negative(&mut errors, "electrical.piezo_constant", e.piezo_constant);
        positive(&mut errors, "electrical.resistance_ohm", e.resistance_ohm);
        if !(e.efficiency > 0.0 && e.efficiency <= 1.0) {
            errors.push(ConfigError::new("electrical.efficiency", "must be in (0.0, 1.0]"));
        }
        non_negative(&mut errors, "electrical.max_voltage", e.max_voltage);
        non_negative(&mut errors, "electrical.max_power_w", e.max_power_w);
        non_negative(&mut errors, "electrical.min_damping", e.min_damping);
        non_negative(&mut errors, "electrical.max_damping", e.max_damping);
        if e.min_damping > e.max_damping {
            errors.push(ConfigError::new(
                "electrical.min_damping",
                "must be <= electrical.max_damping",
            ));
        }

        let b = &self.battery;
        positive(&mut errors, "battery.capacity_j", b.capacity_j);
        if !(0.0..=b.capacity_j).contains(&b.initial_energy_j) {
            errors.push(ConfigError::new(
                "battery.initial_energy_j",
                "must be in [0.0, battery.capacity_j]",
            ));
        }
        non_negative(&mut errors, "battery.discharge_w", b.discharge_w);

        if s.dt_s > 0.0 && p.mass_kg > 0.0 && p.stiffness_n_per_m > 0.0 {
            let phase = s.dt_s * (p.stiffness_n_per_m / p.mass_kg).sqrt();
            if phase > MAX_PHASE_PER_TICK {
                errors.push(ConfigError::new(
                    "simulation.dt_s",
                    format!(
                        "too coarse for the wind excitation: dt·ω_n = {phase:.3} rad, \
                         must be <= {MAX_PHASE_PER_TICK}"
                    ),
                ));
            }
        }

        let i = &self.integrator;
        positive(&mut errors, "integrator.stability_fraction", i.stability_fraction);
        positive(&mut errors, "integrator.abs_tol", i.abs_tol);
        non_negative(&mut errors, "integrator.rel_tol", i.rel_tol);
        if i.max_substeps == 0 {
            errors.push(ConfigError::new("integrator.max_substeps", "must be > 0"));
        }

        for (n, change) in self.wind_schedule.iter().enumerate() {
            if change.wind_speed_mps.is_nan() || change.wind_speed_mps < 0.0 {
                errors.push(ConfigError::new(
                    &format!("wind_schedule[{n}].wind_speed_mps"),
                    "must be >= 0",
                ));
            }
        }

        errors
    }

    /// Validates the scenario and assembles a ready-to-run engine.
    ///
    /// Panel `i` draws its turbulence from `seed + i`.
    ///
    /// # Errors
    ///
    /// Returns every validation error if the scenario is invalid.
    pub fn build(&self) -> Result<Engine, Vec<ConfigError>> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        let turbulence = self.turbulence().unwrap_or(Turbulence::Off);

        let s = &self.simulation;
        let sim = SimConfig::new(s.dt_s, s.ticks, s.seed)
            .with_windows_per_panel(self.fleet.windows_per_panel);

        let params = PanelParameters {
            mass: self.panel.mass_kg,
            stiffness: self.panel.stiffness_n_per_m,
            area: self.panel.area_m2,
            linear_damping: self.panel.linear_damping,
            quadratic_damping: self.panel.quadratic_damping,
            max_displacement: self.panel.max_displacement_m,
        };
        let wind = WindModel {
            shape_factor: self.wind.shape_factor,
            turbulence,
            noise_fraction: self.wind.noise_fraction,
            excitation_floor: self.wind.excitation_floor,
            excitation_ceiling: self.wind.excitation_ceiling,
            reference_speed: self.wind.reference_speed_mps,
        };
        let policy = StepPolicy {
            stability_fraction: self.integrator.stability_fraction,
            abs_tol: self.integrator.abs_tol,
            rel_tol: self.integrator.rel_tol,
            max_substeps: self.integrator.max_substeps,
        };
        let history_len = PowerHistory::window_for(sim.average_window_s, sim.dt_s);

        let panels = (0..self.fleet.panels)
            .map(|id| {
                Panel::new(
                    id,
                    params,
                    wind.clone(),
                    policy,
                    history_len,
                    s.seed.wrapping_add(id as u64),
                )
            })
            .collect();

        let e = &self.electrical;
        let converter = PiezoelectricConverter {
            piezo_constant: e.piezo_constant,
            resistance: e.resistance_ohm,
            efficiency: e.efficiency,
            max_voltage: e.max_voltage,
            max_power: e.max_power_w,
        };
        let damping = DampingModel::new(e.min_damping, e.max_damping);
        let battery = BatteryStore::new(
            self.battery.capacity_j,
            self.battery.initial_energy_j,
            self.battery.discharge_w,
        );
        let environment =
            EnvironmentState::new(self.environment.wind_speed_mps, self.environment.air_density);
        let schedule = WindSchedule::new(
            self.wind_schedule
                .iter()
                .map(|c| WindChange {
                    tick: c.tick,
                    wind_speed: c.wind_speed_mps,
                })
                .collect(),
        );

        Ok(
            Engine::new(sim, panels, battery, environment, damping, converter)
                .with_schedule(schedule),
        )
    }
}
