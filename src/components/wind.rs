use rand::{Rng, SeedableRng, rngs::StdRng};

use super::types::{EnvironmentState, PanelParameters, gaussian_noise};

/// Distribution of the turbulence term added on top of the harmonic load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turbulence {
    /// No turbulence: the forcing is a pure sine.
    Off,
    /// Uniform draws in `±fraction·F_amp`.
    Uniform,
    /// Gaussian draws with `σ = fraction·F_amp`, truncated at 3σ.
    Gaussian,
}

/// Tunable constants of the wind load model.
#[derive(Debug, Clone, PartialEq)]
pub struct WindModel {
    /// Empirical shape constant `k_shape` in `F_amp = ½ρAv²·k_shape`.
    pub shape_factor: f64,
    /// Turbulence distribution.
    pub turbulence: Turbulence,
    /// Turbulence magnitude as a fraction of `F_amp`.
    pub noise_fraction: f64,
    /// Excitation/natural frequency ratio at zero wind.
    pub excitation_floor: f64,
    /// Excitation/natural frequency ratio approached at high wind.
    pub excitation_ceiling: f64,
    /// Wind speed scale of the approach to the ceiling (m/s).
    pub reference_speed: f64,
}

impl Default for WindModel {
    fn default() -> Self {
        Self {
            shape_factor: 0.1,
            turbulence: Turbulence::Uniform,
            noise_fraction: 0.1,
            excitation_floor: 0.1,
            excitation_ceiling: 0.95,
            reference_speed: 10.0,
        }
    }
}

impl WindModel {
    /// Harmonic amplitude `½ρAv²·k_shape` (N).
    pub fn amplitude(&self, env: &EnvironmentState, params: &PanelParameters) -> f64 {
        0.5 * env.air_density * params.area * env.wind_speed * env.wind_speed * self.shape_factor
    }

    /// Excitation angular frequency (rad/s) for a wind speed and natural frequency.
    ///
    /// `ω_n · (floor + (ceiling - floor)·(1 - exp(-v / v_ref)))`: monotone in `v`,
    /// `floor·ω_n` in still air, saturating at `ceiling·ω_n`.
    pub fn excitation_frequency(&self, wind_speed: f64, natural_frequency: f64) -> f64 {
        let approach = if self.reference_speed > 0.0 {
            1.0 - (-wind_speed.max(0.0) / self.reference_speed).exp()
        } else {
            1.0
        };
        let ratio =
            self.excitation_floor + (self.excitation_ceiling - self.excitation_floor) * approach;
        natural_frequency * ratio
    }
}

/// Per-panel wind load generator.
///
/// Each panel owns its own generator and random stream so panels integrate
/// independently and reproducibly for a given seed.
#[derive(Debug, Clone)]
pub struct WindForceGenerator {
    model: WindModel,
    rng: StdRng,
}

impl WindForceGenerator {
    /// Creates a generator with its own seeded random stream.
    pub fn new(model: WindModel, seed: u64) -> Self {
        Self {
            model,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn model(&self) -> &WindModel {
        &self.model
    }

    /// External force on the panel at time `t` (N).
    ///
    /// # Arguments
    ///
    /// * `t` - Simulation time (s)
    /// * `env` - Wind speed and air density
    /// * `params` - Panel geometry and mechanics
    /// * `natural_frequency` - Panel `ω_n` (rad/s)
    ///
    /// The turbulence term is an independent draw on every call.
    pub fn force(
        &mut self,
        t: f64,
        env: &EnvironmentState,
        params: &PanelParameters,
        natural_frequency: f64,
    ) -> f64 {
        let amplitude = self.model.amplitude(env, params);
        let omega = self
            .model
            .excitation_frequency(env.wind_speed, natural_frequency);
        amplitude * (omega * t).sin() + self.turbulence(amplitude)
    }

    fn turbulence(&mut self, amplitude: f64) -> f64 {
        let scale = self.model.noise_fraction * amplitude;
        if scale <= 0.0 {
            return 0.0;
        }
        match self.model.turbulence {
            Turbulence::Off => 0.0,
            Turbulence::Uniform => self.rng.random_range(-1.0..=1.0) * scale,
            Turbulence::Gaussian => gaussian_noise(&mut self.rng, scale).clamp(-3.0 * scale, 3.0 * scale),
        }
    }
}
