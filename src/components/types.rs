//! Common state records and helpers shared by the panel components.

use std::fmt;

use rand::{Rng, rngs::StdRng};

/// Index of a panel inside the fleet arena.
pub type PanelId = usize;

/// Mechanical state of one panel.
///
/// Owned by exactly one [`super::Panel`]; only the integration step mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanelState {
    /// Out-of-plane displacement (m).
    pub displacement: f64,
    /// Displacement rate (m/s).
    pub velocity: f64,
    /// Simulated time (s).
    pub time: f64,
}

impl PanelState {
    /// Panel at rest at `t = 0`.
    pub fn at_rest() -> Self {
        Self::default()
    }

    /// Panel released from an initial displacement and velocity at `t = 0`.
    pub fn released(displacement: f64, velocity: f64) -> Self {
        Self {
            displacement,
            velocity,
            time: 0.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.displacement.is_finite() && self.velocity.is_finite() && self.time.is_finite()
    }
}

/// Physical parameters of one panel.
///
/// `mass`, `stiffness`, `linear_damping` and `quadratic_damping` are live-tunable
/// between ticks; the rest is fixed for the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelParameters {
    /// Panel mass (kg).
    pub mass: f64,
    /// Spring stiffness (N/m).
    pub stiffness: f64,
    /// Exposed area (m²).
    pub area: f64,
    /// Linear (viscous) damping `c1` (N·s/m).
    pub linear_damping: f64,
    /// Quadratic (aerodynamic) damping `c2` (N·s²/m²).
    pub quadratic_damping: f64,
    /// Structural displacement limit `y_max` (m).
    pub max_displacement: f64,
}

impl PanelParameters {
    /// Undamped natural angular frequency `ω_n = sqrt(k/m)` (rad/s).
    pub fn natural_frequency(&self) -> f64 {
        if self.mass > 0.0 && self.stiffness > 0.0 {
            (self.stiffness / self.mass).sqrt()
        } else {
            0.0
        }
    }

    /// Mechanical damping ratio `ζ = c1 / (2·sqrt(k·m))`.
    pub fn damping_ratio(&self) -> f64 {
        if self.mass > 0.0 && self.stiffness > 0.0 {
            self.linear_damping / (2.0 * (self.stiffness * self.mass).sqrt())
        } else {
            0.0
        }
    }

    /// Damped resonant frequency in hertz, or 0 for an overdamped panel.
    pub fn resonant_frequency_hz(&self) -> f64 {
        let zeta = self.damping_ratio();
        if zeta >= 1.0 {
            return 0.0;
        }
        self.natural_frequency() * (1.0 - zeta * zeta).sqrt() / (2.0 * std::f64::consts::PI)
    }
}

/// Wind conditions seen by every panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentState {
    /// Free-stream wind speed (m/s).
    pub wind_speed: f64,
    /// Air density (kg/m³).
    pub air_density: f64,
}

impl EnvironmentState {
    pub fn new(wind_speed: f64, air_density: f64) -> Self {
        Self {
            wind_speed,
            air_density,
        }
    }

    /// Beaufort classification of the current wind speed.
    pub fn beaufort(&self) -> Beaufort {
        Beaufort::from_speed(self.wind_speed)
    }
}

/// Beaufort wind force, 0 (calm) to 12 (hurricane).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Beaufort(pub u8);

/// Upper speed bounds (m/s, exclusive) of Beaufort forces 0 through 11.
const BEAUFORT_LIMITS: [f64; 12] = [
    0.3, 1.6, 3.4, 5.5, 8.0, 10.8, 13.9, 17.2, 20.8, 24.5, 28.5, 32.7,
];

const BEAUFORT_NAMES: [&str; 13] = [
    "Calm",
    "Light Air",
    "Light Breeze",
    "Gentle Breeze",
    "Moderate Breeze",
    "Fresh Breeze",
    "Strong Breeze",
    "Near Gale",
    "Gale",
    "Strong Gale",
    "Storm",
    "Violent Storm",
    "Hurricane",
];

impl Beaufort {
    pub fn from_speed(wind_speed: f64) -> Self {
        let force = BEAUFORT_LIMITS
            .iter()
            .position(|&limit| wind_speed < limit)
            .unwrap_or(BEAUFORT_LIMITS.len());
        Self(force as u8)
    }

    pub fn description(&self) -> &'static str {
        BEAUFORT_NAMES[usize::from(self.0).min(BEAUFORT_NAMES.len() - 1)]
    }
}

impl fmt::Display for Beaufort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} BF)", self.description(), self.0)
    }
}

/// Electrical readings derived from one panel in one tick. Never carried across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElectricalState {
    /// Transducer voltage (V).
    pub voltage: f64,
    /// Delivered power (W).
    pub power: f64,
    /// Electrical damping applied during the tick (N·s/m).
    pub electrical_damping: f64,
}

/// Gaussian noise via Box-Muller.
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `std_dev` - Standard deviation of the noise
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}
