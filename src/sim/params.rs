//! Live parameter updates and cooperative stop, both applied at tick boundaries.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::warn;

use crate::components::{EnvironmentState, PanelParameters};

/// Closed interval a live parameter is clamped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeRange {
    pub min: f64,
    pub max: f64,
}

impl SafeRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamps `value` into the range, logging a warning when it had to move.
    ///
    /// NaN maps to `min`.
    pub fn clamp(&self, name: &'static str, value: f64) -> f64 {
        let clamped = if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        };
        if clamped != value {
            warn!(
                parameter = name,
                requested = value,
                applied = clamped,
                "parameter out of range, clamped"
            );
        }
        clamped
    }
}

/// Panel mass (kg).
pub const MASS_RANGE: SafeRange = SafeRange::new(0.1, 500.0);
/// Panel stiffness (N/m).
pub const STIFFNESS_RANGE: SafeRange = SafeRange::new(1.0, 1.0e7);
/// Linear damping `c1` (N·s/m).
pub const LINEAR_DAMPING_RANGE: SafeRange = SafeRange::new(0.0, 1.0e4);
/// Quadratic damping `c2` (N·s²/m²).
pub const QUADRATIC_DAMPING_RANGE: SafeRange = SafeRange::new(0.0, 1.0e4);
/// Wind speed (m/s).
pub const WIND_SPEED_RANGE: SafeRange = SafeRange::new(0.0, 30.0);
/// Air density (kg/m³).
pub const AIR_DENSITY_RANGE: SafeRange = SafeRange::new(0.5, 1.5);

/// A partial change to the live-tunable parameters. `None` fields keep their value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParameterUpdate {
    pub mass: Option<f64>,
    pub stiffness: Option<f64>,
    pub linear_damping: Option<f64>,
    pub quadratic_damping: Option<f64>,
    pub wind_speed: Option<f64>,
    pub air_density: Option<f64>,
}

impl ParameterUpdate {
    pub fn wind_speed(v: f64) -> Self {
        Self {
            wind_speed: Some(v),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Layers `later` on top of `self`; fields set in `later` win.
    pub fn merge(self, later: Self) -> Self {
        Self {
            mass: later.mass.or(self.mass),
            stiffness: later.stiffness.or(self.stiffness),
            linear_damping: later.linear_damping.or(self.linear_damping),
            quadratic_damping: later.quadratic_damping.or(self.quadratic_damping),
            wind_speed: later.wind_speed.or(self.wind_speed),
            air_density: later.air_density.or(self.air_density),
        }
    }

    /// Returns a copy with every present field clamped into its safe range.
    pub fn clamped(&self) -> Self {
        Self {
            mass: self.mass.map(|v| MASS_RANGE.clamp("mass", v)),
            stiffness: self.stiffness.map(|v| STIFFNESS_RANGE.clamp("stiffness", v)),
            linear_damping: self
                .linear_damping
                .map(|v| LINEAR_DAMPING_RANGE.clamp("linear_damping", v)),
            quadratic_damping: self
                .quadratic_damping
                .map(|v| QUADRATIC_DAMPING_RANGE.clamp("quadratic_damping", v)),
            wind_speed: self
                .wind_speed
                .map(|v| WIND_SPEED_RANGE.clamp("wind_speed", v)),
            air_density: self
                .air_density
                .map(|v| AIR_DENSITY_RANGE.clamp("air_density", v)),
        }
    }

    /// Writes the panel fields of an already clamped update.
    pub fn apply_to_panel(&self, params: &mut PanelParameters) {
        if let Some(m) = self.mass {
            params.mass = m;
        }
        if let Some(k) = self.stiffness {
            params.stiffness = k;
        }
        if let Some(c1) = self.linear_damping {
            params.linear_damping = c1;
        }
        if let Some(c2) = self.quadratic_damping {
            params.quadratic_damping = c2;
        }
    }

    /// Writes the environment fields of an already clamped update.
    pub fn apply_to_environment(&self, env: &mut EnvironmentState) {
        if let Some(v) = self.wind_speed {
            env.wind_speed = v;
        }
        if let Some(rho) = self.air_density {
            env.air_density = rho;
        }
    }
}

/// Sending side of the parameter inbox. Cheap to clone, usable from any thread.
#[derive(Debug, Clone)]
pub struct ParameterHandle {
    tx: Sender<ParameterUpdate>,
}

impl ParameterHandle {
    /// Queues an update for the next tick boundary.
    ///
    /// Returns `false` once the engine owning the inbox has been dropped.
    pub fn send(&self, update: ParameterUpdate) -> bool {
        self.tx.send(update).is_ok()
    }
}

/// A merged, clamped set of updates tagged with a monotonically increasing version.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSnapshot {
    pub version: u64,
    pub update: ParameterUpdate,
}

/// Receiving side owned by the engine; drained only between ticks.
#[derive(Debug)]
pub struct ParameterInbox {
    rx: Receiver<ParameterUpdate>,
    tx: Sender<ParameterUpdate>,
    version: u64,
}

impl Default for ParameterInbox {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterInbox {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { rx, tx, version: 0 }
    }

    pub fn handle(&self) -> ParameterHandle {
        ParameterHandle {
            tx: self.tx.clone(),
        }
    }

    /// Version of the last snapshot taken; 0 before any update.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Drains everything queued so far into one clamped snapshot.
    ///
    /// Returns `None` when nothing is pending.
    pub fn take_snapshot(&mut self) -> Option<ParameterSnapshot> {
        let merged = self
            .rx
            .try_iter()
            .fold(ParameterUpdate::default(), ParameterUpdate::merge);
        if merged.is_empty() {
            return None;
        }
        self.version += 1;
        let snapshot = ParameterSnapshot {
            version: self.version,
            update: merged.clamped(),
        };
        Some(snapshot)
    }
}

/// Cooperative stop flag checked by the run loop between ticks.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}
