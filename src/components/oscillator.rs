//! Fixed-tick integrator for the forced, damped single-degree-of-freedom panel.
//!
//! Solves `m·ÿ + c·ẏ + k·y = F` over one tick with classical RK4 substeps.
//! Substeps are capped at `stability_fraction / ω_eff`, where
//! `ω_eff = max(sqrt(k/m), c/m)`, and refined by step doubling until the
//! local error estimate meets `abs_tol + rel_tol·|x|`. Forcing and damping
//! are held constant across the tick.

use crate::error::{SimError, SimResult};

use super::types::{PanelId, PanelState};

/// Substep sizing and local error control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPolicy {
    /// Largest substep as a fraction of `1/ω_eff`. RK4 is stable up to ~2.8.
    pub stability_fraction: f64,
    /// Absolute error tolerance per substep.
    pub abs_tol: f64,
    /// Relative error tolerance per substep.
    pub rel_tol: f64,
    /// Sets the substep floor `dt / max_substeps`. A substep at the floor is
    /// accepted even if it misses the tolerance, and counted in [`StepStats::forced`].
    pub max_substeps: usize,
}

impl Default for StepPolicy {
    fn default() -> Self {
        Self {
            stability_fraction: 0.1,
            abs_tol: 1e-12,
            rel_tol: 1e-9,
            max_substeps: 10_000,
        }
    }
}

/// Coefficients of the ODE for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInputs {
    /// Mass `m` (kg).
    pub mass: f64,
    /// Stiffness `k` (N/m).
    pub stiffness: f64,
    /// Total damping `c_total` (N·s/m).
    pub damping: f64,
    /// External force `F` (N).
    pub force: f64,
}

impl StepInputs {
    fn accel(&self, y: f64, v: f64) -> f64 {
        (self.force - self.damping * v - self.stiffness * y) / self.mass
    }

    fn effective_frequency(&self) -> f64 {
        let wn = (self.stiffness.max(0.0) / self.mass).sqrt();
        let damping_rate = self.damping.abs() / self.mass;
        wn.max(damping_rate)
    }
}

/// Bookkeeping from the last integrated tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepStats {
    pub accepted: usize,
    pub rejected: usize,
    /// Substeps accepted at the minimum size although their error estimate failed.
    pub forced: usize,
}

/// Per-panel integrator. Holds only step-control state, never panel state.
#[derive(Debug, Clone)]
pub struct OscillatorIntegrator {
    policy: StepPolicy,
    /// Substep carried over from the previous tick.
    h_hint: Option<f64>,
    stats: StepStats,
}

impl OscillatorIntegrator {
    pub fn new(policy: StepPolicy) -> Self {
        Self {
            policy,
            h_hint: None,
            stats: StepStats::default(),
        }
    }

    pub fn policy(&self) -> &StepPolicy {
        &self.policy
    }

    pub fn last_stats(&self) -> StepStats {
        self.stats
    }

    /// Forgets the carried-over substep, e.g. after a parameter change.
    pub fn reset(&mut self) {
        self.h_hint = None;
        self.stats = StepStats::default();
    }

    /// Advances `state` by `dt`.
    ///
    /// # Errors
    ///
    /// `SimError::InvalidArg` for a non-positive `dt` or mass,
    /// `SimError::NumericDivergence` if the result is not finite. The
    /// state is left untouched on error.
    pub fn step(
        &mut self,
        panel: PanelId,
        state: &PanelState,
        inputs: &StepInputs,
        dt: f64,
    ) -> SimResult<PanelState> {
        if dt.is_nan() || dt <= 0.0 || dt.is_infinite() {
            return Err(SimError::InvalidArg {
                what: "dt must be positive and finite",
            });
        }
        if inputs.mass.is_nan() || inputs.mass <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "mass must be positive",
            });
        }
        let diverged = || SimError::NumericDivergence {
            panel,
            time_s: state.time,
        };
        if !state.is_finite() || !inputs.force.is_finite() || !inputs.damping.is_finite() {
            return Err(diverged());
        }

        let omega = inputs.effective_frequency();
        let h_cap = if omega > 0.0 {
            (self.policy.stability_fraction / omega).min(dt)
        } else {
            dt
        };
        let h_min = dt / self.policy.max_substeps.max(1) as f64;

        let mut y = state.displacement;
        let mut v = state.velocity;
        let mut elapsed = 0.0;
        let mut h = self.h_hint.unwrap_or(h_cap).min(h_cap).max(h_min);
        let mut stats = StepStats::default();

        while elapsed < dt {
            let remaining = dt - elapsed;
            // absorb float slivers at the end of the tick
            let last = h >= remaining || remaining - h < 1e-9 * dt;
            let this_h = if last { remaining } else { h };

            let (y_full, v_full) = rk4(inputs, y, v, this_h);
            let (y_mid, v_mid) = rk4(inputs, y, v, 0.5 * this_h);
            let (y_half, v_half) = rk4(inputs, y_mid, v_mid, 0.5 * this_h);

            let err = error_norm(&self.policy, [y_full, v_full], [y_half, v_half]);
            if !err.is_finite() {
                return Err(diverged());
            }

            // at the substep floor the step is taken regardless and counted
            if err <= 1.0 || h <= h_min {
                y = y_half;
                v = v_half;
                elapsed = if last { dt } else { elapsed + this_h };
                stats.accepted += 1;
                if err > 1.0 {
                    stats.forced += 1;
                }
                h = (this_h * grow_factor(err)).min(h_cap).max(h_min);
            } else {
                stats.rejected += 1;
                h = (this_h * shrink_factor(err)).max(h_min);
            }
        }

        let next = PanelState {
            displacement: y,
            velocity: v,
            time: state.time + dt,
        };
        if !next.is_finite() {
            return Err(diverged());
        }
        self.h_hint = Some(h);
        self.stats = stats;
        Ok(next)
    }
}

fn rk4(inputs: &StepInputs, y: f64, v: f64, h: f64) -> (f64, f64) {
    let k1y = v;
    let k1v = inputs.accel(y, v);

    let k2y = v + 0.5 * h * k1v;
    let k2v = inputs.accel(y + 0.5 * h * k1y, v + 0.5 * h * k1v);

    let k3y = v + 0.5 * h * k2v;
    let k3v = inputs.accel(y + 0.5 * h * k2y, v + 0.5 * h * k2v);

    let k4y = v + h * k3v;
    let k4v = inputs.accel(y + h * k3y, v + h * k3v);

    (
        y + h / 6.0 * (k1y + 2.0 * k2y + 2.0 * k3y + k4y),
        v + h / 6.0 * (k1v + 2.0 * k2v + 2.0 * k3v + k4v),
    )
}

/// Scaled max-norm of the step-doubling difference; `<= 1` means accept.
fn error_norm(policy: &StepPolicy, coarse: [f64; 2], fine: [f64; 2]) -> f64 {
    coarse
        .iter()
        .zip(fine.iter())
        .map(|(c, f)| (c - f).abs() / (policy.abs_tol + policy.rel_tol * f.abs()))
        .fold(0.0, f64::max)
}

// Step-size factors, 0.9·err^(-1/5) bounded to [0.2, 5].
fn grow_factor(err: f64) -> f64 {
    if err <= 0.0 {
        return 5.0;
    }
    (0.9 * err.powf(-0.2)).clamp(1.0, 5.0)
}

fn shrink_factor(err: f64) -> f64 {
    (0.9 * err.powf(-0.2)).clamp(0.2, 0.9)
}
