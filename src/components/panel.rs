use tracing::{error, warn};

use crate::error::SimError;
use crate::sim::history::PowerHistory;

use super::damping::DampingModel;
use super::failsafe::{FailSafeMonitor, FailSafeStatus};
use super::oscillator::{OscillatorIntegrator, StepInputs, StepPolicy};
use super::piezo::PiezoelectricConverter;
use super::types::{ElectricalState, EnvironmentState, PanelId, PanelParameters, PanelState};
use super::wind::{WindForceGenerator, WindModel};

/// Shared, read-only inputs for advancing every panel by one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Tick length (s).
    pub dt: f64,
    /// Wind conditions for this tick.
    pub environment: &'a EnvironmentState,
    /// Store state of charge at the end of the previous tick.
    pub state_of_charge: f64,
    pub damping: &'a DampingModel,
    pub converter: &'a PiezoelectricConverter,
}

/// What one panel did during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelReading {
    pub id: PanelId,
    /// Panel time after the tick (s).
    pub time_s: f64,
    /// Displacement (m).
    pub displacement: f64,
    /// Velocity (m/s).
    pub velocity: f64,
    /// External wind force applied (N).
    pub force: f64,
    /// Total damping applied (N·s/m).
    pub damping: f64,
    pub electrical: ElectricalState,
    /// Power delivered to the store this tick (W); zero unless running.
    pub delivered_w: f64,
    /// Rolling average of delivered power (W).
    pub average_power_w: f64,
    pub status: FailSafeStatus,
    /// Divergence raised on this tick, if any.
    pub fault: Option<SimError>,
}

/// One window panel: its state record plus the components that act on it.
///
/// Panels share nothing mutable; each owns its integrator, wind stream,
/// monitor and history.
#[derive(Debug, Clone)]
pub struct Panel {
    id: PanelId,
    state: PanelState,
    params: PanelParameters,
    integrator: OscillatorIntegrator,
    wind: WindForceGenerator,
    monitor: FailSafeMonitor,
    history: PowerHistory,
    /// Set once integration has diverged; the panel no longer advances.
    divergence: Option<SimError>,
    harvested_j: f64,
    peak_displacement: f64,
}

impl Panel {
    /// Creates a panel at rest.
    ///
    /// # Arguments
    ///
    /// * `id` - Index in the fleet arena
    /// * `params` - Mechanical parameters
    /// * `wind` - Wind load model
    /// * `policy` - Integrator step policy
    /// * `history_len` - Samples in the rolling power average
    /// * `seed` - Seed of this panel's turbulence stream
    pub fn new(
        id: PanelId,
        params: PanelParameters,
        wind: WindModel,
        policy: StepPolicy,
        history_len: usize,
        seed: u64,
    ) -> Self {
        let monitor = FailSafeMonitor::new(params.max_displacement);
        Self {
            id,
            state: PanelState::at_rest(),
            params,
            integrator: OscillatorIntegrator::new(policy),
            wind: WindForceGenerator::new(wind, seed),
            monitor,
            history: PowerHistory::new(history_len),
            divergence: None,
            harvested_j: 0.0,
            peak_displacement: 0.0,
        }
    }

    /// Replaces the initial condition; used to release a panel from a deflected state.
    pub fn with_state(mut self, state: PanelState) -> Self {
        self.state = state;
        self
    }

    /// Whether the panel still integrates.
    pub fn is_active(&self) -> bool {
        !self.monitor.is_tripped() && self.divergence.is_none()
    }

    /// Advances this panel by one tick.
    ///
    /// A tripped or diverged panel holds its state and delivers nothing.
    /// The tick on which the fail-safe trips delivers nothing either.
    pub fn advance(&mut self, ctx: &TickContext<'_>) -> PanelReading {
        if !self.is_active() {
            self.history.push(0.0);
            return self.reading(0.0, 0.0, ElectricalState::default(), 0.0, None);
        }

        let wn = self.params.natural_frequency();
        let force = self
            .wind
            .force(self.state.time, ctx.environment, &self.params, wn);
        let damping = ctx
            .damping
            .total(self.state.velocity, ctx.state_of_charge, &self.params);
        let inputs = StepInputs {
            mass: self.params.mass,
            stiffness: self.params.stiffness,
            damping,
            force,
        };

        let next = match self.integrator.step(self.id, &self.state, &inputs, ctx.dt) {
            Ok(next) => next,
            Err(e) => {
                error!(panel = self.id, time_s = self.state.time, "integration halted: {e}");
                self.divergence = Some(e.clone());
                self.history.push(0.0);
                return self.reading(force, damping, ElectricalState::default(), 0.0, Some(e));
            }
        };
        let stats = self.integrator.last_stats();
        if stats.forced > 0 {
            warn!(
                panel = self.id,
                time_s = next.time,
                forced = stats.forced,
                accepted = stats.accepted,
                "substeps accepted at the floor size above tolerance"
            );
        }
        self.state = next;
        self.peak_displacement = self.peak_displacement.max(next.displacement.abs());

        let (voltage, power) = ctx.converter.convert(next.velocity);
        let electrical = ElectricalState {
            voltage,
            power,
            electrical_damping: ctx.damping.electrical(ctx.state_of_charge),
        };

        let (_, tripped_now) = self.monitor.check(next.displacement, next.time);
        let delivered = if tripped_now {
            warn!(
                panel = self.id,
                time_s = next.time,
                displacement_m = next.displacement,
                limit_m = self.monitor.limit(),
                "structural limit exceeded, panel tripped"
            );
            0.0
        } else {
            power
        };

        self.harvested_j += delivered * ctx.dt;
        self.history.push(delivered);
        self.reading(force, damping, electrical, delivered, None)
    }

    fn reading(
        &self,
        force: f64,
        damping: f64,
        electrical: ElectricalState,
        delivered_w: f64,
        fault: Option<SimError>,
    ) -> PanelReading {
        PanelReading {
            id: self.id,
            time_s: self.state.time,
            displacement: self.state.displacement,
            velocity: self.state.velocity,
            force,
            damping,
            electrical,
            delivered_w,
            average_power_w: self.history.average(),
            status: self.monitor.status(),
            fault,
        }
    }

    /// Samples the rolling power average spans.
    pub fn history_window(&self) -> usize {
        self.history.capacity()
    }

    pub(crate) fn resize_history(&mut self, len: usize) {
        self.history.resize(len);
    }

    /// Re-initializes the panel at rest and re-arms its fail-safe.
    pub fn reset(&mut self) {
        self.state = PanelState::at_rest();
        self.monitor.reset();
        self.integrator.reset();
        self.history.clear();
        self.divergence = None;
        self.harvested_j = 0.0;
        self.peak_displacement = 0.0;
    }

    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn params(&self) -> &PanelParameters {
        &self.params
    }

    /// Mutable access for applying live parameter snapshots between ticks.
    pub(crate) fn params_mut(&mut self) -> &mut PanelParameters {
        &mut self.params
    }

    pub fn status(&self) -> FailSafeStatus {
        self.monitor.status()
    }

    pub fn divergence(&self) -> Option<&SimError> {
        self.divergence.as_ref()
    }

    /// Energy this panel (one window) has delivered (J).
    pub fn harvested_energy(&self) -> f64 {
        self.harvested_j
    }

    /// Largest `|y|` seen since the last reset (m).
    pub fn peak_displacement(&self) -> f64 {
        self.peak_displacement
    }

    pub fn average_power(&self) -> f64 {
        self.history.average()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::wind::Turbulence;

    fn params(limit: f64) -> PanelParameters {
        PanelParameters {
            mass: 1.0,
            stiffness: 1000.0,
            area: 1.0,
            linear_damping: 0.5,
            quadratic_damping: 0.0,
            max_displacement: limit,
        }
    }

    fn quiet_wind() -> WindModel {
        WindModel {
            turbulence: Turbulence::Off,
            ..WindModel::default()
        }
    }

    fn panel(limit: f64) -> Panel {
        Panel::new(0, params(limit), quiet_wind(), StepPolicy::default(), 50, 1)
    }

    fn ctx<'a>(
        env: &'a EnvironmentState,
        damping: &'a DampingModel,
        converter: &'a PiezoelectricConverter,
    ) -> TickContext<'a> {
        TickContext {
            dt: 0.001,
            environment: env,
            state_of_charge: 0.0,
            damping,
            converter,
        }
    }

    #[test]
    fn wind_drives_panel_and_delivers_power() {
        let env = EnvironmentState::new(10.0, 1.2);
        let damping = DampingModel::default();
        let converter = PiezoelectricConverter::default();
        let mut p = panel(1.0);
        let mut delivered = 0.0;
        for _ in 0..500 {
            delivered += p.advance(&ctx(&env, &damping, &converter)).delivered_w;
        }
        assert!(p.peak_displacement() > 0.0);
        assert!(delivered > 0.0);
        assert!(p.harvested_energy() > 0.0);
    }

    #[test]
    fn trip_tick_delivers_nothing_and_panel_freezes() {
        let env = EnvironmentState::new(0.0, 1.2);
        let damping = DampingModel::default();
        let converter = PiezoelectricConverter::default();
        // released just inside its limit, moving outward fast
        let mut p = panel(0.01).with_state(PanelState::released(0.0099, 2.0));
        let first = p.advance(&ctx(&env, &damping, &converter));
        assert_eq!(first.status, FailSafeStatus::Tripped);
        assert_eq!(first.delivered_w, 0.0);
        assert!(first.electrical.power > 0.0);

        let frozen = *p.state();
        let second = p.advance(&ctx(&env, &damping, &converter));
        assert_eq!(second.delivered_w, 0.0);
        assert_eq!(*p.state(), frozen);
        assert!(!p.is_active());
    }

    #[test]
    fn reset_restores_rest_and_running() {
        let env = EnvironmentState::new(0.0, 1.2);
        let damping = DampingModel::default();
        let converter = PiezoelectricConverter::default();
        let mut p = panel(0.01).with_state(PanelState::released(0.0099, 2.0));
        p.advance(&ctx(&env, &damping, &converter));
        assert!(!p.is_active());
        p.reset();
        assert!(p.is_active());
        assert_eq!(*p.state(), PanelState::at_rest());
        assert_eq!(p.harvested_energy(), 0.0);
    }

    #[test]
    fn divergence_halts_panel() {
        let env = EnvironmentState::new(0.0, 1.2);
        let damping = DampingModel::default();
        let converter = PiezoelectricConverter::default();
        let mut p = panel(f64::INFINITY).with_state(PanelState::released(f64::NAN, 0.0));
        let r = p.advance(&ctx(&env, &damping, &converter));
        assert!(matches!(r.fault, Some(SimError::NumericDivergence { panel: 0, .. })));
        assert!(p.divergence().is_some());
        let again = p.advance(&ctx(&env, &damping, &converter));
        assert!(again.fault.is_none());
        assert_eq!(again.delivered_w, 0.0);
    }
}
