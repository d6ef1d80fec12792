//! Simulation engine that drives the fleet, the shared store and the inbox.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::components::{
    BatteryStore, DampingModel, EnvironmentState, Panel, PanelId, PanelReading,
    PiezoelectricConverter, TickContext,
};

use super::clock::Clock;
use super::event::WindSchedule;
use super::history::PowerHistory;
use super::params::{ParameterHandle, ParameterInbox, StopSignal};
use super::types::{SimConfig, StepResult};

/// Why a run loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The clock handed out all its ticks.
    Completed,
    /// The external stop signal was raised.
    Stopped,
    /// Every panel has tripped or diverged.
    AllPanelsHalted,
}

/// Simulation engine owning the panel arena, the store and the clock.
///
/// Each tick runs in three phases:
/// 1. apply the pending parameter snapshot and scripted wind changes,
/// 2. advance every panel against the same state-of-charge snapshot from the
///    previous tick (panels are disjoint, so this runs in parallel),
/// 3. reduce the panels' delivered power into the store in a single write.
pub struct Engine {
    config: SimConfig,
    clock: Clock,
    panels: Vec<Panel>,
    battery: BatteryStore,
    environment: EnvironmentState,
    damping: DampingModel,
    converter: PiezoelectricConverter,
    inbox: ParameterInbox,
    schedule: WindSchedule,
    stop: StopSignal,
}

impl Engine {
    /// Creates a new simulation engine.
    ///
    /// # Arguments
    ///
    /// * `config` - Run configuration
    /// * `panels` - Panel arena; ids are expected to match positions
    /// * `battery` - Shared energy store
    /// * `environment` - Initial wind conditions
    /// * `damping` - Electrical damping model
    /// * `converter` - Piezoelectric conversion shared by all panels
    pub fn new(
        config: SimConfig,
        panels: Vec<Panel>,
        battery: BatteryStore,
        environment: EnvironmentState,
        damping: DampingModel,
        converter: PiezoelectricConverter,
    ) -> Self {
        let clock = Clock::new(config.ticks, config.dt_s);
        Self {
            config,
            clock,
            panels,
            battery,
            environment,
            damping,
            converter,
            inbox: ParameterInbox::new(),
            schedule: WindSchedule::default(),
            stop: StopSignal::new(),
        }
    }

    /// Installs scripted wind changes.
    pub fn with_schedule(mut self, schedule: WindSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Handle through which collaborators push live parameter updates.
    pub fn parameter_handle(&self) -> ParameterHandle {
        self.inbox.handle()
    }

    /// Flag that halts [`Engine::run_with`] at the next tick boundary.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Applies scripted changes and the pending parameter snapshot for `tick`.
    fn apply_pending(&mut self, tick: usize) {
        if let Some(update) = self.schedule.due(tick) {
            self.inbox.handle().send(update);
        }
        let Some(snapshot) = self.inbox.take_snapshot() else {
            return;
        };
        for panel in &mut self.panels {
            snapshot.update.apply_to_panel(panel.params_mut());
        }
        snapshot.update.apply_to_environment(&mut self.environment);
        debug!(
            tick,
            version = snapshot.version,
            wind_speed = self.environment.wind_speed,
            "parameter snapshot applied"
        );
    }

    /// Executes one tick and returns its snapshot, or `None` once the clock is done.
    pub fn step(&mut self) -> Option<StepResult> {
        let tick = self.clock.tick()?;
        self.apply_pending(tick.index);

        // every panel sees the SoC left by the previous tick
        let soc = self.battery.state_of_charge();
        let ctx = TickContext {
            dt: tick.dt,
            environment: &self.environment,
            state_of_charge: soc,
            damping: &self.damping,
            converter: &self.converter,
        };

        let readings: Vec<PanelReading> = self
            .panels
            .par_iter_mut()
            .map(|panel| panel.advance(&ctx))
            .collect();

        let per_window_w: f64 = readings.iter().map(|r| r.delivered_w).sum();
        let generated_w = per_window_w * f64::from(self.config.windows_per_panel);
        self.battery.accumulate(generated_w, tick.dt);

        Some(StepResult {
            tick: tick.index,
            time_s: tick.start_s + tick.dt,
            wind_speed: self.environment.wind_speed,
            panels: readings,
            generated_w,
            battery_j: self.battery.energy(),
            soc: self.battery.state_of_charge(),
            params_version: self.inbox.version(),
        })
    }

    /// Runs until the clock finishes, the stop signal is raised, or no panel
    /// is left running. Each snapshot is passed to `on_step` as it is produced.
    pub fn run_with(&mut self, mut on_step: impl FnMut(StepResult)) -> StopReason {
        info!(
            panels = self.panels.len(),
            ticks = self.config.ticks,
            dt_s = self.config.dt_s,
            "simulation started"
        );
        let reason = loop {
            if self.stop.is_stopped() {
                break StopReason::Stopped;
            }
            if !self.panels.is_empty() && self.panels.iter().all(|p| !p.is_active()) {
                break StopReason::AllPanelsHalted;
            }
            match self.step() {
                Some(result) => on_step(result),
                None => break StopReason::Completed,
            }
        };
        info!(
            ?reason,
            ticks = self.clock.ticks_done(),
            battery_j = self.battery.energy(),
            "simulation finished"
        );
        reason
    }

    /// Runs to completion and returns every tick's snapshot.
    pub fn run(&mut self) -> Vec<StepResult> {
        let mut results = Vec::with_capacity(self.config.ticks);
        self.run_with(|r| results.push(r));
        results
    }

    /// Re-initializes one panel at rest and re-arms its fail-safe.
    ///
    /// Returns `false` for an unknown id.
    pub fn reset_panel(&mut self, id: PanelId) -> bool {
        match self.panels.get_mut(id) {
            Some(panel) => {
                panel.reset();
                info!(panel = id, "panel reset");
                true
            }
            None => false,
        }
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Returns a reference to the store.
    pub fn battery(&self) -> &BatteryStore {
        &self.battery
    }

    pub fn environment(&self) -> &EnvironmentState {
        &self.environment
    }

    /// Returns a reference to the run configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Changes the tick length from the next tick on.
    ///
    /// Each panel's power history is resized so the rolling average keeps
    /// spanning `average_window_s`. Returns `false` and changes nothing for
    /// a non-positive or non-finite `dt`.
    pub fn set_dt(&mut self, dt: f64) -> bool {
        if !self.clock.set_dt(dt) {
            return false;
        }
        let len = PowerHistory::window_for(self.config.average_window_s, dt);
        for panel in &mut self.panels {
            panel.resize_history(len);
        }
        true
    }
}
