//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use piezo_window_sim::components::{
    BatteryStore, DampingModel, EnvironmentState, Panel, PanelId, PanelParameters, PanelState,
    PiezoelectricConverter, StepPolicy, Turbulence, WindModel,
};
use piezo_window_sim::sim::engine::Engine;
use piezo_window_sim::sim::types::SimConfig;

/// Bench panel: 1 kg, 1000 N/m, c1 = 0.5, 1 m², with the given structural limit.
pub fn bench_params(max_displacement: f64) -> PanelParameters {
    PanelParameters {
        mass: 1.0,
        stiffness: 1000.0,
        area: 1.0,
        linear_damping: 0.5,
        quadratic_damping: 0.0,
        max_displacement,
    }
}

/// Wind model with turbulence switched off.
pub fn quiet_wind() -> WindModel {
    WindModel {
        turbulence: Turbulence::Off,
        ..WindModel::default()
    }
}

/// Bench converter: η = 0.8, R = 100 Ω.
pub fn bench_converter() -> PiezoelectricConverter {
    PiezoelectricConverter {
        efficiency: 0.8,
        resistance: 100.0,
        ..PiezoelectricConverter::default()
    }
}

/// A quiet bench panel with id `id`, starting from `state`.
pub fn bench_panel(id: PanelId, max_displacement: f64, state: PanelState) -> Panel {
    Panel::new(
        id,
        bench_params(max_displacement),
        quiet_wind(),
        StepPolicy::default(),
        5000,
        42 + id as u64,
    )
    .with_state(state)
}

/// Engine over `panels` at Δt = 1 ms, ρ = 1.2, lossless 50 kJ store starting empty.
pub fn engine_with(panels: Vec<Panel>, wind_speed: f64, ticks: usize) -> Engine {
    Engine::new(
        SimConfig::new(0.001, ticks, 42),
        panels,
        BatteryStore::new(50_000.0, 0.0, 0.0),
        EnvironmentState::new(wind_speed, 1.2),
        DampingModel::default(),
        bench_converter(),
    )
}

/// Largest `|y|` of panel `index` over a slice of results.
pub fn peak_displacement(results: &[piezo_window_sim::sim::types::StepResult], index: usize) -> f64 {
    results
        .iter()
        .filter_map(|r| r.panels.get(index))
        .map(|p| p.displacement.abs())
        .fold(0.0, f64::max)
}
