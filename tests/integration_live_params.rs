//! Integration tests for live parameter updates, scripted wind and cooperative stop.

mod common;

use std::thread;

use piezo_window_sim::components::PanelState;
use piezo_window_sim::sim::engine::StopReason;
use piezo_window_sim::sim::event::{WindChange, WindSchedule};
use piezo_window_sim::sim::params::ParameterUpdate;

#[test]
fn update_sent_mid_run_applies_at_next_tick() {
    let panel = common::bench_panel(0, 1.0, PanelState::at_rest());
    let mut engine = common::engine_with(vec![panel], 10.0, 300);
    let handle = engine.parameter_handle();

    let mut results = Vec::new();
    engine.run_with(|r| {
        if r.tick == 99 {
            handle.send(ParameterUpdate {
                wind_speed: Some(20.0),
                stiffness: Some(2000.0),
                ..ParameterUpdate::default()
            });
        }
        results.push(r);
    });

    assert_eq!(results[99].wind_speed, 10.0);
    assert_eq!(results[99].params_version, 0);
    assert_eq!(results[100].wind_speed, 20.0);
    assert_eq!(results[100].params_version, 1);
    assert_eq!(results[299].params_version, 1);
    assert_eq!(engine.panels()[0].params().stiffness, 2000.0);
}

#[test]
fn updates_from_other_threads_are_merged_and_clamped() {
    let panel = common::bench_panel(0, 1.0, PanelState::at_rest());
    let mut engine = common::engine_with(vec![panel], 10.0, 10);

    let workers: Vec<_> = [
        ParameterUpdate {
            mass: Some(1000.0),
            ..ParameterUpdate::default()
        },
        ParameterUpdate {
            air_density: Some(0.1),
            ..ParameterUpdate::default()
        },
    ]
    .into_iter()
    .map(|update| {
        let handle = engine.parameter_handle();
        thread::spawn(move || handle.send(update))
    })
    .collect();
    for w in workers {
        assert_eq!(w.join().ok(), Some(true));
    }

    let results = engine.run();
    assert_eq!(results[0].params_version, 1);
    assert_eq!(engine.panels()[0].params().mass, 500.0);
    assert_eq!(engine.environment().air_density, 0.5);
}

#[test]
fn scripted_wind_reaches_the_panels() {
    let panel = common::bench_panel(0, 1.0, PanelState::at_rest());
    let schedule = WindSchedule::new(vec![
        WindChange {
            tick: 0,
            wind_speed: 0.0,
        },
        WindChange {
            tick: 200,
            wind_speed: 12.0,
        },
    ]);
    let mut engine = common::engine_with(vec![panel], 10.0, 400).with_schedule(schedule);
    let results = engine.run();

    // calm until the gust arrives
    assert!(results[..200].iter().all(|r| r.panels[0].displacement == 0.0));
    assert_eq!(results[200].wind_speed, 12.0);
    assert!(common::peak_displacement(&results[200..], 0) > 0.0);
}

#[test]
fn stop_before_run_executes_nothing() {
    let panel = common::bench_panel(0, 1.0, PanelState::at_rest());
    let mut engine = common::engine_with(vec![panel], 10.0, 100);
    engine.stop_signal().stop();
    let mut count = 0;
    let reason = engine.run_with(|_| count += 1);
    assert_eq!(reason, StopReason::Stopped);
    assert_eq!(count, 0);
}

#[test]
fn cleared_stop_resumes_where_it_left_off() {
    let panel = common::bench_panel(0, 1.0, PanelState::at_rest());
    let mut engine = common::engine_with(vec![panel], 10.0, 100);
    let stop = engine.stop_signal();

    let mut first = Vec::new();
    engine.run_with(|r| {
        if r.tick == 39 {
            stop.stop();
        }
        first.push(r);
    });
    assert_eq!(first.len(), 40);

    engine.stop_signal().clear();
    let rest = engine.run();
    assert_eq!(rest.len(), 60);
    assert_eq!(rest[0].tick, 40);
}
