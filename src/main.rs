//! Piezo window simulator entry point: CLI wiring and config-driven engine construction.

use std::path::Path;
use std::process;

use piezo_window_sim::components::FailSafeStatus;
use piezo_window_sim::config::ScenarioConfig;
use piezo_window_sim::io::export::export_csv;
use piezo_window_sim::sim::kpi::RunReport;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    ticks_override: Option<usize>,
    telemetry_out: Option<String>,
    every: usize,
}

fn print_help() {
    eprintln!("piezo-window-sim: wind-excited piezoelectric window panel simulator");
    eprintln!();
    eprintln!("Usage: piezo-window-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --ticks <n>              Override number of ticks");
    eprintln!("  --telemetry-out <path>   Export per-panel step results to CSV");
    eprintln!("  --every <n>              Print every n-th tick (default: 1000)");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

/// Returns the value following flag `name`, exiting with a message if missing.
fn value_of(args: &[String], i: usize, name: &str, kind: &str) -> String {
    match args.get(i) {
        Some(v) => v.clone(),
        None => {
            eprintln!("error: {name} requires a {kind} argument");
            process::exit(1);
        }
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str, name: &str, kind: &str) -> T {
    match raw.parse::<T>() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("error: {name} value \"{raw}\" is not a valid {kind}");
            process::exit(1);
        }
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        ticks_override: None,
        telemetry_out: None,
        every: 1000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                cli.scenario_path = Some(value_of(&args, i, "--scenario", "path"));
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(value_of(&args, i, "--preset", "name"));
            }
            "--seed" => {
                i += 1;
                let raw = value_of(&args, i, "--seed", "u64");
                cli.seed_override = Some(parse_number(&raw, "--seed", "u64"));
            }
            "--ticks" => {
                i += 1;
                let raw = value_of(&args, i, "--ticks", "count");
                cli.ticks_override = Some(parse_number(&raw, "--ticks", "count"));
            }
            "--telemetry-out" => {
                i += 1;
                cli.telemetry_out = Some(value_of(&args, i, "--telemetry-out", "path"));
            }
            "--every" => {
                i += 1;
                let raw = value_of(&args, i, "--every", "count");
                cli.every = parse_number::<usize>(&raw, "--every", "count").max(1);
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    // logs go to stderr so stdout stays a clean data stream
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    // --scenario takes priority, then --preset, then baseline default
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(ticks) = cli.ticks_override {
        scenario.simulation.ticks = ticks;
    }

    let mut engine = match scenario.build() {
        Ok(engine) => engine,
        Err(errors) => {
            for e in &errors {
                eprintln!("{e}");
            }
            process::exit(1);
        }
    };

    for panel in engine.panels() {
        let p = panel.params();
        println!(
            "panel {}: f_n={:.2} Hz, zeta={:.4}, f_d={:.2} Hz, limit={:.1} mm",
            panel.id(),
            p.natural_frequency() / std::f64::consts::TAU,
            p.damping_ratio(),
            p.resonant_frequency_hz(),
            p.max_displacement * 1000.0
        );
    }
    println!("wind: {}", engine.environment().beaufort());

    let every = cli.every;
    let mut results = Vec::with_capacity(engine.config().ticks);
    let mut last_status = FailSafeStatus::Running;
    let reason = engine.run_with(|r| {
        // always show the tick on which the fleet status changes
        if r.tick % every == 0 || r.status() != last_status {
            println!("{r}");
        }
        last_status = r.status();
        results.push(r);
    });
    if let Some(last) = results.last().filter(|r| r.tick % every != 0) {
        println!("{last}");
    }

    let cfg = engine.config();
    let report = RunReport::from_results(&results, cfg.dt_s, cfg.windows_per_panel);
    println!("\nstopped: {reason:?}");
    println!("{report}");

    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_csv(&results, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Telemetry written to {path}");
    }
}
