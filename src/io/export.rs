//! CSV export for simulation step results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::StepResult;

/// Column header for CSV telemetry export: one row per panel per tick.
const HEADER: &str = "tick,time_s,panel,displacement_m,velocity_mps,force_n,\
                      damping_ns_per_m,voltage_v,power_w,battery_j,soc,status";

/// Exports simulation results to a CSV file at the given path.
///
/// Writes a header row followed by one data row per panel per tick.
/// Produces deterministic output for identical inputs.
///
/// # Arguments
///
/// * `results` - Complete simulation step results
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(results: &[StepResult], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(results, buf)
}

/// Writes simulation results as CSV to any writer.
///
/// `power_w` is the power actually delivered to the store, so it reads zero
/// on and after the tick a panel trips.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(results: &[StepResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in results {
        for p in &r.panels {
            wtr.write_record(&[
                r.tick.to_string(),
                format!("{:.6}", r.time_s),
                p.id.to_string(),
                format!("{:.9}", p.displacement),
                format!("{:.9}", p.velocity),
                format!("{:.6}", p.force),
                format!("{:.6}", p.damping),
                format!("{:.6}", p.electrical.voltage),
                format!("{:.9}", p.delivered_w),
                format!("{:.6}", r.battery_j),
                format!("{:.9}", r.soc),
                p.status.to_string(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{ElectricalState, FailSafeStatus, PanelReading};

    fn reading(id: usize) -> PanelReading {
        PanelReading {
            id,
            time_s: 0.001,
            displacement: 0.0012,
            velocity: -0.05,
            force: 3.0,
            damping: 6.0,
            electrical: ElectricalState {
                voltage: 1.25,
                power: 0.006,
                electrical_damping: 5.5,
            },
            delivered_w: 0.006,
            average_power_w: 0.006,
            status: FailSafeStatus::Running,
            fault: None,
        }
    }

    fn make_step(t: usize, panels: usize) -> StepResult {
        StepResult {
            tick: t,
            time_s: (t + 1) as f64 * 0.001,
            wind_speed: 10.0,
            panels: (0..panels).map(reading).collect(),
            generated_w: 0.006 * panels as f64,
            battery_j: 0.01,
            soc: 2e-7,
            params_version: 0,
        }
    }

    fn to_string(results: &[StepResult]) -> String {
        let mut buf = Vec::new();
        write_csv(results, &mut buf).ok();
        String::from_utf8(buf).unwrap_or_default()
    }

    #[test]
    fn header_matches_schema() {
        let output = to_string(&[make_step(0, 1)]);
        let first_line = output.lines().next().unwrap_or("");
        assert_eq!(
            first_line,
            "tick,time_s,panel,displacement_m,velocity_mps,force_n,\
             damping_ns_per_m,voltage_v,power_w,battery_j,soc,status"
        );
    }

    #[test]
    fn one_row_per_panel_per_tick() {
        let results: Vec<StepResult> = (0..10).map(|t| make_step(t, 3)).collect();
        let output = to_string(&results);
        // 1 header + 10 ticks x 3 panels
        assert_eq!(output.lines().count(), 31);
    }

    #[test]
    fn deterministic_output() {
        let results: Vec<StepResult> = (0..5).map(|t| make_step(t, 2)).collect();
        assert_eq!(to_string(&results), to_string(&results));
    }

    #[test]
    fn rows_are_parseable() {
        let results: Vec<StepResult> = (0..3).map(|t| make_step(t, 1)).collect();
        let output = to_string(&results);

        let mut rdr = csv::ReaderBuilder::new().from_reader(output.as_bytes());
        let headers = rdr.headers().cloned().ok();
        assert_eq!(headers.as_ref().map(csv::StringRecord::len), Some(12));

        let mut row_count = 0;
        for record in rdr.records() {
            let rec = record.ok();
            assert!(rec.is_some(), "every row should parse");
            if let Some(rec) = rec {
                for i in 0..11 {
                    assert!(rec[i].parse::<f64>().is_ok(), "column {i} should be numeric");
                }
                assert_eq!(&rec[11], "RUNNING");
            }
            row_count += 1;
        }
        assert_eq!(row_count, 3);
    }
}
