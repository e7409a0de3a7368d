//! CSV and JSON export of run results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::economics::SystemSummary;
use crate::optimizer::OptimizerOutcome;
use crate::sim::{EnergyBalance, ShortfallSign};

/// Fixed leading columns of the hourly detail export.
const DETAIL_HEADER: &str = "hour,load,shortfall,surplus,curtailment,storage_charge";

/// Exports the hourly energy balance to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_detail_csv(balance: &EnergyBalance, sign: ShortfallSign, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_detail_csv(balance, sign, io::BufWriter::new(file))
}

/// Writes the hourly energy balance as CSV to any writer.
///
/// One row per hour. Shortfall and surplus carry opposite signs chosen by
/// `sign`; one output column per technology follows when the run kept
/// hourly detail.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_detail_csv(balance: &EnergyBalance, sign: ShortfallSign, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    let detail = balance.has_detail();

    let mut header: Vec<&str> = DETAIL_HEADER.split(',').collect();
    if detail {
        header.extend(balance.columns.iter().map(String::as_str));
    }
    wtr.write_record(&header)?;

    let shortfall_factor = sign.shortfall_factor();
    for h in &balance.hours {
        let mut row = vec![
            h.hour.to_string(),
            format!("{:.4}", h.load),
            format!("{:.4}", signed(h.shortfall, shortfall_factor)),
            format!("{:.4}", signed(h.surplus, -shortfall_factor)),
            format!("{:.4}", h.curtailment),
            format!("{:.4}", h.storage_charge),
        ];
        if detail {
            row.extend(h.outputs.iter().map(|v| format!("{v:.4}")));
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Applies a display sign without producing negative zero.
fn signed(value: f64, factor: f64) -> f64 {
    value * factor + 0.0
}

/// Exports the per-technology summary to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_summary_csv(summary: &SystemSummary, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_summary_csv(summary, io::BufWriter::new(file))
}

/// Writes one CSV row per costed technology.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_summary_csv(summary: &SystemSummary, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    for t in &summary.technologies {
        wtr.serialize(t)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Exports the optimizer outcome as pretty-printed JSON.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_optimizer_json(outcome: &OptimizerOutcome, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_optimizer_json(outcome, io::BufWriter::new(file))
}

/// Writes the optimizer outcome as JSON to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_optimizer_json(outcome: &OptimizerOutcome, mut writer: impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, outcome)?;
    writeln!(writer)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Scenario, ScenarioContext};
    use crate::tech::profile::flat;
    use crate::tech::{Category, CostParams, HourlyProfiles, Technology};

    fn scenario(detail: bool) -> Scenario {
        let mut profiles = HourlyProfiles::new();
        profiles.insert("demand", flat(100.0)).unwrap();
        profiles.insert("wind", flat(80.0)).unwrap();
        Scenario::new(
            vec![
                Technology::new("Demand", Category::Load, 0.0).with_profile("demand"),
                Technology::new("Wind", Category::Renewable, 80.0)
                    .with_profile("wind")
                    .with_cost(CostParams {
                        lcoe: 50.0,
                        ..CostParams::default()
                    }),
            ],
            profiles,
            None,
            None,
            ScenarioContext {
                detail,
                ..ScenarioContext::default()
            },
        )
        .unwrap()
    }

    fn detail_lines(detail: bool, sign: ShortfallSign) -> Vec<String> {
        let balance = scenario(detail).simulate();
        let mut buf = Vec::new();
        write_detail_csv(&balance, sign, &mut buf).unwrap();
        String::from_utf8(buf)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn header_includes_technology_columns_in_detail_mode() {
        let lines = detail_lines(true, ShortfallSign::Negative);
        assert_eq!(lines[0], "hour,load,shortfall,surplus,curtailment,storage_charge,Wind");
        // 1 header + 8760 data rows
        assert_eq!(lines.len(), 8761);
        assert_eq!(lines[1], "0,100.0000,-20.0000,0.0000,0.0000,0.0000,80.0000");
    }

    #[test]
    fn header_omits_technology_columns_without_detail() {
        let lines = detail_lines(false, ShortfallSign::Negative);
        assert_eq!(lines[0], DETAIL_HEADER);
    }

    #[test]
    fn positive_sign_flips_shortfall() {
        let lines = detail_lines(false, ShortfallSign::Positive);
        assert_eq!(lines[1], "0,100.0000,20.0000,0.0000,0.0000,0.0000");
    }

    #[test]
    fn summary_rows_parse_back() {
        let s = scenario(false);
        let balance = s.simulate();
        let summary = SystemSummary::from_balance(&balance, s.technologies(), s.context());
        let mut buf = Vec::new();
        write_summary_csv(&summary, &mut buf).unwrap();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers().cloned().unwrap();
        assert_eq!(&headers[0], "name");
        let rows: Vec<csv::StringRecord> = rdr.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "Wind");
        assert_eq!(&rows[0][1], "renewable");
    }

    #[test]
    fn deterministic_output() {
        assert_eq!(
            detail_lines(true, ShortfallSign::Negative),
            detail_lines(true, ShortfallSign::Negative)
        );
    }

    #[test]
    fn optimizer_json_is_valid() {
        let outcome = OptimizerOutcome {
            layout: Default::default(),
            targets: Default::default(),
            best: Vec::new(),
            history: Vec::new(),
        };
        let mut buf = Vec::new();
        write_optimizer_json(&outcome, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert!(value.get("history").is_some());
    }
}
