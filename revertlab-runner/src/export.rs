//! Artifact export — JSON and CSV.
//!
//! - **JSON**: the run result (inputs, dates, metrics) with a schema version
//! - **CSV**: the per-bar model frame, and a sweep leaderboard
//!
//! Undefined per-bar statistics are written as empty CSV cells. Undefined
//! scalar metrics serialize as JSON `null`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use revertlab_core::ModelFrame;

use crate::metrics::MetricsSnapshot;
use crate::runner::BacktestResult;
use crate::sweep::SweepResults;

/// Column order of the frame CSV.
pub const FRAME_COLUMNS: [&str; 17] = [
    "date",
    "close",
    "log_return",
    "rolling_mean",
    "spread",
    "spread_mean",
    "spread_std",
    "z_score",
    "long_position",
    "short_position",
    "signal",
    "position",
    "strategy_return",
    "cumulative_return",
    "equity",
    "peak_equity",
    "drawdown_pct",
];

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` (without per-bar rows) to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Serialize a metrics snapshot to pretty JSON.
pub fn export_metrics_json(metrics: &MetricsSnapshot) -> Result<String> {
    serde_json::to_string_pretty(metrics).context("failed to serialize metrics to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the model frame, one row per bar.
pub fn export_frame_csv(frame: &ModelFrame) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(FRAME_COLUMNS)?;

    for row in frame.rows() {
        let s = &row.signal;
        let e = &row.equity;
        wtr.write_record([
            s.date.to_string(),
            format!("{:.6}", s.close),
            optional(s.log_return),
            optional(s.rolling_mean),
            optional(s.spread),
            optional(s.spread_mean),
            optional(s.spread_std),
            optional(s.z_score),
            s.long_position.to_string(),
            s.short_position.to_string(),
            s.signal.to_string(),
            s.position.to_string(),
            format!("{:.8}", s.strategy_return),
            format!("{:.8}", e.cumulative_return),
            format!("{:.2}", e.equity),
            format!("{:.2}", e.peak_equity),
            format!("{:.4}", e.drawdown_pct),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export sweep results ranked by annualized Sharpe.
pub fn export_sweep_csv(results: &SweepResults) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "rank",
        "run_id",
        "calc_type",
        "side",
        "mean_period",
        "spread_mean_period",
        "spread_sdev_period",
        "threshold",
        "net_return_pct",
        "final_equity",
        "max_drawdown_pct",
        "annual_mean_return_pct",
        "annual_sharpe",
        "traded_periods",
    ])?;

    for (i, r) in results.ranked().iter().enumerate() {
        let m = &r.metrics;
        wtr.write_record([
            (i + 1).to_string(),
            r.run_id.clone(),
            r.params.calc_type().to_string(),
            r.params.side().to_string(),
            r.params.mean_period().to_string(),
            r.params.spread_mean_period().to_string(),
            r.params.spread_sdev_period().to_string(),
            r.params.threshold().to_string(),
            format!("{:.4}", m.net_return_pct),
            format!("{:.2}", m.final_equity),
            format!("{:.4}", m.max_drawdown_pct),
            finite(m.annual_mean_return_pct, 4),
            finite(m.annual_sharpe, 4),
            m.traded_periods.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.8}")).unwrap_or_default()
}

fn finite(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{value:.decimals$}")
    } else {
        String::new()
    }
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for a single run.
///
/// Creates `{symbol}_{run_id prefix}/` under `output_dir` containing:
/// - `result.json` — the `BacktestResult` without per-bar rows
/// - `metrics.json` — the metrics snapshot alone
/// - `frame.csv` — the per-bar model frame
///
/// Returns the path to the created directory. Rerunning identical inputs
/// overwrites the same directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let short_id: String = result.run_id.chars().take(12).collect();
    let run_dir = output_dir.join(format!("{}_{}", result.symbol, short_id));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write(&run_dir.join("result.json"), &export_json(result)?)?;
    write(
        &run_dir.join("metrics.json"),
        &export_metrics_json(&result.metrics)?,
    )?;
    write(&run_dir.join("frame.csv"), &export_frame_csv(&result.frame)?)?;

    tracing::debug!(dir = %run_dir.display(), "artifacts written");
    Ok(run_dir)
}

/// Write a sweep leaderboard to `output_dir/sweep_{symbol}.csv`.
pub fn save_sweep(results: &SweepResults, symbol: &str, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;
    let path = output_dir.join(format!("sweep_{symbol}.csv"));
    write(&path, &export_sweep_csv(results)?)?;
    Ok(path)
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::{generate_synthetic, SyntheticSpec};
    use crate::runner::run_backtest;
    use crate::sweep::{ParamGrid, ParamSweep};
    use revertlab_core::{Account, Hyperparameters};

    fn result() -> BacktestResult {
        let spec = SyntheticSpec {
            bars: 120,
            ..SyntheticSpec::default()
        };
        let prices = generate_synthetic("export", &spec).unwrap();
        run_backtest(&prices, &Hyperparameters::default(), &Account::default(), "SYN").unwrap()
    }

    #[test]
    fn frame_csv_has_header_and_one_row_per_bar() {
        let r = result();
        let csv = export_frame_csv(&r.frame).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), r.bar_count + 1);
        assert_eq!(lines[0], FRAME_COLUMNS.join(","));
    }

    #[test]
    fn frame_csv_leaves_undefined_cells_empty() {
        let r = result();
        let csv = export_frame_csv(&r.frame).unwrap();
        let first: Vec<&str> = csv.lines().nth(1).unwrap().split(',').collect();
        assert_eq!(first.len(), FRAME_COLUMNS.len());
        // First bar: no log-return, no z-score.
        assert_eq!(first[2], "");
        assert_eq!(first[7], "");
        assert_eq!(first[11], "0");
    }

    #[test]
    fn json_omits_frame_and_keeps_metrics() {
        let r = result();
        let json: serde_json::Value = serde_json::from_str(&export_json(&r).unwrap()).unwrap();
        assert_eq!(json["schema_version"], 1);
        assert_eq!(json["symbol"], "SYN");
        assert_eq!(json["bar_count"], 120);
        assert!(json.get("frame").is_none());
        assert!(json["metrics"]["final_equity"].is_number());
        assert_eq!(json["params"]["calc_type"], "exponential");
    }

    #[test]
    fn undefined_metrics_serialize_as_null() {
        let r = run_backtest(
            &revertlab_core::PriceSeries::default(),
            &Hyperparameters::default(),
            &Account::default(),
            "EMPTY",
        )
        .unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&export_metrics_json(&r.metrics).unwrap()).unwrap();
        assert!(json["annual_sharpe"].is_null());
        assert!(json["annual_mean_return_pct"].is_null());
    }

    #[test]
    fn save_artifacts_writes_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let r = result();
        let run_dir = save_artifacts(&r, dir.path()).unwrap();

        assert!(run_dir.starts_with(dir.path()));
        for name in ["result.json", "metrics.json", "frame.csv"] {
            assert!(run_dir.join(name).is_file(), "missing {name}");
        }
        let again = save_artifacts(&r, dir.path()).unwrap();
        assert_eq!(run_dir, again);
    }

    #[test]
    fn sweep_csv_ranks_rows() {
        let spec = SyntheticSpec {
            bars: 300,
            ..SyntheticSpec::default()
        };
        let prices = generate_synthetic("export-sweep", &spec).unwrap();
        let grid = ParamGrid {
            thresholds: vec![0.5, 1.0],
            ..ParamGrid::single(&Hyperparameters::default())
        };
        let results = ParamSweep::new(Account::default())
            .sweep(&prices, &grid, "SYN")
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = save_sweep(&results, "SYN", dir.path()).unwrap();
        let csv = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("rank,run_id"));
        assert!(lines[1].starts_with("1,"));
        assert!(lines[2].starts_with("2,"));
    }
}
