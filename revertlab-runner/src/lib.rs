//! RevertLab Runner — run orchestration, metrics, sweeps, and export.
//!
//! This crate builds on `revertlab-core` to provide:
//! - CSV loading with schema checks, plus deterministic synthetic series
//! - TOML run configuration with content-addressed run ids
//! - Single-run orchestration and the metrics snapshot
//! - Parallel parameter sweeps ranked by annualized Sharpe
//! - JSON/CSV artifacts and console reports

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod sweep;

pub use config::{run_id, ResolvedRun, RunConfig, RunConfigError, RunId};
pub use data_loader::{generate_synthetic, load_csv, read_csv, LoadError, SyntheticSpec};
pub use export::{export_frame_csv, export_json, save_artifacts, save_sweep};
pub use metrics::{AnnualReturn, MetricsSnapshot, MonthlyReturn};
pub use runner::{run_backtest, run_from_config, BacktestResult, RunError, SCHEMA_VERSION};
pub use sweep::{ParamGrid, ParamSweep, SweepResults};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn metrics_snapshot_is_send_sync() {
        assert_send::<MetricsSnapshot>();
        assert_sync::<MetricsSnapshot>();
    }

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
    }

    #[test]
    fn sweep_types_are_send_sync() {
        assert_send::<ParamSweep>();
        assert_sync::<ParamSweep>();
        assert_send::<SweepResults>();
        assert_sync::<SweepResults>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
