//! Parameter sweep over a hyperparameter grid.
//!
//! Every grid point is an independent pure run over the same series, so the
//! sweep fans out with rayon and only collects results.

use std::cmp::Ordering;
use std::collections::HashMap;

use rayon::prelude::*;

use revertlab_core::{Account, CalcType, ConfigError, Hyperparameters, PriceSeries, Side};

use crate::runner::{run_backtest, BacktestResult, RunError};

/// Parameter grid. Every combination of the listed values is run.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGrid {
    pub mean_periods: Vec<usize>,
    pub spread_mean_periods: Vec<usize>,
    pub spread_sdev_periods: Vec<usize>,
    pub thresholds: Vec<f64>,
    pub calc_types: Vec<CalcType>,
    pub sides: Vec<Side>,
}

impl Default for ParamGrid {
    /// Periods 10/20/40, spread windows 5/10/20, thresholds 0.5 to 2.0,
    /// both calc types, long side only.
    fn default() -> Self {
        Self {
            mean_periods: vec![10, 20, 40],
            spread_mean_periods: vec![5, 10, 20],
            spread_sdev_periods: vec![5, 10, 20],
            thresholds: vec![0.5, 1.0, 1.5, 2.0],
            calc_types: CalcType::ALL.to_vec(),
            sides: vec![Side::Long],
        }
    }
}

impl ParamGrid {
    /// Grid holding exactly one parameter set.
    pub fn single(params: &Hyperparameters) -> Self {
        Self {
            mean_periods: vec![params.mean_period()],
            spread_mean_periods: vec![params.spread_mean_period()],
            spread_sdev_periods: vec![params.spread_sdev_period()],
            thresholds: vec![params.threshold()],
            calc_types: vec![params.calc_type()],
            sides: vec![params.side()],
        }
    }

    /// Total number of combinations.
    pub fn size(&self) -> usize {
        self.mean_periods.len()
            * self.spread_mean_periods.len()
            * self.spread_sdev_periods.len()
            * self.thresholds.len()
            * self.calc_types.len()
            * self.sides.len()
    }

    /// Validate and expand every combination. Any invalid value fails the whole grid.
    pub fn generate(&self) -> Result<Vec<Hyperparameters>, ConfigError> {
        let mut out = Vec::with_capacity(self.size());
        for &mean in &self.mean_periods {
            for &spread_mean in &self.spread_mean_periods {
                for &spread_sdev in &self.spread_sdev_periods {
                    for &threshold in &self.thresholds {
                        for &calc in &self.calc_types {
                            for &side in &self.sides {
                                out.push(Hyperparameters::new(
                                    mean,
                                    spread_mean,
                                    spread_sdev,
                                    threshold,
                                    calc,
                                    side,
                                )?);
                            }
                        }
                    }
                }
            }
        }
        Ok(out)
    }
}

/// Sweep executor.
#[derive(Debug, Clone)]
pub struct ParamSweep {
    account: Account,
    parallel: bool,
}

impl ParamSweep {
    pub fn new(account: Account) -> Self {
        Self {
            account,
            parallel: true,
        }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every grid point over `prices`.
    pub fn sweep(
        &self,
        prices: &PriceSeries,
        grid: &ParamGrid,
        symbol: &str,
    ) -> Result<SweepResults, RunError> {
        self.sweep_with_progress(prices, grid, symbol, |_, _, _| {})
    }

    /// Like `sweep`, invoking `progress(index, total, result)` as each run completes.
    /// With parallelism on, completion order is not grid order.
    pub fn sweep_with_progress<F>(
        &self,
        prices: &PriceSeries,
        grid: &ParamGrid,
        symbol: &str,
        progress: F,
    ) -> Result<SweepResults, RunError>
    where
        F: Fn(usize, usize, &BacktestResult) + Send + Sync,
    {
        let sets = grid.generate()?;
        let total = sets.len();
        tracing::info!(symbol, runs = total, parallel = self.parallel, "starting sweep");

        let run = |(idx, params): (usize, &Hyperparameters)| -> Result<BacktestResult, RunError> {
            let result = run_backtest(prices, params, &self.account, symbol)?;
            progress(idx, total, &result);
            Ok(result)
        };

        let results: Vec<BacktestResult> = if self.parallel {
            sets.par_iter()
                .enumerate()
                .map(run)
                .collect::<Result<Vec<_>, RunError>>()?
        } else {
            sets.iter()
                .enumerate()
                .map(run)
                .collect::<Result<Vec<_>, RunError>>()?
        };

        let results = SweepResults::new(results);
        if let Some(best) = results.best() {
            tracing::info!(
                runs = results.len(),
                best = %best.params,
                annual_sharpe = best.metrics.annual_sharpe,
                "sweep finished"
            );
        }
        Ok(results)
    }
}

/// Results from a sweep, in grid order.
#[derive(Debug)]
pub struct SweepResults {
    results: Vec<BacktestResult>,
    by_run_id: HashMap<String, usize>,
}

impl SweepResults {
    fn new(results: Vec<BacktestResult>) -> Self {
        let by_run_id = results
            .iter()
            .enumerate()
            .map(|(i, r)| (r.run_id.clone(), i))
            .collect();
        Self { results, by_run_id }
    }

    pub fn all(&self) -> &[BacktestResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Gets a result by RunId.
    pub fn get(&self, run_id: &str) -> Option<&BacktestResult> {
        self.by_run_id.get(run_id).map(|&i| &self.results[i])
    }

    /// Results ordered by annualized Sharpe, best first. Undefined Sharpe sorts last.
    pub fn ranked(&self) -> Vec<&BacktestResult> {
        let mut sorted: Vec<_> = self.results.iter().collect();
        sorted.sort_by(|a, b| compare_sharpe(b.metrics.annual_sharpe, a.metrics.annual_sharpe));
        sorted
    }

    pub fn top_n(&self, n: usize) -> Vec<&BacktestResult> {
        self.ranked().into_iter().take(n).collect()
    }

    /// Best result by annualized Sharpe. None when no run has a defined Sharpe.
    pub fn best(&self) -> Option<&BacktestResult> {
        self.ranked()
            .into_iter()
            .next()
            .filter(|r| r.metrics.has_sharpe())
    }
}

/// Total order with NaN below every number (so it lands last in a descending sort).
fn compare_sharpe(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::{generate_synthetic, SyntheticSpec};
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn prices() -> PriceSeries {
        let spec = SyntheticSpec {
            bars: 600,
            ..SyntheticSpec::default()
        };
        generate_synthetic("sweep", &spec).unwrap()
    }

    fn small_grid() -> ParamGrid {
        ParamGrid {
            mean_periods: vec![10, 20],
            spread_mean_periods: vec![5],
            spread_sdev_periods: vec![5, 10],
            thresholds: vec![1.0],
            calc_types: CalcType::ALL.to_vec(),
            sides: vec![Side::Long, Side::Neutral],
        }
    }

    #[test]
    fn grid_size_and_generation() {
        let grid = small_grid();
        assert_eq!(grid.size(), 16);
        assert_eq!(grid.generate().unwrap().len(), 16);
        assert_eq!(ParamGrid::default().size(), 216);
    }

    #[test]
    fn invalid_grid_value_fails() {
        let mut grid = small_grid();
        grid.thresholds.push(0.0);
        assert!(matches!(
            grid.generate(),
            Err(ConfigError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn single_grid_round_trips_params() {
        let params = Hyperparameters::default().with_side(Side::Short);
        assert_eq!(ParamGrid::single(&params).generate().unwrap(), vec![params]);
    }

    #[test]
    fn parallel_matches_sequential() {
        let prices = prices();
        let grid = small_grid();
        let seq = ParamSweep::new(Account::default())
            .with_parallelism(false)
            .sweep(&prices, &grid, "SYN")
            .unwrap();
        let par = ParamSweep::new(Account::default())
            .sweep(&prices, &grid, "SYN")
            .unwrap();

        assert_eq!(seq.len(), 16);
        assert_eq!(par.len(), 16);
        for (a, b) in seq.all().iter().zip(par.all()) {
            assert_eq!(a.run_id, b.run_id);
            assert_eq!(a.metrics.final_equity, b.metrics.final_equity);
        }
    }

    #[test]
    fn results_lookup_by_run_id() {
        let results = ParamSweep::new(Account::default())
            .sweep(&prices(), &small_grid(), "SYN")
            .unwrap();
        let first = &results.all()[0];
        assert_eq!(results.get(&first.run_id).map(|r| r.params), Some(first.params));
        assert!(results.get("missing").is_none());
    }

    #[test]
    fn ranking_is_descending_with_nan_last() {
        let results = ParamSweep::new(Account::default())
            .sweep(&prices(), &small_grid(), "SYN")
            .unwrap();
        let ranked = results.ranked();
        let sharpes: Vec<f64> = ranked.iter().map(|r| r.metrics.annual_sharpe).collect();
        let first_nan = sharpes.iter().position(|s| s.is_nan()).unwrap_or(sharpes.len());
        assert!(sharpes[first_nan..].iter().all(|s| s.is_nan()));
        for pair in sharpes[..first_nan].windows(2) {
            assert!(pair[0] >= pair[1]);
        }
        assert_eq!(results.top_n(3).len(), 3);
    }

    #[test]
    fn compare_sharpe_orders_nan_lowest() {
        assert_eq!(compare_sharpe(f64::NAN, -5.0), Ordering::Less);
        assert_eq!(compare_sharpe(1.0, f64::NAN), Ordering::Greater);
        assert_eq!(compare_sharpe(f64::NAN, f64::NAN), Ordering::Equal);
        assert_eq!(compare_sharpe(2.0, 1.0), Ordering::Greater);
    }

    #[test]
    fn progress_called_once_per_run() {
        let calls = AtomicUsize::new(0);
        ParamSweep::new(Account::default())
            .sweep_with_progress(&prices(), &small_grid(), "SYN", |_, total, _| {
                assert_eq!(total, 16);
                calls.fetch_add(1, AtomicOrdering::Relaxed);
            })
            .unwrap();
        assert_eq!(calls.load(AtomicOrdering::Relaxed), 16);
    }

    #[test]
    fn empty_grid_yields_no_best() {
        let mut grid = small_grid();
        grid.sides.clear();
        let results = ParamSweep::new(Account::default())
            .sweep(&prices(), &grid, "SYN")
            .unwrap();
        assert!(results.is_empty());
        assert!(results.best().is_none());
    }
}
