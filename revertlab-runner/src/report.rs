//! Plain-text console reports.

use crate::metrics::MetricsSnapshot;
use crate::runner::BacktestResult;
use crate::sweep::SweepResults;

/// The results block printed after a run.
pub fn render_summary(metrics: &MetricsSnapshot) -> String {
    let mut out = String::with_capacity(512);
    out.push_str("===== SIMULATION RESULTS =====\n");
    out.push_str(&format!("Returns: {:.2}%\n", metrics.net_return_pct));
    out.push_str(&format!("Deposit: ${:.2}\n", metrics.cash));
    out.push_str(&format!("Final Equity: ${:.2}\n", metrics.final_equity));
    out.push_str(&format!("Peak: ${:.2}\n", metrics.peak_equity));
    out.push_str(&format!("Max Drawdown: {:.2}%\n", metrics.max_drawdown_pct));
    out.push_str(&format!(
        "Average Annual Returns: {:.2}%\n",
        metrics.annual_mean_return_pct
    ));
    out.push_str(&format!("Daily Sharpe: {:.2}\n", metrics.daily_sharpe));
    out.push_str(&format!("Annualized Sharpe: {:.2}\n", metrics.annual_sharpe));
    out.push_str("==========\n");
    out
}

/// Run header, summary block, and per-year returns.
pub fn render_run(result: &BacktestResult) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(&format!("{} | {}\n", result.symbol, result.params));
    match (result.start_date, result.end_date) {
        (Some(start), Some(end)) => out.push_str(&format!("Period: {start} to {end}\n")),
        _ => out.push_str("Period: (no data)\n"),
    }
    out.push_str(&format!(
        "Bars: {} ({} warmup, {} in market)\n",
        result.bar_count, result.warmup_bars, result.bars_in_market
    ));
    out.push('\n');
    out.push_str(&render_summary(&result.metrics));

    if !result.metrics.annual_returns.is_empty() {
        out.push_str("\nYear    Return\n");
        for year in &result.metrics.annual_returns {
            out.push_str(&format!("{:<6} {:>7.2}%\n", year.year, year.return_pct));
        }
    }
    out
}

/// Top `n` sweep results by annualized Sharpe.
pub fn render_leaderboard(results: &SweepResults, n: usize) -> String {
    let mut out = String::with_capacity(128 + n * 96);
    out.push_str(&format!(
        "{:<4} {:<36} {:>10} {:>9} {:>8} {:>7}\n",
        "#", "params", "return %", "max dd %", "sharpe", "traded"
    ));
    for (i, r) in results.top_n(n).iter().enumerate() {
        let m = &r.metrics;
        out.push_str(&format!(
            "{:<4} {:<36} {:>10.2} {:>9.2} {:>8.2} {:>7}\n",
            i + 1,
            r.params.to_string(),
            m.net_return_pct,
            m.max_drawdown_pct,
            m.annual_sharpe,
            m.traded_periods
        ));
    }
    out
}
