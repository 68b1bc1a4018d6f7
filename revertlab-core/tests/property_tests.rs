//! Property tests for model and simulator invariants.
//!
//! Uses proptest to verify:
//! 1. Signal range — merged signal is always -1, 0 or +1
//! 2. Look-ahead freedom — changing bar t's close never changes the position held at t
//! 3. Hysteresis — a long position persists until the first z >= 0
//! 4. Equity path — peak is non-decreasing, drawdown is never positive
//! 5. Side masking — long-only runs realize nothing while short
//! 6. Round trip — cash · (1 + Σ returns) equals the last equity point

use chrono::NaiveDate;
use proptest::prelude::*;
use revertlab_core::model::{build, latch_positions, Direction};
use revertlab_core::{run_model, Account, Bar, CalcType, Hyperparameters, PriceSeries, Side};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-0.04..0.04_f64, 0..160).prop_map(|steps| {
        let mut price = 100.0_f64;
        steps
            .into_iter()
            .map(|s| {
                price *= 1.0 + s;
                (price * 100.0).round() / 100.0
            })
            .map(|p| p.max(0.01))
            .collect()
    })
}

fn arb_calc_type() -> impl Strategy<Value = CalcType> {
    prop_oneof![Just(CalcType::Simple), Just(CalcType::Exponential)]
}

fn arb_side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Long), Just(Side::Short), Just(Side::Neutral)]
}

fn arb_params() -> impl Strategy<Value = Hyperparameters> {
    (1usize..25, 1usize..15, 1usize..15, 0.1..3.0_f64, arb_calc_type(), arb_side()).prop_map(
        |(mean, smean, ssdev, threshold, calc, side)| {
            Hyperparameters::new(mean, smean, ssdev, threshold, calc, side).unwrap()
        },
    )
}

fn series(closes: &[f64]) -> PriceSeries {
    let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::new(base + chrono::Duration::days(i as i64), c, c, c, c))
        .collect();
    PriceSeries::new(bars).unwrap()
}

// ── 1. Signal range ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn signal_is_ternary(closes in arb_closes(), params in arb_params()) {
        let frame = build(&series(&closes), &params).unwrap();
        for row in frame.rows() {
            prop_assert!((-1..=1).contains(&row.signal));
            prop_assert!(row.long_position == 0 || row.short_position == 0);
        }
    }
}

// ── 2. Look-ahead freedom ────────────────────────────────────────────

proptest! {
    #[test]
    fn position_ignores_current_and_future_bars(
        closes in arb_closes().prop_filter("need bars", |c| c.len() >= 2),
        params in arb_params(),
        pick in any::<prop::sample::Index>(),
        bump in 0.5..1.5_f64,
    ) {
        let t = pick.index(closes.len());
        let original = series(&closes);
        let altered = original.with_close(t, (closes[t] * bump).max(0.01)).unwrap();

        let a = build(&original, &params).unwrap();
        let b = build(&altered, &params).unwrap();

        for i in 0..=t {
            prop_assert_eq!(a.rows()[i].position, b.rows()[i].position);
        }
        for i in 0..t {
            prop_assert_eq!(a.rows()[i].strategy_return, b.rows()[i].strategy_return);
        }
    }
}

// ── 3. Hysteresis ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn long_latch_persists_until_non_negative_z(
        z in prop::collection::vec(prop::option::weighted(0.9, -3.0..3.0_f64), 1..80),
        threshold in 0.1..2.5_f64,
    ) {
        let positions = latch_positions(&z, Direction::Long, threshold);
        for t in 1..z.len() {
            if positions[t - 1] == 1 {
                let exits = matches!(z[t], Some(v) if v >= 0.0);
                prop_assert_eq!(positions[t], if exits { 0 } else { 1 });
            } else {
                let enters = matches!(z[t], Some(v) if v < -threshold);
                prop_assert_eq!(positions[t], if enters { 1 } else { 0 });
            }
        }
    }
}

// ── 4–6. Equity path ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn peak_is_monotone_and_drawdown_non_positive(
        closes in arb_closes(),
        params in arb_params(),
        cash in 1_000.0..2_000_000.0_f64,
    ) {
        let account = Account::new(cash).unwrap();
        let frame = run_model(&series(&closes), &params, &account).unwrap();
        let rows = frame.rows();
        for t in 0..rows.len() {
            prop_assert!(rows[t].equity.drawdown_pct <= 0.0);
            prop_assert!(rows[t].equity.peak_equity >= rows[t].equity.equity);
            if t > 0 {
                prop_assert!(rows[t].equity.peak_equity >= rows[t - 1].equity.peak_equity);
            }
        }
        if let Some(first) = rows.first() {
            prop_assert_eq!(first.equity.equity, cash);
        }
    }

    #[test]
    fn long_side_realizes_nothing_while_short(closes in arb_closes(), params in arb_params()) {
        let params = params.with_side(Side::Long);
        let frame = build(&series(&closes), &params).unwrap();
        for row in frame.rows() {
            if row.position == -1 {
                prop_assert_eq!(row.strategy_return, 0.0);
            }
        }
    }

    #[test]
    fn summed_returns_reproduce_final_equity(
        closes in arb_closes(),
        params in arb_params(),
        cash in 1_000.0..2_000_000.0_f64,
    ) {
        let account = Account::new(cash).unwrap();
        let frame = run_model(&series(&closes), &params, &account).unwrap();
        let total: f64 = frame.strategy_returns().iter().sum();
        let expected = cash * (1.0 + total);
        prop_assert!((frame.final_equity() - expected).abs() <= 1e-9 * cash.max(1.0));
    }
}
