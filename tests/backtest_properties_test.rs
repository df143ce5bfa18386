//! Backtest scenarios and properties over generated price series.

mod common;

use approx::assert_relative_eq;
use common::*;
use proptest::prelude::*;
use stocklens::domain::backtest::run_backtest;
use stocklens::domain::error::StocklensError;

mod scenarios {
    use super::*;

    #[test]
    fn flat_series_never_trades() {
        let bars = bars_from_closes("IBM", &[100.0; 300]);
        let result = run_backtest(&bars, 10_000.0).unwrap();

        assert_eq!(result.trades, 0);
        assert_relative_eq!(result.total_return, 0.0);
        assert_relative_eq!(result.max_drawdown, 0.0);
        assert_relative_eq!(result.final_value, 10_000.0);
    }

    #[test]
    fn dip_then_rally_buys_once_and_sells_once() {
        let bars = bars_from_closes("IBM", &dip_then_rally_closes());
        let result = run_backtest(&bars, 10_000.0).unwrap();

        assert_eq!(result.trades, 2);
        // 111 shares bought at 90 leave 10 cash; sold at 120.
        assert_relative_eq!(result.final_value, 13_330.0, epsilon = 1e-9);
        assert_relative_eq!(result.total_return, 33.3, epsilon = 1e-9);
        assert!(result.max_drawdown > 0.0);
    }

    #[test]
    fn equity_curve_has_one_point_per_bar() {
        let bars = bars_from_closes("IBM", &dip_then_rally_closes());
        let result = run_backtest(&bars, 10_000.0).unwrap();
        assert_eq!(result.equity_curve.len(), bars.len());
        assert_eq!(result.equity_curve[0].timestamp, bars[0].timestamp);
    }

    #[test]
    fn zero_investment_reports_zero_return() {
        let bars = bars_from_closes("IBM", &dip_then_rally_closes());
        let result = run_backtest(&bars, 0.0).unwrap();
        assert_eq!(result.trades, 0);
        assert_relative_eq!(result.total_return, 0.0);
    }

    #[test]
    fn negative_investment_is_rejected() {
        let bars = bars_from_closes("IBM", &[100.0; 10]);
        assert!(matches!(
            run_backtest(&bars, -1.0),
            Err(StocklensError::InvalidInvestment { .. })
        ));
    }

    #[test]
    fn empty_series_keeps_cash() {
        let result = run_backtest(&[], 5_000.0).unwrap();
        assert_eq!(result.trades, 0);
        assert_relative_eq!(result.final_value, 5_000.0);
        assert!(result.equity_curve.is_empty());
    }
}

fn closes_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..500.0, 0..400)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn drawdown_stays_within_unit_interval(closes in closes_strategy(), investment in 0.0f64..1e6) {
        let bars = bars_from_closes("PROP", &closes);
        let result = run_backtest(&bars, investment).unwrap();
        prop_assert!((0.0..=1.0).contains(&result.max_drawdown));
    }

    #[test]
    fn trades_are_paired_unless_position_open(closes in closes_strategy()) {
        let bars = bars_from_closes("PROP", &closes);
        let result = run_backtest(&bars, 10_000.0).unwrap();
        prop_assert_eq!(result.trades % 2 == 1, result.shares_held > 0);
        prop_assert!(result.trades <= closes.len());
    }

    #[test]
    fn results_are_deterministic(closes in closes_strategy(), investment in 0.0f64..1e6) {
        let bars = bars_from_closes("PROP", &closes);
        let a = run_backtest(&bars, investment).unwrap();
        let b = run_backtest(&bars, investment).unwrap();
        prop_assert_eq!(a.total_return.to_bits(), b.total_return.to_bits());
        prop_assert_eq!(a.max_drawdown.to_bits(), b.max_drawdown.to_bits());
        prop_assert_eq!(a.trades, b.trades);
        prop_assert_eq!(a.final_value.to_bits(), b.final_value.to_bits());
    }

    #[test]
    fn constant_prices_never_trade(price in 1.0f64..1_000.0, len in 0usize..400) {
        let bars = bars_from_closes("PROP", &vec![price; len]);
        let result = run_backtest(&bars, 10_000.0).unwrap();
        prop_assert_eq!(result.trades, 0);
        prop_assert_eq!(result.total_return, 0.0);
    }
}
