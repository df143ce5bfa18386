//! Moving-average crossover backtest.
//!
//! Rule per step, evaluated in order:
//! - price < SMA(50) and flat: buy as many whole shares as cash allows
//! - price > SMA(200) and holding: sell everything
//!
//! An average that is still in warmup compares false, so the long rule stays
//! inactive for the first 199 bars while the short rule may already fire.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::domain::error::StocklensError;
use crate::domain::moving_average::{calculate_sma, LONG_WINDOW, SHORT_WINDOW};
use crate::domain::portfolio::{EquityPoint, Portfolio};
use crate::domain::price_bar::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestStep {
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
}

impl BacktestStep {
    fn buy_signal(&self) -> bool {
        self.ma_short.is_some_and(|ma| self.price < ma)
    }

    fn sell_signal(&self) -> bool {
        self.ma_long.is_some_and(|ma| self.price > ma)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    /// Percentage, e.g. 12.5 for +12.5%.
    pub total_return: f64,
    /// Fraction of the running peak, in [0, 1] for non-negative portfolios.
    pub max_drawdown: f64,
    pub trades: usize,
    pub final_value: f64,
    /// Shares still held after the last bar.
    #[serde(skip)]
    pub shares_held: u64,
    #[serde(skip)]
    pub equity_curve: Vec<EquityPoint>,
}

/// Validate a user-supplied starting cash amount.
pub fn validate_investment(initial_investment: f64) -> Result<f64, StocklensError> {
    if !initial_investment.is_finite() {
        return Err(StocklensError::InvalidInvestment {
            reason: "must be a finite number".into(),
        });
    }
    if initial_investment < 0.0 {
        return Err(StocklensError::InvalidInvestment {
            reason: "must be greater than or equal to 0".into(),
        });
    }
    Ok(initial_investment)
}

/// Pair each bar with its 50- and 200-period closing averages.
pub fn build_steps(bars: &[PriceBar]) -> Vec<BacktestStep> {
    let short = calculate_sma(bars, SHORT_WINDOW);
    let long = calculate_sma(bars, LONG_WINDOW);
    debug!(bars = bars.len(), short = %short, long = %long, "averages computed");

    bars.iter()
        .zip(&short.values)
        .zip(&long.values)
        .map(|((bar, ma_short), ma_long)| BacktestStep {
            timestamp: bar.timestamp,
            price: bar.close,
            ma_short: ma_short.get(),
            ma_long: ma_long.get(),
        })
        .collect()
}

/// Walk the steps: buy with all cash on a buy signal while flat, sell everything
/// on a sell signal while holding. A buy signal that cannot afford one whole
/// share leaves the portfolio untouched and does not count as a trade.
pub fn simulate(
    steps: &[BacktestStep],
    initial_investment: f64,
) -> Result<BacktestResult, StocklensError> {
    let initial_investment = validate_investment(initial_investment)?;
    let mut portfolio = Portfolio::new(initial_investment);

    for step in steps {
        if step.buy_signal() && !portfolio.has_position() {
            portfolio.buy_max(step.price);
        } else if step.sell_signal() && portfolio.has_position() {
            portfolio.sell_all(step.price);
        }
        portfolio.mark(step.timestamp, step.price);
    }

    let final_value = portfolio.final_value();
    let total_return = if initial_investment > 0.0 {
        (final_value - initial_investment) / initial_investment * 100.0
    } else {
        0.0
    };

    Ok(BacktestResult {
        total_return,
        max_drawdown: portfolio.max_drawdown,
        trades: portfolio.trades,
        final_value,
        shares_held: portfolio.shares,
        equity_curve: portfolio.equity_curve,
    })
}

pub fn run_backtest(
    bars: &[PriceBar],
    initial_investment: f64,
) -> Result<BacktestResult, StocklensError> {
    simulate(&build_steps(bars), initial_investment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(i: usize) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::hours(i as i64)
    }

    fn step(i: usize, price: f64, ma_short: Option<f64>, ma_long: Option<f64>) -> BacktestStep {
        BacktestStep {
            timestamp: ts(i),
            price,
            ma_short,
            ma_long,
        }
    }

    fn bars_from(prices: &[f64]) -> Vec<PriceBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                symbol: "TEST".into(),
                timestamp: ts(i),
                open: close,
                high: close,
                low: close,
                close,
                volume: 100,
            })
            .collect()
    }

    #[test]
    fn flat_series_has_no_trades() {
        let bars = bars_from(&[100.0; 300]);
        let result = run_backtest(&bars, 10_000.0).unwrap();
        assert_eq!(result.trades, 0);
        assert_eq!(result.total_return, 0.0);
        assert_eq!(result.max_drawdown, 0.0);
        assert_eq!(result.equity_curve.len(), 300);
    }

    #[test]
    fn dip_then_rally_is_one_round_trip() {
        let mut prices = vec![100.0; 200];
        prices.push(90.0);
        prices.push(120.0);
        let result = run_backtest(&bars_from(&prices), 10_000.0).unwrap();

        // 111 shares at 90 leaves 10 cash, sold at 120.
        assert_eq!(result.trades, 2);
        assert!((result.final_value - 13_330.0).abs() < 1e-6);
        assert!((result.total_return - 33.3).abs() < 1e-9);
        assert_eq!(result.max_drawdown, 0.0);
    }

    #[test]
    fn undefined_averages_never_trigger() {
        let steps = vec![step(0, 50.0, None, None), step(1, 500.0, None, None)];
        let result = simulate(&steps, 1_000.0).unwrap();
        assert_eq!(result.trades, 0);
        assert_eq!(result.total_return, 0.0);
    }

    #[test]
    fn short_average_can_buy_before_long_average_exists() {
        let steps = vec![
            step(0, 90.0, Some(100.0), None),
            step(1, 200.0, Some(100.0), None),
        ];
        let result = simulate(&steps, 900.0).unwrap();
        assert_eq!(result.trades, 1);
        assert!((result.final_value - 2_000.0).abs() < 1e-9);
    }

    #[test]
    fn buy_takes_priority_when_flat() {
        // Both signals true while flat: the buy branch wins and no sell follows on the same step.
        let steps = vec![step(0, 100.0, Some(110.0), Some(90.0))];
        let result = simulate(&steps, 1_000.0).unwrap();
        assert_eq!(result.trades, 1);
    }

    #[test]
    fn unaffordable_buy_signal_is_not_counted() {
        let steps = vec![
            step(0, 90.0, Some(100.0), None),
            step(1, 95.0, Some(100.0), None),
        ];
        let result = simulate(&steps, 50.0).unwrap();
        assert_eq!(result.trades, 0);
        assert_eq!(result.shares_held, 0);
        assert!((result.final_value - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn drawdown_measured_from_running_peak() {
        let steps = vec![
            step(0, 10.0, Some(20.0), None),
            step(1, 20.0, Some(5.0), None),
            step(2, 15.0, Some(5.0), None),
        ];
        let result = simulate(&steps, 100.0).unwrap();
        // 10 shares; peak 200, trough 150 → 25%.
        assert!((result.max_drawdown - 0.25).abs() < 1e-12);
        assert_eq!(result.trades, 1);
    }

    #[test]
    fn zero_investment_reports_zero_return() {
        let bars = bars_from(&[100.0; 10]);
        let result = run_backtest(&bars, 0.0).unwrap();
        assert_eq!(result.total_return, 0.0);
        assert_eq!(result.max_drawdown, 0.0);
        assert_eq!(result.trades, 0);
    }

    #[test]
    fn negative_investment_rejected() {
        let err = simulate(&[], -1.0).unwrap_err();
        assert!(matches!(err, StocklensError::InvalidInvestment { .. }));
    }

    #[test]
    fn nan_investment_rejected() {
        assert!(validate_investment(f64::NAN).is_err());
        assert!(validate_investment(f64::INFINITY).is_err());
        assert_eq!(validate_investment(0.0).unwrap(), 0.0);
    }

    #[test]
    fn empty_series_keeps_initial_value() {
        let result = simulate(&[], 5_000.0).unwrap();
        assert_eq!(result.final_value, 5_000.0);
        assert_eq!(result.total_return, 0.0);
        assert!(result.equity_curve.is_empty());
    }

    #[test]
    fn build_steps_warmup_lengths() {
        let bars = bars_from(&[100.0; 210]);
        let steps = build_steps(&bars);
        assert_eq!(steps.len(), 210);
        assert!(steps[SHORT_WINDOW - 2].ma_short.is_none());
        assert!(steps[SHORT_WINDOW - 1].ma_short.is_some());
        assert!(steps[LONG_WINDOW - 2].ma_long.is_none());
        assert!(steps[LONG_WINDOW - 1].ma_long.is_some());
    }
}
