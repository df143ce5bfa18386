//! Simple moving average over closing prices.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: the first (n-1) points are invalid.

use chrono::NaiveDateTime;
use std::fmt;

use crate::domain::price_bar::PriceBar;

pub const SHORT_WINDOW: usize = 50;
pub const LONG_WINDOW: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AveragePoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: f64,
}

impl AveragePoint {
    /// The average, or `None` during warmup.
    pub fn get(&self) -> Option<f64> {
        self.valid.then_some(self.value)
    }
}

#[derive(Debug, Clone)]
pub struct AverageSeries {
    pub period: usize,
    pub values: Vec<AveragePoint>,
}

impl fmt::Display for AverageSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SMA({})", self.period)
    }
}

/// Rolling mean of `values` over `period`; `None` until `period` values have been seen.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                let window = &values[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}

pub fn calculate_sma(bars: &[PriceBar], period: usize) -> AverageSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values = rolling_mean(&closes, period)
        .into_iter()
        .zip(bars)
        .map(|(avg, bar)| AveragePoint {
            timestamp: bar.timestamp,
            valid: avg.is_some(),
            value: avg.unwrap_or(0.0),
        })
        .collect();

    AverageSeries { period, values }
}
