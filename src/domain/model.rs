//! Linear price model over a day-index feature.
//!
//! price(day) = intercept + slope * day, where day counts whole days since the
//! first bar of the training series.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::error::StocklensError;
use crate::domain::prediction::{Prediction, FORECAST_HORIZON_DAYS};
use crate::domain::price_bar::PriceBar;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub symbol: String,
    pub intercept: f64,
    pub slope: f64,
    #[serde(default)]
    pub samples: usize,
}

impl LinearModel {
    pub fn predict(&self, day: i64) -> f64 {
        self.intercept + self.slope * day as f64
    }

    /// Ordinary least squares of close price on day index.
    pub fn fit(symbol: &str, bars: &[PriceBar]) -> Result<Self, StocklensError> {
        let days = day_index(bars);
        let distinct = {
            let mut d = days.clone();
            d.dedup();
            d.len()
        };
        if distinct < 2 {
            return Err(StocklensError::InsufficientData {
                symbol: symbol.to_string(),
                have: distinct,
                need: 2,
            });
        }

        let n = bars.len() as f64;
        let mean_x = days.iter().map(|&d| d as f64).sum::<f64>() / n;
        let mean_y = bars.iter().map(|b| b.close).sum::<f64>() / n;

        let (mut sxy, mut sxx) = (0.0, 0.0);
        for (&d, bar) in days.iter().zip(bars) {
            let dx = d as f64 - mean_x;
            sxy += dx * (bar.close - mean_y);
            sxx += dx * dx;
        }
        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };

        Ok(LinearModel {
            symbol: symbol.to_string(),
            intercept: mean_y - slope * mean_x,
            slope,
            samples: bars.len(),
        })
    }
}

/// Whole days elapsed since the first bar, one entry per bar.
///
/// Bars must be ordered by timestamp.
pub fn day_index(bars: &[PriceBar]) -> Vec<i64> {
    let Some(first) = bars.first() else {
        return Vec::new();
    };
    bars.iter()
        .map(|b| (b.timestamp - first.timestamp).num_days())
        .collect()
}

/// Extrapolate the model over the days following the last bar.
pub fn forecast(symbol: &str, bars: &[PriceBar], model: &LinearModel) -> Vec<Prediction> {
    let Some(last) = bars.last() else {
        return Vec::new();
    };
    let last_day = day_index(bars).into_iter().max().unwrap_or(0);
    let last_date = last.date();

    (1..=FORECAST_HORIZON_DAYS)
        .map(|offset| Prediction {
            symbol: symbol.to_string(),
            date: last_date + Duration::days(offset),
            predicted_price: model.predict(last_day + offset),
        })
        .collect()
}
