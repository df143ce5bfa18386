//! Predicted prices produced by the forecasting workflow.

use chrono::NaiveDate;
use serde::Serialize;

/// Number of future days produced by each prediction run.
pub const FORECAST_HORIZON_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub symbol: String,
    pub date: NaiveDate,
    pub predicted_price: f64,
}
