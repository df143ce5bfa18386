//! Price and prediction persistence port.

use crate::domain::error::StocklensError;
use crate::domain::prediction::Prediction;
use crate::domain::price_bar::PriceBar;

pub trait DataPort {
    /// Insert bars, replacing any existing row with the same symbol and timestamp.
    fn upsert_bars(&self, bars: &[PriceBar]) -> Result<usize, StocklensError>;

    /// All bars for `symbol`, ordered by timestamp ascending.
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<PriceBar>, StocklensError>;

    fn list_symbols(&self) -> Result<Vec<String>, StocklensError>;

    /// Append a prediction run; returns its batch number.
    fn insert_predictions(&self, predictions: &[Prediction]) -> Result<i64, StocklensError>;

    /// Predictions from the most recent batch for `symbol`, ordered by date.
    fn latest_predictions(&self, symbol: &str) -> Result<Vec<Prediction>, StocklensError>;
}
