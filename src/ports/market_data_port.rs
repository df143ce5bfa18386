//! Upstream market data port.

use async_trait::async_trait;

use crate::domain::error::StocklensError;
use crate::domain::price_bar::PriceBar;

#[async_trait]
pub trait MarketDataPort {
    /// Intraday bars for one `YYYY-MM` month.
    async fn fetch_month(&self, symbol: &str, month: &str)
        -> Result<Vec<PriceBar>, StocklensError>;
}
