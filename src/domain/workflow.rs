//! Request-level pipelines shared by the CLI and the web server.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::domain::backtest::{self, BacktestResult};
use crate::domain::error::StocklensError;
use crate::domain::fetch_plan::month_windows;
use crate::domain::model::{self, LinearModel};
use crate::domain::prediction::Prediction;
use crate::domain::price_bar::PriceBar;
use crate::ports::data_port::DataPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::model_port::ModelPort;

/// Pull each month from upstream and store it before requesting the next.
///
/// The first failing month aborts the run; months already stored stay stored.
pub async fn fetch_history(
    market: &(dyn MarketDataPort + Send + Sync),
    store: &(dyn DataPort + Send + Sync),
    symbol: &str,
    today: NaiveDate,
    month_limit: usize,
) -> Result<Vec<PriceBar>, StocklensError> {
    let months = month_windows(today, month_limit);
    info!(symbol, months = months.len(), "fetching intraday history");

    let mut fetched = Vec::new();
    for month in &months {
        let bars = market.fetch_month(symbol, month).await.inspect_err(|e| {
            warn!(symbol, month = month.as_str(), error = %e, "month fetch failed");
        })?;
        debug!(symbol, month = month.as_str(), bars = bars.len(), "month fetched");
        store.upsert_bars(&bars)?;
        fetched.extend(bars);
    }

    info!(symbol, bars = fetched.len(), "fetch complete");
    Ok(fetched)
}

/// Stored bars for `symbol`, or `NoData` when there are none.
pub fn load_bars(store: &dyn DataPort, symbol: &str) -> Result<Vec<PriceBar>, StocklensError> {
    let bars = store.fetch_bars(symbol)?;
    if bars.is_empty() {
        return Err(StocklensError::NoData {
            symbol: symbol.to_string(),
        });
    }
    Ok(bars)
}

pub fn backtest_symbol(
    store: &dyn DataPort,
    symbol: &str,
    initial_investment: f64,
) -> Result<BacktestResult, StocklensError> {
    backtest::validate_investment(initial_investment)?;
    let bars = load_bars(store, symbol)?;
    let result = backtest::run_backtest(&bars, initial_investment)?;
    info!(
        symbol,
        bars = bars.len(),
        trades = result.trades,
        total_return = result.total_return,
        "backtest complete"
    );
    Ok(result)
}

/// Load the model, extrapolate 30 days, and persist the run as a new batch.
pub fn predict_symbol(
    store: &dyn DataPort,
    models: &dyn ModelPort,
    symbol: &str,
) -> Result<Vec<Prediction>, StocklensError> {
    let model = models.load(symbol)?;
    let bars = load_bars(store, symbol)?;
    let predictions = model::forecast(symbol, &bars, &model);
    let batch = store.insert_predictions(&predictions)?;
    info!(symbol, batch, points = predictions.len(), "predictions stored");
    Ok(predictions)
}

pub fn train_symbol(
    store: &dyn DataPort,
    models: &dyn ModelPort,
    symbol: &str,
) -> Result<LinearModel, StocklensError> {
    let bars = load_bars(store, symbol)?;
    let model = LinearModel::fit(symbol, &bars)?;
    models.save(&model)?;
    info!(
        symbol,
        samples = model.samples,
        slope = model.slope,
        intercept = model.intercept,
        "model trained"
    );
    Ok(model)
}
