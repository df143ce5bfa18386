//! Alpha Vantage intraday time-series adapter.
//!
//! One `TIME_SERIES_INTRADAY` request per month, no retries.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::debug;

use crate::domain::error::StocklensError;
use crate::domain::price_bar::{PriceBar, TIMESTAMP_FORMAT};
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
pub const DEFAULT_INTERVAL: &str = "5min";

pub struct AlphaVantageAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    interval: String,
    extended_hours: bool,
}

impl AlphaVantageAdapter {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            interval: DEFAULT_INTERVAL.to_string(),
            extended_hours: true,
        }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StocklensError> {
        let api_key = config
            .get_string("alpha_vantage", "api_key")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| StocklensError::ConfigMissing {
                section: "alpha_vantage".into(),
                key: "api_key".into(),
            })?;
        let base_url = config
            .get_string("alpha_vantage", "base_url")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut adapter = Self::new(base_url, api_key);
        if let Some(interval) = config.get_string("alpha_vantage", "interval") {
            adapter.interval = interval;
        }
        adapter.extended_hours = config.get_bool("alpha_vantage", "extended_hours", true);
        Ok(adapter)
    }

    fn query_params<'a>(&'a self, symbol: &'a str, month: &'a str) -> Vec<(&'a str, &'a str)> {
        let mut params = vec![
            ("function", "TIME_SERIES_INTRADAY"),
            ("symbol", symbol),
            ("interval", self.interval.as_str()),
            ("apikey", self.api_key.as_str()),
            ("month", month),
        ];
        if !self.extended_hours {
            params.push(("extended_hours", "false"));
        }
        params
    }
}

#[async_trait]
impl MarketDataPort for AlphaVantageAdapter {
    async fn fetch_month(
        &self,
        symbol: &str,
        month: &str,
    ) -> Result<Vec<PriceBar>, StocklensError> {
        debug!(symbol, month, "requesting intraday month");
        let network = |e: reqwest::Error| StocklensError::Network {
            reason: e.to_string(),
        };

        let body: Value = self
            .client
            .get(&self.base_url)
            .query(&self.query_params(symbol, month))
            .send()
            .await
            .map_err(network)?
            .error_for_status()
            .map_err(network)?
            .json()
            .await
            .map_err(network)?;

        parse_intraday(symbol, &self.interval, &body)
    }
}

fn field(values: &Value, key: &str, timestamp: &str) -> Result<f64, StocklensError> {
    let raw = values.get(key).ok_or_else(|| StocklensError::ApiResponse {
        reason: format!("missing '{key}' at {timestamp}"),
    })?;
    let parsed = match raw {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.ok_or_else(|| StocklensError::ApiResponse {
        reason: format!("invalid '{key}' at {timestamp}: {raw}"),
    })
}

/// Turn one intraday response body into bars.
///
/// A `Note` or `Information` member is the API's throttling signal.
pub fn parse_intraday(
    symbol: &str,
    interval: &str,
    body: &Value,
) -> Result<Vec<PriceBar>, StocklensError> {
    if body.get("Note").is_some() || body.get("Information").is_some() {
        return Err(StocklensError::RateLimited);
    }
    if let Some(msg) = body.get("Error Message").and_then(Value::as_str) {
        return Err(StocklensError::ApiResponse {
            reason: msg.to_string(),
        });
    }

    let series_key = format!("Time Series ({interval})");
    let Some(series) = body.get(&series_key).and_then(Value::as_object) else {
        return Ok(Vec::new());
    };

    let mut bars = Vec::with_capacity(series.len());
    for (ts, values) in series {
        let timestamp = NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).map_err(|e| {
            StocklensError::ApiResponse {
                reason: format!("invalid timestamp '{ts}': {e}"),
            }
        })?;
        bars.push(PriceBar {
            symbol: symbol.to_string(),
            timestamp,
            open: field(values, "1. open", ts)?,
            high: field(values, "2. high", ts)?,
            low: field(values, "3. low", ts)?,
            close: field(values, "4. close", ts)?,
            volume: field(values, "5. volume", ts)? as i64,
        });
    }
    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}
