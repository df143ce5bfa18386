#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use stocklens::domain::error::StocklensError;
use stocklens::domain::model::LinearModel;
pub use stocklens::domain::prediction::Prediction;
pub use stocklens::domain::price_bar::PriceBar;
use stocklens::ports::data_port::DataPort;
use stocklens::ports::market_data_port::MarketDataPort;
use stocklens::ports::model_port::ModelPort;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory store with the same upsert and batch semantics as the SQLite adapter.
#[derive(Default)]
pub struct MockDataPort {
    pub bars: Mutex<HashMap<String, Vec<PriceBar>>>,
    pub predictions: Mutex<Vec<(String, i64, Prediction)>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.bars.lock().unwrap().insert(symbol.to_string(), bars);
        self
    }

    pub fn bar_count(&self, symbol: &str) -> usize {
        self.bars
            .lock()
            .unwrap()
            .get(symbol)
            .map_or(0, |b| b.len())
    }
}

/// Store whose every call fails, as a broken database would.
pub struct FailingDataPort;

impl FailingDataPort {
    fn error() -> StocklensError {
        StocklensError::Database {
            reason: "unable to open database file".into(),
        }
    }
}

impl DataPort for FailingDataPort {
    fn upsert_bars(&self, _bars: &[PriceBar]) -> Result<usize, StocklensError> {
        Err(Self::error())
    }

    fn fetch_bars(&self, _symbol: &str) -> Result<Vec<PriceBar>, StocklensError> {
        Err(Self::error())
    }

    fn list_symbols(&self) -> Result<Vec<String>, StocklensError> {
        Err(Self::error())
    }

    fn insert_predictions(&self, _predictions: &[Prediction]) -> Result<i64, StocklensError> {
        Err(Self::error())
    }

    fn latest_predictions(&self, _symbol: &str) -> Result<Vec<Prediction>, StocklensError> {
        Err(Self::error())
    }
}

impl DataPort for MockDataPort {
    fn upsert_bars(&self, bars: &[PriceBar]) -> Result<usize, StocklensError> {
        let mut store = self.bars.lock().unwrap();
        for bar in bars {
            let series = store.entry(bar.symbol.clone()).or_default();
            match series.iter_mut().find(|b| b.timestamp == bar.timestamp) {
                Some(existing) => *existing = bar.clone(),
                None => series.push(bar.clone()),
            }
            series.sort_by_key(|b| b.timestamp);
        }
        Ok(bars.len())
    }

    fn fetch_bars(&self, symbol: &str) -> Result<Vec<PriceBar>, StocklensError> {
        Ok(self
            .bars
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, StocklensError> {
        let mut symbols: Vec<String> = self.bars.lock().unwrap().keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn insert_predictions(&self, predictions: &[Prediction]) -> Result<i64, StocklensError> {
        let mut rows = self.predictions.lock().unwrap();
        let Some(symbol) = predictions.first().map(|p| p.symbol.clone()) else {
            return Ok(0);
        };
        let batch = rows
            .iter()
            .filter(|(s, _, _)| *s == symbol)
            .map(|(_, b, _)| *b)
            .max()
            .unwrap_or(0)
            + 1;
        rows.extend(predictions.iter().map(|p| (symbol.clone(), batch, p.clone())));
        Ok(batch)
    }

    fn latest_predictions(&self, symbol: &str) -> Result<Vec<Prediction>, StocklensError> {
        let rows = self.predictions.lock().unwrap();
        let Some(latest) = rows
            .iter()
            .filter(|(s, _, _)| s == symbol)
            .map(|(_, b, _)| *b)
            .max()
        else {
            return Ok(Vec::new());
        };
        Ok(rows
            .iter()
            .filter(|(s, b, _)| s == symbol && *b == latest)
            .map(|(_, _, p)| p.clone())
            .collect())
    }
}

/// Scripted upstream: each month returns its queued result, unknown months are empty.
#[derive(Default)]
pub struct MockMarketData {
    pub months: HashMap<String, Result<Vec<PriceBar>, String>>,
    pub rate_limited_from: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_month(mut self, month: &str, bars: Vec<PriceBar>) -> Self {
        self.months.insert(month.to_string(), Ok(bars));
        self
    }

    /// Every month at or after `month` answers with a rate-limit note.
    pub fn rate_limited_from(mut self, month: &str) -> Self {
        self.rate_limited_from = Some(month.to_string());
        self
    }

    pub fn with_network_error(mut self, month: &str, reason: &str) -> Self {
        self.months.insert(month.to_string(), Err(reason.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataPort for MockMarketData {
    async fn fetch_month(&self, _symbol: &str, month: &str) -> Result<Vec<PriceBar>, StocklensError> {
        self.calls.lock().unwrap().push(month.to_string());
        if let Some(limit) = &self.rate_limited_from {
            if month >= limit.as_str() {
                return Err(StocklensError::RateLimited);
            }
        }
        match self.months.get(month) {
            Some(Ok(bars)) => Ok(bars.clone()),
            Some(Err(reason)) => Err(StocklensError::Network {
                reason: reason.clone(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Default)]
pub struct MockModelPort {
    pub models: Mutex<HashMap<String, LinearModel>>,
}

impl MockModelPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(self, model: LinearModel) -> Self {
        self.models
            .lock()
            .unwrap()
            .insert(model.symbol.clone(), model);
        self
    }
}

impl ModelPort for MockModelPort {
    fn load(&self, symbol: &str) -> Result<LinearModel, StocklensError> {
        self.models
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .ok_or_else(|| StocklensError::ModelNotFound {
                symbol: symbol.to_string(),
            })
    }

    fn save(&self, model: &LinearModel) -> Result<(), StocklensError> {
        self.models
            .lock()
            .unwrap()
            .insert(model.symbol.clone(), model.clone());
        Ok(())
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

pub fn make_bar(symbol: &str, timestamp: NaiveDateTime, close: f64) -> PriceBar {
    PriceBar {
        symbol: symbol.to_string(),
        timestamp,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000,
    }
}

/// One bar per five minutes with the given closes.
pub fn bars_from_closes(symbol: &str, closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(symbol, start_time() + Duration::minutes(5 * i as i64), c))
        .collect()
}

/// One bar per day with the given closes.
pub fn daily_bars(symbol: &str, closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(symbol, start_time() + Duration::days(i as i64), c))
        .collect()
}

/// 250 flat bars at 100, then a dip to 90 for 20 bars, then a rally to 120.
///
/// The dip crosses below the 50-period average (buy); the rally crosses above
/// the 200-period average (sell).
pub fn dip_then_rally_closes() -> Vec<f64> {
    let mut closes = vec![100.0; 250];
    closes.extend(std::iter::repeat_n(90.0, 20));
    closes.extend(std::iter::repeat_n(120.0, 20));
    closes
}
