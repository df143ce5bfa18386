//! HTML templates using Askama.

use askama::Template;

use crate::domain::backtest::BacktestResult;
use crate::domain::prediction::Prediction;
use crate::domain::price_bar::PriceBar;

#[derive(Template)]
#[template(path = "main.html")]
pub struct MainTemplate<'a> {
    pub symbols: &'a [String],
}

#[derive(Template)]
#[template(path = "fetch_data.html")]
pub struct FetchTemplate<'a> {
    pub symbol: &'a str,
    pub total: usize,
    /// Most recent bars, newest last.
    pub rows: &'a [PriceBar],
}

#[derive(Template)]
#[template(path = "backtest.html")]
pub struct BacktestFormTemplate<'a> {
    pub symbol: &'a str,
    /// Previously submitted value, echoed back on validation failure.
    pub value: &'a str,
    /// Empty when there is nothing to report.
    pub error: &'a str,
}

#[derive(Template)]
#[template(path = "backtest_result.html")]
pub struct BacktestResultTemplate<'a> {
    pub symbol: &'a str,
    pub initial_investment: f64,
    /// Path segment for the report links.
    pub investment_param: &'a str,
    pub result: &'a BacktestResult,
    pub max_drawdown_pct: f64,
    pub equity_svg: &'a str,
    pub drawdown_svg: &'a str,
}

#[derive(Template)]
#[template(path = "predict.html")]
pub struct PredictTemplate<'a> {
    pub symbol: &'a str,
    pub predictions: &'a [Prediction],
    pub chart_svg: &'a str,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub message: &'a str,
    pub status: u16,
}
