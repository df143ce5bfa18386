//! HTTP request handlers for web adapter.

use askama::Template;
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::adapters::chart::{self, ChartSeries};
use crate::adapters::chart_svg::line_chart_svg;
use crate::domain::backtest::{self, validate_investment};
use crate::domain::error::StocklensError;
use crate::domain::prediction::Prediction;
use crate::domain::price_bar::{PriceBar, is_valid_symbol, normalize_symbol};
use crate::domain::workflow;

use super::templates::{
    BacktestFormTemplate, BacktestResultTemplate, FetchTemplate, MainTemplate, PredictTemplate,
};
use super::{AppState, WebError};

/// Rows shown on the fetch page.
const FETCH_PAGE_ROWS: usize = 100;

fn render<T: Template>(template: &T) -> Result<Html<String>, WebError> {
    template
        .render()
        .map(Html)
        .map_err(|e| WebError::internal(format!("template error: {e}")))
}

fn pdf_response(bytes: Vec<u8>, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Normalise a symbol taken from the URL, rejecting anything that is not a ticker.
fn path_symbol(raw: &str) -> Result<String, WebError> {
    let symbol = normalize_symbol(raw);
    if !is_valid_symbol(&symbol) {
        return Err(WebError::bad_request(format!("invalid symbol '{raw}'")));
    }
    Ok(symbol)
}

fn parse_investment(raw: &str) -> Result<f64, StocklensError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| StocklensError::InvalidInvestment {
            reason: format!("'{raw}' is not a number"),
        })?;
    validate_investment(value)
}

pub async fn main_page(State(state): State<Arc<AppState>>) -> Result<Response, WebError> {
    let symbols = state.data_port.list_symbols()?;
    Ok(render(&MainTemplate { symbols: &symbols })?.into_response())
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub symbol: String,
    #[serde(default)]
    pub action: String,
}

/// Redirect the dashboard form to the chosen page.
pub async fn lookup(Query(query): Query<LookupQuery>) -> Result<Redirect, WebError> {
    let symbol = path_symbol(&query.symbol)?;
    let action = match query.action.as_str() {
        "" | "fetch" => "fetch",
        "backtest" => "backtest",
        "predict" => "predict",
        other => return Err(WebError::bad_request(format!("unknown action '{other}'"))),
    };
    Ok(Redirect::to(&format!("/{action}/{symbol}")))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn fetch_stock_data(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Response, WebError> {
    let symbol = path_symbol(&symbol)?;
    let bars = workflow::fetch_history(
        &*state.market_data,
        &*state.data_port,
        &symbol,
        Local::now().date_naive(),
        state.month_limit,
    )
    .await?;

    let rows = &bars[bars.len().saturating_sub(FETCH_PAGE_ROWS)..];
    let template = FetchTemplate {
        symbol: &symbol,
        total: bars.len(),
        rows,
    };
    Ok(render(&template)?.into_response())
}

pub async fn backtest_form(Path(symbol): Path<String>) -> Result<Response, WebError> {
    let symbol = path_symbol(&symbol)?;
    let template = BacktestFormTemplate {
        symbol: &symbol,
        value: "",
        error: "",
    };
    Ok(render(&template)?.into_response())
}

#[derive(Debug, Deserialize)]
pub struct BacktestFormData {
    #[serde(default)]
    pub initial_investment: String,
}

pub async fn run_backtest(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Form(form): Form<BacktestFormData>,
) -> Result<Response, WebError> {
    let symbol = path_symbol(&symbol)?;

    let initial_investment = match parse_investment(&form.initial_investment) {
        Ok(v) => v,
        Err(e) => {
            let message = if form.initial_investment.trim().is_empty() {
                "Initial investment is required.".to_string()
            } else {
                e.to_string()
            };
            let template = BacktestFormTemplate {
                symbol: &symbol,
                value: &form.initial_investment,
                error: &message,
            };
            return Ok((StatusCode::BAD_REQUEST, render(&template)?).into_response());
        }
    };

    let result = workflow::backtest_symbol(&*state.data_port, &symbol, initial_investment)?;

    let equity_svg = line_chart_svg(
        &format!("{symbol} Equity Curve"),
        &[chart::equity_series(&result.equity_curve)],
    );
    let drawdown_svg = line_chart_svg(
        &format!("{symbol} Drawdown"),
        &[chart::drawdown_series(&result.equity_curve)],
    );
    let investment_param = initial_investment.to_string();
    let template = BacktestResultTemplate {
        symbol: &symbol,
        initial_investment,
        investment_param: &investment_param,
        result: &result,
        max_drawdown_pct: result.max_drawdown * 100.0,
        equity_svg: &equity_svg,
        drawdown_svg: &drawdown_svg,
    };
    Ok(render(&template)?.into_response())
}

pub async fn predict_stock_prices(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Response, WebError> {
    let symbol = path_symbol(&symbol)?;
    let predictions = workflow::predict_symbol(&*state.data_port, &*state.models, &symbol)?;
    let bars = workflow::load_bars(&*state.data_port, &symbol)?;

    let series: [ChartSeries; 2] = [
        chart::actual_series(&bars),
        chart::predicted_series(&predictions),
    ];
    let chart_svg = line_chart_svg(&format!("{symbol} Actual vs Predicted"), &series);
    let template = PredictTemplate {
        symbol: &symbol,
        predictions: &predictions,
        chart_svg: &chart_svg,
    };
    Ok(render(&template)?.into_response())
}

#[derive(Debug, Serialize)]
pub struct PredictedPrice {
    pub date: NaiveDate,
    pub predicted_price: f64,
}

impl From<&Prediction> for PredictedPrice {
    fn from(p: &Prediction) -> Self {
        Self {
            date: p.date,
            predicted_price: p.predicted_price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActualPrice {
    pub date: NaiveDateTime,
    pub close_price: f64,
}

impl From<&PriceBar> for ActualPrice {
    fn from(bar: &PriceBar) -> Self {
        Self {
            date: bar.timestamp,
            close_price: bar.close,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictionReport {
    pub symbol: String,
    pub predicted_prices: Vec<PredictedPrice>,
}

#[derive(Debug, Serialize)]
pub struct BacktestReport {
    pub symbol: String,
    pub initial_investment: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub trades: usize,
    pub predicted_prices: Vec<PredictedPrice>,
    pub actual_prices: Vec<ActualPrice>,
}

fn latest_batch(state: &AppState, symbol: &str) -> Result<Vec<Prediction>, StocklensError> {
    let predictions = state.data_port.latest_predictions(symbol)?;
    if predictions.is_empty() {
        return Err(StocklensError::NoPredictions {
            symbol: symbol.to_string(),
        });
    }
    Ok(predictions)
}

pub async fn prediction_pdf(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Response, WebError> {
    let symbol = path_symbol(&symbol)?;
    let predictions = latest_batch(&state, &symbol)?;
    let bytes = state.reports.prediction_report(&symbol, &predictions)?;
    info!(symbol, bytes = bytes.len(), "prediction report rendered");
    Ok(pdf_response(bytes, &format!("{symbol}_report.pdf")))
}

pub async fn prediction_json(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<PredictionReport>, WebError> {
    let symbol = path_symbol(&symbol)?;
    let predictions = latest_batch(&state, &symbol)?;
    Ok(Json(PredictionReport {
        predicted_prices: predictions.iter().map(PredictedPrice::from).collect(),
        symbol,
    }))
}

pub async fn backtest_pdf(
    State(state): State<Arc<AppState>>,
    Path((symbol, initial_investment)): Path<(String, String)>,
) -> Result<Response, WebError> {
    let symbol = path_symbol(&symbol)?;
    let initial_investment = parse_investment(&initial_investment)?;
    let result = workflow::backtest_symbol(&*state.data_port, &symbol, initial_investment)?;
    let bytes = state
        .reports
        .backtest_report(&symbol, initial_investment, &result)?;
    info!(symbol, bytes = bytes.len(), "backtest report rendered");
    Ok(pdf_response(bytes, &format!("{symbol}_backtest_report.pdf")))
}

pub async fn backtest_json(
    State(state): State<Arc<AppState>>,
    Path((symbol, initial_investment)): Path<(String, String)>,
) -> Result<Json<BacktestReport>, WebError> {
    let symbol = path_symbol(&symbol)?;
    let initial_investment = parse_investment(&initial_investment)?;
    let bars = workflow::load_bars(&*state.data_port, &symbol)?;
    let result = backtest::run_backtest(&bars, initial_investment)?;
    let predictions = state.data_port.latest_predictions(&symbol)?;

    Ok(Json(BacktestReport {
        initial_investment,
        total_return: result.total_return,
        max_drawdown: result.max_drawdown,
        trades: result.trades,
        predicted_prices: predictions.iter().map(PredictedPrice::from).collect(),
        actual_prices: bars.iter().map(ActualPrice::from).collect(),
        symbol,
    }))
}

pub async fn not_found() -> WebError {
    WebError::not_found("Page not found")
}
