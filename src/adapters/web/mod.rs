//! Web server adapter.
//!
//! Axum router serving the dashboard pages, the backtest form, and the
//! PDF/JSON report downloads.

mod error;
mod handlers;
mod templates;

pub use error::{status_from_error, WebError};
pub use handlers::*;
pub use templates::*;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::ports::data_port::DataPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::model_port::ModelPort;
use crate::ports::report_port::ReportPort;

pub struct AppState {
    pub data_port: Arc<dyn DataPort + Send + Sync>,
    pub market_data: Arc<dyn MarketDataPort + Send + Sync>,
    pub models: Arc<dyn ModelPort + Send + Sync>,
    pub reports: Arc<dyn ReportPort + Send + Sync>,
    /// Months requested per fetch.
    pub month_limit: usize,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::main_page))
        .route("/lookup", get(handlers::lookup))
        .route("/health", get(handlers::health))
        .route("/fetch/{symbol}", get(handlers::fetch_stock_data))
        .route(
            "/backtest/{symbol}",
            get(handlers::backtest_form).post(handlers::run_backtest),
        )
        .route("/predict/{symbol}", get(handlers::predict_stock_prices))
        .route("/report/pdf/{symbol}", get(handlers::prediction_pdf))
        .route("/report/json/{symbol}", get(handlers::prediction_json))
        .route(
            "/backtest/pdf/{symbol}/{initial_investment}",
            get(handlers::backtest_pdf),
        )
        .route(
            "/backtest/json/{symbol}/{initial_investment}",
            get(handlers::backtest_json),
        )
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
