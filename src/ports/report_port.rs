//! Report rendering port.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::StocklensError;
use crate::domain::prediction::Prediction;

/// Port for rendering downloadable reports.
pub trait ReportPort {
    fn backtest_report(
        &self,
        symbol: &str,
        initial_investment: f64,
        result: &BacktestResult,
    ) -> Result<Vec<u8>, StocklensError>;

    fn prediction_report(
        &self,
        symbol: &str,
        predictions: &[Prediction],
    ) -> Result<Vec<u8>, StocklensError>;
}
