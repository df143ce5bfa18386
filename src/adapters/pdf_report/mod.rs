//! PDF report generation.
//!
//! Landscape letter pages: a title line, summary lines for backtests, and a
//! line chart drawn with the shared chart geometry.

pub mod document;

use chrono::{DateTime, NaiveDate};

use crate::adapters::chart::{self, Bounds, ChartSeries, Frame};
use crate::domain::backtest::BacktestResult;
use crate::domain::error::StocklensError;
use crate::domain::prediction::Prediction;
use crate::ports::report_port::ReportPort;

use document::{Page, PdfDocument, LETTER_LANDSCAPE};

/// Chart box position on the page, PDF coordinates (bottom-left origin).
const CHART_X: f64 = 100.0;
const CHART_Y: f64 = 110.0;
const CHART_W: f64 = 600.0;
const CHART_H: f64 = 280.0;

fn label_date(epoch_secs: f64) -> String {
    DateTime::from_timestamp(epoch_secs as i64, 0)
        .map(|dt| dt.date_naive())
        .unwrap_or(NaiveDate::MIN)
        .format("%Y-%m-%d")
        .to_string()
}

/// Draw `series` into the chart box; writes a placeholder line when there is nothing to plot.
fn draw_chart(page: &mut Page, page_height: f64, title: &str, series: &[ChartSeries]) {
    page.text(CHART_X, CHART_Y + CHART_H + 16.0, 11.0, title);

    let Some(bounds) = Bounds::of(series) else {
        page.text(CHART_X, CHART_Y + CHART_H / 2.0, 10.0, "No data to chart.");
        return;
    };
    // Frame is top-down; flip into PDF space when emitting.
    let frame = Frame {
        left: CHART_X,
        top: page_height - (CHART_Y + CHART_H),
        width: CHART_W,
        height: CHART_H,
    };
    let to_pdf = |(x, y): (f64, f64)| (x, page_height - y);

    page.stroke_rgb((51, 51, 51)).line_width(0.8).dash(None);
    page.line((CHART_X, CHART_Y), (CHART_X, CHART_Y + CHART_H));
    page.line((CHART_X, CHART_Y), (CHART_X + CHART_W, CHART_Y));

    page.text(CHART_X - 60.0, CHART_Y + CHART_H - 4.0, 8.0, &format!("{:.2}", bounds.max_y));
    page.text(CHART_X - 60.0, CHART_Y, 8.0, &format!("{:.2}", bounds.min_y));
    page.text(CHART_X, CHART_Y - 14.0, 8.0, &label_date(bounds.min_x));
    page.text(
        CHART_X + CHART_W - 50.0,
        CHART_Y - 14.0,
        8.0,
        &label_date(bounds.max_x),
    );

    for (i, s) in series.iter().enumerate() {
        if s.points.is_empty() {
            continue;
        }
        let points: Vec<(f64, f64)> = s
            .points
            .iter()
            .map(|&(x, y)| to_pdf(bounds.project(&frame, x, y)))
            .collect();
        let dash = s.dashed.then_some((4.0, 3.0));
        page.stroke_rgb(s.color).line_width(1.2).dash(dash);
        page.polyline(&points);

        let lx = CHART_X + i as f64 * 180.0;
        let ly = CHART_Y - 34.0;
        page.line((lx, ly + 3.0), (lx + 20.0, ly + 3.0));
        page.text(lx + 26.0, ly, 9.0, &s.label);
    }
    page.dash(None);
}

pub struct PdfReportAdapter;

impl PdfReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for PdfReportAdapter {
    fn backtest_report(
        &self,
        symbol: &str,
        initial_investment: f64,
        result: &BacktestResult,
    ) -> Result<Vec<u8>, StocklensError> {
        let mut doc = PdfDocument::new(LETTER_LANDSCAPE);
        let mut page = Page::new();

        page.text(100.0, 550.0, 12.0, &format!("{symbol} Stock Backtest Report"));
        page.text(
            100.0,
            500.0,
            12.0,
            &format!("Initial Investment: ${initial_investment:.2}"),
        );
        page.text(
            100.0,
            480.0,
            12.0,
            &format!("Total Return: {:.2}%", result.total_return),
        );
        page.text(
            100.0,
            460.0,
            12.0,
            &format!("Max Drawdown: {:.2}%", result.max_drawdown * 100.0),
        );
        page.text(
            100.0,
            440.0,
            12.0,
            &format!("Trades Executed: {}", result.trades),
        );

        draw_chart(
            &mut page,
            doc.height(),
            "Equity Curve",
            &[chart::equity_series(&result.equity_curve)],
        );

        doc.add_page(page);
        Ok(doc.to_bytes())
    }

    fn prediction_report(
        &self,
        symbol: &str,
        predictions: &[Prediction],
    ) -> Result<Vec<u8>, StocklensError> {
        if predictions.is_empty() {
            return Err(StocklensError::NoPredictions {
                symbol: symbol.to_string(),
            });
        }
        let mut doc = PdfDocument::new(LETTER_LANDSCAPE);
        let mut page = Page::new();

        page.text(
            100.0,
            550.0,
            12.0,
            &format!("{symbol} Stock Price Prediction Report"),
        );
        draw_chart(
            &mut page,
            doc.height(),
            &format!("{symbol} Stock Price Predictions"),
            &[chart::predicted_series(predictions)],
        );

        doc.add_page(page);
        Ok(doc.to_bytes())
    }
}
