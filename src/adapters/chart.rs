//! Chart data shared by the SVG and PDF renderers.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::portfolio::EquityPoint;
use crate::domain::prediction::Prediction;
use crate::domain::price_bar::PriceBar;

/// Upper bound on plotted points per series.
pub const MAX_POINTS: usize = 1_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    /// RGB, each channel 0..=255.
    pub color: (u8, u8, u8),
    pub dashed: bool,
    /// (seconds since epoch, value)
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// Plot area in output units, origin at `(left, top)`, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn of(series: &[ChartSeries]) -> Option<Self> {
        let mut points = series.iter().flat_map(|s| s.points.iter());
        let &(x0, y0) = points.next()?;
        let mut b = Bounds {
            min_x: x0,
            max_x: x0,
            min_y: y0,
            max_y: y0,
        };
        for &(x, y) in points {
            b.min_x = b.min_x.min(x);
            b.max_x = b.max_x.max(x);
            b.min_y = b.min_y.min(y);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    /// Map a data point into `frame`. Degenerate ranges collapse to the frame's centre line.
    pub fn project(&self, frame: &Frame, x: f64, y: f64) -> (f64, f64) {
        let x_range = self.max_x - self.min_x;
        let y_range = self.max_y - self.min_y;
        let px = if x_range > 0.0 {
            frame.left + (x - self.min_x) / x_range * frame.width
        } else {
            frame.left + frame.width / 2.0
        };
        let py = if y_range > 0.0 {
            frame.top + frame.height - (y - self.min_y) / y_range * frame.height
        } else {
            frame.top + frame.height / 2.0
        };
        (px, py)
    }
}

fn epoch(ts: NaiveDateTime) -> f64 {
    ts.and_utc().timestamp() as f64
}

fn day_epoch(date: NaiveDate) -> f64 {
    date.and_hms_opt(0, 0, 0).map(epoch).unwrap_or_default()
}

/// Keep every k-th point so at most `max` remain; the last point is always kept.
pub fn downsample(points: Vec<(f64, f64)>, max: usize) -> Vec<(f64, f64)> {
    if max == 0 || points.len() <= max {
        return points;
    }
    let step = points.len().div_ceil(max);
    let last = points.len() - 1;
    let mut out: Vec<(f64, f64)> = points.iter().step_by(step).copied().collect();
    if last % step != 0 {
        if out.len() == max {
            out.pop();
        }
        out.push(points[last]);
    }
    out
}

pub fn equity_series(curve: &[EquityPoint]) -> ChartSeries {
    ChartSeries {
        label: "Portfolio Value".into(),
        color: (31, 119, 180),
        dashed: false,
        points: downsample(
            curve.iter().map(|p| (epoch(p.timestamp), p.equity)).collect(),
            MAX_POINTS,
        ),
    }
}

/// Drawdown from running peak, as a negative percentage.
pub fn drawdown_series(curve: &[EquityPoint]) -> ChartSeries {
    let mut peak = f64::NEG_INFINITY;
    let points = curve
        .iter()
        .map(|p| {
            peak = peak.max(p.equity);
            let dd = if peak > 0.0 {
                (p.equity - peak) / peak * 100.0
            } else {
                0.0
            };
            (epoch(p.timestamp), dd)
        })
        .collect();
    ChartSeries {
        label: "Drawdown (%)".into(),
        color: (214, 39, 40),
        dashed: false,
        points: downsample(points, MAX_POINTS),
    }
}

pub fn actual_series(bars: &[PriceBar]) -> ChartSeries {
    ChartSeries {
        label: "Actual Prices".into(),
        color: (31, 119, 180),
        dashed: false,
        points: downsample(
            bars.iter().map(|b| (epoch(b.timestamp), b.close)).collect(),
            MAX_POINTS,
        ),
    }
}

pub fn predicted_series(predictions: &[Prediction]) -> ChartSeries {
    ChartSeries {
        label: "Predicted Prices".into(),
        color: (214, 39, 40),
        dashed: true,
        points: predictions
            .iter()
            .map(|p| (day_epoch(p.date), p.predicted_price))
            .collect(),
    }
}
