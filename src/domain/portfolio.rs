//! Single-symbol portfolio state and equity tracking.

use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub shares: u64,
    pub trades: usize,
    pub peak_value: f64,
    pub max_drawdown: f64,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            shares: 0,
            trades: 0,
            peak_value: initial_capital,
            max_drawdown: 0.0,
            equity_curve: Vec::new(),
        }
    }

    pub fn has_position(&self) -> bool {
        self.shares > 0
    }

    /// Spend as much cash as possible on whole shares.
    ///
    /// Returns the number bought; a price that cannot buy one share is not a trade.
    pub fn buy_max(&mut self, price: f64) -> u64 {
        if price.is_nan() || price <= 0.0 {
            return 0;
        }
        let quantity = (self.cash / price).floor();
        if quantity < 1.0 {
            return 0;
        }
        let quantity = quantity as u64;
        self.cash -= quantity as f64 * price;
        self.shares = quantity;
        self.trades += 1;
        quantity
    }

    /// Liquidate the whole holding at `price`. Returns the number sold.
    pub fn sell_all(&mut self, price: f64) -> u64 {
        let quantity = self.shares;
        if quantity == 0 {
            return 0;
        }
        self.cash += quantity as f64 * price;
        self.shares = 0;
        self.trades += 1;
        quantity
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.cash + self.shares as f64 * price
    }

    /// Value the portfolio at `price`, record it, and update peak and drawdown.
    pub fn mark(&mut self, timestamp: NaiveDateTime, price: f64) -> f64 {
        let value = self.market_value(price);
        if value > self.peak_value {
            self.peak_value = value;
        }
        let drawdown = if self.peak_value > 0.0 {
            (self.peak_value - value) / self.peak_value
        } else {
            0.0
        };
        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
        }
        self.equity_curve.push(EquityPoint {
            timestamp,
            equity: value,
        });
        value
    }

    pub fn final_value(&self) -> f64 {
        self.equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.initial_capital)
    }
}
