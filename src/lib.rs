//! stocklens: intraday stock data, moving-average backtests and linear
//! price forecasts, served over HTTP or driven from the command line.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
