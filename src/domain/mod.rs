//! Core domain types and logic.

pub mod price_bar;
pub mod prediction;
pub mod moving_average;
pub mod portfolio;
pub mod backtest;
pub mod model;
pub mod fetch_plan;
pub mod workflow;
pub mod error;
