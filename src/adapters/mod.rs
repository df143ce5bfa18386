//! Concrete adapter implementations for ports.

#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
pub mod alpha_vantage_adapter;
pub mod chart;
pub mod chart_svg;
pub mod file_config_adapter;
pub mod json_model_adapter;
pub mod pdf_report;
pub mod web;
