//! CLI definition and dispatch.

use chrono::Local;
use clap::{Parser, Subcommand};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use crate::adapters::alpha_vantage_adapter::AlphaVantageAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_model_adapter::JsonModelAdapter;
use crate::adapters::pdf_report::PdfReportAdapter;
use crate::domain::backtest::{validate_investment, BacktestResult};
use crate::domain::error::StocklensError;
use crate::domain::fetch_plan::DEFAULT_MONTH_LIMIT;
use crate::domain::price_bar::normalize_symbol;
use crate::domain::workflow;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8000";
pub const DEFAULT_INVESTMENT: f64 = 10_000.0;

#[derive(Parser, Debug)]
#[command(name = "stocklens", about = "Stock data, backtests and price forecasts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Download intraday history for a symbol and store it
    Fetch {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
    },
    /// Run the moving-average backtest over stored bars
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        /// Starting cash; defaults to [backtest] initial_investment
        #[arg(long)]
        investment: Option<f64>,
        /// Write a PDF report here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Forecast the next 30 days with the symbol's trained model
    Predict {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
    },
    /// Fit a linear model over stored bars and save it
    Train {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Serve { config } => run_serve(&config),
        Command::Fetch { config, symbol } => run_fetch(&config, &symbol),
        Command::Backtest {
            config,
            symbol,
            investment,
            output,
        } => run_backtest(&config, &symbol, investment, output.as_deref()),
        Command::Predict { config, symbol } => run_predict(&config, &symbol),
        Command::Train { config, symbol } => run_train(&config, &symbol),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StocklensError> {
    FileConfigAdapter::from_file(path)
}

pub fn listen_addr(config: &dyn ConfigPort) -> Result<SocketAddr, StocklensError> {
    let raw = config
        .get_string("web", "listen")
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
    raw.parse().map_err(|_| StocklensError::ConfigInvalid {
        section: "web".into(),
        key: "listen".into(),
        reason: format!("'{raw}' is not a socket address"),
    })
}

pub fn month_limit(config: &dyn ConfigPort) -> Result<usize, StocklensError> {
    let limit = config.get_int("alpha_vantage", "month_limit", DEFAULT_MONTH_LIMIT as i64);
    if limit < 1 {
        return Err(StocklensError::ConfigInvalid {
            section: "alpha_vantage".into(),
            key: "month_limit".into(),
            reason: "must be at least 1".into(),
        });
    }
    Ok(limit as usize)
}

/// Command-line value first, then `[backtest] initial_investment`, then the default.
pub fn resolve_investment(
    config: &dyn ConfigPort,
    override_value: Option<f64>,
) -> Result<f64, StocklensError> {
    let value = override_value.unwrap_or_else(|| {
        config.get_double("backtest", "initial_investment", DEFAULT_INVESTMENT)
    });
    validate_investment(value)
}

pub fn format_backtest_summary(
    symbol: &str,
    initial_investment: f64,
    result: &BacktestResult,
) -> String {
    format!(
        "{symbol} backtest\n\
         Initial Investment: {initial_investment:.2}\n\
         Total Return: {:.2}%\n\
         Max Drawdown: {:.2}%\n\
         Number of Trades: {}\n\
         Final Value: {:.2}",
        result.total_return,
        result.max_drawdown * 100.0,
        result.trades,
        result.final_value
    )
}

#[cfg(feature = "sqlite")]
pub fn open_store(config: &dyn ConfigPort) -> Result<Arc<dyn DataPort + Send + Sync>, StocklensError> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;

    let adapter = SqliteAdapter::from_config(config)?;
    adapter.initialize_schema()?;
    Ok(Arc::new(adapter))
}

#[cfg(not(feature = "sqlite"))]
pub fn open_store(config: &dyn ConfigPort) -> Result<Arc<dyn DataPort + Send + Sync>, StocklensError> {
    let _ = config;
    Err(StocklensError::Database {
        reason: "sqlite feature is required".into(),
    })
}

fn runtime() -> Result<tokio::runtime::Runtime, StocklensError> {
    Ok(tokio::runtime::Runtime::new()?)
}

fn run_serve(config_path: &Path) -> Result<(), StocklensError> {
    use crate::adapters::web::{build_router, AppState};

    eprintln!("Loading config from {}", config_path.display());
    let config = load_config(config_path)?;
    let addr = listen_addr(&config)?;

    let state = AppState {
        data_port: open_store(&config)?,
        market_data: Arc::new(AlphaVantageAdapter::from_config(&config)?),
        models: Arc::new(JsonModelAdapter::from_config(&config)),
        reports: Arc::new(PdfReportAdapter::new()),
        month_limit: month_limit(&config)?,
    };
    let router = build_router(state);

    runtime()?.block_on(async {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "web server listening");
        axum::serve(listener, router).await
    })?;
    Ok(())
}

fn run_fetch(config_path: &Path, symbol: &str) -> Result<(), StocklensError> {
    let config = load_config(config_path)?;
    let symbol = normalize_symbol(symbol);
    let market = AlphaVantageAdapter::from_config(&config)?;
    let limit = month_limit(&config)?;
    let store = open_store(&config)?;

    let bars = runtime()?.block_on(workflow::fetch_history(
        &market,
        &*store,
        &symbol,
        Local::now().date_naive(),
        limit,
    ))?;

    match (bars.first(), bars.last()) {
        (Some(first), Some(last)) => println!(
            "{symbol}: stored {} bars from {} to {}",
            bars.len(),
            first.timestamp_string(),
            last.timestamp_string()
        ),
        _ => println!("{symbol}: no bars returned"),
    }
    Ok(())
}

fn run_backtest(
    config_path: &Path,
    symbol: &str,
    investment: Option<f64>,
    output: Option<&Path>,
) -> Result<(), StocklensError> {
    let config = load_config(config_path)?;
    let symbol = normalize_symbol(symbol);
    let initial_investment = resolve_investment(&config, investment)?;
    let store = open_store(&config)?;

    let result = workflow::backtest_symbol(&*store, &symbol, initial_investment)?;
    println!(
        "{}",
        format_backtest_summary(&symbol, initial_investment, &result)
    );

    if let Some(path) = output {
        let bytes = PdfReportAdapter::new().backtest_report(&symbol, initial_investment, &result)?;
        fs::write(path, bytes)?;
        eprintln!("Report written to {}", path.display());
    }
    Ok(())
}

fn run_predict(config_path: &Path, symbol: &str) -> Result<(), StocklensError> {
    let config = load_config(config_path)?;
    let symbol = normalize_symbol(symbol);
    let store = open_store(&config)?;
    let models = JsonModelAdapter::from_config(&config);

    let predictions = workflow::predict_symbol(&*store, &models, &symbol)?;
    println!("{symbol} predicted prices");
    for p in &predictions {
        println!("{}  {:.2}", p.date, p.predicted_price);
    }
    Ok(())
}

fn run_train(config_path: &Path, symbol: &str) -> Result<(), StocklensError> {
    let config = load_config(config_path)?;
    let symbol = normalize_symbol(symbol);
    let store = open_store(&config)?;
    let models = JsonModelAdapter::from_config(&config);

    let model = workflow::train_symbol(&*store, &models, &symbol)?;
    println!(
        "{symbol}: price = {:.4} + {:.6} * day ({} samples), saved to {}",
        model.intercept,
        model.slope,
        model.samples,
        models.model_path(&symbol).display()
    );
    Ok(())
}
