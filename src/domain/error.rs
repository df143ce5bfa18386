//! Domain error types.

/// Top-level error type for stocklens.
#[derive(Debug, thiserror::Error)]
pub enum StocklensError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("Failed to fetch data: {reason}")]
    Network { reason: String },

    #[error("API rate limit exceeded, please try again later.")]
    RateLimited,

    #[error("market data API error: {reason}")]
    ApiResponse { reason: String },

    #[error("No data found for symbol {symbol}.")]
    NoData { symbol: String },

    #[error("No predictions found for {symbol}. Run a prediction first.")]
    NoPredictions { symbol: String },

    #[error("insufficient data for {symbol}: have {have}, need {need}")]
    InsufficientData {
        symbol: String,
        have: usize,
        need: usize,
    },

    #[error("No pre-trained model found for {symbol}. Please train the model first.")]
    ModelNotFound { symbol: String },

    #[error("invalid model file {path}: {reason}")]
    ModelInvalid { path: String, reason: String },

    #[error("invalid initial investment: {reason}")]
    InvalidInvestment { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StocklensError> for std::process::ExitCode {
    fn from(err: &StocklensError) -> Self {
        let code: u8 = match err {
            StocklensError::Io(_) | StocklensError::Report { .. } => 1,
            StocklensError::ConfigParse { .. }
            | StocklensError::ConfigMissing { .. }
            | StocklensError::ConfigInvalid { .. }
            | StocklensError::InvalidInvestment { .. } => 2,
            StocklensError::Database { .. } | StocklensError::DatabaseQuery { .. } => 3,
            StocklensError::Network { .. }
            | StocklensError::RateLimited
            | StocklensError::ApiResponse { .. } => 4,
            StocklensError::NoData { .. }
            | StocklensError::NoPredictions { .. }
            | StocklensError::InsufficientData { .. }
            | StocklensError::ModelNotFound { .. }
            | StocklensError::ModelInvalid { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
