//! HTTP error responses for web adapter.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::warn;

use crate::domain::error::StocklensError;

use super::templates::ErrorTemplate;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_from_error(err: &StocklensError) -> StatusCode {
    match err {
        StocklensError::ConfigMissing { .. }
        | StocklensError::ConfigInvalid { .. }
        | StocklensError::ConfigParse { .. }
        | StocklensError::InvalidInvestment { .. } => StatusCode::BAD_REQUEST,
        StocklensError::NoData { .. }
        | StocklensError::NoPredictions { .. }
        | StocklensError::ModelNotFound { .. } => StatusCode::NOT_FOUND,
        StocklensError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        StocklensError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        StocklensError::Network { .. } | StocklensError::ApiResponse { .. } => {
            StatusCode::BAD_GATEWAY
        }
        StocklensError::Database { .. }
        | StocklensError::DatabaseQuery { .. }
        | StocklensError::ModelInvalid { .. }
        | StocklensError::Report { .. }
        | StocklensError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<StocklensError> for WebError {
    fn from(err: StocklensError) -> Self {
        let status = status_from_error(&err);
        if status.is_server_error() {
            warn!(error = %err, "request failed");
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let template = ErrorTemplate {
            message: &self.message,
            status: self.status.as_u16(),
        };
        match template.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(_) => (self.status, self.message).into_response(),
        }
    }
}
