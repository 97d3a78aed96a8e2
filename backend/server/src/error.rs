use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{config::ConfigError, database::StoreError};

/// Failure of a request after it reached a handler.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    DataAccess(#[from] StoreError),

    #[error("Malformed restaurant record: {0}")]
    MalformedRecord(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::DataAccess { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MalformedRecord { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!("Request failed: {self}");

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Failure before the server starts listening.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build data store client: {0}")]
    Store(#[from] StoreError),

    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}
