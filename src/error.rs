use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Input rejected before anything touches the store.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("distance must be a positive number of kilometers, got {0}")]
    InvalidDistance(f64),
    #[error("unknown transport mode: {0:?}")]
    UnknownTransportMode(String),
    #[error("unknown trip status: {0:?}")]
    UnknownStatus(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    JsonBody(#[from] JsonRejection),
    #[error(transparent)]
    Query(#[from] QueryRejection),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::JsonBody(rejection) => rejection.status(),
            AppError::Query(rejection) => rejection.status(),
            AppError::Config(_)
            | AppError::Io(_)
            | AppError::Database(_)
            | AppError::Migration(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("request failed: {self:?}");
        } else {
            warn!("rejected request ({status}): {self}");
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
