use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lexicon::LexiconError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedPayload { .. } | AppError::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{what} not found"))
    }

    /// Swaps the message of a duplicate-key error, leaving every other error as is.
    pub fn on_conflict(self, message: &str) -> Self {
        match self {
            AppError::Conflict(_) => AppError::Conflict(message.into()),
            other => other,
        }
    }
}

impl From<LexiconError> for AppError {
    fn from(e: LexiconError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(field) => {
                AppError::Conflict(format!("A record with this {field} already exists"))
            }
            StoreError::Missing => AppError::NotFound("Record not found".into()),
            other => AppError::InternalError(Box::new(other)),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    status_code: u16,
    message: String,
    data: Option<()>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            AppError::InternalError(e) => {
                error!("Request failed: {e}");
                "Internal server error".to_string()
            }
            other => {
                warn!("Request rejected ({status}): {other}");
                other.to_string()
            }
        };

        let body = ErrorBody {
            success: false,
            status_code: status.as_u16(),
            message,
            data: None,
        };

        (status, Json(body)).into_response()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {reason}")]
    Invalid { key: String, reason: String },

    #[error("Failed to read secret {name}: {source}")]
    Secret {
        name: String,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statuses() {
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::not_found("Name").to_string(), "Name not found");
        assert_eq!(
            AppError::from(StoreError::Duplicate("slug")).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(LexiconError::EmptyName).to_string(),
            "Name is required"
        );
    }

    #[test]
    fn test_on_conflict() {
        let renamed = AppError::from(StoreError::Duplicate("name")).on_conflict("Name already exists");
        assert_eq!(renamed.to_string(), "Name already exists");

        let untouched = AppError::not_found("Name").on_conflict("Name already exists");
        assert_eq!(untouched.status(), StatusCode::NOT_FOUND);
    }
}
