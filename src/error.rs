//! Handler-boundary error type.
//!
//! Every handler returns `Result<_, AppError>`. Internal failures are logged
//! here and reach the client only as a generic message.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error};

use crate::store::StoreError;

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const AUTH_REQUIRED: &str = "Authentication required";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or missing input. The message is shown to the client as is.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("unauthenticated")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("request timed out")]
    Timeout,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) | AppError::InvalidCredentials => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Timeout | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::Conflict(msg) => msg.clone(),
            AppError::InvalidCredentials => INVALID_CREDENTIALS.into(),
            AppError::Unauthorized => AUTH_REQUIRED.into(),
            AppError::NotFound(what) => format!("{what} not found"),
            AppError::Timeout | AppError::Internal(_) => "Internal Server Error".into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AppError::Conflict("Email already in use".into()),
            StoreError::DuplicateUsername => AppError::Conflict("Username already in use".into()),
            StoreError::NotFound => AppError::NotFound("Property"),
            StoreError::UnknownOwner => AppError::Unauthorized,
            StoreError::InvalidRiskScore(score) => {
                AppError::Validation(format!("Risk score {score} is outside 0-100"))
            }
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection, "malformed request body");
        AppError::Validation("Invalid request body".into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal(e) => error!(error = ?e, "internal error"),
            AppError::Timeout => error!("request deadline exceeded"),
            _ => {}
        }
        let status = self.status();
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
