//! Error responses for the API routes.
//!
//! Every failure is reported as a JSON body `{"error": "..."}`, with an
//! optional `details` field carrying the underlying cause.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Internal {
        message: String,
        details: Option<String>,
    },
}

impl AppError {
    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
            details: None,
        }
    }

    /// Internal error that also reports its cause to the caller.
    pub fn internal_with(message: impl Into<String>, cause: &anyhow::Error) -> Self {
        AppError::Internal {
            message: message.into(),
            details: Some(format!("{:#}", cause)),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            AppError::Internal { details, .. } => details.clone(),
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            details,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::internal("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_details_carry_cause_chain() {
        let cause = anyhow::anyhow!("404 Not Found").context("Failed to fetch file");
        match AppError::internal_with("Failed to update translation", &cause) {
            AppError::Internal { message, details } => {
                assert_eq!(message, "Failed to update translation");
                assert_eq!(
                    details.as_deref(),
                    Some("Failed to fetch file: 404 Not Found")
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
