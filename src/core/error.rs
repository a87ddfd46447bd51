//! Typed error handling for the console core
//!
//! Every failure in this crate is recoverable: screen controllers catch
//! [`ConsoleError`] at their boundary, turn it into a user-visible message and
//! leave their stores untouched so the user can retry or cancel.
//!
//! # Error Categories
//!
//! - `Transport`: the backend could not be reached or answered with a failure
//! - `Validation`: local, pre-submission rule violations
//! - `MissingIdentifier`: delete/update attempted on a record never persisted
//! - `IllegalAction`: action not permitted in the current edit mode
//! - `Query`: malformed search criteria
//!
//! # Example
//!
//! ```rust,ignore
//! match controller.delete().await {
//!     Ok(_) => {}
//!     Err(ConsoleError::MissingIdentifier { .. }) => {
//!         // never reached the network
//!     }
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

use crate::core::mode::{EditMode, ModeAction};
use crate::core::query::QueryError;
use crate::core::validation::Violation;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// The main error type of the console core
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The backend call failed
    #[error("{operation} failed: {message}")]
    Transport { operation: String, message: String },

    /// The record breaks its validation rules
    #[error("{}", describe_violations(.0))]
    Validation(Vec<Violation>),

    /// The record has no server-assigned id
    #[error("cannot {operation} {resource}: record has not been saved yet")]
    MissingIdentifier { resource: String, operation: String },

    /// Action not permitted in the current mode
    #[error("cannot {action} in {mode} mode")]
    IllegalAction { action: ModeAction, mode: EditMode },

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("{resource} with id '{id}' not found")]
    NotFound { resource: String, id: Uuid },

    /// The same action is still in flight
    #[error("{operation} is already in progress")]
    Busy { operation: String },

    /// The screen was torn down
    #[error("screen has been closed")]
    ScreenClosed,

    #[error("configuration error: {0}")]
    Config(String),

    /// Internal errors (should not happen in normal operation)
    #[error("internal error: {0}")]
    Internal(String),
}

fn describe_violations(violations: &[Violation]) -> String {
    let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
    format!("validation failed: {}", messages.join(", "))
}

/// Error response body for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ConsoleError {
    /// Build a transport error from any displayable cause
    pub fn transport(operation: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        ConsoleError::Transport {
            operation: operation.into(),
            message: cause.to_string(),
        }
    }

    pub fn missing_identifier(resource: impl Into<String>, operation: impl Into<String>) -> Self {
        ConsoleError::MissingIdentifier {
            resource: resource.into(),
            operation: operation.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ConsoleError::Transport { .. } => StatusCode::BAD_GATEWAY,
            ConsoleError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ConsoleError::MissingIdentifier { .. } => StatusCode::BAD_REQUEST,
            ConsoleError::IllegalAction { .. } => StatusCode::CONFLICT,
            ConsoleError::Query(_) => StatusCode::BAD_REQUEST,
            ConsoleError::NotFound { .. } => StatusCode::NOT_FOUND,
            ConsoleError::Busy { .. } => StatusCode::CONFLICT,
            ConsoleError::ScreenClosed => StatusCode::GONE,
            ConsoleError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ConsoleError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ConsoleError::Transport { .. } => "TRANSPORT_ERROR",
            ConsoleError::Validation(_) => "VALIDATION_ERROR",
            ConsoleError::MissingIdentifier { .. } => "MISSING_IDENTIFIER",
            ConsoleError::IllegalAction { .. } => "ILLEGAL_ACTION",
            ConsoleError::Query(_) => "INVALID_QUERY",
            ConsoleError::NotFound { .. } => "NOT_FOUND",
            ConsoleError::Busy { .. } => "BUSY",
            ConsoleError::ScreenClosed => "SCREEN_CLOSED",
            ConsoleError::Config(_) => "CONFIG_ERROR",
            ConsoleError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ConsoleError::Validation(violations) => {
                Some(serde_json::json!({ "violations": violations }))
            }
            ConsoleError::NotFound { resource, id } => Some(serde_json::json!({
                "resource": resource,
                "id": id.to_string()
            })),
            _ => None,
        }
    }
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

impl From<serde_yaml::Error> for ConsoleError {
    fn from(err: serde_yaml::Error) -> Self {
        ConsoleError::Config(err.to_string())
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(err: std::io::Error) -> Self {
        ConsoleError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        ConsoleError::Internal(err.to_string())
    }
}

/// A specialized Result type for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;
