//! HTTP error mapping.
//!
//! Every failure leaves the server as `{"error": <message>, "code": <CODE>}`
//! with a matching status. Internal details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mdrrmo_core::error::CoreError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed input that is not a domain validation failure (multipart
    /// framing, self-messaging).
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    /// Ollama or Cloudinary returned an error.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// An optional integration has no configuration.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

const INTERNAL_MESSAGE: &str = "An internal error occurred";

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(err) => core_parts(err),
            AppError::Database(err) => sqlx_parts(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
            AppError::Upstream(msg) => {
                tracing::warn!(error = %msg, "Upstream service error");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "An external service failed".to_string(),
                )
            }
            AppError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                msg.clone(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = self.parts();
        (status, Json(ErrorBody { error, code })).into_response()
    }
}

fn core_parts(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal domain error");
            internal()
        }
    }
}

/// Readable message for a violated `uq_*` constraint.
fn conflict_message(constraint: &str) -> String {
    if constraint.ends_with("_email") {
        "An account with this email already exists".to_string()
    } else {
        format!("Duplicate value violates {constraint}")
    }
}

/// Map a sqlx error to status, code and client-safe message.
///
/// Unique violations on `uq_*` constraints become 409, foreign-key
/// violations 400, and a database that cannot be reached 503.
fn sqlx_parts(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            let code = db_err.code();
            match (code.as_deref(), db_err.constraint()) {
                (Some("23505"), Some(constraint)) if constraint.starts_with("uq_") => {
                    (StatusCode::CONFLICT, "CONFLICT", conflict_message(constraint))
                }
                (Some("23503"), _) => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_REFERENCE",
                    "Referenced record does not exist".to_string(),
                ),
                _ => {
                    tracing::error!(error = %db_err, "Database error");
                    internal()
                }
            }
        }
        _ if mdrrmo_db::retry::is_transient(err) => {
            tracing::error!(error = %err, "Database unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "DATABASE_UNAVAILABLE",
                "The database is temporarily unavailable".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
