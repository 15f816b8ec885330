//! API error types and handling

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use subtrack_billing::BillingError;
use subtrack_shared::MonthTokenError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),

    // Resource errors
    #[error("Resource not found")]
    NotFound,
    #[error("Resource already exists")]
    Conflict(String),

    // Internal errors
    #[error("Database error: {0}")]
    Database(String),
    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            // Validation
            ApiError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            ApiError::BadRequest(msg) => ("BAD_REQUEST", msg.clone()),

            // Resources
            ApiError::NotFound => ("NOT_FOUND", self.to_string()),
            ApiError::Conflict(msg) => ("CONFLICT", msg.clone()),

            // Internal
            ApiError::Database(_) => ("DATABASE_ERROR", "Database error".to_string()),
            ApiError::ServiceUnavailable => ("SERVICE_UNAVAILABLE", self.to_string()),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (self.status(), body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            sqlx::Error::PoolTimedOut => ApiError::ServiceUnavailable,
            sqlx::Error::Database(db_err) => {
                if let Some(code) = db_err.code() {
                    // PostgreSQL unique violation
                    if code == "23505" {
                        return ApiError::Conflict("Resource already exists".to_string());
                    }
                    // PostgreSQL check violation (e.g. negative price)
                    if code == "23514" {
                        return ApiError::Validation(db_err.message().to_string());
                    }
                }
                ApiError::Database(db_err.to_string())
            }
            _ => ApiError::Database(err.to_string()),
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<MonthTokenError> for ApiError {
    fn from(err: MonthTokenError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
