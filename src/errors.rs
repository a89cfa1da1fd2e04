use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use sea_orm::SqlErr;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::quantity::Quantity;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Unprocessable Entity",
    "code": "insufficient_stock",
    "message": "Insufficient stock: available 2, requested 5",
    "request_id": "req-abc123xyz",
    "timestamp": "2025-11-15T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    #[schema(example = "Not Found")]
    pub error: String,
    /// Stable machine-readable error kind
    #[schema(example = "reference_not_found")]
    pub code: String,
    /// Human-readable error description
    #[schema(example = "Not found: sub-variant 550e8400-e29b-41d4-a716-446655440000")]
    pub message: String,
    /// Unique request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "req-abc123xyz")]
    pub request_id: Option<String>,
    /// RFC 3339 timestamp when the error occurred
    #[schema(example = "2025-11-15T10:30:00.000Z")]
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Insufficient stock: available {available}, requested {requested}")]
    InsufficientStock {
        available: Quantity,
        requested: Quantity,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        DbErr,
    ),

    #[error("Lock timeout: {0}")]
    LockTimeout(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Migration error: {0}")]
    MigrationError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Classifies a store error, lifting lock-wait timeouts and unique
    /// constraint violations out of the generic database bucket.
    pub fn from_db(err: DbErr) -> Self {
        if is_lock_timeout(&err) {
            return ServiceError::LockTimeout(err.to_string());
        }
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return ServiceError::Conflict(detail);
        }
        ServiceError::DatabaseError(err)
    }

    /// Stable machine-readable kind, independent of the message text.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidReference(_) => "invalid_reference",
            Self::InvalidQuantity(_) => "invalid_quantity",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::NotFound(_) => "reference_not_found",
            Self::DatabaseError(_) | Self::LockTimeout(_) => "store_failure",
            Self::ValidationError(_) => "validation_error",
            Self::InvalidInput(_) => "invalid_input",
            Self::Conflict(_) => "conflict",
            Self::InternalError(_) | Self::MigrationError(_) => "internal_error",
        }
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidReference(_)
            | Self::InvalidQuantity(_)
            | Self::ValidationError(_)
            | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientStock { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::LockTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::DatabaseError(_) | Self::InternalError(_) | Self::MigrationError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Store errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::LockTimeout(_) => "Stock is busy, retry the movement".to_string(),
            Self::InternalError(_) | Self::MigrationError(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }

    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::LockTimeout(_))
    }
}

fn is_lock_timeout(err: &DbErr) -> bool {
    let text = err.to_string().to_ascii_lowercase();
    text.contains("lock timeout") || text.contains("55p03") || text.contains("database is locked")
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            code: self.kind().to_string(),
            message: self.response_message(),
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

/// API Error type for HTTP responses
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Bad request: {message}")]
    BadRequest { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::ServiceError(service_error) => return service_error.into_response(),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg),
            ApiError::BadRequest { message } => (StatusCode::BAD_REQUEST, "bad_request", message),
        };

        let error_response = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            code: code.to_string(),
            message,
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(error_response)).into_response()
    }
}
