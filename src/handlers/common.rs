use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Parses an optional integer query value, treating anything unparsable as
/// absent so the service falls back to its default.
pub fn lenient_number(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<i64>().ok())
}

/// Pagination parameters for list operations
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// 1-based page number
    #[param(value_type = Option<i64>)]
    pub page: Option<String>,
    /// Page size
    #[param(value_type = Option<i64>)]
    pub limit: Option<String>,
}

impl PaginationParams {
    pub fn page(&self) -> Option<i64> {
        lenient_number(self.page.as_deref())
    }

    pub fn limit(&self) -> Option<i64> {
        lenient_number(self.limit.as_deref())
    }
}
