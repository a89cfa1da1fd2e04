use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::common::{lenient_number, success_response};
use crate::{
    entities::stock_transaction,
    errors::ApiError,
    services::stock_report::StockReport,
    ApiResponse, AppState,
};

/// Quantity as it arrives on the wire: a decimal string or a bare JSON number.
///
/// serde_json is built with `arbitrary_precision`, so a number keeps the
/// digits exactly as the client wrote them.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub enum QuantityInput {
    Text(String),
    Number(serde_json::Number),
}

impl TryFrom<serde_json::Value> for QuantityInput {
    type Error = String;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::String(text) => Ok(QuantityInput::Text(text)),
            serde_json::Value::Number(number) => Ok(QuantityInput::Number(number)),
            other => Err(format!(
                "quantity must be a decimal string or number, got {}",
                other
            )),
        }
    }
}

impl QuantityInput {
    /// Decimal text handed to the quantity parser.
    pub fn as_text(&self) -> String {
        match self {
            QuantityInput::Text(text) => text.clone(),
            QuantityInput::Number(number) => number.to_string(),
        }
    }
}

/// Body of `POST /stock/add` and `POST /stock/remove`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StockMovementRequest {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub product_id: String,
    #[schema(example = "6ba7b810-9dad-11d1-80b4-00c04fd430c8")]
    pub sub_variant_id: String,
    /// Positive decimal with at most 8 fractional digits
    #[schema(value_type = String, example = "2.5")]
    pub quantity: QuantityInput,
}

/// Query of `GET /stock/report`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StockReportQuery {
    /// First day, `YYYY-MM-DD`, included
    pub from: Option<String>,
    /// Last day, `YYYY-MM-DD`, included
    pub to: Option<String>,
    #[param(value_type = Option<i64>)]
    pub page: Option<String>,
    #[param(value_type = Option<i64>)]
    pub limit: Option<String>,
}

/// Add stock to a sub-variant
#[utoipa::path(
    post,
    path = "/api/v1/stock/add",
    request_body = StockMovementRequest,
    responses(
        (status = 200, description = "Stock added", body = stock_transaction::Model,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid reference or quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product or sub-variant not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse),
        (status = 503, description = "Stock row busy", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn add_stock(
    State(state): State<AppState>,
    payload: Result<Json<StockMovementRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let record = state
        .services
        .stock_ledger
        .add_stock(
            &payload.product_id,
            &payload.sub_variant_id,
            &payload.quantity.as_text(),
        )
        .await?;

    Ok(success_response(
        ApiResponse::success(record).with_message("stock added successfully"),
    ))
}

/// Remove stock from a sub-variant
#[utoipa::path(
    post,
    path = "/api/v1/stock/remove",
    request_body = StockMovementRequest,
    responses(
        (status = 200, description = "Stock removed", body = stock_transaction::Model,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid reference or quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product or sub-variant not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse),
        (status = 503, description = "Stock row busy", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn remove_stock(
    State(state): State<AppState>,
    payload: Result<Json<StockMovementRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let record = state
        .services
        .stock_ledger
        .remove_stock(
            &payload.product_id,
            &payload.sub_variant_id,
            &payload.quantity.as_text(),
        )
        .await?;

    Ok(success_response(
        ApiResponse::success(record).with_message("stock removed successfully"),
    ))
}

/// Stock movements and their totals over a date range
#[utoipa::path(
    get,
    path = "/api/v1/stock/report",
    params(StockReportQuery),
    responses(
        (status = 200, description = "Report returned", body = StockReport),
        (status = 400, description = "Missing or malformed dates", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn stock_report(
    State(state): State<AppState>,
    query: Result<Query<StockReportQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let (from, to) = match (query.from.as_deref(), query.to.as_deref()) {
        (Some(from), Some(to)) => (from, to),
        _ => {
            return Err(ApiError::bad_request(
                "both 'from' and 'to' dates are required (YYYY-MM-DD)",
            ))
        }
    };

    let report = state
        .services
        .stock_report
        .report(
            from,
            to,
            lenient_number(query.page.as_deref()),
            lenient_number(query.limit.as_deref()),
        )
        .await?;

    Ok(success_response(ApiResponse::success(report)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_accepts_strings_and_numbers() {
        let body: StockMovementRequest = serde_json::from_str(
            r#"{"product_id":"a","sub_variant_id":"b","quantity":"0.25"}"#,
        )
        .unwrap();
        assert_eq!(body.quantity.as_text(), "0.25");

        let body: StockMovementRequest =
            serde_json::from_str(r#"{"product_id":"a","sub_variant_id":"b","quantity":7}"#)
                .unwrap();
        assert_eq!(body.quantity.as_text(), "7");

        let body: StockMovementRequest =
            serde_json::from_str(r#"{"product_id":"a","sub_variant_id":"b","quantity":2.5}"#)
                .unwrap();
        assert_eq!(body.quantity.as_text(), "2.5");
    }

    #[test]
    fn numbers_keep_the_digits_as_written() {
        for raw in ["0.0000001", "100000000000.00000001", "12.50000000", "1e-7"] {
            let body: StockMovementRequest = serde_json::from_str(&format!(
                r#"{{"product_id":"a","sub_variant_id":"b","quantity":{}}}"#,
                raw
            ))
            .unwrap();
            assert_eq!(body.quantity.as_text(), raw);
        }
    }

    #[test]
    fn quantity_rejects_other_json_types() {
        let parsed = serde_json::from_str::<StockMovementRequest>(
            r#"{"product_id":"a","sub_variant_id":"b","quantity":true}"#,
        );
        assert!(parsed.is_err());
    }
}
