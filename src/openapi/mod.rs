use axum::{response::IntoResponse, routing::get, Json, Router};
use utoipa::OpenApi;

/// Path the document is served under
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inventory API",
        version = "1.0.0",
        description = r#"
# Inventory API

Tracks products, their variant/option taxonomy and per-SKU stock. Every stock
movement is recorded as an immutable transaction that can be reported over a
date range.

## Quantities

Quantities are exact decimals sent as strings (a bare JSON number is also
accepted), strictly positive, with at most 8 fractional digits.

## Error Handling

Every error carries a stable `code`:

```json
{
  "error": "Unprocessable Entity",
  "code": "insufficient_stock",
  "message": "Insufficient stock: available 2, requested 5",
  "timestamp": "2025-11-15T10:30:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "stock", description = "Stock movements and reports"),
        (name = "products", description = "Product catalog")
    ),
    paths(
        crate::handlers::stock::add_stock,
        crate::handlers::stock::remove_stock,
        crate::handlers::stock::stock_report,
        crate::handlers::products::create_product,
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
    ),
    components(
        schemas(
            crate::handlers::stock::StockMovementRequest,
            crate::services::stock_report::StockReport,
            crate::services::product_catalog::CreateProductInput,
            crate::services::product_catalog::VariantInput,
            crate::services::product_catalog::SubVariantInput,
            crate::services::product_catalog::OptionValueInput,
            crate::services::product_catalog::ProductDetail,
            crate::services::product_catalog::VariantDetail,
            crate::entities::product::Model,
            crate::entities::variant::Model,
            crate::entities::variant_option::Model,
            crate::entities::sub_variant::Model,
            crate::entities::stock_transaction::Model,
            crate::entities::TransactionType,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDocV1::openapi())
}

/// Serves the OpenAPI document as JSON
pub fn openapi_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(OPENAPI_JSON_PATH, get(openapi_json))
}
