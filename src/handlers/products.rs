use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    response::IntoResponse,
    Json,
};

use super::common::{created_response, success_response, PaginationParams};
use crate::{
    errors::ApiError,
    references::ProductRef,
    services::product_catalog::{CreateProductInput, ProductDetail},
    ApiResponse, AppState, PaginatedResponse,
};

/// Create a product with its variants, options and sub-variants
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductInput,
    responses(
        (status = 201, description = "Product created", body = ProductDetail,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Product code, product id or SKU already exists", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<CreateProductInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let product = state
        .services
        .product_catalog
        .create_product(payload)
        .await?;

    Ok(created_response(
        ApiResponse::success(product).with_message("product created successfully"),
    ))
}

/// List products, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(PaginationParams),
    responses(
        (status = 200, description = "Products returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = query?;
    let page = state
        .services
        .product_catalog
        .list_products(params.page(), params.limit())
        .await?;

    let response = PaginatedResponse::new(page.items, page.total, page.page, page.limit);
    Ok(success_response(ApiResponse::success(response)))
}

/// Get one product
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(
        ("id" = String, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product returned", body = ProductDetail),
        (status = 400, description = "Malformed id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = ProductRef::parse(&id)?;
    let detail = state
        .services
        .product_catalog
        .get_product(product.id())
        .await?;

    Ok(success_response(ApiResponse::success(detail)))
}
