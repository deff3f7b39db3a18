use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use kirana_types::Product;
use serde_json::json;

use crate::api::{ListResponse, StorefrontState};

/// GET /v1/products endpoint - active catalog entries
pub async fn list_products(State(state): State<StorefrontState>) -> impl IntoResponse {
    let products: Vec<Product> = state
        .products
        .iter()
        .filter(|p| p.active)
        .cloned()
        .collect();

    Json(ListResponse::new(products, "/v1/products"))
}

/// GET /v1/products/{id} endpoint
pub async fn get_product(
    State(state): State<StorefrontState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.find_product(&id) {
        Some(product) => (StatusCode::OK, Json(json!(product))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Product not found" })),
        ),
    }
}
