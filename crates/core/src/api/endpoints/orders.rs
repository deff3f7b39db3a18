use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use kirana_types::{Amount, CustomerDetails, Product};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use crate::api::{ListResponse, StorefrontState};
use crate::db::{NewOrder, NewOrderItem};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<CreateOrderItem>,
    #[serde(default)]
    pub shipping_address: serde_json::Value,
    pub customer_details: CustomerDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItem {
    pub product_id: String,
    pub quantity: i32,
}

/// Caller identity, taken from the `x-user-id` header.
fn user_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

fn unauthorized() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Missing x-user-id header" })),
    )
}

/// POST /v1/orders endpoint - price the items against the catalog and persist
pub async fn create_order(
    State(state): State<StorefrontState>,
    headers: HeaderMap,
    Json(request): Json<CreateOrderRequest>,
) -> impl IntoResponse {
    let Some(user_id) = user_id_from_headers(&headers) else {
        return unauthorized().into_response();
    };

    if request.items.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Order has no items" })),
        )
            .into_response();
    }

    // Unit prices always come from the catalog, never from the client
    let mut total = Amount::ZERO;
    let mut currency: Option<&str> = None;
    let mut resolved: Vec<(&Product, i32)> = Vec::with_capacity(request.items.len());
    for item in &request.items {
        let Some(product) = state.find_product(&item.product_id) else {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Unknown product: {}", item.product_id) })),
            )
                .into_response();
        };
        if item.quantity <= 0 {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Invalid quantity for product: {}", item.product_id) })),
            )
                .into_response();
        }
        match currency {
            Some(c) if c != product.currency => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Order mixes currencies" })),
                )
                    .into_response();
            }
            None => currency = Some(&product.currency),
            _ => {}
        }
        let Some(next_total) = product
            .price()
            .checked_mul(item.quantity as i64)
            .and_then(|line| total.checked_add(line))
        else {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Order total out of range" })),
            )
                .into_response();
        };
        total = next_total;
        resolved.push((product, item.quantity));
    }

    debug!(
        "Creating order for user {} with {} items, total {}",
        user_id,
        resolved.len(),
        total
    );

    let new_order = match NewOrder::new(
        &user_id,
        total,
        currency.unwrap_or("INR"),
        request.shipping_address.to_string(),
        &request.customer_details,
    ) {
        Ok(new_order) => new_order,
        Err(e) => {
            error!("Failed to encode order fields: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to create order" })),
            )
                .into_response();
        }
    };

    let items: Vec<NewOrderItem> = resolved
        .iter()
        .map(|(product, quantity)| {
            NewOrderItem::new(&new_order.id, &product.id, &product.name, product.price(), *quantity)
        })
        .collect();

    match state.db.create_order(new_order, items) {
        Ok(order) => (StatusCode::CREATED, Json(json!(order))).into_response(),
        Err(e) => {
            error!("Failed to create order: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to create order" })),
            )
                .into_response()
        }
    }
}

/// GET /v1/orders/{id} endpoint
pub async fn get_order(
    State(state): State<StorefrontState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let Some(user_id) = user_id_from_headers(&headers) else {
        return unauthorized().into_response();
    };

    match state.db.get_order(&id) {
        Ok(Some(order)) if order.user_id == user_id => {
            (StatusCode::OK, Json(json!(order))).into_response()
        }
        Ok(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Order not found" })),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to fetch order {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch order" })),
            )
                .into_response()
        }
    }
}

/// GET /v1/orders endpoint - orders for the calling user, newest first
pub async fn list_orders(
    State(state): State<StorefrontState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let Some(user_id) = user_id_from_headers(&headers) else {
        return unauthorized().into_response();
    };

    match state.db.list_orders_for_user(&user_id) {
        Ok(orders) => Json(ListResponse::new(orders, "/v1/orders")).into_response(),
        Err(e) => {
            error!("Failed to list orders for user {}: {}", user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to list orders" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, header};
    use kirana_driver_payu::MerchantCredentials;
    use kirana_types::StorefrontConfig;
    use secrecy::SecretString;
    use serde_json::Value;
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::api::create_router;
    use crate::db::DbManager;

    fn catalog() -> Vec<Product> {
        vec![
            Product {
                id: "prod_masala_chai".to_string(),
                name: "Masala Chai (250g)".to_string(),
                description: None,
                image_url: None,
                unit_amount: 25000,
                currency: "INR".to_string(),
                active: true,
            },
            Product {
                id: "prod_filter_coffee".to_string(),
                name: "Filter Coffee (500g)".to_string(),
                description: None,
                image_url: None,
                unit_amount: 49900,
                currency: "INR".to_string(),
                active: true,
            },
            Product {
                id: "prod_single_origin".to_string(),
                name: "Single Origin Beans (1kg)".to_string(),
                description: None,
                image_url: None,
                unit_amount: 1800,
                currency: "USD".to_string(),
                active: true,
            },
            Product {
                id: "prod_estate_lease".to_string(),
                name: "Tea Estate Lease".to_string(),
                description: None,
                image_url: None,
                unit_amount: i64::MAX,
                currency: "INR".to_string(),
                active: true,
            },
        ]
    }

    fn test_state() -> StorefrontState {
        let db = DbManager::open(":memory:").unwrap();
        let credentials =
            MerchantCredentials::new("gtKFFx", SecretString::new("test-salt".to_string()));
        let config = StorefrontConfig {
            gateway_base_url: Url::parse("https://test.payu.in/_payment").unwrap(),
            frontend_url: Url::parse("http://localhost:5173").unwrap(),
            backend_url: Url::parse("http://localhost:5001").unwrap(),
            allow_unsigned_callbacks: false,
        };
        StorefrontState::new(catalog(), db, credentials, config)
    }

    fn order_body(items: Value) -> Value {
        json!({
            "items": items,
            "shippingAddress": { "line1": "12 MG Road", "city": "Bengaluru" },
            "customerDetails": {
                "firstName": "Asha",
                "lastName": "Rao",
                "email": "a@example.com",
                "phone": "9999999999"
            }
        })
    }

    async fn post_order(app: Router, body: &Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/orders")
                    .header("x-user-id", "user-1")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn create_order_prices_items_from_the_catalog() {
        let state = test_state();
        let app = create_router(state.clone());

        let body = order_body(json!([
            { "productId": "prod_masala_chai", "quantity": 2 },
            { "productId": "prod_filter_coffee", "quantity": 1 }
        ]));
        let (status, order) = post_order(app, &body).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(order["totalAmount"], "999.00");
        assert_eq!(order["currency"], "INR");
        assert_eq!(order["paymentStatus"], "pending");
        assert_eq!(order["customerDetails"]["firstName"], "Asha");

        let items = order["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        let chai = items
            .iter()
            .find(|i| i["productId"] == "prod_masala_chai")
            .unwrap();
        assert_eq!(chai["unitPrice"], "250.00");
        assert_eq!(chai["quantity"], 2);

        // Priced from the catalog and persisted, not just echoed back
        let order_id = order["id"].as_str().unwrap();
        let stored = state.db.get_order(order_id).unwrap().unwrap();
        assert_eq!(stored.total_amount, Amount::from_paise(99900));
        assert_eq!(stored.items.len(), 2);
    }

    #[tokio::test]
    async fn create_order_rejects_unknown_products() {
        let app = create_router(test_state());

        let body = order_body(json!([{ "productId": "prod_missing", "quantity": 1 }]));
        let (status, error) = post_order(app, &body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "Unknown product: prod_missing");
    }

    #[tokio::test]
    async fn create_order_rejects_non_positive_quantities() {
        let app = create_router(test_state());

        let zero = order_body(json!([{ "productId": "prod_masala_chai", "quantity": 0 }]));
        let (status, error) = post_order(app.clone(), &zero).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "Invalid quantity for product: prod_masala_chai");

        let negative = order_body(json!([{ "productId": "prod_masala_chai", "quantity": -3 }]));
        let (status, _) = post_order(app, &negative).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_order_rejects_mixed_currencies() {
        let app = create_router(test_state());

        let body = order_body(json!([
            { "productId": "prod_masala_chai", "quantity": 1 },
            { "productId": "prod_single_origin", "quantity": 1 }
        ]));
        let (status, error) = post_order(app, &body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "Order mixes currencies");
    }

    #[tokio::test]
    async fn create_order_rejects_totals_out_of_range() {
        let app = create_router(test_state());

        let body = order_body(json!([{ "productId": "prod_estate_lease", "quantity": 2 }]));
        let (status, error) = post_order(app, &body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "Order total out of range");
    }

    #[tokio::test]
    async fn create_order_rejects_empty_item_lists() {
        let app = create_router(test_state());

        let (status, error) = post_order(app, &order_body(json!([]))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "Order has no items");
    }

    #[tokio::test]
    async fn create_order_requires_a_user_header() {
        let app = create_router(test_state());

        let body = order_body(json!([{ "productId": "prod_masala_chai", "quantity": 1 }]));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/orders")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
