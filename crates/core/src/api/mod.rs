pub mod endpoints;

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use kirana_driver_payu::MerchantCredentials;
use kirana_types::{Product, StorefrontConfig};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::db::DbManager;

/// Shared state for all storefront endpoints.
#[derive(Clone)]
pub struct StorefrontState {
    pub products: Arc<Vec<Product>>,
    pub db: Arc<DbManager>,
    pub credentials: Arc<MerchantCredentials>,
    pub config: Arc<StorefrontConfig>,
}

impl StorefrontState {
    pub fn new(
        products: Vec<Product>,
        db: DbManager,
        credentials: MerchantCredentials,
        config: StorefrontConfig,
    ) -> Self {
        Self {
            products: Arc::new(products),
            db: Arc::new(db),
            credentials: Arc::new(credentials),
            config: Arc::new(config),
        }
    }

    pub fn find_product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id && p.active)
    }
}

/// List envelope returned by collection endpoints.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub object: String,
    pub data: Vec<T>,
    pub url: String,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>, url: &str) -> Self {
        Self {
            object: "list".to_string(),
            data,
            url: url.to_string(),
        }
    }
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub fn create_router(state: StorefrontState) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/v1/products", get(endpoints::products::list_products))
        .route("/v1/products/{id}", get(endpoints::products::get_product))
        .route(
            "/v1/orders",
            post(endpoints::orders::create_order).get(endpoints::orders::list_orders),
        )
        .route("/v1/orders/{id}", get(endpoints::orders::get_order))
        .route("/v1/payments/initiate", post(endpoints::initiate::initiate_payment))
        .route("/v1/payments/callback", post(endpoints::callback::payment_callback))
        .with_state(state)
        .layer(cors_layer)
}

/// Start the storefront API server on the specified port
pub async fn start_storefront(
    state: StorefrontState,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("Starting kirana storefront server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
