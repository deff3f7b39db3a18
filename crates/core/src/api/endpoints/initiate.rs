use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use kirana_driver_payu::{PaymentRequest, build_payment_request};
use serde_json::json;
use tracing::{debug, error};

use crate::api::StorefrontState;

/// POST /v1/payments/initiate endpoint - sign a payment request
///
/// Returns the complete field set the client submits to the gateway as a
/// browser form, including the `action` URL and the request `hash`.
pub async fn initiate_payment(
    State(state): State<StorefrontState>,
    Json(request): Json<PaymentRequest>,
) -> impl IntoResponse {
    debug!("Payment initiation requested for order '{}'", request.order_id);

    let callback_url = state.config.callback_url();
    match build_payment_request(
        &state.credentials,
        &state.config.gateway_base_url,
        &callback_url,
        &request,
    ) {
        Ok(fields) => {
            debug!(
                "Signed payment request {} for order {}",
                fields.txnid, request.order_id
            );
            (StatusCode::OK, Json(json!(fields)))
        }
        Err(e) => {
            error!("Rejected payment initiation: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "message": e.to_string() })),
            )
        }
    }
}
