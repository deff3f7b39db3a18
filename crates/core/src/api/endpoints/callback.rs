use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    response::Redirect,
};
use kirana_driver_payu::{CallbackOutcome, CallbackPayload, classify_callback};
use kirana_types::PaymentStatus;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::api::StorefrontState;
use crate::db::DbError;
use crate::reconcile::{ReconcileOutcome, reconcile_payment};

const DEFAULT_FAILURE_MESSAGE: &str = "Payment failed";

/// POST /v1/payments/callback endpoint - gateway-posted payment outcome
///
/// The request is made by the end user's browser mid-redirect, so every
/// failure maps to the frontend failure page rather than an HTTP error.
pub async fn payment_callback(
    State(state): State<StorefrontState>,
    payload: Result<Form<CallbackPayload>, FormRejection>,
) -> Redirect {
    let target = match payload {
        Ok(Form(payload)) => process_callback(&state, &payload),
        Err(rejection) => {
            warn!("Gateway callback body could not be parsed: {}", rejection);
            failure_url(&state, "internal_error", "Internal server error", None)
        }
    };
    Redirect::to(target.as_str())
}

fn process_callback(state: &StorefrontState, payload: &CallbackPayload) -> Url {
    debug!("Gateway callback received for txnid '{}'", payload.txnid);

    let order_id = match classify_callback(&state.credentials, payload) {
        CallbackOutcome::Verified { order_id } => order_id,
        CallbackOutcome::Unsigned { order_id } => {
            if !state.config.allow_unsigned_callbacks {
                warn!("Rejected unsigned callback for txnid '{}'", payload.txnid);
                return failure_url(state, "unsigned_callback", "Unsigned payment callback rejected", None);
            }
            warn!(
                "Accepting unsigned callback for txnid '{}' (allow_unsigned_callbacks is set)",
                payload.txnid
            );
            order_id
        }
        CallbackOutcome::InvalidSignature => {
            warn!("Invalid payment signature on callback for txnid '{}'", payload.txnid);
            return failure_url(state, "invalid_signature", "Invalid payment signature", None);
        }
        CallbackOutcome::MissingOrderReference => {
            warn!("Callback for txnid '{}' carries no order reference", payload.txnid);
            return failure_url(state, "missing_order_reference", "Order ID not found", None);
        }
    };

    // Repeat deliveries redirect by the stored state, not the incoming one
    let order = match reconcile_payment(&state.db, &order_id, payload) {
        Ok(ReconcileOutcome::Applied(order)) => order,
        Ok(ReconcileOutcome::AlreadySettled(order)) => {
            info!(
                "Repeat callback for order {}, keeping stored payment state '{}'",
                order.id, order.payment_status
            );
            order
        }
        Ok(ReconcileOutcome::OrderNotFound) => {
            warn!("Callback references unknown order '{}'", order_id);
            return failure_url(
                state,
                "order_not_found",
                "Order not found for payment reference",
                Some((&order_id, &payload.txnid)),
            );
        }
        Err(e) => {
            error!("Failed to record callback for order {}: {}", order_id, e);
            let (code, message) = match e {
                DbError::UpdatePaymentError(_) => ("persistence_error", "Failed to update order status"),
                _ => ("internal_error", "Internal server error"),
            };
            return failure_url(state, code, message, None);
        }
    };

    if order.payment_status == PaymentStatus::SUCCESS {
        info!("Payment successful for order {}", order.id);
        success_url(state, &order.id, &payload.txnid)
    } else {
        info!(
            "Payment not successful for order {} (state '{}')",
            order.id, order.payment_status
        );
        let message = payload
            .failure_message()
            .or(order.payment_error.as_deref())
            .unwrap_or(DEFAULT_FAILURE_MESSAGE);
        failure_url(state, "payment_failed", message, Some((&order.id, &payload.txnid)))
    }
}

fn success_url(state: &StorefrontState, order_id: &str, txnid: &str) -> Url {
    let mut url = state.config.success_redirect_base();
    url.query_pairs_mut()
        .append_pair("orderId", order_id)
        .append_pair("txnid", txnid);
    url
}

fn failure_url(
    state: &StorefrontState,
    code: &str,
    message: &str,
    order_ref: Option<(&str, &str)>,
) -> Url {
    let mut url = state.config.failure_redirect_base();
    {
        let mut pairs = url.query_pairs_mut();
        if let Some((order_id, txnid)) = order_ref {
            pairs.append_pair("orderId", order_id).append_pair("txnid", txnid);
        }
        pairs
            .append_pair("error_Message", message)
            .append_pair("code", code);
    }
    url
}
