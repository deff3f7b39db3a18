//! Maps trusted gateway callbacks onto persisted order state.

use kirana_driver_payu::CallbackPayload;
use kirana_types::PaymentStatus;
use tracing::{debug, info};

use crate::db::{DbManager, DbResult, OrderModel, PaymentUpdate};

/// Result of applying one callback to the orders store.
#[derive(Debug)]
pub enum ReconcileOutcome {
    /// The order transitioned out of `pending`; the updated row is returned.
    Applied(OrderModel),
    /// The order already holds a final payment state; nothing was written.
    AlreadySettled(OrderModel),
    /// No order exists for the reference carried in the callback.
    OrderNotFound,
}

/// Record the payment outcome carried by `payload` on `order_id`.
///
/// The write is guarded on `payment_status = 'pending'`, so whichever
/// callback lands first settles the order and every later delivery becomes
/// a read-only `AlreadySettled`. Gateway status strings are normalized
/// (lowercased, `pending` when empty) before they are stored.
pub fn reconcile_payment(
    db: &DbManager,
    order_id: &str,
    payload: &CallbackPayload,
) -> DbResult<ReconcileOutcome> {
    let status = PaymentStatus::from_gateway(&payload.status);
    let update = PaymentUpdate::new(
        &status,
        payload.mihpayid.clone().filter(|v| !v.is_empty()),
        payload.mode.clone().filter(|v| !v.is_empty()),
        Some(payload.txnid.clone()).filter(|v| !v.is_empty()),
        payload.failure_message().map(|m| m.to_string()),
    );

    if let Some(order) = db.apply_payment_update(order_id, update)? {
        info!(
            "Recorded payment state '{}' for order {}",
            order.payment_status, order.id
        );
        return Ok(ReconcileOutcome::Applied(order));
    }

    match db.find_order_model(order_id)? {
        Some(order) => {
            debug!(
                "Order {} already holds payment state '{}', callback ignored",
                order.id, order.payment_status
            );
            Ok(ReconcileOutcome::AlreadySettled(order))
        }
        None => Ok(ReconcileOutcome::OrderNotFound),
    }
}
