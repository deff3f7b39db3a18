use kirana_types::{Amount, AmountParseError};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::MerchantCredentials;

/// A payment attempt as submitted by the storefront client.
///
/// Every field defaults to empty so an omitted field and an empty one are
/// indistinguishable past this boundary. Only the order reference and the
/// amount are validated; the rest passes through to the gateway unchecked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub product_info: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub order_id: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Order ID is required")]
    MissingOrderId,
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountParseError),
}

/// The complete signed field set for one payment attempt.
///
/// Everything except `action` is submitted to the gateway as a form field;
/// `action` is the URL the form posts to. The salt never appears here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedPaymentFields {
    pub key: String,
    pub txnid: String,
    pub amount: String,
    pub productinfo: String,
    pub firstname: String,
    pub email: String,
    pub phone: String,
    pub surl: String,
    pub furl: String,
    pub udf1: String,
    pub hash: String,
    pub action: String,
}

/// Assemble and sign the gateway field set for one payment attempt.
///
/// A fresh `txnid` is generated per attempt, so retrying payment for the
/// same order produces a new gateway transaction. The order id rides in
/// `udf1`, which the gateway echoes back verbatim in the callback. `surl`
/// and `furl` both point at the callback endpoint; the gateway picks one
/// based on the payment outcome.
pub fn build_payment_request(
    credentials: &MerchantCredentials,
    gateway_base_url: &Url,
    callback_url: &Url,
    request: &PaymentRequest,
) -> Result<SignedPaymentFields, ValidationError> {
    if request.order_id.is_empty() {
        return Err(ValidationError::MissingOrderId);
    }

    let amount = request.amount.parse::<Amount>()?.to_string();
    let txnid = Uuid::new_v4().to_string();

    let hash = credentials.sign_request(
        &txnid,
        &amount,
        &request.product_info,
        &request.first_name,
        &request.email,
        &request.order_id,
    );

    Ok(SignedPaymentFields {
        key: credentials.key().to_string(),
        txnid,
        amount,
        productinfo: request.product_info.clone(),
        firstname: request.first_name.clone(),
        email: request.email.clone(),
        phone: request.phone.clone(),
        surl: callback_url.to_string(),
        furl: callback_url.to_string(),
        udf1: request.order_id.clone(),
        hash,
        action: gateway_base_url.to_string(),
    })
}
