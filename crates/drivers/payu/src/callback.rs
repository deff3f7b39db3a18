use serde::Deserialize;

use crate::MerchantCredentials;

/// Inbound gateway callback, decoded from the form-encoded POST body.
///
/// The gateway's field vocabulary is much wider than this; unknown fields
/// are ignored. Every field consumed here defaults to empty when absent, so
/// canonical-string construction never distinguishes a missing field from an
/// empty one. That matters: the gateway signs with empty strings in the
/// unused slots.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackPayload {
    #[serde(default)]
    pub txnid: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub productinfo: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub email: String,
    /// Gateway-side payment id.
    #[serde(default)]
    pub mihpayid: Option<String>,
    /// Payment instrument (CC, NB, UPI, ...).
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, rename = "error_Message")]
    pub error_message: Option<String>,
    /// Bank-supplied message, populated on some failure modes.
    #[serde(default)]
    pub field9: Option<String>,
    #[serde(default)]
    pub udf1: Option<String>,
    #[serde(default)]
    pub udf2: Option<String>,
    #[serde(default)]
    pub udf3: Option<String>,
    #[serde(default)]
    pub udf4: Option<String>,
    #[serde(default)]
    pub udf5: Option<String>,
    #[serde(default)]
    pub udf6: Option<String>,
    #[serde(default)]
    pub udf7: Option<String>,
    #[serde(default)]
    pub udf8: Option<String>,
    #[serde(default)]
    pub udf9: Option<String>,
    #[serde(default)]
    pub udf10: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
}

impl CallbackPayload {
    /// The order reference carried through the gateway in `udf1`.
    pub fn order_reference(&self) -> Option<&str> {
        self.udf1.as_deref().filter(|v| !v.is_empty())
    }

    /// Failure text surfaced to the user: the gateway's message, else the
    /// bank's, else nothing.
    pub fn failure_message(&self) -> Option<&str> {
        self.error_message
            .as_deref()
            .filter(|v| !v.is_empty())
            .or_else(|| self.field9.as_deref().filter(|v| !v.is_empty()))
    }

    /// An empty hash field counts as no signature at all.
    fn provided_hash(&self) -> Option<&str> {
        self.hash.as_deref().filter(|v| !v.is_empty())
    }
}

/// Trust classification of an inbound callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Signature present and matching; the payload can be trusted.
    Verified { order_id: String },
    /// No hash field at all. Downstream policy decides whether to proceed.
    Unsigned { order_id: String },
    /// Signature present but wrong. Nothing in the payload can be trusted.
    InvalidSignature,
    /// Signed correctly (or unsigned), but carrying no order reference.
    MissingOrderReference,
}

/// Classify `payload` against the merchant credentials.
///
/// The signature is checked before the order reference is even looked at: a
/// payload that fails verification reveals nothing, not even whether it
/// named an order. Echoed fields are hashed verbatim, so a payload the
/// gateway signed verifies regardless of casing or formatting quirks.
pub fn classify_callback(
    credentials: &MerchantCredentials,
    payload: &CallbackPayload,
) -> CallbackOutcome {
    match payload.provided_hash() {
        Some(provided) => {
            let expected = credentials.expected_callback_hash(payload);
            if expected != provided {
                return CallbackOutcome::InvalidSignature;
            }
            match payload.order_reference() {
                Some(order_id) => CallbackOutcome::Verified { order_id: order_id.to_string() },
                None => CallbackOutcome::MissingOrderReference,
            }
        }
        None => match payload.order_reference() {
            Some(order_id) => CallbackOutcome::Unsigned { order_id: order_id.to_string() },
            None => CallbackOutcome::MissingOrderReference,
        },
    }
}
