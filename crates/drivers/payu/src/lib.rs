//! PayU redirect-flow driver: payment request signing and callback
//! verification.
//!
//! The gateway trusts a keyed SHA-512 digest in both directions. The
//! merchant signs the outbound field set before the browser submits it, and
//! the gateway signs the callback it posts back. The two directions hash
//! different canonical strings; see [`hash`] for the layouts.

use secrecy::{ExposeSecret, SecretString};

pub mod callback;
pub mod hash;
pub mod request;

pub use callback::{CallbackOutcome, CallbackPayload, classify_callback};
pub use request::{PaymentRequest, SignedPaymentFields, ValidationError, build_payment_request};

/// Merchant identity shared with the gateway.
///
/// The key is public-facing and travels with every payment form. The salt is
/// secret: it is only ever mixed into canonical strings and must never
/// appear in logs, errors, or outbound fields.
#[derive(Clone)]
pub struct MerchantCredentials {
    key: String,
    salt: SecretString,
}

impl MerchantCredentials {
    pub fn new(key: impl Into<String>, salt: SecretString) -> Self {
        Self { key: key.into(), salt }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn salt(&self) -> &str {
        self.salt.expose_secret()
    }
}

impl std::fmt::Debug for MerchantCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerchantCredentials")
            .field("key", &self.key)
            .field("salt", &"[REDACTED]")
            .finish()
    }
}
