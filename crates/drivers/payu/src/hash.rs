//! Canonical string construction and SHA-512 signing.
//!
//! Request direction, seventeen pipe-joined fields with udf2 through udf10
//! reserved and always empty:
//!
//! ```text
//! key|txnid|amount|productinfo|firstname|email|udf1|udf2|...|udf10|salt
//! ```
//!
//! Response direction, eighteen fields: the reverse order, with `status`
//! inserted after the salt and the salt and key swapped to opposite ends:
//!
//! ```text
//! salt|status|udf10|udf9|...|udf1|email|firstname|productinfo|amount|txnid|key
//! ```
//!
//! Field positions are fixed by the gateway. Values are hashed verbatim,
//! byte for byte as they travel on the wire, so there is no escaping: a
//! field containing `|` would shift every later position and the signature
//! would simply fail to verify.

use sha2::{Digest, Sha512};

use crate::MerchantCredentials;
use crate::callback::CallbackPayload;

/// SHA-512 over the UTF-8 bytes of `input`, as lowercase hex (128 chars).
pub fn sha512_hex(input: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub(crate) fn request_canonical(
    key: &str,
    txnid: &str,
    amount: &str,
    productinfo: &str,
    firstname: &str,
    email: &str,
    udf1: &str,
    salt: &str,
) -> String {
    format!("{key}|{txnid}|{amount}|{productinfo}|{firstname}|{email}|{udf1}||||||||||{salt}")
}

pub(crate) fn response_canonical(salt: &str, payload: &CallbackPayload, key: &str) -> String {
    fn udf(value: &Option<String>) -> &str {
        value.as_deref().unwrap_or("")
    }

    [
        salt,
        payload.status.as_str(),
        udf(&payload.udf10),
        udf(&payload.udf9),
        udf(&payload.udf8),
        udf(&payload.udf7),
        udf(&payload.udf6),
        udf(&payload.udf5),
        udf(&payload.udf4),
        udf(&payload.udf3),
        udf(&payload.udf2),
        udf(&payload.udf1),
        payload.email.as_str(),
        payload.firstname.as_str(),
        payload.productinfo.as_str(),
        payload.amount.as_str(),
        payload.txnid.as_str(),
        key,
    ]
    .join("|")
}

impl MerchantCredentials {
    /// Signature for an outbound payment request.
    pub fn sign_request(
        &self,
        txnid: &str,
        amount: &str,
        productinfo: &str,
        firstname: &str,
        email: &str,
        udf1: &str,
    ) -> String {
        sha512_hex(&request_canonical(
            self.key(),
            txnid,
            amount,
            productinfo,
            firstname,
            email,
            udf1,
            self.salt(),
        ))
    }

    /// The hash the gateway should have attached to `payload`.
    pub fn expected_callback_hash(&self, payload: &CallbackPayload) -> String {
        sha512_hex(&response_canonical(self.salt(), payload, self.key()))
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn credentials() -> MerchantCredentials {
        MerchantCredentials::new("merchant-key", SecretString::new("merchant-salt".to_string()))
    }

    #[test]
    fn request_canonical_layout_is_fixed() {
        let canonical = request_canonical("k", "t", "1.00", "p", "f", "e", "o", "s");
        assert_eq!(canonical, "k|t|1.00|p|f|e|o||||||||||s");
        assert_eq!(canonical.matches('|').count(), 16);
    }

    #[test]
    fn response_canonical_reverses_and_inserts_status() {
        let payload = CallbackPayload {
            txnid: "t".to_string(),
            status: "success".to_string(),
            amount: "1.00".to_string(),
            productinfo: "p".to_string(),
            firstname: "f".to_string(),
            email: "e".to_string(),
            udf1: Some("o".to_string()),
            ..Default::default()
        };
        let canonical = response_canonical("s", &payload, "k");
        assert_eq!(canonical, "s|success||||||||||o|e|f|p|1.00|t|k");
        assert_eq!(canonical.matches('|').count(), 17);
    }

    #[test]
    fn absent_and_empty_udf_fields_hash_identically() {
        let absent = CallbackPayload {
            txnid: "t".to_string(),
            status: "success".to_string(),
            ..Default::default()
        };
        let empty = CallbackPayload {
            txnid: "t".to_string(),
            status: "success".to_string(),
            udf1: Some(String::new()),
            udf5: Some(String::new()),
            udf10: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            response_canonical("s", &absent, "k"),
            response_canonical("s", &empty, "k")
        );
    }

    #[test]
    fn sha512_hex_matches_known_vector() {
        assert_eq!(
            sha512_hex(""),
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce\
             47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
        );
    }

    #[test]
    fn sha512_hex_is_deterministic_lowercase() {
        let digest = sha512_hex("k|t|1.00|p|f|e|o||||||||||s");
        assert_eq!(digest, sha512_hex("k|t|1.00|p|f|e|o||||||||||s"));
        assert_eq!(digest.len(), 128);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn request_and_response_signatures_differ_for_same_fields() {
        let credentials = credentials();
        let request_hash = credentials.sign_request("t", "1.00", "p", "f", "e", "o");
        let payload = CallbackPayload {
            txnid: "t".to_string(),
            status: "success".to_string(),
            amount: "1.00".to_string(),
            productinfo: "p".to_string(),
            firstname: "f".to_string(),
            email: "e".to_string(),
            udf1: Some("o".to_string()),
            ..Default::default()
        };
        assert_ne!(request_hash, credentials.expected_callback_hash(&payload));
    }

    #[test]
    fn any_field_change_changes_the_signature() {
        let credentials = credentials();
        let base = credentials.sign_request("t", "500.00", "p", "f", "e", "o");
        assert_ne!(base, credentials.sign_request("t2", "500.00", "p", "f", "e", "o"));
        assert_ne!(base, credentials.sign_request("t", "500.01", "p", "f", "e", "o"));
        assert_ne!(base, credentials.sign_request("t", "500.00", "p", "f", "e", "o2"));
    }

    #[test]
    fn different_salts_produce_different_signatures() {
        let a = MerchantCredentials::new("k", SecretString::new("salt-a".to_string()));
        let b = MerchantCredentials::new("k", SecretString::new("salt-b".to_string()));
        assert_ne!(
            a.sign_request("t", "1.00", "p", "f", "e", "o"),
            b.sign_request("t", "1.00", "p", "f", "e", "o")
        );
    }
}
