use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Amount;

/// Payment state of an order, always held lowercase.
///
/// The gateway reports status as free text ("success", "Success", "failure",
/// "pending", bank-specific variants), so this stays an open string rather
/// than a closed enum. Normalization happens once, at the gateway boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentStatus(String);

impl PaymentStatus {
    pub const PENDING: &'static str = "pending";
    pub const SUCCESS: &'static str = "success";

    pub fn pending() -> Self {
        PaymentStatus(Self::PENDING.to_string())
    }

    /// Normalize a gateway-reported status: lowercased, `pending` when empty.
    pub fn from_gateway(raw: &str) -> Self {
        if raw.is_empty() {
            Self::pending()
        } else {
            PaymentStatus(raw.to_lowercase())
        }
    }

    pub fn is_success(&self) -> bool {
        self.0 == Self::SUCCESS
    }

    pub fn is_pending(&self) -> bool {
        self.0 == Self::PENDING
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contact details captured at checkout and stored with the order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// One priced line of an order. The unit price is the catalog price at the
/// time the order was placed, not the current one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub unit_price: Amount,
    pub quantity: i32,
}

/// An order as exposed by the API: the persisted row plus its items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub status: String,
    pub total_amount: Amount,
    pub currency: String,
    /// Opaque pass-through from order creation.
    pub shipping_address: serde_json::Value,
    pub customer_details: CustomerDetails,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_error: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_status_is_lowercased() {
        assert_eq!(PaymentStatus::from_gateway("Success").as_str(), "success");
        assert_eq!(PaymentStatus::from_gateway("SUCCESS").as_str(), "success");
        assert_eq!(PaymentStatus::from_gateway("failure").as_str(), "failure");
        assert!(PaymentStatus::from_gateway("sUcCeSs").is_success());
    }

    #[test]
    fn empty_gateway_status_becomes_pending() {
        assert!(PaymentStatus::from_gateway("").is_pending());
        assert_eq!(PaymentStatus::from_gateway("").as_str(), "pending");
    }

    #[test]
    fn unknown_statuses_pass_through() {
        let status = PaymentStatus::from_gateway("Dropped");
        assert_eq!(status.as_str(), "dropped");
        assert!(!status.is_success());
        assert!(!status.is_pending());
    }

    #[test]
    fn payment_status_serializes_transparently() {
        let status = PaymentStatus::from_gateway("Success");
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"success\"");
    }

    #[test]
    fn customer_details_use_camel_case() {
        let json = r#"{"firstName":"Asha","lastName":"Rao","email":"a@example.com","phone":"9999999999"}"#;
        let details: CustomerDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.first_name, "Asha");
        assert_eq!(serde_json::to_value(&details).unwrap()["firstName"], "Asha");
    }
}
