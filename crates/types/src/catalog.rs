use serde::{Deserialize, Serialize};

use crate::Amount;

/// A catalog product, loaded from one YAML file per product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Unit price in paise.
    pub unit_amount: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Inactive products stay on disk but are not served or sellable.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_active() -> bool {
    true
}

impl Product {
    pub fn price(&self) -> Amount {
        Amount::from_paise(self.unit_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_yaml() {
        let yaml = r#"
id: prod_masala_chai
name: Masala Chai (250g)
description: Loose-leaf assam blend with cardamom and ginger
unit_amount: 24900
currency: INR
"#;
        let product: Product = serde_yml::from_str(yaml).unwrap();
        assert_eq!(product.id, "prod_masala_chai");
        assert_eq!(product.unit_amount, 24900);
        assert_eq!(product.price(), Amount::from_paise(24900));
        assert!(product.active);
        assert!(product.image_url.is_none());
    }

    #[test]
    fn currency_and_active_default() {
        let yaml = "id: prod_x\nname: X\nunit_amount: 100\n";
        let product: Product = serde_yml::from_str(yaml).unwrap();
        assert_eq!(product.currency, "INR");
        assert!(product.active);
    }

    #[test]
    fn inactive_products_parse() {
        let yaml = "id: prod_x\nname: X\nunit_amount: 100\nactive: false\n";
        let product: Product = serde_yml::from_str(yaml).unwrap();
        assert!(!product.active);
    }
}
