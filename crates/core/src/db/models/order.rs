use diesel::prelude::*;
use kirana_types::{Amount, CustomerDetails, Order, OrderItem, PaymentStatus};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::db::{PooledConnection, schema::*};

pub const ORDER_STATUS_CREATED: &str = "created";

/// Generate an order ID with an `ord_` prefix
fn generate_order_id() -> String {
    format!(
        "ord_{}",
        Uuid::new_v4().to_string().replace("-", "")[..24].to_string()
    )
}

pub fn find_order(conn: &mut PooledConnection, order_id: &str) -> QueryResult<Option<OrderModel>> {
    orders::table
        .filter(orders::id.eq(order_id))
        .first::<OrderModel>(conn)
        .optional()
}

/// All orders placed by `user_id`, newest first.
pub fn list_orders_for_user(
    conn: &mut PooledConnection,
    user_id: &str,
) -> QueryResult<Vec<OrderModel>> {
    orders::table
        .filter(orders::user_id.eq(user_id))
        .order(orders::created_at.desc())
        .load(conn)
}

#[derive(Debug, Queryable, Identifiable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = orders)]
pub struct OrderModel {
    pub id: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub user_id: String,
    /// Order lifecycle status (currently always "created")
    pub status: String,
    /// Order total in paise
    pub total_amount: i64,
    pub currency: String,
    /// JSON-encoded shipping address, passed through from checkout
    pub shipping_address: String,
    /// JSON-encoded customer contact details
    pub customer_details: String,
    /// Payment state, lowercase ("pending" until a callback lands)
    pub payment_status: String,
    /// Gateway-side payment ID (mihpayid)
    pub payment_id: Option<String>,
    /// Payment instrument reported by the gateway
    pub payment_mode: Option<String>,
    /// Merchant transaction ID (txnid) of the settling attempt
    pub transaction_id: Option<String>,
    /// Gateway or bank error message for failed payments
    pub payment_error: Option<String>,
}

impl OrderModel {
    pub fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            status: self.status,
            total_amount: Amount::from_paise(self.total_amount),
            currency: self.currency,
            shipping_address: serde_json::from_str(&self.shipping_address)
                .unwrap_or(serde_json::Value::Null),
            customer_details: serde_json::from_str(&self.customer_details).unwrap_or_default(),
            payment_status: PaymentStatus::from_gateway(&self.payment_status),
            payment_id: self.payment_id,
            payment_mode: self.payment_mode,
            transaction_id: self.transaction_id,
            payment_error: self.payment_error,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrder {
    pub id: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub user_id: String,
    pub status: String,
    pub total_amount: i64,
    pub currency: String,
    pub shipping_address: String,
    pub customer_details: String,
    pub payment_status: String,
}

impl NewOrder {
    pub fn new(
        user_id: &str,
        total_amount: Amount,
        currency: &str,
        shipping_address: String,
        customer_details: &CustomerDetails,
    ) -> Result<Self, serde_json::Error> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        Ok(Self {
            id: generate_order_id(),
            created_at: timestamp,
            updated_at: timestamp,
            user_id: user_id.to_string(),
            status: ORDER_STATUS_CREATED.to_string(),
            total_amount: total_amount.paise(),
            currency: currency.to_string(),
            shipping_address,
            customer_details: serde_json::to_string(customer_details)?,
            payment_status: PaymentStatus::PENDING.to_string(),
        })
    }

    pub fn insert(&self, conn: &mut PooledConnection) -> QueryResult<usize> {
        debug!(
            "Inserting order {} for user {} with total {} {}",
            self.id, self.user_id, self.total_amount, self.currency
        );
        diesel::insert_into(orders::table).values(self).execute(conn)
    }
}

/// Payment columns written by callback reconciliation. `None` values clear
/// their columns, so one update always records the whole payment state.
#[derive(AsChangeset)]
#[diesel(table_name = orders)]
#[diesel(treat_none_as_null = true)]
pub struct PaymentUpdate {
    pub payment_status: String,
    pub payment_id: Option<String>,
    pub payment_mode: Option<String>,
    pub transaction_id: Option<String>,
    pub payment_error: Option<String>,
    pub updated_at: i64,
}

impl PaymentUpdate {
    pub fn new(
        status: &PaymentStatus,
        payment_id: Option<String>,
        payment_mode: Option<String>,
        transaction_id: Option<String>,
        payment_error: Option<String>,
    ) -> Self {
        let timestamp = chrono::Utc::now().timestamp_millis();
        Self {
            payment_status: status.as_str().to_string(),
            payment_id,
            payment_mode,
            transaction_id,
            payment_error,
            updated_at: timestamp,
        }
    }

    /// Apply to `order_id` only while it still awaits payment. Returns the
    /// updated row, or `None` when the guard matched nothing (order missing
    /// or already settled).
    pub fn apply_if_pending(
        &self,
        conn: &mut PooledConnection,
        order_id: &str,
    ) -> QueryResult<Option<OrderModel>> {
        debug!(
            "Applying payment update to order {}: status {}, payment_id {:?}",
            order_id, self.payment_status, self.payment_id
        );
        diesel::update(
            orders::table.filter(
                orders::id
                    .eq(order_id)
                    .and(orders::payment_status.eq(PaymentStatus::PENDING)),
            ),
        )
        .set(self)
        .get_result::<OrderModel>(conn)
        .optional()
    }
}
