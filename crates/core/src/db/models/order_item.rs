use diesel::prelude::*;
use kirana_types::{Amount, OrderItem};
use serde::{Deserialize, Serialize};

use crate::db::{PooledConnection, models::OrderModel, schema::*};

pub fn list_items_for_order(
    conn: &mut PooledConnection,
    order_id: &str,
) -> QueryResult<Vec<OrderItemModel>> {
    order_items::table
        .filter(order_items::order_id.eq(order_id))
        .order(order_items::id.asc())
        .load(conn)
}

#[derive(Debug, Queryable, Identifiable, Selectable, Associations, Serialize, Deserialize)]
#[diesel(belongs_to(OrderModel, foreign_key = order_id))]
#[diesel(table_name = order_items)]
pub struct OrderItemModel {
    pub id: i32,
    pub order_id: String,
    pub product_id: String,
    /// Product name at purchase time
    pub product_name: String,
    /// Unit price in paise at purchase time
    pub unit_price: i64,
    pub quantity: i32,
}

impl From<OrderItemModel> for OrderItem {
    fn from(model: OrderItemModel) -> Self {
        OrderItem {
            product_id: model.product_id,
            product_name: model.product_name,
            unit_price: Amount::from_paise(model.unit_price),
            quantity: model.quantity,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItem {
    pub order_id: String,
    pub product_id: String,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: i32,
}

impl NewOrderItem {
    pub fn new(
        order_id: &str,
        product_id: &str,
        product_name: &str,
        unit_price: Amount,
        quantity: i32,
    ) -> Self {
        Self {
            order_id: order_id.to_string(),
            product_id: product_id.to_string(),
            product_name: product_name.to_string(),
            unit_price: unit_price.paise(),
            quantity,
        }
    }

    pub fn insert_all(items: &[NewOrderItem], conn: &mut PooledConnection) -> QueryResult<usize> {
        diesel::insert_into(order_items::table)
            .values(items)
            .execute(conn)
    }
}
