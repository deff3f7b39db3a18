pub mod order;
pub mod order_item;

pub use order::{NewOrder, OrderModel, PaymentUpdate};
pub use order_item::{NewOrderItem, OrderItemModel};
