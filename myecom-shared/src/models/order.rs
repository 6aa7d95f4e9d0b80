use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::product::{Product, ProductId};
use super::user::User;

/// Lifecycle state of an order.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

/// A single line of a placed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub id: u64,
    /// Absent when the product was deleted after the order was placed.
    #[serde(default)]
    pub product: Option<Product>,
    pub quantity: u32,
    /// Unit price captured when the order was placed.
    pub price: Decimal,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
}

impl OrderItem {
    /// Line subtotal, computed locally when the server omits it.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.subtotal
            .unwrap_or_else(|| self.price * Decimal::from(self.quantity))
    }
}

/// Order as returned by `orders/` and `my-orders/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: u64,
    #[serde(default)]
    pub user: Option<User>,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    #[serde(default)]
    pub is_seen: bool,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total: Decimal,
}

/// Payment methods accepted by `create-order/`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
}

/// One `{product_id, quantity}` entry of an order request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Request body for `create-order/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineRequest>,
    pub address: String,
    pub payment_method: PaymentMethod,
}

/// Request body for `orders/{id}/update_status/`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}
