//! In-memory shopping cart.

use rust_decimal::Decimal;
use shared::models::{OrderLineRequest, Product, ProductId};

/// One product in the cart. `quantity` never exceeds the stock captured in `product`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Ordered cart lines, at most one per product id.
///
/// Quantities are checked against the stock of the snapshot passed to the
/// last [`Cart::add`]; the server is not consulted until checkout.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of `product`, merging with an existing line.
    ///
    /// The line keeps the newest snapshot and is clamped to its stock, so an
    /// out-of-stock product ends up as a zero-quantity line.
    pub fn add(&mut self, product: Product, quantity: u32) {
        let stock = product.stock;
        if let Some(line) = self.lines.iter_mut().find(|line| line.product.id == product.id) {
            line.quantity = line.quantity.saturating_add(quantity).min(stock);
            line.product = product;
        } else {
            self.lines.push(CartLine {
                product,
                quantity: quantity.min(stock),
            });
        }
    }

    /// Drop the line for `product_id`; no-op when absent.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.product.id != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities (the header badge).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of price × quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Checkout payload lines. Zero-quantity lines are left out.
    #[must_use]
    pub fn order_items(&self) -> Vec<OrderLineRequest> {
        self.lines
            .iter()
            .filter(|line| line.quantity > 0)
            .map(|line| OrderLineRequest {
                product_id: line.product.id,
                quantity: line.quantity,
            })
            .collect()
    }
}

/// Quantity-picker rule: clamp into `1..=max`, where a `max` of 0 still yields 1.
#[must_use]
pub fn clamp_quantity(requested: u32, max: u32) -> u32 {
    requested.min(max).max(1)
}
