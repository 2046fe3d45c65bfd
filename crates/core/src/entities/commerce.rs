//! Cart and order entities, plus the client-side cart totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ValidationError;
use crate::types::{OrderId, OrderStatus, Price, Principal, ProductId};

/// A line in the caller's cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    /// Zero removes the line.
    pub quantity: u64,
}

impl CartItem {
    /// Set a product's cart quantity.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: u64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }

    /// An update that removes the product from the cart.
    #[must_use]
    pub const fn removal(product_id: ProductId) -> Self {
        Self::new(product_id, 0)
    }

    /// Whether this update removes the line.
    #[must_use]
    pub const fn is_removal(&self) -> bool {
        self.quantity == 0
    }
}

/// A placed order. Immutable apart from server-side status changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: Principal,
    pub items: Vec<CartItem>,
    /// Total in whole dollars as charged by the backend.
    pub total: u64,
    pub shipping_address: String,
    pub status: OrderStatus,
}

impl Order {
    /// Total as a [`Price`].
    #[must_use]
    pub fn total_price(&self) -> Price {
        Price::from_units(self.total)
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items
            .iter()
            .fold(0, |count: u64, item| count.saturating_add(item.quantity))
    }
}

/// Validate a shipping address before checkout.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the address is blank or too short to be
/// deliverable.
pub fn validate_shipping_address(address: &str) -> Result<(), ValidationError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("shippingAddress", "cannot be empty"));
    }
    if trimmed.len() < 10 {
        return Err(ValidationError::new(
            "shippingAddress",
            "must be at least 10 characters",
        ));
    }
    Ok(())
}

/// Order summary shown on the cart and checkout pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub subtotal: Price,
    pub tax: Price,
    pub total: Price,
    /// Units across all priced lines.
    pub item_count: u64,
    /// Lines whose product could not be resolved and were left out.
    pub unpriced_lines: usize,
}

impl CartSummary {
    /// Compute totals from cart lines.
    ///
    /// `price_of` resolves a product's unit price; lines it cannot resolve are
    /// excluded from the totals and counted in `unpriced_lines`.
    #[must_use]
    pub fn compute(
        items: &[CartItem],
        price_of: impl Fn(ProductId) -> Option<Price>,
        tax_rate: Decimal,
    ) -> Self {
        let mut subtotal = Price::ZERO;
        let mut item_count: u64 = 0;
        let mut unpriced_lines = 0;

        for item in items.iter().filter(|item| !item.is_removal()) {
            if let Some(unit) = price_of(item.product_id) {
                subtotal = subtotal + unit.times(item.quantity);
                item_count = item_count.saturating_add(item.quantity);
            } else {
                unpriced_lines += 1;
            }
        }

        let tax = (subtotal * tax_rate).rounded();
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
            item_count,
            unpriced_lines,
        }
    }
}
