//! Cart and order flow.

use std::collections::HashMap;

use fit_amigo_core::{
    CartItem, CartSummary, Order, OrderId, Price, ProductId, validate_shipping_address,
};
use tracing::{debug, instrument, warn};

use super::{FitAmigoClient, Gate, QueryState};
use crate::cache::QueryKey;
use crate::error::Result;
use crate::invalidation::Mutation;

impl FitAmigoClient {
    /// The caller's cart; empty when anonymous or unavailable.
    #[instrument(skip(self))]
    pub async fn cart(&self) -> Vec<CartItem> {
        self.fetch_or_default(Gate::Identity, QueryKey::Cart, |backend| async move {
            backend.get_cart().await
        })
        .await
    }

    /// A single order.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` or `ClientError::Remote` when the
    /// lookup fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order(&self, id: OrderId) -> Result<QueryState<Order>> {
        self.fetch_detail(Gate::Facade, QueryKey::Order(id), move |backend| async move {
            backend.get_order(id).await
        })
        .await
    }

    /// The caller's orders; empty when anonymous or unavailable.
    #[instrument(skip(self))]
    pub async fn user_orders(&self) -> Vec<Order> {
        self.fetch_or_default(Gate::Identity, QueryKey::UserOrders, |backend| async move {
            backend.get_user_orders().await
        })
        .await
    }

    /// Subtotal, tax and total for the current cart.
    ///
    /// Prices come from the product queries, so repeated summaries reuse the
    /// cached products.
    #[instrument(skip(self))]
    pub async fn cart_summary(&self) -> CartSummary {
        let items = self.cart().await;
        let mut prices: HashMap<ProductId, Price> = HashMap::new();
        for item in items.iter().filter(|item| !item.is_removal()) {
            if prices.contains_key(&item.product_id) {
                continue;
            }
            match self.product(item.product_id).await {
                Ok(QueryState::Ready(product)) => {
                    prices.insert(product.id, product.unit_price());
                }
                Ok(QueryState::Disabled) => {}
                Err(e) => {
                    warn!(product_id = %item.product_id, error = %e, "Cart line has no price");
                }
            }
        }
        CartSummary::compute(&items, |id| prices.get(&id).copied(), self.inner.tax_rate)
    }

    /// Set a cart line's quantity; zero removes the line.
    ///
    /// Stock is enforced by the backend. A cached product whose stock looks
    /// too low is only logged, since the cached copy may be stale.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    #[instrument(skip(self), fields(product_id = %item.product_id, quantity = item.quantity))]
    pub async fn add_to_cart(&self, item: CartItem) -> Result<()> {
        if !item.is_removal()
            && let Some(stock) = self.cached_stock(item.product_id).await
            && item.quantity > stock
        {
            debug!(cached_stock = stock, "Quantity exceeds cached stock, deferring to backend");
        }
        self.mutate(Mutation::AddToCart, move |backend| async move {
            backend.add_to_cart(item).await
        })
        .await
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    pub async fn remove_from_cart(&self, product_id: ProductId) -> Result<()> {
        self.add_to_cart(CartItem::removal(product_id)).await
    }

    /// Place an order for the cart's contents.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` for a short address, or the
    /// backend's error (empty cart, insufficient stock).
    #[instrument(skip(self, shipping_address))]
    pub async fn place_order(&self, shipping_address: &str) -> Result<OrderId> {
        self.check(Mutation::PlaceOrder, validate_shipping_address(shipping_address))?;
        let address = shipping_address.trim().to_string();
        self.mutate(Mutation::PlaceOrder, move |backend| async move {
            backend.place_order(&address).await
        })
        .await
    }
}
