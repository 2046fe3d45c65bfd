//! Store catalog queries and admin product mutations.

use std::sync::Arc;

use fit_amigo_core::{
    CatalogEntry, ExternalProduct, ExternalSportsProduct, Product, ProductDetails, ProductId,
    StoreFilter, is_searchable,
};
use tracing::{debug, instrument};

use super::{FitAmigoClient, Gate, QueryState};
use crate::cache::QueryKey;
use crate::error::Result;
use crate::external::parse;
use crate::invalidation::Mutation;

impl FitAmigoClient {
    /// Products matching `term`; a blank term lists the whole catalog.
    ///
    /// A non-blank term shorter than two characters issues no call.
    #[instrument(skip(self))]
    pub async fn search_products(&self, term: &str) -> Vec<Product> {
        let term = term.trim().to_string();
        if !term.is_empty() && !is_searchable(&term) {
            return Vec::new();
        }
        let key = QueryKey::Products { term: term.clone() };
        self.fetch_or_default(Gate::Facade, key, move |backend| async move {
            backend.search_products(&term).await
        })
        .await
    }

    /// A single store product.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the product does not exist, or
    /// `ClientError::Remote` if the call fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<QueryState<Product>> {
        self.fetch_detail(Gate::Facade, QueryKey::Product(id), move |backend| async move {
            backend.get_product(id).await
        })
        .await
    }

    /// Products from the general partner store; empty unless the go-store is
    /// configured.
    #[instrument(skip(self))]
    pub async fn external_products(&self) -> Vec<ExternalProduct> {
        let Some(store_url) = self.inner.go_store_url.clone() else {
            debug!("Go-store not configured; external products disabled");
            return Vec::new();
        };
        self.fetch_or_default(Gate::Facade, QueryKey::ExternalProducts, move |backend| async move {
            let raw = backend.fetch_external_products().await?;
            Ok(parse::parse_products(&raw, store_url.as_str().trim_end_matches('/')))
        })
        .await
    }

    /// Sports partner products in `category` matching `term`.
    #[instrument(skip(self))]
    pub async fn external_sports_products(
        &self,
        category: Option<&str>,
        term: Option<&str>,
    ) -> Vec<ExternalSportsProduct> {
        let category = category.map(ToString::to_string);
        let term = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(ToString::to_string);
        let key = QueryKey::ExternalSportsProducts {
            category: category.clone(),
            term: term.clone(),
        };
        let source = Arc::clone(&self.inner.sports);
        self.fetch_or_default(Gate::Facade, key, move |backend| async move {
            source
                .sports_products(backend.as_ref(), category.as_deref(), term.as_deref())
                .await
        })
        .await
    }

    /// The merged store listing: store products, then partner products, then
    /// sports products, filtered by category and price ceiling.
    #[instrument(skip(self))]
    pub async fn store_listing(&self, filter: StoreFilter) -> Vec<CatalogEntry> {
        let (internal, external, sports) = tokio::join!(
            self.search_products(""),
            self.external_products(),
            self.external_sports_products(None, None)
        );
        filter.apply(internal, external, sports)
    }

    // =========================================================================
    // Admin mutations
    // =========================================================================

    /// Create a store product (admin only).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` for an invalid payload, or the
    /// backend's error.
    #[instrument(skip(self, details), fields(name = %details.name))]
    pub async fn add_product(&self, details: ProductDetails) -> Result<()> {
        self.check(Mutation::AddProduct, details.validate())?;
        self.mutate(Mutation::AddProduct, move |backend| async move {
            backend.add_product(&details).await
        })
        .await
    }

    /// Replace a product's details (admin only).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` for an invalid payload, or the
    /// backend's error.
    #[instrument(skip(self, details), fields(product_id = %id))]
    pub async fn edit_product(&self, id: ProductId, details: ProductDetails) -> Result<()> {
        let mutation = Mutation::EditProduct(id);
        self.check(mutation, details.validate())?;
        self.mutate(mutation, move |backend| async move {
            backend.edit_product(id, &details).await
        })
        .await
    }

    /// Delete a product (admin only).
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        self.mutate(Mutation::DeleteProduct(id), move |backend| async move {
            backend.delete_product(id).await
        })
        .await
    }

    /// Stock of a product as last seen in the cache, without a call.
    pub(super) async fn cached_stock(&self, id: ProductId) -> Option<u64> {
        let cache = self.inner.session.cache();
        if let Some(product) = cache.get::<Product>(&QueryKey::Product(id)).await {
            return Some(product.quantity);
        }
        cache
            .get::<Vec<Product>>(&QueryKey::Products {
                term: String::new(),
            })
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .map(|p| p.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fit_amigo_core::{CatalogSource, Price, StoreCategory};

    use super::super::tests::connected_as;
    use super::*;
    use crate::backend::{BackendError, MemoryBackend};
    use crate::error::ClientError;

    #[tokio::test]
    async fn test_search_products_requires_two_chars() {
        let backend = MemoryBackend::seeded();
        let client = connected_as(&backend, "alice").await;

        assert!(client.search_products("k").await.is_empty());
        assert_eq!(client.search_products("kettle").await.len(), 1);
        assert_eq!(client.search_products("  ").await.len(), 5);
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let backend = MemoryBackend::seeded();
        let client = connected_as(&backend, "alice").await;
        let err = client.product(ProductId::new(999)).await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_external_products_need_go_store() {
        let backend = MemoryBackend::seeded();
        backend.set_external_products(r#"[{"id": "g1", "name": "Bench", "price": 120}]"#);
        let client = connected_as(&backend, "alice").await;
        assert!(client.external_products().await.is_empty());
    }

    #[tokio::test]
    async fn test_store_listing_merges_sources() {
        let backend = MemoryBackend::seeded();
        let client = connected_as(&backend, "alice").await;

        let all = client.store_listing(StoreFilter::default()).await;
        assert_eq!(all.len(), 5 + 16);
        assert_eq!(all.first().map(CatalogEntry::source), Some(CatalogSource::Internal));

        let cheap_supplements = client
            .store_listing(StoreFilter {
                category: Some(StoreCategory::Supplements),
                max_price: Some(Price::from_units(40)),
            })
            .await;
        assert!(!cheap_supplements.is_empty());
        assert!(cheap_supplements.iter().all(|e| e.price() <= Price::from_units(40)));
    }

    #[tokio::test]
    async fn test_non_admin_cannot_add_product() {
        let backend = MemoryBackend::seeded();
        let client = connected_as(&backend, "alice").await;
        let details = ProductDetails {
            name: "Foam Roller".to_string(),
            description: "High density".to_string(),
            price: 25,
            quantity: 10,
            image: None,
        };
        let err = client.add_product(details).await.unwrap_err();
        assert!(matches!(err, ClientError::Remote(BackendError::Unauthorized(_))));
    }
}
