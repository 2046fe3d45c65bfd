//! Query gating, empty defaults and defensive parsing of partner payloads.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use fit_amigo_client::backend::MemoryBackend;
use fit_amigo_client::external::{BackendFitnessVideos, BackendSportsProducts};
use fit_amigo_client::search::{DEFAULT_DEBOUNCE, debounce};
use fit_amigo_client::{ClientError, QueryState};
use fit_amigo_core::{CartItem, CatalogSource, ProductId, StoreFilter};
use fit_amigo_integration_tests::TestContext;
use url::Url;

// =============================================================================
// Readiness and identity gating
// =============================================================================

#[tokio::test]
async fn test_nothing_is_fetched_before_connect() {
    let ctx = TestContext::new();

    assert!(ctx.client.videos().await.is_empty());
    assert_eq!(
        ctx.client.product(ProductId::new(1)).await.unwrap(),
        QueryState::Disabled
    );
    let err = ctx
        .client
        .add_to_cart(CartItem::new(ProductId::new(1), 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotReady));
    assert_eq!(ctx.calls.total(), 0);
}

#[tokio::test]
async fn test_anonymous_caller_gets_empty_user_collections() {
    let ctx = TestContext::new();
    ctx.connect_anonymous().await.unwrap();

    assert!(ctx.client.cart().await.is_empty());
    assert!(ctx.client.user_orders().await.is_empty());
    assert!(ctx.client.workouts().await.is_empty());
    assert!(ctx.client.running_sessions().await.is_empty());
    assert!(ctx.client.food_entries().await.is_empty());
    assert!(!ctx.client.is_caller_admin().await);
    assert_eq!(ctx.calls.total(), 1, "only the connect reaches the backend");

    assert_eq!(ctx.client.videos().await.len(), 2);
}

#[tokio::test]
async fn test_failed_collection_query_is_empty_and_not_cached() {
    let ctx = TestContext::signed_in("alice").await.unwrap();
    ctx.calls.fail("get_all_videos");
    assert!(ctx.client.videos().await.is_empty());

    ctx.calls.heal("get_all_videos");
    assert_eq!(ctx.client.videos().await.len(), 2);
    assert_eq!(ctx.calls.count("get_all_videos"), 2);
}

#[tokio::test]
async fn test_failed_detail_query_is_an_error() {
    let ctx = TestContext::signed_in("alice").await.unwrap();
    ctx.calls.fail("get_product");
    assert!(matches!(
        ctx.client.product(ProductId::new(1)).await,
        Err(ClientError::Remote(_))
    ));
    assert!(matches!(
        ctx.client.product(ProductId::new(404)).await,
        Err(ClientError::Remote(_))
    ));

    ctx.calls.heal("get_product");
    assert!(matches!(
        ctx.client.product(ProductId::new(404)).await,
        Err(ClientError::NotFound(_))
    ));
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_short_terms_never_reach_the_backend() {
    let ctx = TestContext::signed_in("alice").await.unwrap();
    assert!(ctx.client.search_products("k").await.is_empty());
    assert!(ctx.client.search_content(" y ").await.is_empty());
    assert!(ctx.client.external_search("").await.is_empty());

    assert_eq!(ctx.calls.count("search_products"), 0);
    assert_eq!(ctx.calls.count("search_content"), 0);
    assert_eq!(ctx.calls.count("get_external_fitness_search_results"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_debounced_typing_searches_once() {
    let ctx = TestContext::signed_in("alice").await.unwrap();
    let (input, mut settled) = debounce(DEFAULT_DEBOUNCE);

    let typing = tokio::spawn(async move {
        for term in ["k", "ke", "ket", "kett", "kettle"] {
            input.set(term);
            tokio::time::sleep(Duration::from_millis(80)).await;
        }
    });

    let mut results = Vec::new();
    while let Some(term) = settled.next().await {
        results = ctx.client.search_products(&term).await;
    }
    typing.await.unwrap();

    assert_eq!(ctx.calls.count("search_products"), 1);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "Kettlebell 16kg");
}

#[tokio::test]
async fn test_repeated_search_is_served_from_cache() {
    let ctx = TestContext::signed_in("alice").await.unwrap();
    let first = ctx.client.search_content("protein").await;
    let second = ctx.client.search_content("  protein ").await;
    assert_eq!(first, second);
    assert_eq!(ctx.calls.count("search_content"), 1);
}

// =============================================================================
// Partner payloads
// =============================================================================

#[tokio::test]
async fn test_malformed_partner_payloads_yield_empty_lists() {
    let backend = MemoryBackend::seeded();
    backend.set_external_products("<html>502 Bad Gateway</html>");
    backend.set_external_sports_products("{\"items\": 3}");
    backend.set_external_videos("not json");
    backend.set_external_search("[1, 2");

    let ctx = TestContext::configured(backend, |builder| {
        builder
            .go_store_url(Url::parse("https://go-store.example.com/").ok())
            .sports_source(Arc::new(BackendSportsProducts))
            .video_source(Arc::new(BackendFitnessVideos))
    });
    ctx.sign_in("alice").await.unwrap();

    assert!(ctx.client.external_products().await.is_empty());
    assert!(ctx.client.external_sports_products(None, None).await.is_empty());
    assert!(ctx.client.external_fitness_videos().await.is_empty());
    assert!(ctx.client.external_search("yoga").await.is_empty());
    assert!(ctx.notices.all().is_empty());
}

#[tokio::test]
async fn test_store_listing_merges_all_sources() {
    let backend = MemoryBackend::seeded();
    backend.set_external_products(
        r#"[{"id": 9001, "name": "Foam Roller", "price": "24.50", "image": "/img/roller.png"}]"#,
    );

    let ctx = TestContext::configured(backend, |builder| {
        builder.go_store_url(Url::parse("https://go-store.example.com/").ok())
    });
    ctx.sign_in("alice").await.unwrap();

    let listing = ctx.client.store_listing(StoreFilter::default()).await;
    assert_eq!(listing[0].source(), CatalogSource::Internal);
    assert!(
        listing
            .iter()
            .any(|entry| entry.source() == CatalogSource::External
                && entry.name() == "Foam Roller")
    );
    assert!(
        listing
            .iter()
            .any(|entry| entry.source() == CatalogSource::Sports)
    );
}
