//! Response sequencing and session teardown.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use fit_amigo_client::{QueryCache, QueryKey};
use fit_amigo_core::{CartItem, ProductId, Workout};
use fit_amigo_integration_tests::TestContext;

const KETTLEBELL: ProductId = ProductId::new(1);

async fn wait_for_call(ctx: &TestContext, method: &str, count: usize) {
    while ctx.calls.count(method) < count {
        tokio::task::yield_now().await;
    }
}

fn squat() -> Workout {
    Workout {
        exercise_name: "Back Squat".to_string(),
        sets: 5,
        reps: 5,
        weight: 100,
    }
}

// =============================================================================
// Stale responses
// =============================================================================

#[tokio::test]
async fn test_older_ticket_never_overwrites_newer_value() {
    let cache = QueryCache::new(100, Duration::from_secs(60));
    let older = cache.begin(QueryKey::Workouts).await;
    let newer = cache.begin(QueryKey::Workouts).await;
    assert!(newer.seq() > older.seq());

    assert!(cache.commit(newer, vec![squat()]).await);
    assert!(!cache.commit(older, Vec::<Workout>::new()).await);

    assert_eq!(
        cache.get::<Vec<Workout>>(&QueryKey::Workouts).await,
        Some(vec![squat()])
    );
}

#[tokio::test]
async fn test_response_started_before_invalidation_is_not_cached() {
    let ctx = TestContext::signed_in("alice").await.unwrap();
    ctx.calls.hold("get_cart");

    let client = ctx.client.clone();
    let in_flight = tokio::spawn(async move { client.cart().await });
    wait_for_call(&ctx, "get_cart", 1).await;

    ctx.client
        .add_to_cart(CartItem::new(KETTLEBELL, 1))
        .await
        .unwrap();
    ctx.calls.unhold("get_cart");

    // The parked read still answers its caller with whatever it saw.
    let _ = in_flight.await.unwrap();

    assert_eq!(ctx.client.cart().await, vec![CartItem::new(KETTLEBELL, 1)]);
    assert_eq!(ctx.calls.count("get_cart"), 2);
}

#[tokio::test]
async fn test_overlapping_reads_keep_the_newest() {
    let ctx = TestContext::signed_in("alice").await.unwrap();
    ctx.calls.hold("get_workouts");

    let first = {
        let client = ctx.client.clone();
        tokio::spawn(async move { client.workouts().await })
    };
    wait_for_call(&ctx, "get_workouts", 1).await;

    ctx.client.log_workout(squat()).await.unwrap();

    let second = {
        let client = ctx.client.clone();
        tokio::spawn(async move { client.workouts().await })
    };
    wait_for_call(&ctx, "get_workouts", 2).await;

    ctx.calls.release("get_workouts");
    ctx.calls.release("get_workouts");
    let newest = second.await.unwrap();
    let _ = first.await.unwrap();
    ctx.calls.unhold("get_workouts");

    assert_eq!(newest, vec![squat()]);
    assert_eq!(ctx.client.workouts().await, vec![squat()]);
    assert_eq!(ctx.calls.count("get_workouts"), 2);
}

// =============================================================================
// Session teardown
// =============================================================================

#[tokio::test]
async fn test_logout_clears_cache_and_facade() {
    let ctx = TestContext::signed_in("alice").await.unwrap();
    ctx.client
        .add_to_cart(CartItem::new(KETTLEBELL, 1))
        .await
        .unwrap();
    assert_eq!(ctx.client.cart().await.len(), 1);

    ctx.client.session().logout().await;

    assert!(!ctx.client.session().facade().is_ready());
    assert!(!ctx.client.session().cache().contains(&QueryKey::Cart));
    assert!(ctx.client.cart().await.is_empty());
    assert!(ctx.client.videos().await.is_empty());
    assert_eq!(ctx.calls.count("get_cart"), 1);

    ctx.sign_in("alice").await.unwrap();
    assert_eq!(ctx.calls.count("connect"), 2);
    assert_eq!(ctx.client.cart().await.len(), 1);
    assert_eq!(ctx.calls.count("get_cart"), 2);
}

#[tokio::test]
async fn test_switching_identity_drops_previous_callers_data() {
    let ctx = TestContext::signed_in("alice").await.unwrap();
    ctx.client
        .add_to_cart(CartItem::new(KETTLEBELL, 1))
        .await
        .unwrap();
    assert_eq!(ctx.client.cart().await.len(), 1);

    ctx.sign_in("bob").await.unwrap();

    assert!(ctx.client.cart().await.is_empty());
    assert_eq!(ctx.calls.count("get_cart"), 2);
}

#[tokio::test]
async fn test_reconnecting_same_identity_keeps_handle() {
    let ctx = TestContext::signed_in("alice").await.unwrap();
    ctx.client.videos().await;
    ctx.sign_in("alice").await.unwrap();
    ctx.client.videos().await;

    assert_eq!(ctx.calls.count("connect"), 1);
    assert_eq!(ctx.calls.count("get_all_videos"), 1);
}
