//! Integration tests for the FIT AMIGO client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fit-amigo-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `invalidation` - mutations refetch exactly the queries they affect
//! - `queries` - gating, empty defaults and malformed partner payloads
//! - `sequencing` - stale responses, logout and identity switches
//!
//! # Harness
//!
//! [`TestContext`] wires a [`FitAmigoClient`] to a seeded [`MemoryBackend`]
//! through a [`CountingBackend`], which records how often each remote
//! procedure is called and can fail or hold individual procedures.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use fit_amigo_client::backend::{Backend, BackendError, BackendResult, MemoryBackend};
use fit_amigo_client::{
    Connector, FitAmigoClient, FitAmigoClientBuilder, Identity, Notice, Notifier, QueryCache,
    Session,
};
use fit_amigo_core::{
    ArticleId, ArticleSummary, BlobRef, CartItem, Comment, CommentId, FoodEntry, FoodEntryId,
    FoodEntryInput, NewsArticle, NewsArticleInput, NewsCategory, Order, OrderId, Principal,
    Product, ProductDetails, ProductId, RunId, RunningSession, SearchResult, UserProfile,
    UserRole, Video, VideoId, Workout,
};
use tokio::sync::Semaphore;

// =============================================================================
// Call log
// =============================================================================

/// Shared record of remote calls plus injected faults.
#[derive(Default)]
pub struct CallLog {
    counts: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
    held: Mutex<HashMap<&'static str, Arc<Semaphore>>>,
}

impl CallLog {
    /// How many times `method` was called.
    #[must_use]
    pub fn count(&self, method: &str) -> usize {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    /// Total calls across all methods.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }

    /// Make every later call to `method` fail with `BackendError::Rejected`.
    pub fn fail(&self, method: &'static str) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(method);
    }

    /// Stop failing `method`.
    pub fn heal(&self, method: &'static str) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(method);
    }

    /// Park every later call to `method` until [`Self::release`] is called
    /// once per parked call.
    pub fn hold(&self, method: &'static str) {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(method, Arc::new(Semaphore::new(0)));
    }

    /// Let one parked call to `method` proceed.
    pub fn release(&self, method: &'static str) {
        if let Some(gate) = self
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method)
        {
            gate.add_permits(1);
        }
    }

    /// Stop parking calls to `method` and wake every parked call.
    pub fn unhold(&self, method: &'static str) {
        if let Some(gate) = self
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(method)
        {
            gate.close();
        }
    }

    async fn enter(&self, method: &'static str) -> BackendResult<()> {
        *self
            .counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(method)
            .or_default() += 1;

        let gate = self
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method)
            .cloned();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let failing = self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(method);
        if failing {
            return Err(BackendError::Rejected(format!("{method} failed")));
        }
        Ok(())
    }
}

// =============================================================================
// CountingBackend
// =============================================================================

/// Delegates to a [`MemoryBackend`] and records each call in a [`CallLog`].
pub struct CountingBackend {
    inner: MemoryBackend,
    log: Arc<CallLog>,
}

#[async_trait]
impl Backend for CountingBackend {
    async fn get_product(&self, id: ProductId) -> BackendResult<Product> {
        self.log.enter("get_product").await?;
        self.inner.get_product(id).await
    }

    async fn search_products(&self, term: &str) -> BackendResult<Vec<Product>> {
        self.log.enter("search_products").await?;
        self.inner.search_products(term).await
    }

    async fn add_product(&self, details: &ProductDetails) -> BackendResult<()> {
        self.log.enter("add_product").await?;
        self.inner.add_product(details).await
    }

    async fn edit_product(&self, id: ProductId, details: &ProductDetails) -> BackendResult<()> {
        self.log.enter("edit_product").await?;
        self.inner.edit_product(id, details).await
    }

    async fn delete_product(&self, id: ProductId) -> BackendResult<()> {
        self.log.enter("delete_product").await?;
        self.inner.delete_product(id).await
    }

    async fn fetch_external_products(&self) -> BackendResult<String> {
        self.log.enter("fetch_external_products").await?;
        self.inner.fetch_external_products().await
    }

    async fn fetch_external_sports_products(
        &self,
        category: Option<&str>,
        term: Option<&str>,
    ) -> BackendResult<String> {
        self.log.enter("fetch_external_sports_products").await?;
        self.inner.fetch_external_sports_products(category, term).await
    }

    async fn get_cart(&self) -> BackendResult<Vec<CartItem>> {
        self.log.enter("get_cart").await?;
        self.inner.get_cart().await
    }

    async fn add_to_cart(&self, item: CartItem) -> BackendResult<()> {
        self.log.enter("add_to_cart").await?;
        self.inner.add_to_cart(item).await
    }

    async fn place_order(&self, shipping_address: &str) -> BackendResult<OrderId> {
        self.log.enter("place_order").await?;
        self.inner.place_order(shipping_address).await
    }

    async fn get_order(&self, id: OrderId) -> BackendResult<Order> {
        self.log.enter("get_order").await?;
        self.inner.get_order(id).await
    }

    async fn get_user_orders(&self) -> BackendResult<Vec<Order>> {
        self.log.enter("get_user_orders").await?;
        self.inner.get_user_orders().await
    }

    async fn get_all_videos(&self) -> BackendResult<Vec<Video>> {
        self.log.enter("get_all_videos").await?;
        self.inner.get_all_videos().await
    }

    async fn get_video(&self, id: VideoId) -> BackendResult<Option<Video>> {
        self.log.enter("get_video").await?;
        self.inner.get_video(id).await
    }

    async fn upload_video(
        &self,
        title: &str,
        description: &str,
        file: &BlobRef,
    ) -> BackendResult<VideoId> {
        self.log.enter("upload_video").await?;
        self.inner.upload_video(title, description, file).await
    }

    async fn like_video(&self, id: VideoId) -> BackendResult<()> {
        self.log.enter("like_video").await?;
        self.inner.like_video(id).await
    }

    async fn unlike_video(&self, id: VideoId) -> BackendResult<()> {
        self.log.enter("unlike_video").await?;
        self.inner.unlike_video(id).await
    }

    async fn has_liked_video(&self, id: VideoId) -> BackendResult<bool> {
        self.log.enter("has_liked_video").await?;
        self.inner.has_liked_video(id).await
    }

    async fn add_comment(&self, video_id: VideoId, text: &str) -> BackendResult<CommentId> {
        self.log.enter("add_comment").await?;
        self.inner.add_comment(video_id, text).await
    }

    async fn delete_comment(&self, id: CommentId) -> BackendResult<()> {
        self.log.enter("delete_comment").await?;
        self.inner.delete_comment(id).await
    }

    async fn get_video_comments(&self, video_id: VideoId) -> BackendResult<Vec<Comment>> {
        self.log.enter("get_video_comments").await?;
        self.inner.get_video_comments(video_id).await
    }

    async fn fetch_sports_and_fitness_videos(&self) -> BackendResult<String> {
        self.log.enter("fetch_sports_and_fitness_videos").await?;
        self.inner.fetch_sports_and_fitness_videos().await
    }

    async fn get_workouts(&self) -> BackendResult<Vec<Workout>> {
        self.log.enter("get_workouts").await?;
        self.inner.get_workouts().await
    }

    async fn log_workout(&self, workout: &Workout) -> BackendResult<()> {
        self.log.enter("log_workout").await?;
        self.inner.log_workout(workout).await
    }

    async fn get_user_running_sessions(&self) -> BackendResult<Vec<RunningSession>> {
        self.log.enter("get_user_running_sessions").await?;
        self.inner.get_user_running_sessions().await
    }

    async fn log_running_session(
        &self,
        distance: f64,
        duration: u64,
        notes: Option<&str>,
    ) -> BackendResult<RunId> {
        self.log.enter("log_running_session").await?;
        self.inner.log_running_session(distance, duration, notes).await
    }

    async fn delete_running_session(&self, id: RunId) -> BackendResult<()> {
        self.log.enter("delete_running_session").await?;
        self.inner.delete_running_session(id).await
    }

    async fn get_user_food_entries(&self) -> BackendResult<Vec<FoodEntry>> {
        self.log.enter("get_user_food_entries").await?;
        self.inner.get_user_food_entries().await
    }

    async fn add_food_entry(&self, food: &FoodEntryInput) -> BackendResult<FoodEntryId> {
        self.log.enter("add_food_entry").await?;
        self.inner.add_food_entry(food).await
    }

    async fn edit_food_entry(
        &self,
        id: FoodEntryId,
        food: &FoodEntryInput,
    ) -> BackendResult<()> {
        self.log.enter("edit_food_entry").await?;
        self.inner.edit_food_entry(id, food).await
    }

    async fn delete_food_entry(&self, id: FoodEntryId) -> BackendResult<()> {
        self.log.enter("delete_food_entry").await?;
        self.inner.delete_food_entry(id).await
    }

    async fn get_food_entry(&self, id: FoodEntryId) -> BackendResult<Option<FoodEntry>> {
        self.log.enter("get_food_entry").await?;
        self.inner.get_food_entry(id).await
    }

    async fn get_all_news_articles(
        &self,
        category: Option<NewsCategory>,
    ) -> BackendResult<Vec<NewsArticle>> {
        self.log.enter("get_all_news_articles").await?;
        self.inner.get_all_news_articles(category).await
    }

    async fn get_news_article(&self, id: ArticleId) -> BackendResult<Option<NewsArticle>> {
        self.log.enter("get_news_article").await?;
        self.inner.get_news_article(id).await
    }

    async fn get_article_summaries(&self) -> BackendResult<Vec<ArticleSummary>> {
        self.log.enter("get_article_summaries").await?;
        self.inner.get_article_summaries().await
    }

    async fn get_all_articles_sorted_by_publication_date(
        &self,
    ) -> BackendResult<Vec<NewsArticle>> {
        self.log
            .enter("get_all_articles_sorted_by_publication_date")
            .await?;
        self.inner.get_all_articles_sorted_by_publication_date().await
    }

    async fn create_news_article(&self, input: &NewsArticleInput) -> BackendResult<ArticleId> {
        self.log.enter("create_news_article").await?;
        self.inner.create_news_article(input).await
    }

    async fn update_news_article(
        &self,
        id: ArticleId,
        input: &NewsArticleInput,
    ) -> BackendResult<()> {
        self.log.enter("update_news_article").await?;
        self.inner.update_news_article(id, input).await
    }

    async fn delete_news_article(&self, id: ArticleId) -> BackendResult<()> {
        self.log.enter("delete_news_article").await?;
        self.inner.delete_news_article(id).await
    }

    async fn get_caller_user_profile(&self) -> BackendResult<Option<UserProfile>> {
        self.log.enter("get_caller_user_profile").await?;
        self.inner.get_caller_user_profile().await
    }

    async fn save_caller_user_profile(&self, profile: &UserProfile) -> BackendResult<()> {
        self.log.enter("save_caller_user_profile").await?;
        self.inner.save_caller_user_profile(profile).await
    }

    async fn get_user_profile(&self, user: &Principal) -> BackendResult<Option<UserProfile>> {
        self.log.enter("get_user_profile").await?;
        self.inner.get_user_profile(user).await
    }

    async fn get_caller_user_role(&self) -> BackendResult<UserRole> {
        self.log.enter("get_caller_user_role").await?;
        self.inner.get_caller_user_role().await
    }

    async fn is_caller_admin(&self) -> BackendResult<bool> {
        self.log.enter("is_caller_admin").await?;
        self.inner.is_caller_admin().await
    }

    async fn assign_caller_user_role(
        &self,
        user: &Principal,
        role: UserRole,
    ) -> BackendResult<()> {
        self.log.enter("assign_caller_user_role").await?;
        self.inner.assign_caller_user_role(user, role).await
    }

    async fn search_content(&self, term: &str) -> BackendResult<Vec<SearchResult>> {
        self.log.enter("search_content").await?;
        self.inner.search_content(term).await
    }

    async fn get_external_fitness_search_results(&self, term: &str) -> BackendResult<String> {
        self.log.enter("get_external_fitness_search_results").await?;
        self.inner.get_external_fitness_search_results(term).await
    }
}

// =============================================================================
// CountingConnector
// =============================================================================

/// Hands out [`CountingBackend`] handles sharing one store and one log.
pub struct CountingConnector {
    backend: MemoryBackend,
    log: Arc<CallLog>,
}

#[async_trait]
impl Connector for CountingConnector {
    async fn connect(&self, identity: &Identity) -> BackendResult<Arc<dyn Backend>> {
        self.log.enter("connect").await?;
        Ok(Arc::new(CountingBackend {
            inner: self.backend.as_caller(identity.principal().clone()),
            log: Arc::clone(&self.log),
        }))
    }
}

// =============================================================================
// Notices
// =============================================================================

/// Collects every notice a client raises.
#[derive(Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    /// Everything raised so far.
    #[must_use]
    pub fn all(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

// =============================================================================
// TestContext
// =============================================================================

/// A client over a seeded store, with call counting and notice capture.
pub struct TestContext {
    pub backend: MemoryBackend,
    pub calls: Arc<CallLog>,
    pub notices: Arc<NoticeLog>,
    pub client: FitAmigoClient,
}

impl TestContext {
    /// Unconnected client over a seeded store.
    #[must_use]
    pub fn new() -> Self {
        Self::over(MemoryBackend::seeded())
    }

    /// Unconnected client over an existing store.
    #[must_use]
    pub fn over(backend: MemoryBackend) -> Self {
        Self::configured(backend, |builder| builder)
    }

    /// Unconnected client over `backend`, with builder overrides applied.
    #[must_use]
    pub fn configured(
        backend: MemoryBackend,
        configure: impl FnOnce(FitAmigoClientBuilder) -> FitAmigoClientBuilder,
    ) -> Self {
        let calls = Arc::new(CallLog::default());
        let notices = Arc::new(NoticeLog::default());
        let connector = CountingConnector {
            backend: backend.clone(),
            log: Arc::clone(&calls),
        };
        let session = Arc::new(Session::new(
            Arc::new(connector),
            QueryCache::new(1000, Duration::from_secs(300)),
        ));
        let client = configure(FitAmigoClient::builder(session))
            .notifier(Arc::clone(&notices) as Arc<dyn Notifier>)
            .build();
        Self {
            backend,
            calls,
            notices,
            client,
        }
    }

    /// Seeded context already connected as `user`.
    ///
    /// # Errors
    ///
    /// Returns the session's connect error.
    pub async fn signed_in(user: &str) -> fit_amigo_client::Result<Self> {
        let ctx = Self::new();
        ctx.sign_in(user).await?;
        Ok(ctx)
    }

    /// Connect the session as `user`.
    ///
    /// # Errors
    ///
    /// Returns the session's connect error.
    pub async fn sign_in(&self, user: &str) -> fit_amigo_client::Result<()> {
        self.client
            .session()
            .connect(Identity::authenticated(Principal::new(user), None))
            .await
    }

    /// Connect the session anonymously.
    ///
    /// # Errors
    ///
    /// Returns the session's connect error.
    pub async fn connect_anonymous(&self) -> fit_amigo_client::Result<()> {
        self.client.session().connect(Identity::anonymous()).await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
