//! JSON-over-HTTP gateway to the backend.
//!
//! Every procedure is a `POST {base}/call/{method}` whose body is the JSON
//! array of positional arguments and whose response body is the JSON result.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fit_amigo_core::{
    ArticleId, ArticleSummary, BlobRef, CartItem, Comment, CommentId, FoodEntry, FoodEntryId,
    FoodEntryInput, NewsArticle, NewsArticleInput, NewsCategory, Order, OrderId, Principal,
    Product, ProductDetails, ProductId, RunId, RunningSession, SearchResult, UserProfile,
    UserRole, Video, VideoId, Workout,
};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};
use url::Url;

use super::{Backend, BackendError, BackendResult};
use crate::session::{Connector, Identity};

const ERROR_BODY_PREVIEW: usize = 200;

/// Backend handle speaking to the HTTP gateway.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<HttpBackendInner>,
}

struct HttpBackendInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl HttpBackend {
    /// Create a handle for the given gateway and (optional) bearer token.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: Url, token: Option<SecretString>) -> Self {
        Self {
            inner: Arc::new(HttpBackendInner {
                client,
                base_url,
                token,
            }),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/call/{method}",
            self.inner.base_url.as_str().trim_end_matches('/')
        )
    }

    /// Invoke a remote procedure.
    async fn call<R: DeserializeOwned>(&self, method: &str, args: Value) -> BackendResult<R> {
        let mut request = self
            .inner
            .client
            .post(self.endpoint(method))
            .header("Content-Type", "application/json")
            .json(&args);
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                method,
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(error_for_status(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                method,
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }
}

/// Map a non-success gateway status to a [`BackendError`].
fn error_for_status(status: reqwest::StatusCode, body: &str) -> BackendError {
    let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
    match status {
        reqwest::StatusCode::NOT_FOUND => BackendError::NotFound(preview),
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            BackendError::Unauthorized(preview)
        }
        _ => BackendError::Rejected(format!("HTTP {status}: {preview}")),
    }
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> BackendResult<Product> {
        self.call("getProduct", json!([id])).await
    }

    #[instrument(skip(self))]
    async fn search_products(&self, term: &str) -> BackendResult<Vec<Product>> {
        self.call("searchProducts", json!([term])).await
    }

    #[instrument(skip(self, details))]
    async fn add_product(&self, details: &ProductDetails) -> BackendResult<()> {
        self.call("addProduct", json!([details])).await
    }

    #[instrument(skip(self, details), fields(product_id = %id))]
    async fn edit_product(&self, id: ProductId, details: &ProductDetails) -> BackendResult<()> {
        self.call("editProduct", json!([id, details])).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn delete_product(&self, id: ProductId) -> BackendResult<()> {
        self.call("deleteProduct", json!([id])).await
    }

    #[instrument(skip(self))]
    async fn fetch_external_products(&self) -> BackendResult<String> {
        self.call("fetchExternalProducts", json!([])).await
    }

    #[instrument(skip(self))]
    async fn fetch_external_sports_products(
        &self,
        category: Option<&str>,
        term: Option<&str>,
    ) -> BackendResult<String> {
        self.call("fetchExternalSportsProducts", json!([category, term]))
            .await
    }

    #[instrument(skip(self))]
    async fn get_cart(&self) -> BackendResult<Vec<CartItem>> {
        self.call("getCart", json!([])).await
    }

    #[instrument(skip(self), fields(product_id = %item.product_id, quantity = item.quantity))]
    async fn add_to_cart(&self, item: CartItem) -> BackendResult<()> {
        self.call("addToCart", json!([item])).await
    }

    #[instrument(skip(self, shipping_address))]
    async fn place_order(&self, shipping_address: &str) -> BackendResult<OrderId> {
        self.call("placeOrder", json!([shipping_address])).await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_order(&self, id: OrderId) -> BackendResult<Order> {
        self.call("getOrder", json!([id])).await
    }

    #[instrument(skip(self))]
    async fn get_user_orders(&self) -> BackendResult<Vec<Order>> {
        self.call("getUserOrders", json!([])).await
    }

    #[instrument(skip(self))]
    async fn get_all_videos(&self) -> BackendResult<Vec<Video>> {
        self.call("getAllVideos", json!([])).await
    }

    #[instrument(skip(self), fields(video_id = %id))]
    async fn get_video(&self, id: VideoId) -> BackendResult<Option<Video>> {
        self.call("getVideo", json!([id])).await
    }

    #[instrument(skip(self, description, file), fields(size = ?file.len()))]
    async fn upload_video(
        &self,
        title: &str,
        description: &str,
        file: &BlobRef,
    ) -> BackendResult<VideoId> {
        self.call("uploadVideo", json!([title, description, file]))
            .await
    }

    #[instrument(skip(self), fields(video_id = %id))]
    async fn like_video(&self, id: VideoId) -> BackendResult<()> {
        self.call("likeVideo", json!([id])).await
    }

    #[instrument(skip(self), fields(video_id = %id))]
    async fn unlike_video(&self, id: VideoId) -> BackendResult<()> {
        self.call("unlikeVideo", json!([id])).await
    }

    #[instrument(skip(self), fields(video_id = %id))]
    async fn has_liked_video(&self, id: VideoId) -> BackendResult<bool> {
        self.call("hasLikedVideo", json!([id])).await
    }

    #[instrument(skip(self, text), fields(video_id = %video_id))]
    async fn add_comment(&self, video_id: VideoId, text: &str) -> BackendResult<CommentId> {
        self.call("addComment", json!([video_id, text])).await
    }

    #[instrument(skip(self), fields(comment_id = %id))]
    async fn delete_comment(&self, id: CommentId) -> BackendResult<()> {
        self.call("deleteComment", json!([id])).await
    }

    #[instrument(skip(self), fields(video_id = %video_id))]
    async fn get_video_comments(&self, video_id: VideoId) -> BackendResult<Vec<Comment>> {
        self.call("getVideoComments", json!([video_id])).await
    }

    #[instrument(skip(self))]
    async fn fetch_sports_and_fitness_videos(&self) -> BackendResult<String> {
        self.call("fetchSportsAndFitnessVideos", json!([])).await
    }

    #[instrument(skip(self))]
    async fn get_workouts(&self) -> BackendResult<Vec<Workout>> {
        self.call("getWorkouts", json!([])).await
    }

    #[instrument(skip(self, workout), fields(exercise = %workout.exercise_name))]
    async fn log_workout(&self, workout: &Workout) -> BackendResult<()> {
        self.call("logWorkout", json!([workout])).await
    }

    #[instrument(skip(self))]
    async fn get_user_running_sessions(&self) -> BackendResult<Vec<RunningSession>> {
        self.call("getUserRunningSessions", json!([])).await
    }

    #[instrument(skip(self, notes))]
    async fn log_running_session(
        &self,
        distance: f64,
        duration: u64,
        notes: Option<&str>,
    ) -> BackendResult<RunId> {
        self.call("logRunningSession", json!([distance, duration, notes]))
            .await
    }

    #[instrument(skip(self), fields(run_id = %id))]
    async fn delete_running_session(&self, id: RunId) -> BackendResult<()> {
        self.call("deleteRunningSession", json!([id])).await
    }

    #[instrument(skip(self))]
    async fn get_user_food_entries(&self) -> BackendResult<Vec<FoodEntry>> {
        self.call("getUserFoodEntries", json!([])).await
    }

    #[instrument(skip(self, food), fields(food = %food.food_name))]
    async fn add_food_entry(&self, food: &FoodEntryInput) -> BackendResult<FoodEntryId> {
        self.call("addFoodEntry", json!([food])).await
    }

    #[instrument(skip(self, food), fields(entry_id = %id))]
    async fn edit_food_entry(
        &self,
        id: FoodEntryId,
        food: &FoodEntryInput,
    ) -> BackendResult<()> {
        self.call("editFoodEntry", json!([id, food])).await
    }

    #[instrument(skip(self), fields(entry_id = %id))]
    async fn delete_food_entry(&self, id: FoodEntryId) -> BackendResult<()> {
        self.call("deleteFoodEntry", json!([id])).await
    }

    #[instrument(skip(self), fields(entry_id = %id))]
    async fn get_food_entry(&self, id: FoodEntryId) -> BackendResult<Option<FoodEntry>> {
        self.call("getFoodEntry", json!([id])).await
    }

    #[instrument(skip(self))]
    async fn get_all_news_articles(
        &self,
        category: Option<NewsCategory>,
    ) -> BackendResult<Vec<NewsArticle>> {
        self.call("getAllNewsArticles", json!([category])).await
    }

    #[instrument(skip(self), fields(article_id = %id))]
    async fn get_news_article(&self, id: ArticleId) -> BackendResult<Option<NewsArticle>> {
        self.call("getNewsArticle", json!([id])).await
    }

    #[instrument(skip(self))]
    async fn get_article_summaries(&self) -> BackendResult<Vec<ArticleSummary>> {
        self.call("getArticleSummaries", json!([])).await
    }

    #[instrument(skip(self))]
    async fn get_all_articles_sorted_by_publication_date(
        &self,
    ) -> BackendResult<Vec<NewsArticle>> {
        self.call("getAllArticlesSortedByPublicationDate", json!([]))
            .await
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    async fn create_news_article(&self, input: &NewsArticleInput) -> BackendResult<ArticleId> {
        self.call("createNewsArticle", json!([input])).await
    }

    #[instrument(skip(self, input), fields(article_id = %id))]
    async fn update_news_article(
        &self,
        id: ArticleId,
        input: &NewsArticleInput,
    ) -> BackendResult<()> {
        self.call("updateNewsArticle", json!([id, input])).await
    }

    #[instrument(skip(self), fields(article_id = %id))]
    async fn delete_news_article(&self, id: ArticleId) -> BackendResult<()> {
        self.call("deleteNewsArticle", json!([id])).await
    }

    #[instrument(skip(self))]
    async fn get_caller_user_profile(&self) -> BackendResult<Option<UserProfile>> {
        self.call("getCallerUserProfile", json!([])).await
    }

    #[instrument(skip(self, profile))]
    async fn save_caller_user_profile(&self, profile: &UserProfile) -> BackendResult<()> {
        self.call("saveCallerUserProfile", json!([profile])).await
    }

    #[instrument(skip(self), fields(user = %user))]
    async fn get_user_profile(&self, user: &Principal) -> BackendResult<Option<UserProfile>> {
        self.call("getUserProfile", json!([user])).await
    }

    #[instrument(skip(self))]
    async fn get_caller_user_role(&self) -> BackendResult<UserRole> {
        self.call("getCallerUserRole", json!([])).await
    }

    #[instrument(skip(self))]
    async fn is_caller_admin(&self) -> BackendResult<bool> {
        self.call("isCallerAdmin", json!([])).await
    }

    #[instrument(skip(self), fields(user = %user, role = %role))]
    async fn assign_caller_user_role(
        &self,
        user: &Principal,
        role: UserRole,
    ) -> BackendResult<()> {
        self.call("assignCallerUserRole", json!([user, role])).await
    }

    #[instrument(skip(self))]
    async fn search_content(&self, term: &str) -> BackendResult<Vec<SearchResult>> {
        self.call("searchContent", json!([term])).await
    }

    #[instrument(skip(self))]
    async fn get_external_fitness_search_results(&self, term: &str) -> BackendResult<String> {
        self.call("getExternalFitnessSearchResults", json!([term]))
            .await
    }
}

// =============================================================================
// HttpConnector
// =============================================================================

/// Builds [`HttpBackend`] handles bound to a caller's identity token.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    base_url: Url,
    timeout: Duration,
}

impl HttpConnector {
    /// Create a connector for the gateway at `base_url`.
    #[must_use]
    pub const fn new(base_url: Url, timeout: Duration) -> Self {
        Self { base_url, timeout }
    }
}

#[async_trait]
impl Connector for HttpConnector {
    #[instrument(skip(self, identity), fields(principal = %identity.principal()))]
    async fn connect(&self, identity: &Identity) -> BackendResult<Arc<dyn Backend>> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        debug!(base_url = %self.base_url, "Created backend gateway handle");
        Ok(Arc::new(HttpBackend::new(
            client,
            self.base_url.clone(),
            identity.token().cloned(),
        )))
    }
}
