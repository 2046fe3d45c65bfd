//! The FIT AMIGO backend contract.
//!
//! # Architecture
//!
//! - One async method per remote procedure, mirroring the backend's public
//!   interface one-to-one
//! - The backend is the source of truth: implementations never cache
//! - Caller identity is bound when a handle is created (see
//!   [`crate::session::Connector`]), so user-scoped procedures take no
//!   principal argument
//!
//! # Implementations
//!
//! - [`HttpBackend`] - JSON over the HTTP gateway
//! - [`MemoryBackend`] - in-process collaborator for tests and demos

mod http;
mod memory;

pub use http::{HttpBackend, HttpConnector};
pub use memory::{MemoryBackend, MemoryConnector};

use async_trait::async_trait;
use fit_amigo_core::{
    ArticleId, ArticleSummary, BlobRef, CartItem, Comment, CommentId, FoodEntry, FoodEntryId,
    FoodEntryInput, NewsArticle, NewsArticleInput, NewsCategory, Order, OrderId, Principal,
    Product, ProductDetails, ProductId, RunId, RunningSession, SearchResult, UserProfile,
    UserRole, Video, VideoId, Workout,
};
use thiserror::Error;

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend refused the call (trap, invariant violation).
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Referenced entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller lacks permission for the call.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the gateway.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// Result alias for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Remote procedures exposed by the FIT AMIGO backend.
#[async_trait]
pub trait Backend: Send + Sync {
    // Catalog
    async fn get_product(&self, id: ProductId) -> BackendResult<Product>;
    async fn search_products(&self, term: &str) -> BackendResult<Vec<Product>>;
    async fn add_product(&self, details: &ProductDetails) -> BackendResult<()>;
    async fn edit_product(&self, id: ProductId, details: &ProductDetails) -> BackendResult<()>;
    async fn delete_product(&self, id: ProductId) -> BackendResult<()>;
    /// Raw JSON text from the general partner store.
    async fn fetch_external_products(&self) -> BackendResult<String>;
    /// Raw JSON text from the sports partner catalog.
    async fn fetch_external_sports_products(
        &self,
        category: Option<&str>,
        term: Option<&str>,
    ) -> BackendResult<String>;

    // Cart and orders
    async fn get_cart(&self) -> BackendResult<Vec<CartItem>>;
    /// Quantity zero removes the line.
    async fn add_to_cart(&self, item: CartItem) -> BackendResult<()>;
    async fn place_order(&self, shipping_address: &str) -> BackendResult<OrderId>;
    async fn get_order(&self, id: OrderId) -> BackendResult<Order>;
    async fn get_user_orders(&self) -> BackendResult<Vec<Order>>;

    // Video
    async fn get_all_videos(&self) -> BackendResult<Vec<Video>>;
    async fn get_video(&self, id: VideoId) -> BackendResult<Option<Video>>;
    async fn upload_video(
        &self,
        title: &str,
        description: &str,
        file: &BlobRef,
    ) -> BackendResult<VideoId>;
    async fn like_video(&self, id: VideoId) -> BackendResult<()>;
    async fn unlike_video(&self, id: VideoId) -> BackendResult<()>;
    async fn has_liked_video(&self, id: VideoId) -> BackendResult<bool>;
    async fn add_comment(&self, video_id: VideoId, text: &str) -> BackendResult<CommentId>;
    /// Rejected unless the caller authored the comment.
    async fn delete_comment(&self, id: CommentId) -> BackendResult<()>;
    async fn get_video_comments(&self, video_id: VideoId) -> BackendResult<Vec<Comment>>;
    /// Raw JSON text from the partner video catalog.
    async fn fetch_sports_and_fitness_videos(&self) -> BackendResult<String>;

    // Fitness trackers
    async fn get_workouts(&self) -> BackendResult<Vec<Workout>>;
    async fn log_workout(&self, workout: &Workout) -> BackendResult<()>;
    async fn get_user_running_sessions(&self) -> BackendResult<Vec<RunningSession>>;
    async fn log_running_session(
        &self,
        distance: f64,
        duration: u64,
        notes: Option<&str>,
    ) -> BackendResult<RunId>;
    async fn delete_running_session(&self, id: RunId) -> BackendResult<()>;
    async fn get_user_food_entries(&self) -> BackendResult<Vec<FoodEntry>>;
    async fn add_food_entry(&self, food: &FoodEntryInput) -> BackendResult<FoodEntryId>;
    async fn edit_food_entry(&self, id: FoodEntryId, food: &FoodEntryInput)
    -> BackendResult<()>;
    async fn delete_food_entry(&self, id: FoodEntryId) -> BackendResult<()>;
    async fn get_food_entry(&self, id: FoodEntryId) -> BackendResult<Option<FoodEntry>>;

    // News
    async fn get_all_news_articles(
        &self,
        category: Option<NewsCategory>,
    ) -> BackendResult<Vec<NewsArticle>>;
    async fn get_news_article(&self, id: ArticleId) -> BackendResult<Option<NewsArticle>>;
    async fn get_article_summaries(&self) -> BackendResult<Vec<ArticleSummary>>;
    async fn get_all_articles_sorted_by_publication_date(&self)
    -> BackendResult<Vec<NewsArticle>>;
    async fn create_news_article(&self, input: &NewsArticleInput) -> BackendResult<ArticleId>;
    async fn update_news_article(
        &self,
        id: ArticleId,
        input: &NewsArticleInput,
    ) -> BackendResult<()>;
    async fn delete_news_article(&self, id: ArticleId) -> BackendResult<()>;

    // Identity and roles
    async fn get_caller_user_profile(&self) -> BackendResult<Option<UserProfile>>;
    async fn save_caller_user_profile(&self, profile: &UserProfile) -> BackendResult<()>;
    async fn get_user_profile(&self, user: &Principal) -> BackendResult<Option<UserProfile>>;
    async fn get_caller_user_role(&self) -> BackendResult<UserRole>;
    async fn is_caller_admin(&self) -> BackendResult<bool>;
    async fn assign_caller_user_role(&self, user: &Principal, role: UserRole)
    -> BackendResult<()>;

    // Search
    async fn search_content(&self, term: &str) -> BackendResult<Vec<SearchResult>>;
    /// Raw JSON text from the external fitness search.
    async fn get_external_fitness_search_results(&self, term: &str) -> BackendResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::NotFound("product 7".to_string());
        assert_eq!(err.to_string(), "Not found: product 7");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = BackendError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }

    #[test]
    fn test_rejected_error() {
        let err = BackendError::Rejected("insufficient stock".to_string());
        assert_eq!(err.to_string(), "Rejected: insufficient stock");
    }
}
