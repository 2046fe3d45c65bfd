//! In-process backend used by tests and the CLI's `--in-memory` mode.
//!
//! Honors the documented backend behaviors: stock limits on cart updates,
//! author-only comment deletion, admin-only catalog and news management, and
//! per-caller scoping of carts, orders and tracker data. Handles created for
//! different callers share one store.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use fit_amigo_core::{
    ArticleId, ArticleSummary, BlobRef, CartItem, Comment, CommentId, ContentType, FoodEntry,
    FoodEntryId, FoodEntryInput, NewsArticle, NewsArticleInput, NewsCategory, Order, OrderId,
    OrderStatus, Principal, Product, ProductDetails, ProductId, RunId, RunningSession,
    SearchResult, Timestamp, UserProfile, UserRole, Video, VideoId, Workout, validate_comment,
    validate_shipping_address,
};
use tracing::instrument;

use super::{Backend, BackendError, BackendResult};
use crate::session::{Connector, Identity};

const PREVIEW_CHARS: usize = 100;

#[derive(Default)]
struct Store {
    next_id: u64,
    last_stamp: i64,
    products: BTreeMap<ProductId, Product>,
    carts: HashMap<Principal, Vec<CartItem>>,
    orders: BTreeMap<OrderId, Order>,
    videos: BTreeMap<VideoId, Video>,
    likes: HashSet<(Principal, VideoId)>,
    comments: BTreeMap<CommentId, Comment>,
    workouts: HashMap<Principal, Vec<Workout>>,
    runs: BTreeMap<RunId, RunningSession>,
    food: BTreeMap<FoodEntryId, FoodEntry>,
    articles: BTreeMap<ArticleId, NewsArticle>,
    profiles: HashMap<Principal, UserProfile>,
    roles: HashMap<Principal, UserRole>,
    external_products: Option<String>,
    external_sports_products: Option<String>,
    external_videos: Option<String>,
    external_search: Option<String>,
}

impl Store {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Wall-clock stamp, forced strictly increasing.
    fn stamp(&mut self) -> Timestamp {
        let now = Timestamp::now().as_nanos().max(self.last_stamp + 1);
        self.last_stamp = now;
        Timestamp::from_nanos(now)
    }

    fn role_of(&self, caller: &Principal) -> UserRole {
        if caller.is_anonymous() {
            return UserRole::Guest;
        }
        self.roles.get(caller).copied().unwrap_or(UserRole::User)
    }

    fn product(&self, id: ProductId) -> BackendResult<&Product> {
        self.products
            .get(&id)
            .ok_or_else(|| BackendError::NotFound(format!("product {id}")))
    }

    fn video_mut(&mut self, id: VideoId) -> BackendResult<&mut Video> {
        self.videos
            .get_mut(&id)
            .ok_or_else(|| BackendError::NotFound(format!("video {id}")))
    }
}

/// Backend that keeps all state in process memory.
#[derive(Clone)]
pub struct MemoryBackend {
    store: Arc<Mutex<Store>>,
    caller: Principal,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Empty store, handle bound to the anonymous caller.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
            caller: Principal::anonymous(),
        }
    }

    /// Handle sharing this store, acting as `caller`.
    #[must_use]
    pub fn as_caller(&self, caller: Principal) -> Self {
        Self {
            store: Arc::clone(&self.store),
            caller,
        }
    }

    /// The principal this handle acts as.
    #[must_use]
    pub const fn caller(&self) -> &Principal {
        &self.caller
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn require_user(&self) -> BackendResult<&Principal> {
        if self.caller.is_anonymous() {
            return Err(BackendError::Unauthorized(
                "anonymous callers cannot do this".to_string(),
            ));
        }
        Ok(&self.caller)
    }

    fn require_admin(&self, store: &Store) -> BackendResult<()> {
        if store.role_of(&self.caller) == UserRole::Admin {
            Ok(())
        } else {
            Err(BackendError::Unauthorized("admin role required".to_string()))
        }
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Grant a role directly, bypassing the admin check.
    pub fn grant_role(&self, user: &Principal, role: UserRole) {
        self.store().roles.insert(user.clone(), role);
    }

    /// Insert a product directly and return its id.
    pub fn insert_product(&self, details: ProductDetails, is_internal: bool) -> ProductId {
        let mut store = self.store();
        let id = ProductId::new(store.next_id());
        store.products.insert(
            id,
            Product {
                id,
                name: details.name,
                description: details.description,
                price: details.price,
                quantity: details.quantity,
                image: details.image,
                is_internal,
            },
        );
        id
    }

    /// Set the raw payload returned by `fetch_external_products`.
    pub fn set_external_products(&self, json: impl Into<String>) {
        self.store().external_products = Some(json.into());
    }

    /// Set the raw payload returned by `fetch_external_sports_products`.
    pub fn set_external_sports_products(&self, json: impl Into<String>) {
        self.store().external_sports_products = Some(json.into());
    }

    /// Set the raw payload returned by `fetch_sports_and_fitness_videos`.
    pub fn set_external_videos(&self, json: impl Into<String>) {
        self.store().external_videos = Some(json.into());
    }

    /// Set the raw payload returned by `get_external_fitness_search_results`.
    pub fn set_external_search(&self, json: impl Into<String>) {
        self.store().external_search = Some(json.into());
    }

    /// A store with demo catalog, videos and news for the CLI.
    #[must_use]
    pub fn seeded() -> Self {
        let backend = Self::new();
        for (name, description, price, quantity) in [
            ("Kettlebell 16kg", "Cast iron kettlebell for swings and presses", 45, 12),
            ("Yoga Mat", "Non-slip 6mm mat for yoga and stretching", 30, 25),
            ("Whey Protein Tub", "2kg vanilla whey protein supplement", 55, 8),
            ("Trail Running Socks", "Cushioned merino socks for long runs", 15, 40),
            ("Gym Equipment Bag", "Duffel bag with shoe compartment", 60, 0),
        ] {
            backend.insert_product(
                ProductDetails {
                    name: name.to_string(),
                    description: description.to_string(),
                    price,
                    quantity,
                    image: None,
                },
                true,
            );
        }

        let mut store = backend.store();
        let coach = Principal::new("coach-fitamigo");
        for (title, description) in [
            ("Five Minute Core Finisher", "Quick plank and hollow hold circuit"),
            ("Easy Run Warm-up", "Dynamic drills before an easy run"),
        ] {
            let id = VideoId::new(store.next_id());
            let upload_timestamp = store.stamp();
            let video_file = url::Url::parse(&format!("https://cdn.fitamigo.app/videos/{id}.mp4"))
                .map_or_else(|_| BlobRef::Bytes(Vec::new()), BlobRef::Url);
            store.videos.insert(
                id,
                Video {
                    id,
                    title: title.to_string(),
                    description: description.to_string(),
                    uploader_id: coach.clone(),
                    like_count: 0,
                    comment_count: 0,
                    upload_timestamp,
                    video_file,
                },
            );
        }

        for (title, category, content) in [
            (
                "Why Zone 2 Training Works",
                NewsCategory::TrainingAdvice,
                "Low-intensity aerobic work builds the base for everything else.",
            ),
            (
                "Protein Timing Myths",
                NewsCategory::Nutrition,
                "Total daily intake matters far more than the anabolic window.",
            ),
        ] {
            let id = ArticleId::new(store.next_id());
            let at = store.stamp();
            store.articles.insert(
                id,
                NewsArticle::from_input(
                    id,
                    NewsArticleInput {
                        title: title.to_string(),
                        content: Some(content.to_string()),
                        external_url: None,
                        article_type: fit_amigo_core::ArticleType::Internal,
                        category,
                        author: "FIT AMIGO Editorial".to_string(),
                        publication_date: at,
                        featured_image_url: None,
                    },
                    coach.clone(),
                    at,
                ),
            );
        }
        drop(store);
        backend
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get_product(&self, id: ProductId) -> BackendResult<Product> {
        self.store().product(id).cloned()
    }

    async fn search_products(&self, term: &str) -> BackendResult<Vec<Product>> {
        let needle = term.trim().to_lowercase();
        Ok(self
            .store()
            .products
            .values()
            .filter(|p| {
                needle.is_empty()
                    || contains_ci(&p.name, &needle)
                    || contains_ci(&p.description, &needle)
            })
            .cloned()
            .collect())
    }

    async fn add_product(&self, details: &ProductDetails) -> BackendResult<()> {
        {
            let store = self.store();
            self.require_admin(&store)?;
        }
        self.insert_product(details.clone(), true);
        Ok(())
    }

    async fn edit_product(&self, id: ProductId, details: &ProductDetails) -> BackendResult<()> {
        let mut store = self.store();
        self.require_admin(&store)?;
        let product = store
            .products
            .get_mut(&id)
            .ok_or_else(|| BackendError::NotFound(format!("product {id}")))?;
        product.name.clone_from(&details.name);
        product.description.clone_from(&details.description);
        product.price = details.price;
        product.quantity = details.quantity;
        product.image.clone_from(&details.image);
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> BackendResult<()> {
        let mut store = self.store();
        self.require_admin(&store)?;
        store
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| BackendError::NotFound(format!("product {id}")))
    }

    async fn fetch_external_products(&self) -> BackendResult<String> {
        Ok(self
            .store()
            .external_products
            .clone()
            .unwrap_or_else(|| "[]".to_string()))
    }

    async fn fetch_external_sports_products(
        &self,
        _category: Option<&str>,
        _term: Option<&str>,
    ) -> BackendResult<String> {
        Ok(self
            .store()
            .external_sports_products
            .clone()
            .unwrap_or_else(|| "[]".to_string()))
    }

    async fn get_cart(&self) -> BackendResult<Vec<CartItem>> {
        Ok(self
            .store()
            .carts
            .get(&self.caller)
            .cloned()
            .unwrap_or_default())
    }

    #[instrument(skip(self), fields(caller = %self.caller))]
    async fn add_to_cart(&self, item: CartItem) -> BackendResult<()> {
        let caller = self.require_user()?.clone();
        let mut store = self.store();
        let stock = store.product(item.product_id)?.quantity;
        if item.quantity > stock {
            return Err(BackendError::Rejected(format!(
                "insufficient stock for product {}: requested {}, available {stock}",
                item.product_id, item.quantity
            )));
        }
        let cart = store.carts.entry(caller).or_default();
        cart.retain(|line| line.product_id != item.product_id);
        if !item.is_removal() {
            cart.push(item);
        }
        Ok(())
    }

    #[instrument(skip(self, shipping_address), fields(caller = %self.caller))]
    async fn place_order(&self, shipping_address: &str) -> BackendResult<OrderId> {
        let caller = self.require_user()?.clone();
        validate_shipping_address(shipping_address)
            .map_err(|e| BackendError::Rejected(e.to_string()))?;

        let mut store = self.store();
        let items = store.carts.get(&caller).cloned().unwrap_or_default();
        if items.is_empty() {
            return Err(BackendError::Rejected("cart is empty".to_string()));
        }

        let mut total = 0_u64;
        for item in &items {
            let product = store.product(item.product_id)?;
            if item.quantity > product.quantity {
                return Err(BackendError::Rejected(format!(
                    "insufficient stock for product {}",
                    item.product_id
                )));
            }
            total = total.saturating_add(product.price.saturating_mul(item.quantity));
        }
        for item in &items {
            if let Some(product) = store.products.get_mut(&item.product_id) {
                product.quantity -= item.quantity;
            }
        }

        let id = OrderId::new(store.next_id());
        store.orders.insert(
            id,
            Order {
                id,
                user_id: caller.clone(),
                items,
                total,
                shipping_address: shipping_address.trim().to_string(),
                status: OrderStatus::Pending,
            },
        );
        store.carts.remove(&caller);
        Ok(id)
    }

    async fn get_order(&self, id: OrderId) -> BackendResult<Order> {
        let store = self.store();
        let order = store
            .orders
            .get(&id)
            .ok_or_else(|| BackendError::NotFound(format!("order {id}")))?;
        if order.user_id != self.caller && store.role_of(&self.caller) != UserRole::Admin {
            return Err(BackendError::Unauthorized(
                "order belongs to another user".to_string(),
            ));
        }
        Ok(order.clone())
    }

    async fn get_user_orders(&self) -> BackendResult<Vec<Order>> {
        Ok(self
            .store()
            .orders
            .values()
            .filter(|o| o.user_id == self.caller)
            .cloned()
            .collect())
    }

    async fn get_all_videos(&self) -> BackendResult<Vec<Video>> {
        Ok(self.store().videos.values().cloned().collect())
    }

    async fn get_video(&self, id: VideoId) -> BackendResult<Option<Video>> {
        Ok(self.store().videos.get(&id).cloned())
    }

    async fn upload_video(
        &self,
        title: &str,
        description: &str,
        file: &BlobRef,
    ) -> BackendResult<VideoId> {
        let caller = self.require_user()?.clone();
        if title.trim().is_empty() {
            return Err(BackendError::Rejected("title cannot be empty".to_string()));
        }
        let mut store = self.store();
        let id = VideoId::new(store.next_id());
        let upload_timestamp = store.stamp();
        store.videos.insert(
            id,
            Video {
                id,
                title: title.to_string(),
                description: description.to_string(),
                uploader_id: caller,
                like_count: 0,
                comment_count: 0,
                upload_timestamp,
                video_file: file.clone(),
            },
        );
        Ok(id)
    }

    async fn like_video(&self, id: VideoId) -> BackendResult<()> {
        let caller = self.require_user()?.clone();
        let mut store = self.store();
        store.video_mut(id)?;
        if store.likes.insert((caller, id)) {
            store.video_mut(id)?.like_count += 1;
        }
        Ok(())
    }

    async fn unlike_video(&self, id: VideoId) -> BackendResult<()> {
        let caller = self.require_user()?.clone();
        let mut store = self.store();
        store.video_mut(id)?;
        if store.likes.remove(&(caller, id)) {
            let video = store.video_mut(id)?;
            video.like_count = video.like_count.saturating_sub(1);
        }
        Ok(())
    }

    async fn has_liked_video(&self, id: VideoId) -> BackendResult<bool> {
        Ok(self.store().likes.contains(&(self.caller.clone(), id)))
    }

    async fn add_comment(&self, video_id: VideoId, text: &str) -> BackendResult<CommentId> {
        let caller = self.require_user()?.clone();
        validate_comment(text).map_err(|e| BackendError::Rejected(e.to_string()))?;
        let mut store = self.store();
        store.video_mut(video_id)?.comment_count += 1;
        let id = CommentId::new(store.next_id());
        let timestamp = store.stamp();
        store.comments.insert(
            id,
            Comment {
                id,
                video_id,
                user_id: caller,
                text: text.trim().to_string(),
                timestamp,
            },
        );
        Ok(id)
    }

    #[instrument(skip(self), fields(caller = %self.caller))]
    async fn delete_comment(&self, id: CommentId) -> BackendResult<()> {
        let mut store = self.store();
        let comment = store
            .comments
            .get(&id)
            .ok_or_else(|| BackendError::NotFound(format!("comment {id}")))?;
        if !comment.is_authored_by(&self.caller) {
            return Err(BackendError::Unauthorized(
                "only the author can delete a comment".to_string(),
            ));
        }
        let video_id = comment.video_id;
        store.comments.remove(&id);
        if let Some(video) = store.videos.get_mut(&video_id) {
            video.comment_count = video.comment_count.saturating_sub(1);
        }
        Ok(())
    }

    async fn get_video_comments(&self, video_id: VideoId) -> BackendResult<Vec<Comment>> {
        Ok(self
            .store()
            .comments
            .values()
            .filter(|c| c.video_id == video_id)
            .cloned()
            .collect())
    }

    async fn fetch_sports_and_fitness_videos(&self) -> BackendResult<String> {
        Ok(self
            .store()
            .external_videos
            .clone()
            .unwrap_or_else(|| "[]".to_string()))
    }

    async fn get_workouts(&self) -> BackendResult<Vec<Workout>> {
        Ok(self
            .store()
            .workouts
            .get(&self.caller)
            .cloned()
            .unwrap_or_default())
    }

    async fn log_workout(&self, workout: &Workout) -> BackendResult<()> {
        let caller = self.require_user()?.clone();
        workout
            .validate()
            .map_err(|e| BackendError::Rejected(e.to_string()))?;
        self.store()
            .workouts
            .entry(caller)
            .or_default()
            .push(workout.clone());
        Ok(())
    }

    async fn get_user_running_sessions(&self) -> BackendResult<Vec<RunningSession>> {
        Ok(self
            .store()
            .runs
            .values()
            .filter(|r| r.user_id == self.caller)
            .cloned()
            .collect())
    }

    async fn log_running_session(
        &self,
        distance: f64,
        duration: u64,
        notes: Option<&str>,
    ) -> BackendResult<RunId> {
        let caller = self.require_user()?.clone();
        if !distance.is_finite() || distance <= 0.0 || duration == 0 {
            return Err(BackendError::Rejected(
                "distance and duration must be positive".to_string(),
            ));
        }
        let mut store = self.store();
        let run_id = RunId::new(store.next_id());
        let timestamp = store.stamp();
        store.runs.insert(
            run_id,
            RunningSession {
                run_id,
                user_id: caller,
                distance,
                duration,
                notes: notes.map(ToString::to_string),
                timestamp,
            },
        );
        Ok(run_id)
    }

    async fn delete_running_session(&self, id: RunId) -> BackendResult<()> {
        let mut store = self.store();
        let run = store
            .runs
            .get(&id)
            .ok_or_else(|| BackendError::NotFound(format!("running session {id}")))?;
        if run.user_id != self.caller {
            return Err(BackendError::Unauthorized(
                "running session belongs to another user".to_string(),
            ));
        }
        store.runs.remove(&id);
        Ok(())
    }

    async fn get_user_food_entries(&self) -> BackendResult<Vec<FoodEntry>> {
        Ok(self
            .store()
            .food
            .values()
            .filter(|f| f.user_id == self.caller)
            .cloned()
            .collect())
    }

    async fn add_food_entry(&self, food: &FoodEntryInput) -> BackendResult<FoodEntryId> {
        let caller = self.require_user()?.clone();
        food.validate()
            .map_err(|e| BackendError::Rejected(e.to_string()))?;
        let mut store = self.store();
        let id = FoodEntryId::new(store.next_id());
        let timestamp = store.stamp();
        store.food.insert(
            id,
            FoodEntry::from_input(id, caller, food.clone(), timestamp),
        );
        Ok(id)
    }

    async fn edit_food_entry(
        &self,
        id: FoodEntryId,
        food: &FoodEntryInput,
    ) -> BackendResult<()> {
        food.validate()
            .map_err(|e| BackendError::Rejected(e.to_string()))?;
        let mut store = self.store();
        let entry = store
            .food
            .get_mut(&id)
            .ok_or_else(|| BackendError::NotFound(format!("food entry {id}")))?;
        if entry.user_id != self.caller {
            return Err(BackendError::Unauthorized(
                "food entry belongs to another user".to_string(),
            ));
        }
        *entry = FoodEntry::from_input(id, entry.user_id.clone(), food.clone(), entry.timestamp);
        Ok(())
    }

    async fn delete_food_entry(&self, id: FoodEntryId) -> BackendResult<()> {
        let mut store = self.store();
        let entry = store
            .food
            .get(&id)
            .ok_or_else(|| BackendError::NotFound(format!("food entry {id}")))?;
        if entry.user_id != self.caller {
            return Err(BackendError::Unauthorized(
                "food entry belongs to another user".to_string(),
            ));
        }
        store.food.remove(&id);
        Ok(())
    }

    async fn get_food_entry(&self, id: FoodEntryId) -> BackendResult<Option<FoodEntry>> {
        Ok(self
            .store()
            .food
            .get(&id)
            .filter(|f| f.user_id == self.caller)
            .cloned())
    }

    async fn get_all_news_articles(
        &self,
        category: Option<NewsCategory>,
    ) -> BackendResult<Vec<NewsArticle>> {
        Ok(self
            .store()
            .articles
            .values()
            .filter(|a| category.is_none_or(|c| a.category == c))
            .cloned()
            .collect())
    }

    async fn get_news_article(&self, id: ArticleId) -> BackendResult<Option<NewsArticle>> {
        Ok(self.store().articles.get(&id).cloned())
    }

    async fn get_article_summaries(&self) -> BackendResult<Vec<ArticleSummary>> {
        Ok(self
            .store()
            .articles
            .values()
            .map(NewsArticle::summary)
            .collect())
    }

    async fn get_all_articles_sorted_by_publication_date(
        &self,
    ) -> BackendResult<Vec<NewsArticle>> {
        let mut articles: Vec<NewsArticle> = self.store().articles.values().cloned().collect();
        articles.sort_by(|a, b| b.publication_date.cmp(&a.publication_date));
        Ok(articles)
    }

    async fn create_news_article(&self, input: &NewsArticleInput) -> BackendResult<ArticleId> {
        input
            .validate()
            .map_err(|e| BackendError::Rejected(e.to_string()))?;
        let mut store = self.store();
        self.require_admin(&store)?;
        let id = ArticleId::new(store.next_id());
        let at = store.stamp();
        store.articles.insert(
            id,
            NewsArticle::from_input(id, input.clone(), self.caller.clone(), at),
        );
        Ok(id)
    }

    async fn update_news_article(
        &self,
        id: ArticleId,
        input: &NewsArticleInput,
    ) -> BackendResult<()> {
        input
            .validate()
            .map_err(|e| BackendError::Rejected(e.to_string()))?;
        let mut store = self.store();
        self.require_admin(&store)?;
        let article = store
            .articles
            .get_mut(&id)
            .ok_or_else(|| BackendError::NotFound(format!("article {id}")))?;
        *article = NewsArticle::from_input(
            id,
            input.clone(),
            article.creator_user_id.clone(),
            article.creation_timestamp,
        );
        Ok(())
    }

    async fn delete_news_article(&self, id: ArticleId) -> BackendResult<()> {
        let mut store = self.store();
        self.require_admin(&store)?;
        store
            .articles
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| BackendError::NotFound(format!("article {id}")))
    }

    async fn get_caller_user_profile(&self) -> BackendResult<Option<UserProfile>> {
        Ok(self.store().profiles.get(&self.caller).cloned())
    }

    async fn save_caller_user_profile(&self, profile: &UserProfile) -> BackendResult<()> {
        let caller = self.require_user()?.clone();
        profile
            .validate()
            .map_err(|e| BackendError::Rejected(e.to_string()))?;
        self.store().profiles.insert(caller, profile.clone());
        Ok(())
    }

    async fn get_user_profile(&self, user: &Principal) -> BackendResult<Option<UserProfile>> {
        Ok(self.store().profiles.get(user).cloned())
    }

    async fn get_caller_user_role(&self) -> BackendResult<UserRole> {
        Ok(self.store().role_of(&self.caller))
    }

    async fn is_caller_admin(&self) -> BackendResult<bool> {
        Ok(self.store().role_of(&self.caller) == UserRole::Admin)
    }

    async fn assign_caller_user_role(
        &self,
        user: &Principal,
        role: UserRole,
    ) -> BackendResult<()> {
        let mut store = self.store();
        self.require_admin(&store)?;
        store.roles.insert(user.clone(), role);
        Ok(())
    }

    async fn search_content(&self, term: &str) -> BackendResult<Vec<SearchResult>> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let store = self.store();
        let hit = |content_type, item_id: String, title: &str, body: &str| SearchResult {
            content_type,
            item_id,
            title: title.to_string(),
            preview_text: preview(body),
        };

        let mut results = Vec::new();
        results.extend(
            store
                .products
                .values()
                .filter(|p| contains_ci(&p.name, &needle) || contains_ci(&p.description, &needle))
                .map(|p| hit(ContentType::Product, p.id.to_string(), &p.name, &p.description)),
        );
        results.extend(
            store
                .videos
                .values()
                .filter(|v| contains_ci(&v.title, &needle) || contains_ci(&v.description, &needle))
                .map(|v| hit(ContentType::Video, v.id.to_string(), &v.title, &v.description)),
        );
        results.extend(
            store
                .articles
                .values()
                .filter(|a| {
                    contains_ci(&a.title, &needle)
                        || a.content.as_deref().is_some_and(|c| contains_ci(c, &needle))
                })
                .map(|a| {
                    hit(
                        ContentType::Article,
                        a.id.to_string(),
                        &a.title,
                        a.content.as_deref().unwrap_or_default(),
                    )
                }),
        );
        if let Some(workouts) = store.workouts.get(&self.caller) {
            results.extend(
                workouts
                    .iter()
                    .enumerate()
                    .filter(|(_, w)| contains_ci(&w.exercise_name, &needle))
                    .map(|(i, w)| {
                        let body = format!("{} sets x {} reps @ {}kg", w.sets, w.reps, w.weight);
                        hit(ContentType::Workout, i.to_string(), &w.exercise_name, &body)
                    }),
            );
        }
        results.extend(
            store
                .runs
                .values()
                .filter(|r| r.user_id == self.caller)
                .filter(|r| r.notes.as_deref().is_some_and(|n| contains_ci(n, &needle)))
                .map(|r| {
                    let title = format!("{:.1} km run", r.distance);
                    hit(
                        ContentType::RunningSession,
                        r.run_id.to_string(),
                        &title,
                        r.notes.as_deref().unwrap_or_default(),
                    )
                }),
        );
        results.extend(
            store
                .food
                .values()
                .filter(|f| f.user_id == self.caller && contains_ci(&f.food_name, &needle))
                .map(|f| {
                    let body = format!("{:.0} kcal", f.calories);
                    hit(ContentType::FoodEntry, f.id.to_string(), &f.food_name, &body)
                }),
        );
        Ok(results)
    }

    async fn get_external_fitness_search_results(&self, _term: &str) -> BackendResult<String> {
        Ok(self
            .store()
            .external_search
            .clone()
            .unwrap_or_else(|| "[]".to_string()))
    }
}

// =============================================================================
// MemoryConnector
// =============================================================================

/// Hands out [`MemoryBackend`] handles bound to the connecting identity.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    backend: MemoryBackend,
}

impl MemoryConnector {
    /// Connector over an existing store.
    #[must_use]
    pub const fn new(backend: MemoryBackend) -> Self {
        Self { backend }
    }

    /// The shared store.
    #[must_use]
    pub const fn backend(&self) -> &MemoryBackend {
        &self.backend
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, identity: &Identity) -> BackendResult<Arc<dyn Backend>> {
        Ok(Arc::new(self.backend.as_caller(identity.principal().clone())))
    }
}
