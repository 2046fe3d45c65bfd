//! Query cache keyed by resource identity.
//!
//! Entries live in a `moka` cache (capacity and TTL from configuration).
//! Writes go through a sequencer: every fetch takes a monotonic [`Ticket`]
//! before calling the backend, and its response is stored only if the ticket
//! is still the newest for its key and no invalidation touched the key after
//! the ticket was issued. Older responses are handed back to their caller but
//! never overwrite newer data.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use fit_amigo_core::{
    ArticleId, ArticleSummary, CartItem, Comment, ExternalFitnessVideo, ExternalProduct,
    ExternalSearchResult, ExternalSportsProduct, FoodEntry, FoodEntryId, NewsArticle,
    NewsCategory, Order, OrderId, Principal, Product, ProductId, RunningSession, SearchResult,
    UserProfile, UserRole, Video, VideoId, Workout,
};
use moka::future::Cache;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::invalidation::InvalidationTarget;

/// Identity of a cached query.
///
/// User-scoped keys carry no principal: the cache belongs to one session and
/// is cleared whenever the identity changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Products { term: String },
    Product(ProductId),
    ExternalProducts,
    ExternalSportsProducts {
        category: Option<String>,
        term: Option<String>,
    },
    Cart,
    Order(OrderId),
    UserOrders,
    Videos,
    Video(VideoId),
    VideoComments(VideoId),
    VideoLike(VideoId),
    ExternalFitnessVideos,
    Workouts,
    RunningSessions,
    UserFoodEntries,
    FoodEntry(FoodEntryId),
    NewsArticles { category: Option<NewsCategory> },
    NewsArticle(ArticleId),
    ArticleSummaries,
    ArticlesByDate,
    CallerProfile,
    UserProfile(Principal),
    CallerRole,
    IsCallerAdmin,
    SearchContent(String),
    ExternalSearch(String),
}

/// A key with its parameters erased, used for kind-wide invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Products,
    Product,
    ExternalProducts,
    ExternalSportsProducts,
    Cart,
    Order,
    UserOrders,
    Videos,
    Video,
    VideoComments,
    VideoLike,
    ExternalFitnessVideos,
    Workouts,
    RunningSessions,
    UserFoodEntries,
    FoodEntry,
    NewsArticles,
    NewsArticle,
    ArticleSummaries,
    ArticlesByDate,
    CallerProfile,
    UserProfile,
    CallerRole,
    IsCallerAdmin,
    SearchContent,
    ExternalSearch,
}

impl QueryKey {
    /// The key's kind.
    #[must_use]
    pub const fn kind(&self) -> QueryKind {
        match self {
            Self::Products { .. } => QueryKind::Products,
            Self::Product(_) => QueryKind::Product,
            Self::ExternalProducts => QueryKind::ExternalProducts,
            Self::ExternalSportsProducts { .. } => QueryKind::ExternalSportsProducts,
            Self::Cart => QueryKind::Cart,
            Self::Order(_) => QueryKind::Order,
            Self::UserOrders => QueryKind::UserOrders,
            Self::Videos => QueryKind::Videos,
            Self::Video(_) => QueryKind::Video,
            Self::VideoComments(_) => QueryKind::VideoComments,
            Self::VideoLike(_) => QueryKind::VideoLike,
            Self::ExternalFitnessVideos => QueryKind::ExternalFitnessVideos,
            Self::Workouts => QueryKind::Workouts,
            Self::RunningSessions => QueryKind::RunningSessions,
            Self::UserFoodEntries => QueryKind::UserFoodEntries,
            Self::FoodEntry(_) => QueryKind::FoodEntry,
            Self::NewsArticles { .. } => QueryKind::NewsArticles,
            Self::NewsArticle(_) => QueryKind::NewsArticle,
            Self::ArticleSummaries => QueryKind::ArticleSummaries,
            Self::ArticlesByDate => QueryKind::ArticlesByDate,
            Self::CallerProfile => QueryKind::CallerProfile,
            Self::UserProfile(_) => QueryKind::UserProfile,
            Self::CallerRole => QueryKind::CallerRole,
            Self::IsCallerAdmin => QueryKind::IsCallerAdmin,
            Self::SearchContent(_) => QueryKind::SearchContent,
            Self::ExternalSearch(_) => QueryKind::ExternalSearch,
        }
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
    ExternalProducts(Vec<ExternalProduct>),
    SportsProducts(Vec<ExternalSportsProduct>),
    CartItems(Vec<CartItem>),
    Order(Box<Order>),
    Orders(Vec<Order>),
    Videos(Vec<Video>),
    Video(Box<Video>),
    Comments(Vec<Comment>),
    Flag(bool),
    FitnessVideos(Vec<ExternalFitnessVideo>),
    Workouts(Vec<Workout>),
    RunningSessions(Vec<RunningSession>),
    FoodEntries(Vec<FoodEntry>),
    FoodEntry(Box<FoodEntry>),
    Articles(Vec<NewsArticle>),
    Article(Box<NewsArticle>),
    Summaries(Vec<ArticleSummary>),
    Profile(Option<UserProfile>),
    Role(UserRole),
    SearchResults(Vec<SearchResult>),
    ExternalSearchResults(Vec<ExternalSearchResult>),
}

/// A type that can be stored in the query cache.
pub trait Cached: Clone + Send + Sync + 'static {
    /// Wrap for storage.
    fn into_value(self) -> CacheValue;
    /// Unwrap a stored value; `None` if it holds a different type.
    fn from_value(value: CacheValue) -> Option<Self>;
}

macro_rules! impl_cached {
    (box $ty:ty => $variant:ident) => {
        impl Cached for $ty {
            fn into_value(self) -> CacheValue {
                CacheValue::$variant(Box::new(self))
            }

            fn from_value(value: CacheValue) -> Option<Self> {
                match value {
                    CacheValue::$variant(inner) => Some(*inner),
                    _ => None,
                }
            }
        }
    };
    ($ty:ty => $variant:ident) => {
        impl Cached for $ty {
            fn into_value(self) -> CacheValue {
                CacheValue::$variant(self)
            }

            fn from_value(value: CacheValue) -> Option<Self> {
                match value {
                    CacheValue::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_cached!(Vec<Product> => Products);
impl_cached!(box Product => Product);
impl_cached!(Vec<ExternalProduct> => ExternalProducts);
impl_cached!(Vec<ExternalSportsProduct> => SportsProducts);
impl_cached!(Vec<CartItem> => CartItems);
impl_cached!(box Order => Order);
impl_cached!(Vec<Order> => Orders);
impl_cached!(Vec<Video> => Videos);
impl_cached!(box Video => Video);
impl_cached!(Vec<Comment> => Comments);
impl_cached!(bool => Flag);
impl_cached!(Vec<ExternalFitnessVideo> => FitnessVideos);
impl_cached!(Vec<Workout> => Workouts);
impl_cached!(Vec<RunningSession> => RunningSessions);
impl_cached!(Vec<FoodEntry> => FoodEntries);
impl_cached!(box FoodEntry => FoodEntry);
impl_cached!(Vec<NewsArticle> => Articles);
impl_cached!(box NewsArticle => Article);
impl_cached!(Vec<ArticleSummary> => Summaries);
impl_cached!(Option<UserProfile> => Profile);
impl_cached!(UserRole => Role);
impl_cached!(Vec<SearchResult> => SearchResults);
impl_cached!(Vec<ExternalSearchResult> => ExternalSearchResults);

// =============================================================================
// Sequencing
// =============================================================================

/// Issued when a fetch starts; required to store its response.
#[derive(Debug)]
pub struct Ticket {
    key: QueryKey,
    seq: u64,
}

impl Ticket {
    /// The key this ticket was issued for.
    #[must_use]
    pub const fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Sequence number; later tickets compare greater.
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }
}

/// Tracks the newest in-flight ticket per key.
///
/// A key has an entry only while a fetch for it is outstanding, so the map
/// stays as small as the number of concurrent fetches. Invalidation and
/// clearing remove entries, which orphans every ticket issued before them.
#[derive(Default)]
struct Sequencer {
    next: u64,
    in_flight: HashMap<QueryKey, u64>,
}

impl Sequencer {
    fn issue(&mut self) -> u64 {
        self.next += 1;
        self.next
    }

    fn is_current(&self, ticket: &Ticket) -> bool {
        self.in_flight.get(&ticket.key) == Some(&ticket.seq)
    }

    fn settle(&mut self, ticket: &Ticket) {
        if self.is_current(ticket) {
            self.in_flight.remove(&ticket.key);
        }
    }
}

// =============================================================================
// QueryCache
// =============================================================================

/// Session-wide cache of query results.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<QueryCacheInner>,
}

struct QueryCacheInner {
    entries: Cache<QueryKey, CacheValue>,
    sequencer: Mutex<Sequencer>,
}

impl QueryCache {
    /// Create a cache holding at most `capacity` entries for `ttl` each.
    #[must_use]
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .support_invalidation_closures()
            .build();

        Self {
            inner: Arc::new(QueryCacheInner {
                entries,
                sequencer: Mutex::new(Sequencer::default()),
            }),
        }
    }

    /// Cached value for `key`, if present and of type `T`.
    pub async fn get<T: Cached>(&self, key: &QueryKey) -> Option<T> {
        let value = self.inner.entries.get(key).await?;
        T::from_value(value)
    }

    /// Whether a live entry exists for `key`.
    #[must_use]
    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.entries.contains_key(key)
    }

    /// Take a ticket for a fetch of `key` that is about to start.
    pub async fn begin(&self, key: QueryKey) -> Ticket {
        let mut sequencer = self.inner.sequencer.lock().await;
        let seq = sequencer.issue();
        sequencer.in_flight.insert(key.clone(), seq);
        Ticket { key, seq }
    }

    /// Store a fetched value if its ticket is still current.
    ///
    /// Returns `false` when the response was stale and discarded.
    pub async fn commit<T: Cached>(&self, ticket: Ticket, value: T) -> bool {
        let mut sequencer = self.inner.sequencer.lock().await;
        if !sequencer.is_current(&ticket) {
            debug!(key = ?ticket.key, seq = ticket.seq, "Discarding stale response");
            return false;
        }
        sequencer.settle(&ticket);
        self.inner
            .entries
            .insert(ticket.key, value.into_value())
            .await;
        drop(sequencer);
        true
    }

    /// Release a ticket whose fetch failed without storing anything.
    pub async fn abandon(&self, ticket: Ticket) {
        self.inner.sequencer.lock().await.settle(&ticket);
    }

    /// Mark the targets stale so the next access refetches.
    pub async fn invalidate(&self, targets: &[InvalidationTarget]) {
        let mut sequencer = self.inner.sequencer.lock().await;
        for target in targets {
            match target {
                InvalidationTarget::Key(key) => {
                    sequencer.in_flight.remove(key);
                    self.inner.entries.invalidate(key).await;
                }
                InvalidationTarget::Kind(kind) => {
                    let kind = *kind;
                    sequencer.in_flight.retain(|key, _| key.kind() != kind);
                    if let Err(e) = self
                        .inner
                        .entries
                        .invalidate_entries_if(move |key, _| key.kind() == kind)
                    {
                        warn!(error = %e, ?kind, "Failed to register kind invalidation");
                    }
                }
            }
            debug!(?target, "Invalidated");
        }
    }

    /// Drop every entry and orphan all in-flight tickets.
    pub async fn clear(&self) {
        let mut sequencer = self.inner.sequencer.lock().await;
        sequencer.in_flight.clear();
        self.inner.entries.invalidate_all();
        self.inner.entries.run_pending_tasks().await;
    }

    /// Approximate live entry count.
    pub async fn entry_count(&self) -> u64 {
        self.inner.entries.run_pending_tasks().await;
        self.inner.entries.entry_count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cache() -> QueryCache {
        QueryCache::new(100, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_commit_then_get() {
        let cache = cache();
        let ticket = cache.begin(QueryKey::IsCallerAdmin).await;
        assert!(cache.commit(ticket, true).await);
        assert_eq!(cache.get::<bool>(&QueryKey::IsCallerAdmin).await, Some(true));
        // Wrong type reads as a miss.
        assert_eq!(cache.get::<UserRole>(&QueryKey::IsCallerAdmin).await, None);
    }

    #[tokio::test]
    async fn test_older_ticket_never_overwrites_newer() {
        let cache = cache();
        let old = cache.begin(QueryKey::CallerRole).await;
        let new = cache.begin(QueryKey::CallerRole).await;
        assert!(new.seq() > old.seq());

        assert!(cache.commit(new, UserRole::Admin).await);
        assert!(!cache.commit(old, UserRole::Guest).await);
        assert_eq!(
            cache.get::<UserRole>(&QueryKey::CallerRole).await,
            Some(UserRole::Admin)
        );
    }

    #[tokio::test]
    async fn test_invalidation_orphans_in_flight_fetch() {
        let cache = cache();
        let ticket = cache.begin(QueryKey::Cart).await;
        cache
            .invalidate(&[InvalidationTarget::Key(QueryKey::Cart)])
            .await;
        assert!(!cache.commit(ticket, vec![CartItem::new(ProductId::new(1), 1)]).await);
        assert!(!cache.contains(&QueryKey::Cart));

        let ticket = cache.begin(QueryKey::Cart).await;
        assert!(cache.commit(ticket, Vec::<CartItem>::new()).await);
    }

    #[tokio::test]
    async fn test_kind_invalidation_hits_every_parameter() {
        let cache = cache();
        for term in ["yoga", "rope"] {
            let key = QueryKey::Products {
                term: term.to_string(),
            };
            let ticket = cache.begin(key).await;
            assert!(cache.commit(ticket, Vec::<Product>::new()).await);
        }
        let ticket = cache.begin(QueryKey::Workouts).await;
        assert!(cache.commit(ticket, Vec::<Workout>::new()).await);

        cache
            .invalidate(&[InvalidationTarget::Kind(QueryKind::Products)])
            .await;

        let yoga = QueryKey::Products {
            term: "yoga".to_string(),
        };
        assert!(cache.get::<Vec<Product>>(&yoga).await.is_none());
        assert!(cache.get::<Vec<Workout>>(&QueryKey::Workouts).await.is_some());

        // Fetches started after the invalidation may store again.
        let ticket = cache.begin(yoga.clone()).await;
        assert!(cache.commit(ticket, Vec::<Product>::new()).await);
        assert!(cache.get::<Vec<Product>>(&yoga).await.is_some());
    }

    #[tokio::test]
    async fn test_settled_keys_leave_no_bookkeeping() {
        let cache = QueryCache::new(10, Duration::from_secs(60));
        for n in 0..500 {
            let ticket = cache.begin(QueryKey::SearchContent(format!("term {n}"))).await;
            if n % 2 == 0 {
                assert!(cache.commit(ticket, Vec::<SearchResult>::new()).await);
            } else {
                cache.abandon(ticket).await;
            }
        }
        cache
            .invalidate(&[InvalidationTarget::Key(QueryKey::Cart)])
            .await;

        assert!(cache.entry_count().await <= 10);
        assert!(cache.inner.sequencer.lock().await.in_flight.is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_ticket_does_not_orphan_newer_fetch() {
        let cache = cache();
        let failed = cache.begin(QueryKey::Workouts).await;
        let retry = cache.begin(QueryKey::Workouts).await;
        cache.abandon(failed).await;
        assert!(cache.commit(retry, Vec::<Workout>::new()).await);
    }

    #[tokio::test]
    async fn test_clear_orphans_tickets() {
        let cache = cache();
        let ticket = cache.begin(QueryKey::UserOrders).await;
        cache.clear().await;
        assert!(!cache.commit(ticket, Vec::<Order>::new()).await);
        assert_eq!(cache.entry_count().await, 0);
    }
}
