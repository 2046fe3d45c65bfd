//! Query and mutation layer over the session's backend facade.
//!
//! # Queries
//!
//! Every read goes through one of three policies:
//!
//! - collection reads: disabled or failed reads yield the type's default
//!   (empty list, `false`, guest role) and never error
//! - detail reads: disabled reads yield [`QueryState::Disabled`], failures
//!   propagate as [`ClientError`]
//! - search reads: like collections, plus a minimum term length
//!
//! A cache miss issues exactly one backend call. The result is cached under
//! its [`QueryKey`] only if the fetch's ticket is still current when it
//! resolves.
//!
//! # Mutations
//!
//! Exactly one backend call. On success the mutation's invalidation set is
//! applied; on failure the error is logged, reported to the [`Notifier`] and
//! returned unchanged.

mod cart;
mod catalog;
mod identity;
mod news;
mod search;
mod tracking;
mod video;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use fit_amigo_core::ValidationError;
use rust_decimal::Decimal;
use tracing::{debug, error, warn};
use url::Url;

use crate::backend::{Backend, BackendError, BackendResult};
use crate::cache::{Cached, QueryKey};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::external::{self, FitnessVideoSource, SportsProductSource};
use crate::invalidation::Mutation;
use crate::session::Session;

// =============================================================================
// QueryState
// =============================================================================

/// Outcome of a detail query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState<T> {
    /// Readiness signals do not hold; nothing was fetched.
    Disabled,
    /// Data loaded (from cache or backend).
    Ready(T),
}

impl<T> QueryState<T> {
    /// Whether data is available.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The data, if loaded.
    #[must_use]
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Disabled => None,
        }
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient user-facing notification about a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    /// Name of the mutation, e.g. `add_to_cart`.
    pub mutation: &'static str,
    pub message: String,
}

/// Receives mutation outcomes for display.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

// =============================================================================
// FitAmigoClient
// =============================================================================

/// Which readiness signals a query waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    /// Facade connected.
    Facade,
    /// Facade connected and caller not anonymous.
    Identity,
}

/// FIT AMIGO data client.
///
/// Cheap to clone; clones share the session, cache and sources.
#[derive(Clone)]
pub struct FitAmigoClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    session: Arc<Session>,
    sports: Arc<dyn SportsProductSource>,
    videos: Arc<dyn FitnessVideoSource>,
    tax_rate: Decimal,
    search_debounce: Duration,
    go_store_url: Option<Url>,
    notifier: Option<Arc<dyn Notifier>>,
}

/// Builder for [`FitAmigoClient`].
pub struct FitAmigoClientBuilder {
    session: Arc<Session>,
    sports: Arc<dyn SportsProductSource>,
    videos: Arc<dyn FitnessVideoSource>,
    tax_rate: Decimal,
    search_debounce: Duration,
    go_store_url: Option<Url>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl FitAmigoClientBuilder {
    /// Override the sports product source.
    #[must_use]
    pub fn sports_source(mut self, source: Arc<dyn SportsProductSource>) -> Self {
        self.sports = source;
        self
    }

    /// Override the fitness video source.
    #[must_use]
    pub fn video_source(mut self, source: Arc<dyn FitnessVideoSource>) -> Self {
        self.videos = source;
        self
    }

    /// Tax rate applied to the cart subtotal.
    #[must_use]
    pub const fn tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = rate;
        self
    }

    /// Quiet period for [`FitAmigoClient::search_input`].
    #[must_use]
    pub const fn search_debounce(mut self, quiet: Duration) -> Self {
        self.search_debounce = quiet;
        self
    }

    /// Enable external products from the go-store.
    #[must_use]
    pub fn go_store_url(mut self, url: Option<Url>) -> Self {
        self.go_store_url = url;
        self
    }

    /// Receive mutation notices.
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[must_use]
    pub fn build(self) -> FitAmigoClient {
        FitAmigoClient {
            inner: Arc::new(ClientInner {
                session: self.session,
                sports: self.sports,
                videos: self.videos,
                tax_rate: self.tax_rate,
                search_debounce: self.search_debounce,
                go_store_url: self.go_store_url,
                notifier: self.notifier,
            }),
        }
    }
}

impl FitAmigoClient {
    /// Start building a client over `session`.
    ///
    /// Defaults: static partner catalogs, 10% tax, no go-store.
    #[must_use]
    pub fn builder(session: Arc<Session>) -> FitAmigoClientBuilder {
        FitAmigoClientBuilder {
            session,
            sports: Arc::new(external::StaticSportsProducts),
            videos: Arc::new(external::StaticFitnessVideos),
            tax_rate: Decimal::new(10, 2),
            search_debounce: crate::search::DEFAULT_DEBOUNCE,
            go_store_url: None,
            notifier: None,
        }
    }

    /// Client configured from [`ClientConfig`].
    #[must_use]
    pub fn from_config(session: Arc<Session>, config: &ClientConfig) -> Self {
        Self::builder(session)
            .sports_source(external::sports_source(config.sports_source))
            .video_source(external::video_source(config.video_source))
            .tax_rate(config.tax_rate)
            .search_debounce(config.search_debounce)
            .go_store_url(config.go_store_url.clone())
            .build()
    }

    /// The session this client reads through.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    // =========================================================================
    // Readiness
    // =========================================================================

    /// The backend handle if the facade is connected and idle.
    fn ready_backend(&self) -> Option<Arc<dyn Backend>> {
        let facade = self.inner.session.facade();
        if facade.is_fetching() {
            return None;
        }
        facade.handle()
    }

    fn enabled(&self, gate: Gate) -> Option<Arc<dyn Backend>> {
        let backend = self.ready_backend()?;
        match gate {
            Gate::Facade => Some(backend),
            Gate::Identity => self.inner.session.is_authenticated().then_some(backend),
        }
    }

    // =========================================================================
    // Query policies
    // =========================================================================

    /// Cached read: one backend call on miss, committed under a ticket.
    async fn fetch<T, F, Fut>(
        &self,
        backend: Arc<dyn Backend>,
        key: QueryKey,
        load: F,
    ) -> BackendResult<T>
    where
        T: Cached,
        F: FnOnce(Arc<dyn Backend>) -> Fut + Send,
        Fut: Future<Output = BackendResult<T>> + Send,
    {
        let cache = self.inner.session.cache();
        if let Some(hit) = cache.get::<T>(&key).await {
            debug!(?key, "Cache hit");
            return Ok(hit);
        }

        let ticket = cache.begin(key).await;
        match load(backend).await {
            Ok(value) => {
                cache.commit(ticket, value.clone()).await;
                Ok(value)
            }
            Err(e) => {
                cache.abandon(ticket).await;
                Err(e)
            }
        }
    }

    /// Collection policy: default when disabled or failed.
    async fn fetch_or_default<T, F, Fut>(&self, gate: Gate, key: QueryKey, load: F) -> T
    where
        T: Cached + Default,
        F: FnOnce(Arc<dyn Backend>) -> Fut + Send,
        Fut: Future<Output = BackendResult<T>> + Send,
    {
        let Some(backend) = self.enabled(gate) else {
            debug!(?key, "Query disabled");
            return T::default();
        };
        let key_for_log = key.clone();
        match self.fetch(backend, key, load).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key = ?key_for_log, error = %e, "Query failed; using empty result");
                T::default()
            }
        }
    }

    /// Detail policy: disabled when not ready, loud on failure.
    async fn fetch_detail<T, F, Fut>(
        &self,
        gate: Gate,
        key: QueryKey,
        load: F,
    ) -> Result<QueryState<T>>
    where
        T: Cached,
        F: FnOnce(Arc<dyn Backend>) -> Fut + Send,
        Fut: Future<Output = BackendResult<T>> + Send,
    {
        let Some(backend) = self.enabled(gate) else {
            return Ok(QueryState::Disabled);
        };
        match self.fetch(backend, key, load).await {
            Ok(value) => Ok(QueryState::Ready(value)),
            Err(BackendError::NotFound(what)) => Err(ClientError::NotFound(what)),
            Err(e) => Err(ClientError::Remote(e)),
        }
    }

    // =========================================================================
    // Mutation policy
    // =========================================================================

    /// One backend call; invalidate on success, log and notify on failure.
    async fn mutate<T, F, Fut>(&self, mutation: Mutation, call: F) -> Result<T>
    where
        F: FnOnce(Arc<dyn Backend>) -> Fut + Send,
        Fut: Future<Output = BackendResult<T>> + Send,
    {
        let Some(backend) = self.ready_backend() else {
            return Err(self.failed(mutation, ClientError::NotReady));
        };

        match call(backend).await {
            Ok(value) => {
                self.inner
                    .session
                    .cache()
                    .invalidate(&mutation.invalidates())
                    .await;
                debug!(mutation = mutation.name(), "Mutation succeeded");
                self.notice(NoticeLevel::Success, mutation, "Saved".to_string());
                Ok(value)
            }
            Err(e) => Err(self.failed(mutation, ClientError::Remote(e))),
        }
    }

    /// Reject a payload before any call is made.
    fn check(&self, mutation: Mutation, validation: Result<(), ValidationError>) -> Result<()> {
        validation.map_err(|e| self.failed(mutation, e.into()))
    }

    fn failed(&self, mutation: Mutation, err: ClientError) -> ClientError {
        error!(mutation = mutation.name(), error = %err, "Mutation failed");
        self.notice(NoticeLevel::Error, mutation, err.to_string());
        err
    }

    fn notice(&self, level: NoticeLevel, mutation: Mutation, message: String) {
        if let Some(notifier) = &self.inner.notifier {
            notifier.notify(Notice {
                level,
                mutation: mutation.name(),
                message,
            });
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use fit_amigo_core::Principal;

    use super::*;
    use crate::backend::{MemoryBackend, MemoryConnector};
    use crate::cache::QueryCache;
    use crate::session::Identity;

    #[derive(Default)]
    pub struct RecordingNotifier {
        pub notices: Mutex<Vec<Notice>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: Notice) {
            self.notices.lock().unwrap().push(notice);
        }
    }

    /// Client over a seeded in-memory backend, not yet connected.
    pub fn client_over(backend: &MemoryBackend) -> FitAmigoClient {
        let session = Session::new(
            Arc::new(MemoryConnector::new(backend.clone())),
            QueryCache::new(1000, Duration::from_secs(300)),
        );
        FitAmigoClient::builder(Arc::new(session)).build()
    }

    pub async fn connected_as(backend: &MemoryBackend, user: &str) -> FitAmigoClient {
        let client = client_over(backend);
        client
            .session()
            .connect(Identity::authenticated(Principal::new(user), None))
            .await
            .unwrap();
        client
    }

    #[tokio::test]
    async fn test_mutation_without_facade_is_not_ready() {
        let backend = MemoryBackend::seeded();
        let notifier = Arc::new(RecordingNotifier::default());
        let session = Session::new(
            Arc::new(MemoryConnector::new(backend)),
            QueryCache::new(10, Duration::from_secs(60)),
        );
        let client = FitAmigoClient::builder(Arc::new(session))
            .notifier(notifier.clone())
            .build();

        let err = client.log_workout(fit_amigo_core::Workout {
            exercise_name: "Squat".to_string(),
            sets: 3,
            reps: 5,
            weight: 100,
        });
        assert!(matches!(err.await, Err(ClientError::NotReady)));

        let notices = notifier.notices.lock().unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].mutation, "log_workout");
    }

    #[tokio::test]
    async fn test_detail_query_disabled_before_connect() {
        let backend = MemoryBackend::seeded();
        let client = client_over(&backend);
        let state = client
            .product(fit_amigo_core::ProductId::new(1))
            .await
            .unwrap();
        assert_eq!(state, QueryState::Disabled);
    }

    #[test]
    fn test_query_state_accessors() {
        assert!(QueryState::Ready(3).is_ready());
        assert_eq!(QueryState::Ready(3).ready(), Some(3));
        assert_eq!(QueryState::<u8>::Disabled.ready(), None);
    }
}
