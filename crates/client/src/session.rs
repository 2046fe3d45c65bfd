//! Session context: the caller's identity and the lazily-built backend facade.
//!
//! A [`Session`] is created once per process and passed to the client. It is
//! the only place the backend handle lives, so logging out (or switching
//! identity) is a single, well-defined teardown: the facade returns to
//! not-ready and every cached query is dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use fit_amigo_core::Principal;
use secrecy::SecretString;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::backend::{Backend, BackendResult};
use crate::cache::QueryCache;
use crate::error::{ClientError, Result};

// =============================================================================
// Identity
// =============================================================================

/// Who the client acts as.
#[derive(Clone)]
pub struct Identity {
    principal: Principal,
    token: Option<SecretString>,
}

impl Identity {
    /// The anonymous caller.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            principal: Principal::anonymous(),
            token: None,
        }
    }

    /// An authenticated caller with the gateway token proving it.
    #[must_use]
    pub const fn authenticated(principal: Principal, token: Option<SecretString>) -> Self {
        Self { principal, token }
    }

    /// The caller's principal.
    #[must_use]
    pub const fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Bearer token for the gateway, if any.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Whether this is the anonymous caller.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.principal.is_anonymous()
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("principal", &self.principal)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// =============================================================================
// Connector
// =============================================================================

/// Builds a backend handle for an identity.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Create a handle bound to `identity`.
    async fn connect(&self, identity: &Identity) -> BackendResult<Arc<dyn Backend>>;
}

// =============================================================================
// Facade
// =============================================================================

/// Single lazily-initialized handle to the backend.
///
/// Reading the facade never fails: before [`Facade::connect`] completes
/// [`Facade::handle`] is `None`.
pub struct Facade {
    connector: Arc<dyn Connector>,
    handle: RwLock<Option<Arc<dyn Backend>>>,
    fetching: AtomicBool,
    /// Bumped on every reset so a connect racing a logout is discarded.
    generation: AtomicU64,
    connect_lock: Mutex<()>,
}

impl Facade {
    /// Create an unconnected facade.
    #[must_use]
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            handle: RwLock::new(None),
            fetching: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            connect_lock: Mutex::new(()),
        }
    }

    /// True while a handle is being built.
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.fetching.load(Ordering::Acquire)
    }

    /// The backend handle, once connected.
    #[must_use]
    pub fn handle(&self) -> Option<Arc<dyn Backend>> {
        self.handle
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a handle is available and no connect is in flight.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !self.is_fetching() && self.handle().is_some()
    }

    /// Build the handle for `identity` unless one already exists.
    ///
    /// Concurrent callers share one connect. Yields `None` when the facade
    /// was reset while the connect was in flight; that handle is dropped.
    ///
    /// # Errors
    ///
    /// Returns the connector's error; the facade stays not-ready.
    pub async fn connect(&self, identity: &Identity) -> BackendResult<Option<Arc<dyn Backend>>> {
        let _guard = self.connect_lock.lock().await;
        if let Some(handle) = self.handle() {
            return Ok(Some(handle));
        }

        let generation = self.generation.load(Ordering::Acquire);
        self.fetching.store(true, Ordering::Release);
        let result = self.connector.connect(identity).await;
        self.fetching.store(false, Ordering::Release);
        let handle = result?;

        if self.generation.load(Ordering::Acquire) != generation {
            debug!("Facade was reset during connect; handle discarded");
            return Ok(None);
        }
        *self.handle.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&handle));
        Ok(Some(handle))
    }

    /// Drop the handle; the facade is not-ready until the next connect.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        *self.handle.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

// =============================================================================
// Session
// =============================================================================

/// Process-wide client context.
pub struct Session {
    identity: RwLock<Identity>,
    facade: Facade,
    cache: QueryCache,
}

impl Session {
    /// Create an anonymous, unconnected session.
    #[must_use]
    pub fn new(connector: Arc<dyn Connector>, cache: QueryCache) -> Self {
        Self {
            identity: RwLock::new(Identity::anonymous()),
            facade: Facade::new(connector),
            cache,
        }
    }

    /// Connect as `identity`.
    ///
    /// Switching to a different principal tears down the previous handle and
    /// cached data first.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Remote`] if the handle cannot be built, or
    /// [`ClientError::NotReady`] if a logout or identity switch landed while
    /// it was being built.
    #[instrument(skip(self), fields(principal = %identity.principal()))]
    pub async fn connect(&self, identity: Identity) -> Result<()> {
        let switched = {
            let mut current = self
                .identity
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let switched = current.principal() != identity.principal();
            *current = identity.clone();
            switched
        };
        if switched {
            self.facade.reset();
            self.cache.clear().await;
        }

        match self.facade.connect(&identity).await {
            Ok(Some(_)) => {
                info!("Session connected");
                Ok(())
            }
            Ok(None) => {
                warn!("Session was reset during connect");
                Err(ClientError::NotReady)
            }
            Err(e) => {
                warn!(error = %e, "Failed to connect session");
                Err(ClientError::Remote(e))
            }
        }
    }

    /// Log out: back to anonymous, facade not-ready, cache cleared.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        *self
            .identity
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Identity::anonymous();
        self.facade.reset();
        self.cache.clear().await;
        info!("Session logged out");
    }

    /// Current identity.
    #[must_use]
    pub fn identity(&self) -> Identity {
        self.identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current principal.
    #[must_use]
    pub fn principal(&self) -> Principal {
        self.identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .principal()
            .clone()
    }

    /// Whether a non-anonymous identity is set.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self
            .identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_anonymous()
    }

    /// The backend facade.
    #[must_use]
    pub const fn facade(&self) -> &Facade {
        &self.facade
    }

    /// The query cache.
    #[must_use]
    pub const fn cache(&self) -> &QueryCache {
        &self.cache
    }
}
