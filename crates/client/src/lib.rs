//! FIT AMIGO Client
//!
//! Data-synchronization layer between FIT AMIGO front ends and the backend
//! service.
//!
//! # Architecture
//!
//! - [`Session`] owns the caller's identity, the lazily-connected backend
//!   facade and the query cache
//! - [`FitAmigoClient`] exposes cached, readiness-gated queries and
//!   mutations that invalidate a fixed set of queries on success
//! - [`backend::Backend`] is the remote contract; [`backend::HttpBackend`]
//!   speaks to the gateway, [`backend::MemoryBackend`] stands in for tests
//!   and demos
//! - [`external`] adapts read-only partner catalogs
//!
//! # Example
//!
//! ```rust,ignore
//! let config = ClientConfig::from_env()?;
//! let connector = HttpConnector::new(config.require_backend_url()?.clone(), config.request_timeout);
//! let cache = QueryCache::new(config.cache_capacity, config.cache_ttl);
//! let session = Arc::new(Session::new(Arc::new(connector), cache));
//! session.connect(Identity::authenticated(principal, config.identity_token.clone())).await?;
//!
//! let client = FitAmigoClient::from_config(session, &config);
//! let cart = client.cart_summary().await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod blob;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod external;
pub mod invalidation;
pub mod search;
pub mod session;

pub use blob::ExternalBlob;
pub use cache::{QueryCache, QueryKey, QueryKind};
pub use client::{FitAmigoClient, FitAmigoClientBuilder, Notice, NoticeLevel, Notifier, QueryState};
pub use config::{ClientConfig, ConfigError, SourceKind};
pub use error::{ClientError, Result};
pub use invalidation::{InvalidationTarget, Mutation};
pub use session::{Connector, Facade, Identity, Session};
