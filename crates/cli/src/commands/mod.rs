//! Subcommand implementations.
//!
//! Every command takes a connected [`FitAmigoClient`] and writes plain text
//! to the given writer.

pub mod media;
pub mod store;
pub mod trackers;

use std::sync::Arc;

use fit_amigo_client::backend::{HttpConnector, MemoryBackend, MemoryConnector};
use fit_amigo_client::{
    ClientConfig, ClientError, ConfigError, Connector, FitAmigoClient, Identity, QueryCache,
    Session,
};
use fit_amigo_core::Principal;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The client layer failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    /// Argument rejected before any call was made.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Build a session, connect it as `user` and wrap it in a client.
///
/// # Errors
///
/// Returns `CliError::Config` when no backend URL is configured outside
/// in-memory mode, or `CliError::Client` if the connection fails.
pub async fn connect(
    config: &ClientConfig,
    in_memory: bool,
    user: Option<&str>,
) -> Result<FitAmigoClient, CliError> {
    let connector: Arc<dyn Connector> = if in_memory {
        tracing::info!("Using seeded in-memory backend");
        Arc::new(MemoryConnector::new(MemoryBackend::seeded()))
    } else {
        Arc::new(HttpConnector::new(
            config.require_backend_url()?.clone(),
            config.request_timeout,
        ))
    };

    let cache = QueryCache::new(config.cache_capacity, config.cache_ttl);
    let session = Arc::new(Session::new(connector, cache));

    let identity = match user {
        Some(name) => {
            let principal: Principal = name.parse().map_err(CliError::InvalidArgument)?;
            Identity::authenticated(principal, config.identity_token.clone())
        }
        None => Identity::anonymous(),
    };
    session.connect(identity).await?;

    Ok(FitAmigoClient::from_config(session, config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Client over a fresh seeded in-memory backend.
    pub async fn seeded_client(user: Option<&str>) -> FitAmigoClient {
        connect(&ClientConfig::default(), true, user).await.unwrap()
    }

    /// Captured output as a string.
    pub fn text(out: &[u8]) -> String {
        String::from_utf8_lossy(out).into_owned()
    }

    #[tokio::test]
    async fn test_http_mode_requires_backend_url() {
        let err = connect(&ClientConfig::default(), false, None)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, CliError::Config(ConfigError::MissingEnvVar(_))));
    }

    #[tokio::test]
    async fn test_blank_user_is_rejected() {
        let err = connect(&ClientConfig::default(), true, Some("  "))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_in_memory_user_is_authenticated() {
        let client = seeded_client(Some("alice")).await;
        assert!(client.session().is_authenticated());
    }
}
