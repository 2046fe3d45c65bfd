//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (HTTP backend only)
//! - `FIT_AMIGO_BACKEND_URL` - Base URL of the backend gateway
//!
//! ## Optional
//! - `FIT_AMIGO_IDENTITY_TOKEN` - Bearer token for the gateway (high entropy)
//! - `FIT_AMIGO_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 30)
//! - `FIT_AMIGO_CACHE_CAPACITY` - Maximum cached queries (default: 1000)
//! - `FIT_AMIGO_CACHE_TTL_SECS` - Cached query lifetime (default: 300)
//! - `FIT_AMIGO_TAX_RATE` - Cart tax rate (default: 0.10)
//! - `FIT_AMIGO_SEARCH_DEBOUNCE_MS` - Search input quiet period (default: 300)
//! - `GO_STORE_API_URL` - Go-store base URL; enables external products
//! - `FIT_AMIGO_SPORTS_SOURCE` - `static` or `backend` (default: static)
//! - `FIT_AMIGO_VIDEO_SOURCE` - `static` or `backend` (default: static)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Where mock-able external data comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceKind {
    /// Built-in static catalog.
    #[default]
    Static,
    /// Backend passthrough returning raw JSON.
    Backend,
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "backend" => Ok(Self::Backend),
            other => Err(format!("expected 'static' or 'backend', got '{other}'")),
        }
    }
}

/// FIT AMIGO client configuration.
///
/// Implements `Debug` manually to redact the identity token.
#[derive(Clone)]
pub struct ClientConfig {
    /// Backend gateway base URL
    pub backend_url: Option<Url>,
    /// Bearer token for the gateway
    pub identity_token: Option<SecretString>,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// Maximum number of cached queries
    pub cache_capacity: u64,
    /// Lifetime of a cached query
    pub cache_ttl: Duration,
    /// Tax rate applied to the cart subtotal
    pub tax_rate: Decimal,
    /// Quiet period before a search term settles
    pub search_debounce: Duration,
    /// Go-store base URL
    pub go_store_url: Option<Url>,
    /// Source of sports products
    pub sports_source: SourceKind,
    /// Source of fitness videos
    pub video_source: SourceKind,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            identity_token: None,
            request_timeout: Duration::from_secs(30),
            cache_capacity: 1000,
            cache_ttl: Duration::from_secs(300),
            tax_rate: Decimal::new(10, 2),
            search_debounce: Duration::from_millis(300),
            go_store_url: None,
            sports_source: SourceKind::Static,
            video_source: SourceKind::Static,
            sentry_dsn: None,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("backend_url", &self.backend_url.as_ref().map(Url::as_str))
            .field(
                "identity_token",
                &self.identity_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("request_timeout", &self.request_timeout)
            .field("cache_capacity", &self.cache_capacity)
            .field("cache_ttl", &self.cache_ttl)
            .field("tax_rate", &self.tax_rate)
            .field("search_debounce", &self.search_debounce)
            .field("go_store_url", &self.go_store_url.as_ref().map(Url::as_str))
            .field("sports_source", &self.sports_source)
            .field("video_source", &self.video_source)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid or the identity token
    /// fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend_url = get_optional_url("FIT_AMIGO_BACKEND_URL")?;
        let identity_token = get_optional_validated_secret("FIT_AMIGO_IDENTITY_TOKEN")?;
        let request_timeout =
            Duration::from_secs(get_parsed_or_default("FIT_AMIGO_REQUEST_TIMEOUT_SECS", 30)?);
        let cache_capacity = get_parsed_or_default("FIT_AMIGO_CACHE_CAPACITY", 1000)?;
        let cache_ttl = Duration::from_secs(get_parsed_or_default("FIT_AMIGO_CACHE_TTL_SECS", 300)?);
        let tax_rate = get_parsed_or_default("FIT_AMIGO_TAX_RATE", Decimal::new(10, 2))?;
        if tax_rate.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar(
                "FIT_AMIGO_TAX_RATE".to_string(),
                "must not be negative".to_string(),
            ));
        }
        let search_debounce =
            Duration::from_millis(get_parsed_or_default("FIT_AMIGO_SEARCH_DEBOUNCE_MS", 300)?);
        let go_store_url = get_optional_url("GO_STORE_API_URL")?;
        let sports_source = get_parsed_or_default("FIT_AMIGO_SPORTS_SOURCE", SourceKind::Static)?;
        let video_source = get_parsed_or_default("FIT_AMIGO_VIDEO_SOURCE", SourceKind::Static)?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            backend_url,
            identity_token,
            request_timeout,
            cache_capacity,
            cache_ttl,
            tax_rate,
            search_debounce,
            go_store_url,
            sports_source,
            video_source,
            sentry_dsn,
        })
    }

    /// The backend URL, required when talking to a real gateway.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` when `FIT_AMIGO_BACKEND_URL` is unset.
    pub fn require_backend_url(&self) -> Result<&Url, ConfigError> {
        self.backend_url
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("FIT_AMIGO_BACKEND_URL".to_string()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, falling back to a default when unset.
fn get_parsed_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Get an optional environment variable as an absolute URL.
fn get_optional_url(key: &str) -> Result<Option<Url>, ConfigError> {
    get_optional_env(key)
        .map(|raw| {
            Url::parse(raw.trim())
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the token issued by the gateway."
            ),
        ));
    }

    Ok(())
}

/// Load and validate an optional secret from environment.
fn get_optional_validated_secret(key: &str) -> Result<Option<SecretString>, ConfigError> {
    get_optional_env(key)
        .map(|value| {
            validate_secret_strength(&value, key)?;
            Ok(SecretString::from(value))
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("your-token-here", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let err = validate_secret_strength("abababababababababab", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("tK9$vQ2!mZ7@hL4#wR8&", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_source_kind_parsing() {
        assert_eq!("static".parse::<SourceKind>().unwrap(), SourceKind::Static);
        assert_eq!(" Backend ".parse::<SourceKind>().unwrap(), SourceKind::Backend);
        assert!("mock".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.cache_capacity, 1000);
        assert_eq!(config.tax_rate, Decimal::new(10, 2));
        assert_eq!(config.search_debounce, Duration::from_millis(300));
        assert!(config.require_backend_url().is_err());
    }

    #[test]
    fn test_config_debug_redacts_token() {
        let config = ClientConfig {
            backend_url: Some(Url::parse("https://gateway.fitamigo.app").unwrap()),
            identity_token: Some(SecretString::from("tK9$vQ2!mZ7@hL4#wR8&")),
            ..ClientConfig::default()
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("gateway.fitamigo.app"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("tK9$vQ2"));
    }
}
