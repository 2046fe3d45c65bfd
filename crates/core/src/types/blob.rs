//! Reference to a large object held by the backend's blob store.
//!
//! A blob is either already hosted (a URL the backend can resolve) or raw
//! bytes about to be uploaded. On the wire the bytes form is base64 encoded.

use core::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use url::Url;

/// A blob reference carried inside entities (video files, product images).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlobRef {
    /// Hosted object reachable by URL.
    Url(Url),
    /// Inline bytes.
    Bytes(#[serde(with = "base64_bytes")] Vec<u8>),
}

impl BlobRef {
    /// Resolve to a URL usable directly by a player or image tag.
    ///
    /// Inline bytes resolve to a `data:` URL.
    #[must_use]
    pub fn direct_url(&self) -> String {
        match self {
            Self::Url(url) => url.to_string(),
            Self::Bytes(bytes) => format!(
                "data:application/octet-stream;base64,{}",
                STANDARD.encode(bytes)
            ),
        }
    }

    /// Size in bytes, when known locally.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Url(_) => None,
            Self::Bytes(bytes) => Some(bytes.len()),
        }
    }

    /// Whether the blob is inline and empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Bytes(bytes) if bytes.is_empty())
    }
}

impl fmt::Debug for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.debug_tuple("Url").field(&url.as_str()).finish(),
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
        }
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
