//! Newtype IDs for backend entity references.
//!
//! The backend hands out unsigned 64-bit identifiers for every entity kind.
//! Wrapping them keeps a `VideoId` from being passed where a `ProductId` is
//! expected.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `u64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_u64()`
/// - `From<u64>`, `Into<u64>`, `Display` and `FromStr`
///
/// # Example
///
/// ```rust
/// # use fit_amigo_core::define_id;
/// define_id!(PlaylistId);
/// define_id!(TrackId);
///
/// let playlist = PlaylistId::new(1);
/// let track = TrackId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: PlaylistId = track;
/// # let _ = (playlist, track);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Create a new ID from a u64 value.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the underlying u64 value.
            #[must_use]
            pub const fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<u64>().map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(OrderId);
define_id!(VideoId);
define_id!(CommentId);
define_id!(RunId);
define_id!(FoodEntryId);
define_id!(ArticleId);

/// Identity of a caller on the backend (a textual principal).
///
/// The anonymous principal is `"2vxsx-fae"`; the client never treats it as an
/// authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Textual form of the anonymous principal.
    pub const ANONYMOUS: &'static str = "2vxsx-fae";

    /// Create a principal from its textual form.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The anonymous principal.
    #[must_use]
    pub fn anonymous() -> Self {
        Self(Self::ANONYMOUS.to_string())
    }

    /// Whether this is the anonymous principal.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0 == Self::ANONYMOUS
    }

    /// Textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Principal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("principal cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip_through_string() {
        let id: ProductId = " 42 ".parse().unwrap();
        assert_eq!(id, ProductId::new(42));
        assert_eq!(id.to_string(), "42");
        assert_eq!(u64::from(id), 42);
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&VideoId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_principal_anonymous() {
        assert!(Principal::anonymous().is_anonymous());
        assert!(!Principal::new("aaaaa-aa").is_anonymous());
        assert!("   ".parse::<Principal>().is_err());
    }
}
