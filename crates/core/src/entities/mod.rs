//! Backend entities as the client sees them.
//!
//! The backend owns all of these; the client only ever holds transient
//! copies. Field names serialize in camelCase to match the backend contract.

pub mod catalog;
pub mod commerce;
pub mod news;
pub mod profile;
pub mod search;
pub mod tracking;
pub mod video;

pub use catalog::*;
pub use commerce::*;
pub use news::*;
pub use profile::*;
pub use search::*;
pub use tracking::*;
pub use video::*;

/// A payload failed client-side validation before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} {reason}")]
pub struct ValidationError {
    /// Name of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub reason: String,
}

impl ValidationError {
    /// Create a validation error for a field.
    #[must_use]
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
