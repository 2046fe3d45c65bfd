//! Core types for FIT AMIGO.
//!
//! Type-safe wrappers for identifiers, prices, timestamps, blobs and the
//! backend's classification enums.

pub mod blob;
pub mod id;
pub mod price;
pub mod status;
pub mod time;

pub use blob::BlobRef;
pub use id::*;
pub use price::Price;
pub use status::*;
pub use time::Timestamp;
