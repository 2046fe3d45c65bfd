//! FIT AMIGO Core - shared types and entities.
//!
//! This crate provides the types used across all FIT AMIGO components:
//! - `client` - the data-sync layer (backend facade, query cache, mutations)
//! - `cli` - command-line tool for browsing the platform
//!
//! # Architecture
//!
//! The core crate contains only types, entities and pure derived views - no
//! I/O, no HTTP clients, no caching. Anything here can be computed from data
//! the backend already returned.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, timestamps, blobs and statuses
//! - [`entities`] - Backend entities plus cart, store, search and tracker views

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod entities;
pub mod types;

pub use entities::*;
pub use types::*;
