//! Read-only partner data: sports products, fitness videos, external search.
//!
//! # Sources
//!
//! Sports products and fitness videos can come from a built-in catalog or
//! from the backend's partner passthrough. Both are behind a trait so the
//! client never cares which one is configured:
//!
//! - [`StaticSportsProducts`] / [`StaticFitnessVideos`] - built-in catalogs
//! - [`BackendSportsProducts`] / [`BackendFitnessVideos`] - raw JSON relayed by
//!   the backend, parsed defensively

pub mod parse;
pub mod sports;
pub mod videos;

use std::sync::Arc;

use async_trait::async_trait;
use fit_amigo_core::{ExternalFitnessVideo, ExternalSportsProduct};

use crate::backend::{Backend, BackendResult};
use crate::config::SourceKind;

/// Supplies sports partner products.
#[async_trait]
pub trait SportsProductSource: Send + Sync {
    /// Products in `category` matching `term`.
    async fn sports_products(
        &self,
        backend: &dyn Backend,
        category: Option<&str>,
        term: Option<&str>,
    ) -> BackendResult<Vec<ExternalSportsProduct>>;
}

/// Supplies partner fitness videos.
#[async_trait]
pub trait FitnessVideoSource: Send + Sync {
    async fn fitness_videos(&self, backend: &dyn Backend)
    -> BackendResult<Vec<ExternalFitnessVideo>>;
}

/// Built-in sports catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSportsProducts;

#[async_trait]
impl SportsProductSource for StaticSportsProducts {
    async fn sports_products(
        &self,
        _backend: &dyn Backend,
        category: Option<&str>,
        term: Option<&str>,
    ) -> BackendResult<Vec<ExternalSportsProduct>> {
        Ok(sports::filter(sports::catalog(), category, term))
    }
}

/// Sports catalog relayed by the backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendSportsProducts;

#[async_trait]
impl SportsProductSource for BackendSportsProducts {
    async fn sports_products(
        &self,
        backend: &dyn Backend,
        category: Option<&str>,
        term: Option<&str>,
    ) -> BackendResult<Vec<ExternalSportsProduct>> {
        let raw = backend.fetch_external_sports_products(category, term).await?;
        Ok(parse::parse_sports_products(&raw))
    }
}

/// Built-in video catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticFitnessVideos;

#[async_trait]
impl FitnessVideoSource for StaticFitnessVideos {
    async fn fitness_videos(
        &self,
        _backend: &dyn Backend,
    ) -> BackendResult<Vec<ExternalFitnessVideo>> {
        Ok(videos::catalog())
    }
}

/// Videos relayed by the backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendFitnessVideos;

#[async_trait]
impl FitnessVideoSource for BackendFitnessVideos {
    async fn fitness_videos(
        &self,
        backend: &dyn Backend,
    ) -> BackendResult<Vec<ExternalFitnessVideo>> {
        let raw = backend.fetch_sports_and_fitness_videos().await?;
        Ok(parse::parse_videos(&raw))
    }
}

/// The sports source selected by configuration.
#[must_use]
pub fn sports_source(kind: SourceKind) -> Arc<dyn SportsProductSource> {
    match kind {
        SourceKind::Static => Arc::new(StaticSportsProducts),
        SourceKind::Backend => Arc::new(BackendSportsProducts),
    }
}

/// The video source selected by configuration.
#[must_use]
pub fn video_source(kind: SourceKind) -> Arc<dyn FitnessVideoSource> {
    match kind {
        SourceKind::Static => Arc::new(StaticFitnessVideos),
        SourceKind::Backend => Arc::new(BackendFitnessVideos),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    #[tokio::test]
    async fn test_backend_source_parses_relay() {
        let backend = MemoryBackend::new();
        backend.set_external_sports_products(
            r#"[{"id": "p1", "name": "Foam Roller", "price": 19.5, "category": "recovery"}]"#,
        );
        let products = sports_source(SourceKind::Backend)
            .sports_products(&backend, None, None)
            .await
            .unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Foam Roller");
    }

    #[tokio::test]
    async fn test_backend_source_tolerates_garbage() {
        let backend = MemoryBackend::new();
        backend.set_external_videos("<html>503</html>");
        let videos = video_source(SourceKind::Backend)
            .fitness_videos(&backend)
            .await
            .unwrap();
        assert!(videos.is_empty());
    }

    #[tokio::test]
    async fn test_static_sources_ignore_backend() {
        let backend = MemoryBackend::new();
        let videos = video_source(SourceKind::Static)
            .fitness_videos(&backend)
            .await
            .unwrap();
        assert_eq!(videos.len(), 16);
        let gear = sports_source(SourceKind::Static)
            .sports_products(&backend, Some("running-gear"), Some("watch"))
            .await
            .unwrap();
        assert_eq!(gear.len(), 1);
    }
}
