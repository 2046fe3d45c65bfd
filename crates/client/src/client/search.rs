//! Content search across internal data and the external fitness index.

use fit_amigo_core::{ExternalSearchResult, SearchPage, SearchResult, is_searchable};
use tracing::{debug, instrument};

use super::{FitAmigoClient, Gate};
use crate::cache::QueryKey;
use crate::external::parse;
use crate::search::{Debouncer, SearchInput, debounce};

impl FitAmigoClient {
    /// A search box wired to the configured debounce period.
    #[must_use]
    pub fn search_input(&self) -> (SearchInput, Debouncer) {
        debounce(self.inner.search_debounce)
    }

    /// Internal hits for `term`. Terms under two characters issue no call.
    #[instrument(skip(self))]
    pub async fn search_content(&self, term: &str) -> Vec<SearchResult> {
        let Some(term) = settled(term) else {
            return Vec::new();
        };
        self.fetch_or_default(
            Gate::Facade,
            QueryKey::SearchContent(term.clone()),
            move |backend| async move { backend.search_content(&term).await },
        )
        .await
    }

    /// External hits for `term`. Terms under two characters issue no call.
    #[instrument(skip(self))]
    pub async fn external_search(&self, term: &str) -> Vec<ExternalSearchResult> {
        let Some(term) = settled(term) else {
            return Vec::new();
        };
        self.fetch_or_default(
            Gate::Facade,
            QueryKey::ExternalSearch(term.clone()),
            move |backend| async move {
                let raw = backend.get_external_fitness_search_results(&term).await?;
                Ok(parse::parse_search(&raw))
            },
        )
        .await
    }

    /// Internal hits grouped by content type, plus external hits.
    #[instrument(skip(self))]
    pub async fn search_page(&self, term: &str) -> SearchPage {
        let (internal, external) =
            tokio::join!(self.search_content(term), self.external_search(term));
        SearchPage::new(term.trim(), internal, external)
    }
}

fn settled(term: &str) -> Option<String> {
    let term = term.trim();
    if is_searchable(term) {
        Some(term.to_string())
    } else {
        debug!("Search term too short; query disabled");
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use fit_amigo_core::ContentType;

    use super::super::tests::connected_as;
    use super::*;
    use crate::backend::{MemoryBackend, MemoryConnector};
    use crate::cache::QueryCache;
    use crate::session::Session;

    #[tokio::test(start_paused = true)]
    async fn test_search_input_uses_configured_quiet_period() {
        let session = Session::new(
            Arc::new(MemoryConnector::new(MemoryBackend::seeded())),
            QueryCache::new(10, Duration::from_secs(60)),
        );
        let client = FitAmigoClient::builder(Arc::new(session))
            .search_debounce(Duration::from_secs(2))
            .build();
        let (input, mut settled) = client.search_input();
        let _open = input.clone();

        let typing = tokio::spawn(async move {
            input.set("yo");
            tokio::time::sleep(Duration::from_millis(1500)).await;
            input.set("yoga");
        });
        let started = tokio::time::Instant::now();
        assert_eq!(settled.next().await.as_deref(), Some("yoga"));
        assert!(started.elapsed() >= Duration::from_millis(3500));
        typing.await.unwrap();
    }

    #[tokio::test]
    async fn test_single_char_term_is_empty() {
        let backend = MemoryBackend::seeded();
        let client = connected_as(&backend, "alice").await;
        assert!(client.search_page(" p ").await.is_empty());
    }

    #[tokio::test]
    async fn test_search_page_groups_results() {
        let backend = MemoryBackend::seeded();
        backend.set_external_search(
            r#"[{"type": "article", "title": "Protein basics", "snippet": "How much?", "source": "Fit Wire"}]"#,
        );
        let client = connected_as(&backend, "alice").await;

        let page = client.search_page("protein").await;
        assert_eq!(page.term, "protein");
        assert!(
            page.groups
                .iter()
                .any(|g| g.content_type == ContentType::Product)
        );
        assert!(
            page.groups
                .iter()
                .any(|g| g.content_type == ContentType::Article)
        );
        assert_eq!(page.external.len(), 1);
        assert_eq!(
            page.external.first().map(|r| r.source_name.as_str()),
            Some("Fit Wire")
        );
    }

    #[tokio::test]
    async fn test_malformed_external_search_is_empty() {
        let backend = MemoryBackend::seeded();
        backend.set_external_search("{\"error\": \"quota\"}");
        let client = connected_as(&backend, "alice").await;
        assert!(client.external_search("running").await.is_empty());
    }
}
