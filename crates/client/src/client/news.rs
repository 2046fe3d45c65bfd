//! News articles.

use fit_amigo_core::{ArticleId, ArticleSummary, NewsArticle, NewsArticleInput, NewsCategory};
use tracing::instrument;

use super::{FitAmigoClient, Gate, QueryState};
use crate::backend::BackendError;
use crate::cache::QueryKey;
use crate::error::Result;
use crate::invalidation::Mutation;

impl FitAmigoClient {
    /// Articles, optionally restricted to one category.
    #[instrument(skip(self))]
    pub async fn news_articles(&self, category: Option<NewsCategory>) -> Vec<NewsArticle> {
        self.fetch_or_default(
            Gate::Facade,
            QueryKey::NewsArticles { category },
            move |backend| async move { backend.get_all_news_articles(category).await },
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `ClientError::NotFound` for an unknown id, or
    /// `ClientError::Remote` if the call fails.
    #[instrument(skip(self), fields(article_id = %id))]
    pub async fn news_article(&self, id: ArticleId) -> Result<QueryState<NewsArticle>> {
        self.fetch_detail(Gate::Facade, QueryKey::NewsArticle(id), move |backend| async move {
            backend
                .get_news_article(id)
                .await?
                .ok_or_else(|| BackendError::NotFound(format!("article {id}")))
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn article_summaries(&self) -> Vec<ArticleSummary> {
        self.fetch_or_default(Gate::Facade, QueryKey::ArticleSummaries, |backend| async move {
            backend.get_article_summaries().await
        })
        .await
    }

    /// Articles, newest publication date first.
    #[instrument(skip(self))]
    pub async fn articles_by_date(&self) -> Vec<NewsArticle> {
        self.fetch_or_default(Gate::Facade, QueryKey::ArticlesByDate, |backend| async move {
            backend.get_all_articles_sorted_by_publication_date().await
        })
        .await
    }

    // =========================================================================
    // Admin mutations
    // =========================================================================

    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` when an internal article lacks
    /// content or an external one lacks a valid link, or the backend's error.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn add_news_article(&self, input: NewsArticleInput) -> Result<ArticleId> {
        self.check(Mutation::AddNewsArticle, input.validate())?;
        self.mutate(Mutation::AddNewsArticle, move |backend| async move {
            backend.create_news_article(&input).await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` for an invalid payload, or the
    /// backend's error.
    #[instrument(skip(self, input), fields(article_id = %id))]
    pub async fn edit_news_article(&self, id: ArticleId, input: NewsArticleInput) -> Result<()> {
        let mutation = Mutation::EditNewsArticle(id);
        self.check(mutation, input.validate())?;
        self.mutate(mutation, move |backend| async move {
            backend.update_news_article(id, &input).await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns the backend's error.
    #[instrument(skip(self), fields(article_id = %id))]
    pub async fn delete_news_article(&self, id: ArticleId) -> Result<()> {
        self.mutate(Mutation::DeleteNewsArticle(id), move |backend| async move {
            backend.delete_news_article(id).await
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fit_amigo_core::{ArticleType, Principal, Timestamp, UserRole};

    use super::super::tests::connected_as;
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::error::ClientError;

    fn external_article(link: Option<&str>) -> NewsArticleInput {
        NewsArticleInput {
            title: "Marathon season opens".to_string(),
            content: None,
            external_url: link.map(ToString::to_string),
            article_type: ArticleType::External,
            category: NewsCategory::SportsNews,
            author: "Wire".to_string(),
            publication_date: Timestamp::from_nanos(1_700_000_000_000_000_000),
            featured_image_url: None,
        }
    }

    #[tokio::test]
    async fn test_category_filter() {
        let backend = MemoryBackend::seeded();
        let client = connected_as(&backend, "alice").await;
        assert_eq!(client.news_articles(None).await.len(), 2);
        let nutrition = client.news_articles(Some(NewsCategory::Nutrition)).await;
        assert_eq!(nutrition.len(), 1);
        assert_eq!(
            nutrition.first().map(|a| a.title.as_str()),
            Some("Protein Timing Myths")
        );
    }

    #[tokio::test]
    async fn test_external_article_needs_link() {
        let backend = MemoryBackend::seeded();
        let client = connected_as(&backend, "editor").await;
        let err = client
            .add_news_article(external_article(None))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_admin_publish_refreshes_listings() {
        let backend = MemoryBackend::seeded();
        backend.grant_role(&Principal::new("editor"), UserRole::Admin);
        let client = connected_as(&backend, "editor").await;

        assert_eq!(client.article_summaries().await.len(), 2);
        assert_eq!(client.news_articles(None).await.len(), 2);

        let id = client
            .add_news_article(external_article(Some("https://news.example.org/marathon")))
            .await
            .unwrap();
        assert_eq!(client.article_summaries().await.len(), 3);
        assert_eq!(client.news_articles(None).await.len(), 3);

        client.delete_news_article(id).await.unwrap();
        assert_eq!(client.articles_by_date().await.len(), 2);
        assert!(matches!(
            client.news_article(id).await,
            Err(ClientError::NotFound(_))
        ));
    }
}
