//! News articles.

use serde::{Deserialize, Serialize};

use super::ValidationError;
use crate::types::{ArticleId, ArticleType, NewsCategory, Principal, Timestamp};

/// A published news article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: ArticleId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    pub article_type: ArticleType,
    pub category: NewsCategory,
    pub author: String,
    pub publication_date: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image_url: Option<String>,
    pub creator_user_id: Principal,
    pub creation_timestamp: Timestamp,
}

impl NewsArticle {
    /// Build the stored article from an input.
    #[must_use]
    pub fn from_input(
        id: ArticleId,
        input: NewsArticleInput,
        creator_user_id: Principal,
        creation_timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            title: input.title,
            content: input.content,
            external_url: input.external_url,
            article_type: input.article_type,
            category: input.category,
            author: input.author,
            publication_date: input.publication_date,
            featured_image_url: input.featured_image_url,
            creator_user_id,
            creation_timestamp,
        }
    }

    /// Listing projection.
    #[must_use]
    pub fn summary(&self) -> ArticleSummary {
        ArticleSummary {
            id: self.id,
            title: self.title.clone(),
            category: self.category,
            author: self.author.clone(),
            publication_date: self.publication_date,
        }
    }

    /// Where a reader should be sent: the external link for external articles.
    #[must_use]
    pub fn read_more_url(&self) -> Option<&str> {
        match self.article_type {
            ArticleType::External => self.external_url.as_deref(),
            ArticleType::Internal => None,
        }
    }
}

/// Payload for creating or editing an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticleInput {
    pub title: String,
    pub content: Option<String>,
    pub external_url: Option<String>,
    pub article_type: ArticleType,
    pub category: NewsCategory,
    pub author: String,
    pub publication_date: Timestamp,
    pub featured_image_url: Option<String>,
}

impl NewsArticleInput {
    /// Check the fields the article editor requires.
    ///
    /// Internal articles need body content; external ones need a link.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::new("title", "cannot be empty"));
        }
        if self.author.trim().is_empty() {
            return Err(ValidationError::new("author", "cannot be empty"));
        }
        match self.article_type {
            ArticleType::Internal => {
                if self.content.as_deref().is_none_or(|c| c.trim().is_empty()) {
                    return Err(ValidationError::new(
                        "content",
                        "is required for internal articles",
                    ));
                }
            }
            ArticleType::External => {
                let Some(link) = self.external_url.as_deref() else {
                    return Err(ValidationError::new(
                        "externalUrl",
                        "is required for external articles",
                    ));
                };
                if url::Url::parse(link.trim()).is_err() {
                    return Err(ValidationError::new("externalUrl", "must be a valid URL"));
                }
            }
        }
        Ok(())
    }
}

/// Lightweight article listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: ArticleId,
    pub title: String,
    pub category: NewsCategory,
    pub author: String,
    pub publication_date: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(article_type: ArticleType) -> NewsArticleInput {
        NewsArticleInput {
            title: "Five tips for better sleep".to_string(),
            content: None,
            external_url: None,
            article_type,
            category: NewsCategory::MentalHealth,
            author: "Coach Kim".to_string(),
            publication_date: Timestamp::from_nanos(42),
            featured_image_url: None,
        }
    }

    #[test]
    fn test_internal_article_requires_content() {
        let mut article = input(ArticleType::Internal);
        assert_eq!(article.validate().map_err(|e| e.field), Err("content"));
        article.content = Some("  ".to_string());
        assert!(article.validate().is_err());
        article.content = Some("Sleep at least seven hours.".to_string());
        assert!(article.validate().is_ok());
    }

    #[test]
    fn test_external_article_requires_valid_link() {
        let mut article = input(ArticleType::External);
        assert_eq!(article.validate().map_err(|e| e.field), Err("externalUrl"));
        article.external_url = Some("not a url".to_string());
        assert!(article.validate().is_err());
        article.external_url = Some("https://news.example.com/sleep".to_string());
        assert!(article.validate().is_ok());
    }

    #[test]
    fn test_summary_and_read_more_link() {
        let mut source = input(ArticleType::External);
        source.external_url = Some("https://news.example.com/sleep".to_string());
        let article = NewsArticle::from_input(
            ArticleId::new(7),
            source,
            Principal::new("editor"),
            Timestamp::from_nanos(50),
        );
        let summary = article.summary();
        assert_eq!(summary.id, ArticleId::new(7));
        assert_eq!(summary.publication_date, Timestamp::from_nanos(42));
        assert_eq!(article.read_more_url(), Some("https://news.example.com/sleep"));
    }
}
