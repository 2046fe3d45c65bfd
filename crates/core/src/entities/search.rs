//! Content search results and the grouped search page.

use serde::{Deserialize, Serialize};

use crate::types::ContentType;

/// Minimum trimmed length before a search is issued.
pub const MIN_SEARCH_LEN: usize = 2;

/// Whether a raw search input is long enough to query.
#[must_use]
pub fn is_searchable(term: &str) -> bool {
    term.trim().chars().count() >= MIN_SEARCH_LEN
}

/// A hit from the backend's content search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub content_type: ContentType,
    /// Backend id of the hit, as text.
    pub item_id: String,
    pub title: String,
    pub preview_text: String,
}

/// A hit from the external fitness search (read-only projection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSearchResult {
    pub result_type: String,
    pub title: String,
    pub preview: String,
    pub source_url: String,
    pub source_name: String,
}

/// Results sharing a content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchGroup {
    pub content_type: ContentType,
    pub results: Vec<SearchResult>,
}

/// Group results by content type, groups in first-seen order.
#[must_use]
pub fn group_by_content_type(results: Vec<SearchResult>) -> Vec<SearchGroup> {
    let mut groups: Vec<SearchGroup> = Vec::new();
    for result in results {
        match groups
            .iter_mut()
            .find(|g| g.content_type == result.content_type)
        {
            Some(group) => group.results.push(result),
            None => groups.push(SearchGroup {
                content_type: result.content_type,
                results: vec![result],
            }),
        }
    }
    groups
}

/// Everything the search page shows for one settled term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub term: String,
    pub groups: Vec<SearchGroup>,
    pub external: Vec<ExternalSearchResult>,
}

impl SearchPage {
    /// Assemble the page from internal and external hits.
    #[must_use]
    pub fn new(
        term: impl Into<String>,
        internal: Vec<SearchResult>,
        external: Vec<ExternalSearchResult>,
    ) -> Self {
        Self {
            term: term.into(),
            groups: group_by_content_type(internal),
            external,
        }
    }

    /// No hits from either source.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.external.is_empty()
    }

    /// Total hit count across both sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.results.len()).sum::<usize>() + self.external.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(content_type: ContentType, title: &str) -> SearchResult {
        SearchResult {
            content_type,
            item_id: "1".to_string(),
            title: title.to_string(),
            preview_text: String::new(),
        }
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let groups = group_by_content_type(vec![
            hit(ContentType::Video, "Yoga flow"),
            hit(ContentType::Product, "Yoga mat"),
            hit(ContentType::Video, "Yoga for runners"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].content_type, ContentType::Video);
        assert_eq!(groups[0].results.len(), 2);
        assert_eq!(groups[1].content_type, ContentType::Product);
    }

    #[test]
    fn test_search_page_counts() {
        let page = SearchPage::new("yoga", vec![hit(ContentType::Article, "Yoga news")], vec![]);
        assert!(!page.is_empty());
        assert_eq!(page.len(), 1);
        assert!(SearchPage::default().is_empty());
    }

    #[test]
    fn test_is_searchable_trims() {
        assert!(!is_searchable(" a "));
        assert!(is_searchable("ab"));
        assert!(!is_searchable("    "));
    }
}
