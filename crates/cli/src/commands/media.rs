//! Video, news and search commands.

use std::io::Write;

use fit_amigo_client::FitAmigoClient;
use fit_amigo_core::{FeedEntry, FeedSource, NewsCategory, is_searchable};

use super::CliError;

/// Print the merged FiTube feed.
///
/// # Errors
///
/// Returns an I/O error from the writer.
pub async fn videos(client: &FitAmigoClient, out: &mut impl Write) -> Result<(), CliError> {
    let feed = client.video_feed().await;
    if feed.is_empty() {
        writeln!(out, "No videos.")?;
        return Ok(());
    }
    for entry in &feed {
        let detail = match entry {
            FeedEntry::Uploaded(video) => format!("{} likes", video.like_count),
            FeedEntry::External(video) => format!("{} / {}", video.uploader, video.duration_label()),
        };
        let tag = match entry.source() {
            FeedSource::Uploaded => "fitube",
            FeedSource::External => "partner",
        };
        writeln!(out, "{tag:<8} {}  ({detail})", entry.title())?;
        writeln!(out, "         {}", entry.playable_url())?;
    }
    Ok(())
}

/// Print news articles, newest first.
///
/// # Errors
///
/// Returns an I/O error from the writer.
pub async fn news(
    client: &FitAmigoClient,
    category: Option<NewsCategory>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut articles = client.news_articles(category).await;
    if articles.is_empty() {
        writeln!(out, "No articles.")?;
        return Ok(());
    }
    articles.sort_by(|a, b| b.publication_date.cmp(&a.publication_date));
    for article in &articles {
        writeln!(
            out,
            "[{}] {} - {} ({})",
            article.category.label(),
            article.title,
            article.author,
            article.publication_date.to_datetime().format("%Y-%m-%d")
        )?;
        if let Some(link) = article.read_more_url() {
            writeln!(out, "    {link}")?;
        }
    }
    Ok(())
}

/// Print grouped search results for `term`.
///
/// # Errors
///
/// Returns `CliError::InvalidArgument` for a term under two characters, or an
/// I/O error from the writer.
pub async fn search(client: &FitAmigoClient, term: &str, out: &mut impl Write) -> Result<(), CliError> {
    if !is_searchable(term) {
        return Err(CliError::InvalidArgument(
            "search term must be at least two characters".to_string(),
        ));
    }

    let page = client.search_page(term).await;
    if page.is_empty() {
        writeln!(out, "No results for \"{}\".", page.term)?;
        return Ok(());
    }
    for group in &page.groups {
        writeln!(out, "{}", group.content_type.label())?;
        for hit in &group.results {
            writeln!(out, "  {} - {}", hit.title, hit.preview_text)?;
        }
    }
    if !page.external.is_empty() {
        writeln!(out, "Around the web")?;
        for hit in &page.external {
            writeln!(out, "  {} ({}) {}", hit.title, hit.source_name, hit.source_url)?;
        }
    }
    writeln!(out, "{} results", page.len())?;
    Ok(())
}
