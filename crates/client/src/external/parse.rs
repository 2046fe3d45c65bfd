//! Defensive parsing of partner payloads relayed by the backend as raw JSON.
//!
//! Partners disagree on field names, so every field is read from a list of
//! candidate keys and falls back to a fixed default. Anything that is not a
//! JSON array yields an empty list.

use std::str::FromStr;

use fit_amigo_core::{
    ExternalFitnessVideo, ExternalProduct, ExternalSearchResult, ExternalSportsProduct, Price,
};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::error;
use uuid::Uuid;

/// Image shown when a partner product has none.
pub const PLACEHOLDER_IMAGE: &str = "/assets/generated/sports-equipment-placeholder.dim_400x400.png";

/// Parse the general partner store payload.
///
/// Products without a link point at `store_base_url`.
#[must_use]
pub fn parse_products(raw: &str, store_base_url: &str) -> Vec<ExternalProduct> {
    parse_array(raw, "external products")
        .iter()
        .map(|item| ExternalProduct {
            id: text(item, &["id", "_id"]).unwrap_or_else(generated_id),
            name: text(item, &["name", "title"]).unwrap_or_else(|| "Unknown Product".to_string()),
            price: price(item.get("price")),
            image_url: text(item, &["imageUrl", "image"])
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            external_url: text(item, &["externalUrl", "url"])
                .unwrap_or_else(|| store_base_url.to_string()),
        })
        .collect()
}

/// Parse the sports partner catalog payload.
#[must_use]
pub fn parse_sports_products(raw: &str) -> Vec<ExternalSportsProduct> {
    parse_array(raw, "sports products")
        .iter()
        .map(|item| ExternalSportsProduct {
            id: text(item, &["id", "_id"]).unwrap_or_else(generated_id),
            name: text(item, &["name", "title"]).unwrap_or_else(|| "Unknown Product".to_string()),
            description: text(item, &["description"]).unwrap_or_default(),
            price: price(item.get("price")),
            image_url: text(item, &["imageUrl", "image"])
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            category: text(item, &["category"]).unwrap_or_default(),
            external_product_url: text(item, &["externalProductUrl", "externalUrl", "url"])
                .unwrap_or_default(),
        })
        .collect()
}

/// Parse the fitness video payload.
#[must_use]
pub fn parse_videos(raw: &str) -> Vec<ExternalFitnessVideo> {
    parse_array(raw, "fitness videos")
        .iter()
        .map(|item| ExternalFitnessVideo {
            id: text(item, &["id", "_id"]).unwrap_or_else(generated_id),
            title: text(item, &["title", "name"]).unwrap_or_default(),
            description: text(item, &["description"]).unwrap_or_default(),
            thumbnail_url: text(item, &["thumbnailUrl", "thumbnail"]).unwrap_or_default(),
            video_url: text(item, &["videoUrl", "url"]).unwrap_or_default(),
            uploader: text(item, &["uploader", "channel"])
                .unwrap_or_else(|| "Unknown".to_string()),
            view_count: item.get("viewCount").and_then(Value::as_u64),
            duration: item
                .get("duration")
                .and_then(Value::as_u64)
                .and_then(|secs| u32::try_from(secs).ok())
                .unwrap_or(0),
        })
        .collect()
}

/// Parse external search results.
#[must_use]
pub fn parse_search(raw: &str) -> Vec<ExternalSearchResult> {
    parse_array(raw, "external search results")
        .iter()
        .map(|item| ExternalSearchResult {
            result_type: text(item, &["resultType", "type"])
                .unwrap_or_else(|| "general".to_string()),
            title: text(item, &["title"]).unwrap_or_default(),
            preview: text(item, &["preview", "snippet", "description"]).unwrap_or_default(),
            source_url: text(item, &["sourceUrl", "url"]).unwrap_or_default(),
            source_name: text(item, &["source", "sourceName"])
                .unwrap_or_else(|| "External Source".to_string()),
        })
        .collect()
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_array(raw: &str, what: &str) -> Vec<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        Ok(other) => {
            error!(kind = what, found = %json_type(&other), "Expected a JSON array");
            Vec::new()
        }
        Err(e) => {
            error!(
                kind = what,
                error = %e,
                body = %raw.chars().take(500).collect::<String>(),
                "Failed to parse partner payload"
            );
            Vec::new()
        }
    }
}

/// First candidate key holding a non-empty string or a number.
fn text(item: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match item.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// A number or numeric string; anything else, or a negative amount, is zero.
fn price(value: Option<&Value>) -> Price {
    let amount = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_f64().map(|f| Price::from_f64_lossy(f).amount())),
        Some(Value::String(s)) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    };
    amount
        .filter(|d| !d.is_sign_negative())
        .map_or(Price::ZERO, Price::new)
}

fn generated_id() -> String {
    Uuid::new_v4().to_string()
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
