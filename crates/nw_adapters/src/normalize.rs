//! Shared normalization step: resolve dimension rows, derive the slug, parse
//! the provider date, and upsert exactly one article row per input record.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use nw_core::types::slugify;
use nw_core::{Article, NewArticle, Result, Source, Storage};

use crate::RawArticle;

const UNKNOWN_AUTHOR: &str = "Unknown Author";
const DEFAULT_CATEGORY: &str = "General";
const DEFAULT_TITLE: &str = "No Title";

/// Provider date string to a canonical UTC timestamp. None when absent or
/// unparseable.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Normalize and upsert one raw record. Author and category rows are
/// get-or-create by exact name, so they are created at most once per distinct
/// name no matter how many records or runs mention them.
pub async fn ingest(storage: &dyn Storage, source: &Source, raw: RawArticle) -> Result<Article> {
    let author_name = raw.author.as_deref().unwrap_or(UNKNOWN_AUTHOR);
    let author = storage.get_or_create_author(author_name).await?;

    let category_name = raw
        .category
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(DEFAULT_CATEGORY);
    let category = storage
        .get_or_create_category(category_name, &slugify(category_name))
        .await?;

    let slug = raw.title.as_deref().map(slugify);
    let published_at = raw.published_at.as_deref().and_then(parse_datetime);

    storage
        .upsert_article(&NewArticle {
            source_id: source.id,
            category_id: Some(category.id),
            author_id: Some(author.id),
            external_id: raw.external_id,
            title: raw.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            slug,
            description: raw.description,
            content: raw.content,
            url: raw.url,
            image_url: raw.image_url,
            language: raw.language,
            published_at,
            raw: Some(raw.payload),
        })
        .await
}
