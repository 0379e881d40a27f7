use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One external news provider and its fetch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

/// Seed row for a source, upserted by slug.
#[derive(Debug, Clone)]
pub struct SourceSeed {
    pub name: String,
    pub slug: String,
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub source_id: i64,
    pub category_id: Option<i64>,
    pub author_id: Option<i64>,
    pub external_id: String,
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub language: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub raw: Option<serde_json::Value>,
}

/// Normalized field set for an insert-or-update, keyed (source_id, external_id).
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub source_id: i64,
    pub category_id: Option<i64>,
    pub author_id: Option<i64>,
    pub external_id: String,
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub language: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub raw: Option<serde_json::Value>,
}

/// Article with its relations embedded, the shape served by the read API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleWithRelations {
    #[serde(flatten)]
    pub article: Article,
    pub source: Source,
    pub category: Option<Category>,
    pub author: Option<Author>,
}

/// Per-user ranking hints. Lists are hints only, never filters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserPreference {
    pub user_id: i64,
    pub preferred_sources: Option<Vec<String>>,
    pub preferred_categories: Option<Vec<String>>,
    pub preferred_authors: Option<Vec<String>>,
}

/// Lowercase-hyphenated slug: alphanumeric runs joined by single hyphens.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for c in input.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lc in c.to_lowercase() {
                slug.push(lc);
            }
        } else {
            pending_hyphen = true;
        }
    }
    slug
}
