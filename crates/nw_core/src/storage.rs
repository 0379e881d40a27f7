use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{
    Article, ArticleWithRelations, Author, Category, NewArticle, Source, SourceSeed,
    UserPreference,
};
use crate::Result;

/// Filters applied to the article listing. All fields optional; every article
/// in the result set must satisfy every set field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleFilter {
    /// Exact source slug, or case-insensitive substring of the source name.
    pub source: Option<String>,
    /// Exact category slug, or case-insensitive substring of the category name.
    pub category: Option<String>,
    /// Case-insensitive substring of the author name.
    pub author: Option<String>,
    /// Inclusive lower bound on published_at.
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on published_at.
    pub date_to: Option<DateTime<Utc>>,
    /// Case-insensitive substring across title, description and content.
    pub q: Option<String>,
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn seed_sources(&self, seeds: &[SourceSeed]) -> Result<()>;

    async fn sources(&self) -> Result<Vec<Source>>;

    async fn source_by_slug(&self, slug: &str) -> Result<Option<Source>>;

    async fn mark_source_fetched(&self, source_id: i64, at: DateTime<Utc>) -> Result<()>;

    /// Get-or-create by exact name. Never deletes; dimension rows accumulate.
    async fn get_or_create_author(&self, name: &str) -> Result<Author>;

    /// Get-or-create by exact name; slug is only used on first creation.
    async fn get_or_create_category(&self, name: &str, slug: &str) -> Result<Category>;

    /// Insert-or-update keyed (source_id, external_id). Idempotent.
    async fn upsert_article(&self, article: &NewArticle) -> Result<Article>;

    /// Filtered articles with relations embedded, published_at descending,
    /// undated articles last. The full set; pagination happens upstream.
    async fn search_articles(&self, filter: &ArticleFilter) -> Result<Vec<ArticleWithRelations>>;

    async fn article_by_id(&self, id: i64) -> Result<Option<ArticleWithRelations>>;

    async fn preferences(&self, user_id: i64) -> Result<Option<UserPreference>>;

    async fn save_preferences(&self, prefs: &UserPreference) -> Result<UserPreference>;

    async fn delete_preferences(&self, user_id: i64) -> Result<()>;

    async fn create_token(&self, user_id: i64, token: &str) -> Result<()>;

    async fn user_for_token(&self, token: &str) -> Result<Option<i64>>;
}
