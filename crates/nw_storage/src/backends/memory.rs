use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use nw_core::{
    Article, ArticleFilter, ArticleWithRelations, Author, Category, Error, NewArticle, Result,
    Source, SourceSeed, Storage, UserPreference,
};

use super::matches_filter;

#[derive(Default)]
struct Inner {
    sources: Vec<Source>,
    authors: Vec<Author>,
    categories: Vec<Category>,
    articles: Vec<Article>,
    preferences: HashMap<i64, UserPreference>,
    tokens: HashMap<String, i64>,
    next_source_id: i64,
    next_author_id: i64,
    next_category_id: i64,
    next_article_id: i64,
}

/// In-memory backend. Backs unit and router tests; also usable as an
/// ephemeral store via `--storage memory`.
pub struct MemoryStorage {
    inner: RwLock<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn with_relations(&self, article: &Article) -> ArticleWithRelations {
        let source = self
            .sources
            .iter()
            .find(|s| s.id == article.source_id)
            .cloned()
            .unwrap_or(Source {
                id: article.source_id,
                name: String::new(),
                slug: String::new(),
                api_key: None,
                base_url: String::new(),
                last_fetched_at: None,
            });
        let category = article
            .category_id
            .and_then(|id| self.categories.iter().find(|c| c.id == id).cloned());
        let author = article
            .author_id
            .and_then(|id| self.authors.iter().find(|a| a.id == id).cloned());
        ArticleWithRelations {
            article: article.clone(),
            source,
            category,
            author,
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn seed_sources(&self, seeds: &[SourceSeed]) -> Result<()> {
        let mut inner = self.inner.write().await;
        for seed in seeds {
            if let Some(existing) = inner.sources.iter_mut().find(|s| s.slug == seed.slug) {
                existing.name = seed.name.clone();
                existing.api_key = seed.api_key.clone();
                existing.base_url = seed.base_url.clone();
            } else {
                inner.next_source_id += 1;
                let id = inner.next_source_id;
                inner.sources.push(Source {
                    id,
                    name: seed.name.clone(),
                    slug: seed.slug.clone(),
                    api_key: seed.api_key.clone(),
                    base_url: seed.base_url.clone(),
                    last_fetched_at: None,
                });
            }
        }
        Ok(())
    }

    async fn sources(&self) -> Result<Vec<Source>> {
        Ok(self.inner.read().await.sources.clone())
    }

    async fn source_by_slug(&self, slug: &str) -> Result<Option<Source>> {
        Ok(self
            .inner
            .read()
            .await
            .sources
            .iter()
            .find(|s| s.slug == slug)
            .cloned())
    }

    async fn mark_source_fetched(&self, source_id: i64, at: DateTime<Utc>) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(source) = inner.sources.iter_mut().find(|s| s.id == source_id) {
            source.last_fetched_at = Some(at);
        }
        Ok(())
    }

    async fn get_or_create_author(&self, name: &str) -> Result<Author> {
        let mut inner = self.inner.write().await;
        if let Some(author) = inner.authors.iter().find(|a| a.name == name) {
            return Ok(author.clone());
        }
        inner.next_author_id += 1;
        let author = Author {
            id: inner.next_author_id,
            name: name.to_string(),
        };
        inner.authors.push(author.clone());
        Ok(author)
    }

    async fn get_or_create_category(&self, name: &str, slug: &str) -> Result<Category> {
        let mut inner = self.inner.write().await;
        if let Some(category) = inner.categories.iter().find(|c| c.name == name) {
            return Ok(category.clone());
        }
        inner.next_category_id += 1;
        let category = Category {
            id: inner.next_category_id,
            name: name.to_string(),
            slug: slug.to_string(),
        };
        inner.categories.push(category.clone());
        Ok(category)
    }

    async fn upsert_article(&self, article: &NewArticle) -> Result<Article> {
        let mut inner = self.inner.write().await;

        let url_taken = inner.articles.iter().any(|a| {
            a.url == article.url
                && (a.source_id != article.source_id || a.external_id != article.external_id)
        });
        if url_taken {
            return Err(Error::Database(format!(
                "url already exists: {}",
                article.url
            )));
        }

        if let Some(existing) = inner
            .articles
            .iter_mut()
            .find(|a| a.source_id == article.source_id && a.external_id == article.external_id)
        {
            existing.category_id = article.category_id;
            existing.author_id = article.author_id;
            existing.title = article.title.clone();
            existing.slug = article.slug.clone();
            existing.description = article.description.clone();
            existing.content = article.content.clone();
            existing.url = article.url.clone();
            existing.image_url = article.image_url.clone();
            existing.language = article.language.clone();
            existing.published_at = article.published_at;
            existing.raw = article.raw.clone();
            return Ok(existing.clone());
        }

        inner.next_article_id += 1;
        let stored = Article {
            id: inner.next_article_id,
            source_id: article.source_id,
            category_id: article.category_id,
            author_id: article.author_id,
            external_id: article.external_id.clone(),
            title: article.title.clone(),
            slug: article.slug.clone(),
            description: article.description.clone(),
            content: article.content.clone(),
            url: article.url.clone(),
            image_url: article.image_url.clone(),
            language: article.language.clone(),
            published_at: article.published_at,
            raw: article.raw.clone(),
        };
        inner.articles.push(stored.clone());
        Ok(stored)
    }

    async fn search_articles(&self, filter: &ArticleFilter) -> Result<Vec<ArticleWithRelations>> {
        let inner = self.inner.read().await;
        let mut results: Vec<ArticleWithRelations> = inner
            .articles
            .iter()
            .map(|a| inner.with_relations(a))
            .filter(|a| matches_filter(a, filter))
            .collect();
        // Newest first; None < Some, so undated articles land at the end.
        results.sort_by(|a, b| b.article.published_at.cmp(&a.article.published_at));
        Ok(results)
    }

    async fn article_by_id(&self, id: i64) -> Result<Option<ArticleWithRelations>> {
        let inner = self.inner.read().await;
        Ok(inner
            .articles
            .iter()
            .find(|a| a.id == id)
            .map(|a| inner.with_relations(a)))
    }

    async fn preferences(&self, user_id: i64) -> Result<Option<UserPreference>> {
        Ok(self.inner.read().await.preferences.get(&user_id).cloned())
    }

    async fn save_preferences(&self, prefs: &UserPreference) -> Result<UserPreference> {
        let mut inner = self.inner.write().await;
        inner.preferences.insert(prefs.user_id, prefs.clone());
        Ok(prefs.clone())
    }

    async fn delete_preferences(&self, user_id: i64) -> Result<()> {
        self.inner.write().await.preferences.remove(&user_id);
        Ok(())
    }

    async fn create_token(&self, user_id: i64, token: &str) -> Result<()> {
        self.inner
            .write()
            .await
            .tokens
            .insert(token.to_string(), user_id);
        Ok(())
    }

    async fn user_for_token(&self, token: &str) -> Result<Option<i64>> {
        Ok(self.inner.read().await.tokens.get(token).copied())
    }
}
