use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};

use nw_core::{
    Article, ArticleFilter, ArticleWithRelations, Author, Category, Error, NewArticle, Result,
    Source, SourceSeed, Storage, UserPreference,
};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS sources (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        api_key TEXT,
        base_url TEXT NOT NULL,
        last_fetched_at TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS authors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        slug TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        source_id INTEGER NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
        category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
        author_id INTEGER REFERENCES authors(id) ON DELETE SET NULL,
        external_id TEXT NOT NULL,
        title TEXT NOT NULL,
        slug TEXT,
        description TEXT,
        content TEXT,
        url TEXT NOT NULL UNIQUE,
        image_url TEXT,
        language TEXT,
        published_at TEXT,
        raw TEXT,
        UNIQUE(source_id, external_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_articles_published_at ON articles(published_at)",
    "CREATE INDEX IF NOT EXISTS idx_articles_category_id ON articles(category_id)",
    r#"
    CREATE TABLE IF NOT EXISTS user_preferences (
        user_id INTEGER PRIMARY KEY,
        preferred_sources TEXT,
        preferred_categories TEXT,
        preferred_authors TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS api_tokens (
        token TEXT PRIMARY KEY,
        user_id INTEGER NOT NULL
    )
    "#,
];

/// SQLite backend. Timestamps are RFC 3339 UTC text, so lexicographic
/// comparison matches chronological order.
pub struct SqliteStorage {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> Error {
    Error::Database(e.to_string())
}

fn parse_ts(value: Option<String>) -> Option<DateTime<Utc>> {
    value
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn to_ts(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|dt| dt.to_rfc3339())
}

impl SqliteStorage {
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await.map_err(db_err)?;

        for migration in MIGRATIONS {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(db_err)?;
        }

        Ok(Self { pool })
    }

    fn source_from_row(row: &SqliteRow, prefix: &str) -> Result<Source> {
        let col = |name: &str| format!("{prefix}{name}");
        Ok(Source {
            id: row.try_get(col("id").as_str()).map_err(db_err)?,
            name: row.try_get(col("name").as_str()).map_err(db_err)?,
            slug: row.try_get(col("slug").as_str()).map_err(db_err)?,
            api_key: row.try_get(col("api_key").as_str()).map_err(db_err)?,
            base_url: row.try_get(col("base_url").as_str()).map_err(db_err)?,
            last_fetched_at: parse_ts(
                row.try_get(col("last_fetched_at").as_str())
                    .map_err(db_err)?,
            ),
        })
    }

    fn article_from_row(row: &SqliteRow) -> Result<Article> {
        let raw: Option<String> = row.try_get("raw").map_err(db_err)?;
        let raw = match raw {
            Some(text) => Some(serde_json::from_str(&text)?),
            None => None,
        };
        Ok(Article {
            id: row.try_get("id").map_err(db_err)?,
            source_id: row.try_get("source_id").map_err(db_err)?,
            category_id: row.try_get("category_id").map_err(db_err)?,
            author_id: row.try_get("author_id").map_err(db_err)?,
            external_id: row.try_get("external_id").map_err(db_err)?,
            title: row.try_get("title").map_err(db_err)?,
            slug: row.try_get("slug").map_err(db_err)?,
            description: row.try_get("description").map_err(db_err)?,
            content: row.try_get("content").map_err(db_err)?,
            url: row.try_get("url").map_err(db_err)?,
            image_url: row.try_get("image_url").map_err(db_err)?,
            language: row.try_get("language").map_err(db_err)?,
            published_at: parse_ts(row.try_get("published_at").map_err(db_err)?),
            raw,
        })
    }

    fn with_relations_from_row(row: &SqliteRow) -> Result<ArticleWithRelations> {
        let article = Self::article_from_row(row)?;
        let source = Source {
            id: article.source_id,
            name: row.try_get("s_name").map_err(db_err)?,
            slug: row.try_get("s_slug").map_err(db_err)?,
            api_key: row.try_get("s_api_key").map_err(db_err)?,
            base_url: row.try_get("s_base_url").map_err(db_err)?,
            last_fetched_at: parse_ts(row.try_get("s_last_fetched_at").map_err(db_err)?),
        };
        let category = match row.try_get::<Option<i64>, _>("c_id").map_err(db_err)? {
            Some(id) => Some(Category {
                id,
                name: row.try_get("c_name").map_err(db_err)?,
                slug: row.try_get("c_slug").map_err(db_err)?,
            }),
            None => None,
        };
        let author = match row.try_get::<Option<i64>, _>("au_id").map_err(db_err)? {
            Some(id) => Some(Author {
                id,
                name: row.try_get("au_name").map_err(db_err)?,
            }),
            None => None,
        };
        Ok(ArticleWithRelations {
            article,
            source,
            category,
            author,
        })
    }

    fn select_with_relations() -> QueryBuilder<'static, Sqlite> {
        QueryBuilder::new(
            "SELECT a.id, a.source_id, a.category_id, a.author_id, a.external_id, a.title, \
             a.slug, a.description, a.content, a.url, a.image_url, a.language, a.published_at, \
             a.raw, \
             s.name AS s_name, s.slug AS s_slug, s.api_key AS s_api_key, \
             s.base_url AS s_base_url, s.last_fetched_at AS s_last_fetched_at, \
             c.id AS c_id, c.name AS c_name, c.slug AS c_slug, \
             au.id AS au_id, au.name AS au_name \
             FROM articles a \
             JOIN sources s ON s.id = a.source_id \
             LEFT JOIN categories c ON c.id = a.category_id \
             LEFT JOIN authors au ON au.id = a.author_id \
             WHERE 1=1",
        )
    }
}

// `%` and `_` in user input are literal characters, not wildcards.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped.to_lowercase())
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn seed_sources(&self, seeds: &[SourceSeed]) -> Result<()> {
        for seed in seeds {
            sqlx::query(
                "INSERT INTO sources (name, slug, api_key, base_url) VALUES (?, ?, ?, ?) \
                 ON CONFLICT(slug) DO UPDATE SET \
                 name = excluded.name, api_key = excluded.api_key, base_url = excluded.base_url",
            )
            .bind(&seed.name)
            .bind(&seed.slug)
            .bind(&seed.api_key)
            .bind(&seed.base_url)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        }
        Ok(())
    }

    async fn sources(&self) -> Result<Vec<Source>> {
        let rows = sqlx::query(
            "SELECT id, name, slug, api_key, base_url, last_fetched_at FROM sources ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(|r| Self::source_from_row(r, "")).collect()
    }

    async fn source_by_slug(&self, slug: &str) -> Result<Option<Source>> {
        let row = sqlx::query(
            "SELECT id, name, slug, api_key, base_url, last_fetched_at FROM sources WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(|r| Self::source_from_row(&r, "")).transpose()
    }

    async fn mark_source_fetched(&self, source_id: i64, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE sources SET last_fetched_at = ? WHERE id = ?")
            .bind(at.to_rfc3339())
            .bind(source_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn get_or_create_author(&self, name: &str) -> Result<Author> {
        // Conflict-ignore then re-read, so concurrent callers converge on one row.
        sqlx::query("INSERT INTO authors (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        let row = sqlx::query("SELECT id, name FROM authors WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(Author {
            id: row.try_get("id").map_err(db_err)?,
            name: row.try_get("name").map_err(db_err)?,
        })
    }

    async fn get_or_create_category(&self, name: &str, slug: &str) -> Result<Category> {
        sqlx::query("INSERT INTO categories (name, slug) VALUES (?, ?) ON CONFLICT(name) DO NOTHING")
            .bind(name)
            .bind(slug)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        let row = sqlx::query("SELECT id, name, slug FROM categories WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(Category {
            id: row.try_get("id").map_err(db_err)?,
            name: row.try_get("name").map_err(db_err)?,
            slug: row.try_get("slug").map_err(db_err)?,
        })
    }

    async fn upsert_article(&self, article: &NewArticle) -> Result<Article> {
        let raw = article
            .raw
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        sqlx::query(
            "INSERT INTO articles (source_id, category_id, author_id, external_id, title, slug, \
             description, content, url, image_url, language, published_at, raw) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(source_id, external_id) DO UPDATE SET \
             category_id = excluded.category_id, author_id = excluded.author_id, \
             title = excluded.title, slug = excluded.slug, description = excluded.description, \
             content = excluded.content, url = excluded.url, image_url = excluded.image_url, \
             language = excluded.language, published_at = excluded.published_at, \
             raw = excluded.raw",
        )
        .bind(article.source_id)
        .bind(article.category_id)
        .bind(article.author_id)
        .bind(&article.external_id)
        .bind(&article.title)
        .bind(&article.slug)
        .bind(&article.description)
        .bind(&article.content)
        .bind(&article.url)
        .bind(&article.image_url)
        .bind(&article.language)
        .bind(to_ts(article.published_at))
        .bind(raw)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        let row = sqlx::query(
            "SELECT id, source_id, category_id, author_id, external_id, title, slug, \
             description, content, url, image_url, language, published_at, raw \
             FROM articles WHERE source_id = ? AND external_id = ?",
        )
        .bind(article.source_id)
        .bind(&article.external_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Self::article_from_row(&row)
    }

    async fn search_articles(&self, filter: &ArticleFilter) -> Result<Vec<ArticleWithRelations>> {
        let mut qb = Self::select_with_relations();

        if let Some(source) = &filter.source {
            qb.push(" AND (s.slug = ")
                .push_bind(source.clone())
                .push(" OR LOWER(s.name) LIKE ")
                .push_bind(like_pattern(source))
                .push(" ESCAPE '\\')");
        }
        if let Some(category) = &filter.category {
            qb.push(" AND (c.slug = ")
                .push_bind(category.clone())
                .push(" OR LOWER(c.name) LIKE ")
                .push_bind(like_pattern(category))
                .push(" ESCAPE '\\')");
        }
        if let Some(author) = &filter.author {
            qb.push(" AND LOWER(au.name) LIKE ")
                .push_bind(like_pattern(author))
                .push(" ESCAPE '\\'");
        }
        if let Some(from) = filter.date_from {
            qb.push(" AND a.published_at >= ")
                .push_bind(from.to_rfc3339());
        }
        if let Some(to) = filter.date_to {
            qb.push(" AND a.published_at <= ").push_bind(to.to_rfc3339());
        }
        if let Some(q) = &filter.q {
            let pattern = like_pattern(q);
            qb.push(" AND (LOWER(a.title) LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR LOWER(a.description) LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR LOWER(a.content) LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        qb.push(" ORDER BY a.published_at IS NULL, a.published_at DESC");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(Self::with_relations_from_row).collect()
    }

    async fn article_by_id(&self, id: i64) -> Result<Option<ArticleWithRelations>> {
        let mut qb = Self::select_with_relations();
        qb.push(" AND a.id = ").push_bind(id);
        let row = qb
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(Self::with_relations_from_row).transpose()
    }

    async fn preferences(&self, user_id: i64) -> Result<Option<UserPreference>> {
        let row = sqlx::query(
            "SELECT user_id, preferred_sources, preferred_categories, preferred_authors \
             FROM user_preferences WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let parse_list = |value: Option<String>| -> Result<Option<Vec<String>>> {
            match value {
                Some(text) => Ok(Some(serde_json::from_str(&text)?)),
                None => Ok(None),
            }
        };
        Ok(Some(UserPreference {
            user_id: row.try_get("user_id").map_err(db_err)?,
            preferred_sources: parse_list(row.try_get("preferred_sources").map_err(db_err)?)?,
            preferred_categories: parse_list(
                row.try_get("preferred_categories").map_err(db_err)?,
            )?,
            preferred_authors: parse_list(row.try_get("preferred_authors").map_err(db_err)?)?,
        }))
    }

    async fn save_preferences(&self, prefs: &UserPreference) -> Result<UserPreference> {
        let encode = |value: &Option<Vec<String>>| -> Result<Option<String>> {
            value
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(Error::from)
        };
        sqlx::query(
            "INSERT INTO user_preferences \
             (user_id, preferred_sources, preferred_categories, preferred_authors) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET \
             preferred_sources = excluded.preferred_sources, \
             preferred_categories = excluded.preferred_categories, \
             preferred_authors = excluded.preferred_authors",
        )
        .bind(prefs.user_id)
        .bind(encode(&prefs.preferred_sources)?)
        .bind(encode(&prefs.preferred_categories)?)
        .bind(encode(&prefs.preferred_authors)?)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(prefs.clone())
    }

    async fn delete_preferences(&self, user_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM user_preferences WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn create_token(&self, user_id: i64, token: &str) -> Result<()> {
        sqlx::query("INSERT INTO api_tokens (token, user_id) VALUES (?, ?)")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn user_for_token(&self, token: &str) -> Result<Option<i64>> {
        let row = sqlx::query("SELECT user_id FROM api_tokens WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|r| r.try_get("user_id").map_err(db_err)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    async fn open_seeded() -> (tempfile::TempDir, SqliteStorage, Source) {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::open(&dir.path().join("test.db")).await.unwrap();
        storage
            .seed_sources(&[SourceSeed {
                name: "The Guardian".into(),
                slug: "guardian".into(),
                api_key: Some("key".into()),
                base_url: "https://content.guardianapis.com/".into(),
            }])
            .await
            .unwrap();
        let source = storage.source_by_slug("guardian").await.unwrap().unwrap();
        (dir, storage, source)
    }

    fn new_article(source_id: i64, external_id: &str, url: &str) -> NewArticle {
        NewArticle {
            source_id,
            category_id: None,
            author_id: None,
            external_id: external_id.to_string(),
            title: "Guardian Test Article".into(),
            slug: Some("guardian-test-article".into()),
            description: Some("Guardian Description".into()),
            content: Some("Guardian Content".into()),
            url: url.to_string(),
            image_url: None,
            language: Some("en".into()),
            published_at: Some(Utc.with_ymd_and_hms(2025, 9, 13, 8, 0, 0).unwrap()),
            raw: Some(serde_json::json!({"id": external_id})),
        }
    }

    #[tokio::test]
    async fn seeding_is_an_upsert() {
        let (_dir, storage, source) = open_seeded().await;
        storage
            .seed_sources(&[SourceSeed {
                name: "The Guardian".into(),
                slug: "guardian".into(),
                api_key: Some("rotated".into()),
                base_url: "https://content.guardianapis.com/".into(),
            }])
            .await
            .unwrap();
        let reread = storage.source_by_slug("guardian").await.unwrap().unwrap();
        assert_eq!(reread.id, source.id);
        assert_eq!(reread.api_key.as_deref(), Some("rotated"));
    }

    #[tokio::test]
    async fn upsert_is_idempotent_and_refreshes() {
        let (_dir, storage, source) = open_seeded().await;
        let mut article = new_article(source.id, "test-guardian-1", "https://guardian.com/test-article");

        let first = storage.upsert_article(&article).await.unwrap();
        assert_eq!(first.title, "Guardian Test Article");
        assert_eq!(first.url, "https://guardian.com/test-article");

        article.title = "Guardian Test Article (updated)".into();
        let second = storage.upsert_article(&article).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.title, "Guardian Test Article (updated)");

        let all = storage
            .search_articles(&ArticleFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn url_unique_across_dedup_keys() {
        let (_dir, storage, source) = open_seeded().await;
        storage
            .upsert_article(&new_article(source.id, "a", "https://guardian.com/x"))
            .await
            .unwrap();
        let clash = storage
            .upsert_article(&new_article(source.id, "b", "https://guardian.com/x"))
            .await;
        assert!(clash.is_err());
    }

    #[tokio::test]
    async fn relations_are_embedded() {
        let (_dir, storage, source) = open_seeded().await;
        let author = storage.get_or_create_author("Jane Smith").await.unwrap();
        let category = storage
            .get_or_create_category("Technology", "technology")
            .await
            .unwrap();

        let mut article = new_article(source.id, "rel-1", "https://guardian.com/rel-1");
        article.author_id = Some(author.id);
        article.category_id = Some(category.id);
        let stored = storage.upsert_article(&article).await.unwrap();

        let found = storage.article_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(found.source.slug, "guardian");
        assert_eq!(found.author.unwrap().name, "Jane Smith");
        assert_eq!(found.category.unwrap().slug, "technology");

        assert!(storage.article_by_id(999_999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn filters_match_sql_side() {
        let (_dir, storage, source) = open_seeded().await;
        let category = storage
            .get_or_create_category("Technology", "technology")
            .await
            .unwrap();
        let mut a = new_article(source.id, "f-1", "https://guardian.com/f-1");
        a.category_id = Some(category.id);
        storage.upsert_article(&a).await.unwrap();

        let mut b = new_article(source.id, "f-2", "https://guardian.com/f-2");
        b.title = "Unrelated".into();
        b.description = None;
        b.content = Some("nothing".into());
        storage.upsert_article(&b).await.unwrap();

        let by_source = storage
            .search_articles(&ArticleFilter {
                source: Some("guardian".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_source.len(), 2);

        // Substring on the source name also matches.
        let by_name = storage
            .search_articles(&ArticleFilter {
                source: Some("guard".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_name.len(), 2);

        let by_category = storage
            .search_articles(&ArticleFilter {
                category: Some("technology".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].article.external_id, "f-1");

        let by_text = storage
            .search_articles(&ArticleFilter {
                q: Some("guardian content".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_text.len(), 1);
        assert_eq!(by_text[0].article.external_id, "f-1");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("P%e"), "%p\\%e%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("back\\slash"), "%back\\\\slash%");
        assert_eq!(like_pattern("plain"), "%plain%");
    }

    #[tokio::test]
    async fn text_search_is_literal_and_backends_agree() {
        use crate::MemoryStorage;

        let (_dir, sqlite, source) = open_seeded().await;
        let memory = MemoryStorage::new();
        memory
            .seed_sources(&[SourceSeed {
                name: "The Guardian".into(),
                slug: "guardian".into(),
                api_key: None,
                base_url: "https://content.guardianapis.com/".into(),
            }])
            .await
            .unwrap();
        let mem_source = memory.source_by_slug("guardian").await.unwrap().unwrap();

        let seed = |source_id: i64, external_id: &str, title: &str| {
            let mut article = new_article(
                source_id,
                external_id,
                &format!("https://guardian.com/{external_id}"),
            );
            article.title = title.to_string();
            article.description = None;
            article.content = None;
            article
        };
        for (external_id, title) in [("p-1", "Plain headline"), ("p-2", "100% coverage")] {
            sqlite
                .upsert_article(&seed(source.id, external_id, title))
                .await
                .unwrap();
            memory
                .upsert_article(&seed(mem_source.id, external_id, title))
                .await
                .unwrap();
        }

        // (query, expected external_ids); wildcard characters are literal.
        let cases = [
            ("P%e", vec![]),
            ("100%", vec!["p-2"]),
            ("plain", vec!["p-1"]),
            ("head_ine", vec![]),
        ];
        for (q, expected) in cases {
            let filter = ArticleFilter {
                q: Some(q.to_string()),
                ..Default::default()
            };
            let ids = |found: Vec<nw_core::ArticleWithRelations>| {
                found
                    .into_iter()
                    .map(|a| a.article.external_id)
                    .collect::<Vec<_>>()
            };
            let from_sqlite = ids(sqlite.search_articles(&filter).await.unwrap());
            let from_memory = ids(memory.search_articles(&filter).await.unwrap());
            assert_eq!(from_sqlite, expected, "sqlite q={q:?}");
            assert_eq!(from_memory, expected, "memory q={q:?}");
        }
    }

    #[tokio::test]
    async fn preferences_and_tokens_roundtrip() {
        let (_dir, storage, _) = open_seeded().await;
        let prefs = UserPreference {
            user_id: 1,
            preferred_sources: Some(vec!["guardian".into()]),
            preferred_categories: Some(vec![]),
            preferred_authors: None,
        };
        storage.save_preferences(&prefs).await.unwrap();
        assert_eq!(storage.preferences(1).await.unwrap(), Some(prefs.clone()));

        let updated = UserPreference {
            preferred_authors: Some(vec!["Jane Smith".into()]),
            ..prefs
        };
        storage.save_preferences(&updated).await.unwrap();
        assert_eq!(storage.preferences(1).await.unwrap(), Some(updated));

        storage.delete_preferences(1).await.unwrap();
        assert!(storage.preferences(1).await.unwrap().is_none());

        storage.create_token(4, "tok").await.unwrap();
        assert_eq!(storage.user_for_token("tok").await.unwrap(), Some(4));
        assert_eq!(storage.user_for_token("other").await.unwrap(), None);
    }
}
