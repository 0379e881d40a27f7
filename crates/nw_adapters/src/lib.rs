use async_trait::async_trait;
use nw_core::{Result, Source};

pub mod manager;
pub mod normalize;
pub mod sources;

pub use manager::{FetchManager, FetchReport};

/// One canonical record as produced by a source adapter, before the shared
/// normalizer resolves dimension rows and writes it.
#[derive(Debug, Clone)]
pub struct RawArticle {
    /// Provider-native id, or the article url when the provider has none.
    pub external_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub language: Option<String>,
    /// Provider date string, parsed by the normalizer.
    pub published_at: Option<String>,
    /// Author name after the provider's own precedence rules.
    pub author: Option<String>,
    pub category: Option<String>,
    /// The untouched provider record.
    pub payload: serde_json::Value,
}

/// Fetches one page of raw provider records for the current fetch window.
/// No pagination or retry loop; a non-2xx response is a `Error::Fetch` and
/// the caller isolates it from other adapters.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Slug of the seeded Source row this adapter refuses to run without.
    fn slug(&self) -> &'static str;

    fn name(&self) -> &'static str;

    async fn fetch(&self, client: &reqwest::Client, source: &Source) -> Result<Vec<RawArticle>>;
}

pub mod prelude {
    pub use super::{FetchManager, RawArticle, SourceAdapter};
    pub use nw_core::{Error, Result};
}
