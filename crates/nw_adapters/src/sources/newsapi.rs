use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use nw_core::{Error, Result, Source};

use crate::{RawArticle, SourceAdapter};

/// NewsAPI top-headlines. Generic headlines; no provider id, the article url
/// doubles as the external id, and no category/section field at all.
pub struct NewsApiAdapter;

const PAGE_SIZE: &str = "20";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiItem {
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
    language: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl NewsApiAdapter {
    pub(crate) fn parse_response(body: &Value) -> Vec<RawArticle> {
        body["articles"]
            .as_array()
            .map(|items| items.iter().filter_map(Self::map_item).collect())
            .unwrap_or_default()
    }

    fn map_item(item: &Value) -> Option<RawArticle> {
        let parsed: NewsApiItem = match serde_json::from_value(item.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Skipping malformed NewsAPI record: {e}");
                return None;
            }
        };
        let Some(url) = non_empty(parsed.url) else {
            warn!("Skipping NewsAPI record without a url");
            return None;
        };

        Some(RawArticle {
            external_id: url.clone(),
            title: non_empty(parsed.title),
            description: parsed.description,
            content: parsed.content,
            url,
            image_url: parsed.url_to_image,
            language: Some(parsed.language.unwrap_or_else(|| "en".to_string())),
            published_at: parsed.published_at,
            author: non_empty(parsed.author),
            category: None,
            payload: item.clone(),
        })
    }
}

#[async_trait]
impl SourceAdapter for NewsApiAdapter {
    fn slug(&self) -> &'static str {
        "newsapi"
    }

    fn name(&self) -> &'static str {
        "NewsAPI"
    }

    async fn fetch(&self, client: &reqwest::Client, source: &Source) -> Result<Vec<RawArticle>> {
        let api_key = source.api_key.clone().unwrap_or_default();
        let response = client
            .get(format!("{}top-headlines", source.base_url))
            .query(&[
                ("apiKey", api_key.as_str()),
                ("language", "en"),
                ("pageSize", PAGE_SIZE),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let cause = response.text().await.unwrap_or_default();
            return Err(Error::Fetch {
                source_name: self.name().to_string(),
                cause: format!("{status}: {cause}"),
            });
        }

        let body: Value = response.json().await?;
        Ok(Self::parse_response(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_doubles_as_external_id() {
        let body = json!({
            "articles": [{
                "author": "Alan Reporter",
                "title": "Headline",
                "description": "Desc",
                "content": "Body",
                "url": "https://news.example/a",
                "urlToImage": "https://news.example/a.jpg",
                "publishedAt": "2025-09-14T10:30:00Z"
            }]
        });
        let articles = NewsApiAdapter::parse_response(&body);
        assert_eq!(articles.len(), 1);
        let a = &articles[0];
        assert_eq!(a.external_id, "https://news.example/a");
        assert_eq!(a.url, "https://news.example/a");
        assert_eq!(a.author.as_deref(), Some("Alan Reporter"));
        assert_eq!(a.language.as_deref(), Some("en"));
        assert!(a.category.is_none());
    }

    #[test]
    fn empty_author_is_left_unresolved() {
        let body = json!({
            "articles": [{"title": "T", "url": "https://news.example/b", "author": ""}]
        });
        let articles = NewsApiAdapter::parse_response(&body);
        assert!(articles[0].author.is_none());
    }

    #[test]
    fn records_without_url_are_dropped() {
        let body = json!({"articles": [{"title": "No url"}]});
        assert!(NewsApiAdapter::parse_response(&body).is_empty());
    }
}
