use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use nw_core::{Error, Result, Source};

use crate::{RawArticle, SourceAdapter};

/// New York Times Top Stories. Abstract-only records; the abstract serves as
/// both description and content.
pub struct NytAdapter;

#[derive(Debug, Deserialize)]
struct NytItem {
    title: Option<String>,
    #[serde(rename = "abstract")]
    summary: Option<String>,
    url: Option<String>,
    byline: Option<String>,
    section: Option<String>,
    published_date: Option<String>,
    #[serde(default)]
    multimedia: Vec<NytMedia>,
}

#[derive(Debug, Deserialize)]
struct NytMedia {
    url: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl NytAdapter {
    pub(crate) fn parse_response(body: &Value) -> Vec<RawArticle> {
        body["results"]
            .as_array()
            .map(|items| items.iter().filter_map(Self::map_item).collect())
            .unwrap_or_default()
    }

    fn map_item(item: &Value) -> Option<RawArticle> {
        let parsed: NytItem = match serde_json::from_value(item.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Skipping malformed NYT record: {e}");
                return None;
            }
        };
        let Some(url) = non_empty(parsed.url) else {
            warn!("Skipping NYT record without a url");
            return None;
        };

        let author = non_empty(parsed.byline)
            .map(|byline| byline.trim_start_matches("By ").to_string());
        let image_url = parsed
            .multimedia
            .iter()
            .find_map(|media| non_empty(media.url.clone()));

        Some(RawArticle {
            external_id: url.clone(),
            title: non_empty(parsed.title),
            description: parsed.summary.clone(),
            content: parsed.summary,
            url,
            image_url,
            language: Some("en".to_string()),
            published_at: parsed.published_date,
            author,
            category: parsed.section,
            payload: item.clone(),
        })
    }
}

#[async_trait]
impl SourceAdapter for NytAdapter {
    fn slug(&self) -> &'static str {
        "nyt"
    }

    fn name(&self) -> &'static str {
        "NYTimes"
    }

    async fn fetch(&self, client: &reqwest::Client, source: &Source) -> Result<Vec<RawArticle>> {
        let api_key = source.api_key.clone().unwrap_or_default();
        let response = client
            .get(format!("{}topstories/v2/home.json", source.base_url))
            .query(&[("api-key", api_key.as_str())])
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
    fn maps_abstract_byline_and_first_image() {
        let body = json!({
            "results": [{
                "title": "NYT Test Article",
                "abstract": "NYT Abstract",
                "url": "https://nytimes.com/test",
                "byline": "By John Writer",
                "section": "world",
                "published_date": "2025-09-14T06:00:00-04:00",
                "multimedia": [
                    {"url": null},
                    {"url": "https://nytimes.com/img-1.jpg"},
                    {"url": "https://nytimes.com/img-2.jpg"}
                ]
            }]
        });
        let articles = NytAdapter::parse_response(&body);
        assert_eq!(articles.len(), 1);
        let a = &articles[0];
        assert_eq!(a.external_id, "https://nytimes.com/test");
        assert_eq!(a.author.as_deref(), Some("John Writer"));
        assert_eq!(a.description.as_deref(), Some("NYT Abstract"));
        assert_eq!(a.content.as_deref(), Some("NYT Abstract"));
        assert_eq!(a.image_url.as_deref(), Some("https://nytimes.com/img-1.jpg"));
        assert_eq!(a.category.as_deref(), Some("world"));
    }

    #[test]
    fn missing_byline_and_media() {
        let body = json!({
            "results": [{"title": "T", "url": "https://nytimes.com/t", "byline": ""}]
        });
        let articles = NytAdapter::parse_response(&body);
        assert!(articles[0].author.is_none());
        assert!(articles[0].image_url.is_none());
    }
}
