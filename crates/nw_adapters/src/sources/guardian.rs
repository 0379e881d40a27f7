use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use nw_core::{Error, Result, Source};

use crate::{RawArticle, SourceAdapter};

/// Guardian content search API. Long-form content with full article bodies.
pub struct GuardianAdapter;

const SHOW_FIELDS: &str = "headline,trailText,body,thumbnail,byline";
const PAGE_SIZE: &str = "50";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuardianItem {
    id: String,
    web_title: Option<String>,
    web_url: Option<String>,
    web_publication_date: Option<String>,
    section_name: Option<String>,
    #[serde(default)]
    fields: GuardianFields,
    #[serde(default)]
    tags: Vec<GuardianTag>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuardianFields {
    byline: Option<String>,
    trail_text: Option<String>,
    body: Option<String>,
    thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GuardianTag {
    #[serde(rename = "type")]
    tag_type: Option<String>,
    #[serde(rename = "webTitle")]
    web_title: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl GuardianAdapter {
    pub(crate) fn parse_response(body: &Value) -> Vec<RawArticle> {
        body["response"]["results"]
            .as_array()
            .map(|items| items.iter().filter_map(Self::map_item).collect())
            .unwrap_or_default()
    }

    fn map_item(item: &Value) -> Option<RawArticle> {
        let parsed: GuardianItem = match serde_json::from_value(item.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Skipping malformed Guardian record: {e}");
                return None;
            }
        };
        let Some(url) = non_empty(parsed.web_url) else {
            warn!("Skipping Guardian record '{}' without a url", parsed.id);
            return None;
        };

        // Byline field first, then the tagged contributor, else unresolved.
        let author = non_empty(parsed.fields.byline).or_else(|| {
            parsed
                .tags
                .iter()
                .find(|t| t.tag_type.as_deref() == Some("contributor"))
                .and_then(|t| t.web_title.clone())
        });

        Some(RawArticle {
            external_id: parsed.id,
            title: non_empty(parsed.web_title),
            description: parsed.fields.trail_text,
            content: parsed.fields.body,
            url,
            image_url: parsed.fields.thumbnail,
            language: Some("en".to_string()),
            published_at: parsed.web_publication_date,
            author,
            category: parsed.section_name,
            payload: item.clone(),
        })
    }
}

#[async_trait]
impl SourceAdapter for GuardianAdapter {
    fn slug(&self) -> &'static str {
        "guardian"
    }

    fn name(&self) -> &'static str {
        "Guardian"
    }

    async fn fetch(&self, client: &reqwest::Client, source: &Source) -> Result<Vec<RawArticle>> {
        let api_key = source.api_key.clone().unwrap_or_default();
        let response = client
            .get(format!("{}search", source.base_url))
            .query(&[
                ("api-key", api_key.as_str()),
                ("show-fields", SHOW_FIELDS),
                ("show-tags", "contributor"),
                ("page-size", PAGE_SIZE),
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
