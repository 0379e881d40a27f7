use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

use nw_core::{Error, Result, Storage};

use crate::{normalize, sources, SourceAdapter};

/// Outcome of one adapter in a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub source: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FetchReport {
    fn success(source: &str, fetched: usize) -> Self {
        Self {
            source: source.to_string(),
            status: "success".to_string(),
            fetched: Some(fetched),
            message: None,
        }
    }

    fn failure(source: &str, error: &Error) -> Self {
        Self {
            source: source.to_string(),
            status: "error".to_string(),
            fetched: None,
            message: Some(error.to_string()),
        }
    }

    pub fn ok(&self) -> bool {
        self.status == "success"
    }
}

/// Runs the adapters sequentially against shared storage. Each adapter is an
/// isolated failure domain: its error is logged and reported, and the batch
/// moves on.
pub struct FetchManager {
    storage: Arc<dyn Storage>,
    client: reqwest::Client,
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl FetchManager {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_adapters(storage, sources::default_adapters())
    }

    pub fn with_adapters(storage: Arc<dyn Storage>, adapters: Vec<Box<dyn SourceAdapter>>) -> Self {
        Self {
            storage,
            client: reqwest::Client::new(),
            adapters,
        }
    }

    pub async fn run_batch(&self) -> Vec<FetchReport> {
        let mut reports = Vec::with_capacity(self.adapters.len());
        for adapter in &self.adapters {
            match self.run_adapter(adapter.as_ref()).await {
                Ok(count) => {
                    info!("{} articles fetched ({count} records)", adapter.name());
                    reports.push(FetchReport::success(adapter.name(), count));
                }
                Err(e) => {
                    error!("Failed to fetch {} articles: {e}", adapter.name());
                    reports.push(FetchReport::failure(adapter.name(), &e));
                }
            }
        }
        info!("All sources processed.");
        reports
    }

    async fn run_adapter(&self, adapter: &dyn SourceAdapter) -> Result<usize> {
        let source = self
            .storage
            .source_by_slug(adapter.slug())
            .await?
            .ok_or_else(|| Error::MissingSource(adapter.slug().to_string()))?;

        let records = adapter.fetch(&self.client, &source).await?;
        let mut count = 0;
        for record in records {
            normalize::ingest(self.storage.as_ref(), &source, record).await?;
            count += 1;
        }

        self.storage
            .mark_source_fetched(source.id, Utc::now())
            .await?;
        Ok(count)
    }
}
