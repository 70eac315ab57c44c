//! Corpus providers: where the guest list comes from.
//!
//! A source is read exactly once at startup. Any failure is fatal: Alfred
//! never indexes a partial guest list.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use alfred_core::error::CorpusError;
use serde::Deserialize;
use tracing::{debug, info};

use crate::guest::GuestRecord;

/// Rows requested per datasets-server page (the server's maximum).
const PAGE_SIZE: usize = 100;

/// Something that can produce the full guest list.
#[async_trait]
pub trait GuestSource: Send + Sync {
    /// Short label for logs and errors.
    fn describe(&self) -> String;

    /// Fetch every guest record, in a stable order.
    async fn fetch(&self) -> Result<Vec<GuestRecord>, CorpusError>;
}

/// Guests held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<GuestRecord>,
}

impl StaticSource {
    pub fn new(records: Vec<GuestRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl GuestSource for StaticSource {
    fn describe(&self) -> String {
        format!("static ({} guests)", self.records.len())
    }

    async fn fetch(&self) -> Result<Vec<GuestRecord>, CorpusError> {
        Ok(self.records.clone())
    }
}

/// Guests read from a local JSON array or JSON Lines file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse either a JSON array of records or one record per line.
    pub fn parse(content: &str) -> Result<Vec<GuestRecord>, CorpusError> {
        if content.trim_start().starts_with('[') {
            return serde_json::from_str(content).map_err(|e| CorpusError::Parse(e.to_string()));
        }

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line)
                    .map_err(|e| CorpusError::Parse(format!("line {}: {e}", n + 1)))
            })
            .collect()
    }
}

#[async_trait]
impl GuestSource for JsonFileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn fetch(&self) -> Result<Vec<GuestRecord>, CorpusError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CorpusError::Io {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;
        let records = Self::parse(&content)?;
        info!(path = %self.path.display(), guests = records.len(), "Loaded guest file");
        Ok(records)
    }
}

/// Guests paged from the Hugging Face datasets-server `rows` endpoint.
pub struct HubDatasetSource {
    base_url: String,
    dataset: String,
    config: String,
    split: String,
    client: reqwest::Client,
}

impl HubDatasetSource {
    pub fn new(
        base_url: impl Into<String>,
        dataset: impl Into<String>,
        split: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            dataset: dataset.into(),
            config: "default".into(),
            split: split.into(),
            client,
        }
    }

    /// The invitee list used by the gala demo.
    pub fn invitees() -> Self {
        Self::new(
            "https://datasets-server.huggingface.co",
            "agents-course/unit3-invitees",
            "train",
        )
    }

    /// GET for one page of rows; the query string is percent-encoded by reqwest.
    fn page_request(&self, offset: usize) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}/rows", self.base_url))
            .query(&[
                ("dataset", self.dataset.as_str()),
                ("config", self.config.as_str()),
                ("split", self.split.as_str()),
            ])
            .query(&[("offset", offset), ("length", PAGE_SIZE)])
    }

    fn fetch_error(&self, reason: impl Into<String>) -> CorpusError {
        CorpusError::Fetch {
            source_name: self.dataset.clone(),
            reason: reason.into(),
        }
    }

    /// Parse one page of the datasets-server response.
    fn parse_page(body: &str) -> Result<RowsPage, CorpusError> {
        serde_json::from_str(body).map_err(|e| CorpusError::Parse(e.to_string()))
    }
}

#[async_trait]
impl GuestSource for HubDatasetSource {
    fn describe(&self) -> String {
        format!("hub dataset {} ({})", self.dataset, self.split)
    }

    async fn fetch(&self) -> Result<Vec<GuestRecord>, CorpusError> {
        let mut records = Vec::new();
        let mut offset = 0;

        loop {
            debug!(dataset = %self.dataset, offset, "Fetching guest rows");

            let response = self
                .page_request(offset)
                .send()
                .await
                .map_err(|e| self.fetch_error(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(self.fetch_error(format!("HTTP {status}: {body}")));
            }

            let body = response
                .text()
                .await
                .map_err(|e| self.fetch_error(e.to_string()))?;
            let page = Self::parse_page(&body)?;
            let received = page.rows.len();
            records.extend(page.rows.into_iter().map(|r| r.row));
            offset += received;

            if received == 0 || offset >= page.num_rows_total {
                break;
            }
        }

        info!(dataset = %self.dataset, guests = records.len(), "Loaded guest dataset");
        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
struct RowsPage {
    rows: Vec<RowEntry>,
    num_rows_total: usize,
}

#[derive(Debug, Deserialize)]
struct RowEntry {
    row: GuestRecord,
}
