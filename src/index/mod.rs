//! Indexer sink for extracted documents
//!
//! Every successfully fetched page produces one `{url, content}` document,
//! pushed to a fixed logical collection on the external search engine. There
//! is no document id: re-indexing the same URL creates a duplicate document
//! rather than an update. That mirrors the index's write contract and is a
//! documented limitation, not something this sink papers over.

use crate::config::IndexConfig;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while pushing a document to the index
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Index request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Index rejected document for {url}: HTTP {status}")]
    Rejected { url: String, status: u16 },
}

/// One extracted document, as written to the search index
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub url: String,
    pub content: String,
}

/// Sink for extracted documents
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn index(&self, document: &Document) -> Result<(), IndexError>;
}

/// HTTP sink writing documents to a search engine collection
///
/// Documents are POSTed as JSON to `{endpoint}/{collection}/_doc`.
pub struct HttpIndexer {
    client: reqwest::Client,
    doc_url: String,
}

impl HttpIndexer {
    pub fn new(config: &IndexConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        let doc_url = format!(
            "{}/{}/_doc",
            config.endpoint.trim_end_matches('/'),
            config.collection
        );

        Ok(Self { client, doc_url })
    }
}

#[async_trait]
impl DocumentSink for HttpIndexer {
    async fn index(&self, document: &Document) -> Result<(), IndexError> {
        let response = self.client.post(&self.doc_url).json(document).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::Rejected {
                url: document.url.clone(),
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}
