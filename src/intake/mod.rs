//! Intake: admission of crawl requests
//!
//! Requests arrive as `{ "domain": ..., "authorId": ... }` payloads over an
//! at-least-once message transport. The transport itself is an external
//! collaborator; this module only decides what a delivered request means:
//! start new work, ignore a duplicate, record another requester's interest in
//! a crawl that is already running or recently finished, or reject the
//! request outright.
//!
//! The freshness rule is implemented literally: an existing record blocks a
//! re-crawl when it is still inside the re-crawl interval, or when it shows
//! zero pages with a non-Crawling status. The second arm is known to be
//! logically inconsistent with the first in places; it is preserved as the
//! established behavior pending product clarification (see DESIGN.md).

use crate::engine::CrawlEngine;
use crate::stats::CrawlStatus;
use crate::Result;
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Rejection reason recorded when a request names no protocol
const NO_PROTOCOL: &str = "protocol should be specified";

/// Decoded intake message payload
#[derive(Debug, Clone, Deserialize)]
pub struct IntakeRequest {
    pub domain: String,
    #[serde(rename = "authorId")]
    pub author_id: i64,
}

/// What admission decided for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// A new crawl job was registered
    Started,
    /// Same requester, same domain, nothing new to do
    Duplicate,
    /// Another requester claimed visibility into an existing crawl
    InterestRecorded,
    /// The request was invalid; an Error record was persisted
    Rejected(String),
}

/// Applies the re-crawl/ownership policy to incoming requests
pub struct IntakeHandler {
    engine: Arc<CrawlEngine>,
    recrawl_interval: Duration,
}

impl IntakeHandler {
    pub fn new(engine: Arc<CrawlEngine>) -> Self {
        let recrawl_interval = Duration::seconds(engine.config().recrawl_interval_secs);
        Self {
            engine,
            recrawl_interval,
        }
    }

    /// Admits one crawl request
    ///
    /// Redelivery of the same `(domain, authorId)` inside the re-crawl
    /// interval is idempotent: it resolves to `Duplicate` without touching
    /// the store or the engine.
    pub async fn admit(&self, domain: &str, author_id: i64) -> Result<Admission> {
        let https = if domain.starts_with("https://") {
            true
        } else if domain.starts_with("http://") {
            false
        } else {
            let store = self.engine.tracker().store();
            let mut store = store.lock().unwrap();
            store.create_stat(
                domain,
                &CrawlStatus::Error(NO_PROTOCOL.to_string()),
                author_id,
                false,
                Utc::now(),
                0,
            )?;
            return Ok(Admission::Rejected(NO_PROTOCOL.to_string()));
        };

        let existing = {
            let store = self.engine.tracker().store();
            let store = store.lock().unwrap();
            store.latest_for_domain(domain)?
        };

        if let Some(existing) = existing {
            let fresh = existing.is_fresh(self.recrawl_interval, Utc::now());
            let settled_empty =
                existing.pages_count == 0 && existing.status != CrawlStatus::Crawling;

            if fresh || settled_empty {
                if existing.author_id == author_id {
                    return Ok(Admission::Duplicate);
                }

                // Interest only: the domain is already being (or was recently)
                // crawled, so no second job is started for the same URL state
                let store = self.engine.tracker().store();
                let mut store = store.lock().unwrap();
                store.create_stat(
                    domain,
                    &existing.status,
                    author_id,
                    existing.https,
                    Utc::now(),
                    0,
                )?;
                return Ok(Admission::InterestRecorded);
            }
            // Stale record: fall through and crawl again
        }

        self.engine.register_job(domain, author_id, https).await?;
        Ok(Admission::Started)
    }
}

/// Consumes raw intake payloads until the channel closes
///
/// The transport acknowledges a delivery once `admit` has returned, so a
/// crash mid-request redelivers it; `admit` keeps redelivery harmless.
/// Malformed payloads are logged and dropped rather than wedging the loop.
pub async fn consume(handler: IntakeHandler, mut payloads: mpsc::Receiver<Vec<u8>>) {
    while let Some(payload) = payloads.recv().await {
        let request: IntakeRequest = match serde_json::from_slice(&payload) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Dropping malformed intake payload: {}", e);
                continue;
            }
        };

        match handler.admit(&request.domain, request.author_id).await {
            Ok(Admission::Started) => {
                tracing::info!("Crawl started for {}", request.domain);
            }
            Ok(Admission::Duplicate) => {
                tracing::debug!(
                    "Duplicate request for {} from author {}",
                    request.domain,
                    request.author_id
                );
            }
            Ok(Admission::InterestRecorded) => {
                tracing::info!(
                    "Recorded author {} interest in {}",
                    request.author_id,
                    request.domain
                );
            }
            Ok(Admission::Rejected(reason)) => {
                tracing::warn!("Rejected request for {}: {}", request.domain, reason);
            }
            Err(e) => {
                tracing::error!("Intake failed for {}: {}", request.domain, e);
            }
        }
    }

    tracing::info!("Intake stream closed");
}
