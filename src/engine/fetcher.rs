//! HTTP fetcher
//!
//! Builds the shared HTTP client and classifies each fetch into an explicit
//! outcome the worker loop can consume without ever propagating an error out
//! of its iteration. Every fetch carries the configured timeout, so a hung
//! server bounds the stall of one frontier slot instead of wedging a worker.

use reqwest::Client;
use std::time::Duration;

/// Result of fetching one frontier item
#[derive(Debug)]
pub enum FetchOutcome {
    /// 2xx response with a decodable body
    Success { body: String },

    /// Non-success HTTP status
    HttpStatus { status_code: u16 },

    /// Network-level failure (timeout, refused connection, bad TLS, ...)
    Failed { error: String },
}

/// Builds the HTTP client shared by every worker
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL, classifying every failure instead of returning an error
pub async fn fetch_page(client: &Client, url: &str) -> FetchOutcome {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();

            if !status.is_success() {
                return FetchOutcome::HttpStatus {
                    status_code: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) => FetchOutcome::Success { body },
                Err(e) => FetchOutcome::Failed {
                    error: format!("body read failed: {}", e),
                },
            }
        }
        Err(e) => {
            let error = if e.is_timeout() {
                "request timeout".to_string()
            } else if e.is_connect() {
                "connection failed".to_string()
            } else {
                e.to_string()
            };
            FetchOutcome::Failed { error }
        }
    }
}
