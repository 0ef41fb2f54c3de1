//! Report delivery over HTTP
//!
//! One POST per report. A fresh client is built for every call and dropped
//! afterwards, so no connection outlives a delivery. HTTP error statuses are
//! reported in the [`DeliveryResult`], only transport failures are errors.

use crate::errors::DeliveryError;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, info};

/// Status logged when no response was obtained
pub const UNKNOWN_STATUS: i32 = -1;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Outcome of a POST that reached the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    pub status: u16,
    pub content_length: usize,
    pub target: String,
}

impl DeliveryResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Posts reports to a fixed target URL
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    target: String,
    timeout: Option<Duration>,
}

impl DeliveryClient {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            timeout: None,
        }
    }

    /// Request timeout; `None` keeps the HTTP client's default
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub async fn deliver(&self, report: &str) -> Result<DeliveryResult, DeliveryError> {
        post_report(report, &self.target, self.timeout).await
    }
}

/// POST `report` verbatim to `target` as JSON
pub async fn post_report(
    report: &str,
    target: &str,
    timeout: Option<Duration>,
) -> Result<DeliveryResult, DeliveryError> {
    if target.trim().is_empty() {
        return Err(DeliveryError::MissingTarget);
    }

    let url = Url::parse(target).map_err(|e| DeliveryError::InvalidTarget {
        url: target.to_string(),
        reason: e.to_string(),
    })?;

    let mut builder = Client::builder().pool_max_idle_per_host(0);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().map_err(DeliveryError::Client)?;

    debug!(url = target, content_length = report.len(), "Posting scan report");

    let response = client
        .post(url)
        .header(ACCEPT, JSON_MEDIA_TYPE)
        .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
        .body(report.to_owned())
        .send()
        .await
        .map_err(|source| DeliveryError::Transport {
            url: target.to_string(),
            source,
        })?;

    let status = response.status().as_u16();

    // The body is never inspected, only drained
    if let Err(e) = response.bytes().await {
        debug!(url = target, error = %e, "Failed to drain response body");
    }

    info!(
        content_length = report.len(),
        status,
        url = target,
        "Scan report posted"
    );

    Ok(DeliveryResult {
        status,
        content_length: report.len(),
        target: target.to_string(),
    })
}
