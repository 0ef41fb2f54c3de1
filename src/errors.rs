//! Error types for the render-and-deliver sequence
//!
//! Each stage of an export returns its own error so the event-handling
//! boundary can decide what to log. None of these are retried.

use thiserror::Error;

/// The last-scan report could not be produced
#[derive(Error, Debug)]
pub enum RenderError {
    /// No scan has produced a report yet
    #[error("no scan report available at {0}")]
    NotAvailable(String),

    /// The report source exists but holds nothing
    #[error("scan report at {0} is empty")]
    Empty(String),

    /// Reading the report failed
    #[error("failed to read scan report {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The rendered report could not be turned into a tagged JSON document
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("malformed XML report: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed JSON report: {0}")]
    Json(#[from] serde_json::Error),

    /// Tagging needs a JSON object to splice into
    #[error("report JSON is not an object (starts with {0:?})")]
    NotAnObject(String),

    #[error("report contains no root element")]
    NoRootElement,
}

/// Transport-level delivery failure. HTTP error statuses are not errors.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// Target URL was never configured
    #[error("no export target URL configured")]
    MissingTarget,

    #[error("invalid export target URL {url:?}: {reason}")]
    InvalidTarget { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("POST to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Any failure of one export cycle
#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl ExportError {
    /// Short stage name used as a structured log field
    pub fn stage(&self) -> &'static str {
        match self {
            ExportError::Render(_) => "render",
            ExportError::Serialization(_) => "serialization",
            ExportError::Delivery(_) => "delivery",
        }
    }
}
