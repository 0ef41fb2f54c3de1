//! Last-scan report rendering
//!
//! The exporter never builds reports itself. It asks a [`ReportGenerator`]
//! for whatever the host considers the last scan, converts that text with a
//! [`JsonConverter`] and tags the result with the scan identifier taken from
//! the triggering event.

use crate::errors::{ExportError, RenderError, SerializationError};
use std::sync::Arc;

mod convert;
mod file;

pub use convert::ReportJsonConverter;
pub use file::FileReportGenerator;

/// Name of the field spliced into every exported report
pub const SCAN_ID_FIELD: &str = "@scanId";

/// Host collaborator producing the report of the last scan
pub trait ReportGenerator: Send + Sync {
    fn render_last_scan(&self) -> Result<String, RenderError>;
}

/// Host collaborator turning rendered report text into a JSON document
pub trait JsonConverter: Send + Sync {
    fn to_json(&self, report: &str) -> Result<String, SerializationError>;
}

/// Generator plus converter, the two halves of one rendered export
#[derive(Clone)]
pub struct ReportRenderer {
    generator: Arc<dyn ReportGenerator>,
    converter: Arc<dyn JsonConverter>,
}

impl ReportRenderer {
    pub fn new(generator: Arc<dyn ReportGenerator>, converter: Arc<dyn JsonConverter>) -> Self {
        Self {
            generator,
            converter,
        }
    }

    /// Render the last scan as-is
    pub fn render(&self) -> Result<String, RenderError> {
        self.generator.render_last_scan()
    }

    /// Render the last scan, convert it to JSON and tag it with `scan_id`.
    ///
    /// The scan id only labels the output; it does not select which scan is
    /// rendered.
    pub fn render_tagged(&self, scan_id: &str) -> Result<String, ExportError> {
        let report = self.render()?;
        let json = self.converter.to_json(&report)?;
        Ok(tag_scan_id(&json, scan_id)?)
    }
}

/// Splice `"@scanId": "<id>"` in as the first member of a JSON object.
///
/// This is a textual patch: everything after the opening brace is kept
/// byte-for-byte. The id is JSON-escaped.
pub fn tag_scan_id(json: &str, scan_id: &str) -> Result<String, SerializationError> {
    let trimmed = json.trim_start();
    let Some(rest) = trimmed.strip_prefix('{') else {
        let head: String = trimmed.chars().take(16).collect();
        return Err(SerializationError::NotAnObject(head));
    };

    let id = serde_json::to_string(scan_id)?;
    let separator = if rest.trim_start().starts_with('}') { "" } else { "," };
    Ok(format!("{{\"{}\": {}{}{}", SCAN_ID_FIELD, id, separator, rest))
}
