//! Scan lifecycle events
//!
//! Events are published by the host's scanner and alerting components and
//! delivered to registered consumers through [`EventBus`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

mod bus;

pub use bus::{EventBus, EventConsumer};

/// Parameter carrying the identifier of a completed scan
pub const SCAN_ID: &str = "scanId";

/// Parameter carrying the identifier of a newly raised alert
pub const ALERT_ID: &str = "alertId";

/// Event categories the exporter understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    ScanCompleted,
    AlertAdded,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ScanCompleted => "scan-completed",
            EventKind::AlertAdded => "alert-added",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single notification with its string parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,

    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            parameters: HashMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn scan_completed(scan_id: impl Into<String>) -> Self {
        Self::new(EventKind::ScanCompleted).with_parameter(SCAN_ID, scan_id)
    }

    pub fn alert_added(alert_id: impl Into<String>) -> Self {
        Self::new(EventKind::AlertAdded).with_parameter(ALERT_ID, alert_id)
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Parse one JSON line, e.g. `{"type":"scan-completed","parameters":{"scanId":"3"}}`
    pub fn from_json_line(line: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(line.trim())?)
    }
}
