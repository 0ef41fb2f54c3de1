//! # alerts-export - scan reports pushed to where they are needed
//!
//! Listens for scan lifecycle events and, whenever a scan completes, renders
//! the last scan report, converts it to JSON, tags it with the scan id and
//! POSTs it to a configured endpoint.
//!
//! ## Quick Start
//!
//! ```bash
//! # Export once
//! alerts-export -alertsexporturl https://collector.example/results export --scan-id 3
//!
//! # Relay events piped in from the scanner
//! scanner-events | alerts-export -alertsexporturl https://collector.example/results listen
//! ```

pub mod cli;
pub mod config;
pub mod delivery;
pub mod errors;
pub mod events;
pub mod exporter;
pub mod report;
pub mod site;

pub use cli::{Cli, Output};
pub use config::ExportConfig;
pub use delivery::{DeliveryClient, DeliveryResult};
pub use errors::{DeliveryError, ExportError, RenderError, SerializationError};
pub use events::{Event, EventBus, EventConsumer, EventKind};
pub use exporter::AlertsExporter;

/// Result type alias for alerts-export operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
