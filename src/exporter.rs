//! The alerts exporter
//!
//! Listens for scan lifecycle events. When a scan completes the last scan
//! report is rendered, tagged with the scan id and POSTed to the configured
//! target. Every failure stops at [`AlertsExporter::handle`], where it is
//! logged and the report is dropped.

use crate::config::ExportConfig;
use crate::delivery::{DeliveryClient, DeliveryResult, UNKNOWN_STATUS};
use crate::errors::ExportError;
use crate::events::{ALERT_ID, Event, EventBus, EventConsumer, EventKind, SCAN_ID};
use crate::report::{FileReportGenerator, ReportJsonConverter, ReportRenderer};
use crate::site::{SiteTree, StaticSiteTree, log_site_tree};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

pub struct AlertsExporter {
    renderer: ReportRenderer,
    delivery: DeliveryClient,
    site_tree: Option<Arc<dyn SiteTree>>,
}

impl AlertsExporter {
    /// Registration name on the event bus
    pub const NAME: &'static str = "alerts-export";

    /// Event kinds the exporter subscribes to
    pub const EVENT_KINDS: [EventKind; 2] = [EventKind::ScanCompleted, EventKind::AlertAdded];

    pub fn new(renderer: ReportRenderer, delivery: DeliveryClient) -> Self {
        Self {
            renderer,
            delivery,
            site_tree: None,
        }
    }

    /// Log the given site tree for every completed scan
    pub fn with_site_tree(mut self, site_tree: Arc<dyn SiteTree>) -> Self {
        self.site_tree = Some(site_tree);
        self
    }

    /// Exporter backed by the report file and target named in `config`
    pub fn from_config(config: &ExportConfig) -> Self {
        let renderer = ReportRenderer::new(
            Arc::new(FileReportGenerator::new(&config.report.path)),
            Arc::new(ReportJsonConverter::new(config.report.keep_strings)),
        );
        let delivery =
            DeliveryClient::new(config.target_url.clone()).with_timeout(config.request_timeout());

        let exporter = Self::new(renderer, delivery);
        if config.diagnostics.log_site_tree {
            exporter.with_site_tree(Arc::new(StaticSiteTree::new(
                config.diagnostics.sites.clone(),
            )))
        } else {
            exporter
        }
    }

    pub fn target(&self) -> &str {
        self.delivery.target()
    }

    /// Subscribe to scan and alert events
    pub fn hook(self: &Arc<Self>, bus: &mut EventBus) {
        info!("alerts-export is loading");
        bus.register_consumer(self.clone(), &Self::EVENT_KINDS);
    }

    /// Drop every subscription made by [`hook`](Self::hook)
    pub fn unload(&self, bus: &mut EventBus) -> bool {
        bus.unregister_consumer(Self::NAME)
    }

    pub fn can_unload(&self) -> bool {
        true
    }

    /// Render, tag and deliver the last scan report
    pub async fn export_scan(&self, scan_id: &str) -> Result<DeliveryResult, ExportError> {
        if let Some(tree) = &self.site_tree {
            log_site_tree(scan_id, tree.as_ref());
        }

        let report = self.renderer.render_tagged(scan_id)?;
        Ok(self.delivery.deliver(&report).await?)
    }

    /// Process one event. Errors are logged and dropped, never returned.
    pub async fn handle(&self, event: &Event) {
        info!(event = %event.kind, "Received new event");

        match event.kind {
            EventKind::ScanCompleted => {
                let scan_id = event.parameter(SCAN_ID).unwrap_or_default();
                info!(scan_id, "Scan completed");

                if let Err(e) = self.export_scan(scan_id).await {
                    match dropped_status(&e) {
                        Some(status) => error!(
                            scan_id,
                            stage = e.stage(),
                            status,
                            url = self.target(),
                            error = %e,
                            "Dropping scan report"
                        ),
                        None => error!(
                            scan_id,
                            stage = e.stage(),
                            error = %e,
                            "Dropping scan report"
                        ),
                    }
                }
            }
            EventKind::AlertAdded => {
                let alert_id = event.parameter(ALERT_ID).unwrap_or_default();
                info!(alert_id, "Alert added");
            }
        }
    }
}

/// Status logged for a dropped report; only a failed POST has one
fn dropped_status(error: &ExportError) -> Option<i32> {
    matches!(error, ExportError::Delivery(_)).then_some(UNKNOWN_STATUS)
}

#[async_trait]
impl EventConsumer for AlertsExporter {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn event_received(&self, event: &Event) {
        self.handle(event).await;
    }
}
