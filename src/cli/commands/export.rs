//! Export command
//!
//! Runs a single render-and-deliver cycle for the given scan id and reports
//! the outcome. Unlike `listen`, a failure here ends the process with an error.

use crate::cli::Output;
use crate::config::ExportConfig;
use crate::exporter::AlertsExporter;
use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct ExportArgs {
    /// Scan identifier to tag the report with
    #[arg(long, value_name = "ID")]
    pub scan_id: String,
}

pub async fn execute(
    args: ExportArgs,
    custom_config: Option<&str>,
    target_url: Option<String>,
    output: &Output,
) -> Result<()> {
    let config = ExportConfig::load_with_custom_config(custom_config)?.with_target_url(target_url);
    let exporter = AlertsExporter::from_config(&config);

    output.verbose(&format!(
        "Exporting {} for scan {}",
        config.report.path.display(),
        args.scan_id
    ));

    match exporter.export_scan(&args.scan_id).await {
        Ok(result) => {
            output.status_indicator(
                &result.status.to_string(),
                &format!(
                    "Scan {} report posted to {} ({} bytes)",
                    args.scan_id, result.target, result.content_length
                ),
                result.is_success(),
            );
            Ok(())
        }
        Err(e) => {
            output.error(&format!("Export of scan {} failed: {}", args.scan_id, e));
            Err(e.into())
        }
    }
}
