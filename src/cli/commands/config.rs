//! Configuration command implementations

use crate::cli::Output;
use crate::config::ExportConfig;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Display the merged configuration
    Show {
        /// Output format: json, yaml
        #[arg(short, long, default_value = "json")]
        format: String,
    },
    /// Check that the configuration loads and has a usable target
    Validate,
}

pub async fn execute(
    args: ConfigArgs,
    custom_config: Option<&str>,
    target_url: Option<String>,
    output: &Output,
) -> Result<()> {
    match args.command {
        ConfigCommand::Show { format } => show(&format, custom_config, target_url),
        ConfigCommand::Validate => validate(custom_config, target_url, output),
    }
}

fn show(format: &str, custom_config: Option<&str>, target_url: Option<String>) -> Result<()> {
    let config = ExportConfig::load_with_custom_config(custom_config)?.with_target_url(target_url);

    let rendered = match format.to_lowercase().as_str() {
        "json" => serde_json::to_string_pretty(&config).context("Failed to render JSON")?,
        "yaml" | "yml" => serde_yml::to_string(&config).context("Failed to render YAML")?,
        _ => anyhow::bail!("Unsupported format: {}. Use json or yaml", format),
    };
    println!("{}", rendered);
    Ok(())
}

fn validate(custom_config: Option<&str>, target_url: Option<String>, output: &Output) -> Result<()> {
    let config = ExportConfig::load_with_custom_config(custom_config)?.with_target_url(target_url);

    output.header("Configuration");
    output.key_value("Target URL:", &config.target_url, !config.target_url.is_empty());
    output.key_value("Report:", &config.report.path.display().to_string(), false);
    output.key_value(
        "Timeout:",
        &config
            .request_timeout()
            .map(|t| format!("{}s", t.as_secs()))
            .unwrap_or_else(|| "client default".to_string()),
        false,
    );
    output.blank_line();

    if config.target_url.is_empty() {
        output.error("No target URL configured");
        anyhow::bail!("Set target_url or pass -alertsexporturl <url>");
    }
    if let Err(e) = reqwest::Url::parse(&config.target_url) {
        output.error(&format!("Target URL is not valid: {}", e));
        anyhow::bail!("Invalid target URL: {}", config.target_url);
    }
    if !config.report.path.exists() {
        output.warning("Report file does not exist yet, exports fail until a scan writes it");
    }

    output.success("Configuration is valid");
    Ok(())
}
