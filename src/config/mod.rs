//! Configuration management for alerts-export
//!
//! Settings are layered with figment, lowest priority first:
//! embedded defaults, user config, project config, `ALERTS_EXPORT_`
//! environment variables, then an explicit `--config` file. The target URL
//! given on the command line is applied last.

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Json, Toml, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

const ENV_PREFIX: &str = "ALERTS_EXPORT_";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ExportConfig {
    /// Endpoint receiving the tagged scan reports
    #[serde(default)]
    pub target_url: String,

    /// Request timeout in seconds, 0 for the client default
    #[serde(default)]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Where the last scan report comes from and how it is converted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    #[serde(default = "default_report_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub keep_strings: bool,
}

fn default_report_path() -> PathBuf {
    PathBuf::from("last-scan-report.xml")
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: default_report_path(),
            keep_strings: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DiagnosticsConfig {
    #[serde(default)]
    pub log_site_tree: bool,

    #[serde(default)]
    pub sites: Vec<String>,
}

impl ExportConfig {
    pub fn load_with_custom_config(custom_config: Option<&str>) -> Result<Self> {
        Self::figment(custom_config)
            .extract()
            .context("Failed to load alerts-export configuration")
    }

    fn figment(custom_config: Option<&str>) -> Figment {
        let user_config = Self::user_config_path();

        let mut figment = Figment::new()
            .merge(Toml::string(DEFAULT_CONFIG))
            // User config - support multiple formats
            .merge(Toml::file(&user_config))
            .merge(Json::file(user_config.with_extension("json")))
            .merge(Yaml::file(user_config.with_extension("yaml")))
            .merge(Yaml::file(user_config.with_extension("yml")))
            // Project config
            .merge(Toml::file("alerts-export.toml"))
            .merge(Json::file("alerts-export.json"))
            .merge(Yaml::file("alerts-export.yaml"))
            .merge(Yaml::file("alerts-export.yml"))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(custom_path) = custom_config {
            figment = match PathBuf::from(custom_path).extension().and_then(|e| e.to_str()) {
                Some("json") => figment.merge(Json::file(custom_path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(custom_path)),
                _ => figment.merge(Toml::file(custom_path)),
            };
        }

        figment
    }

    /// Apply the command-line target URL, which wins over every file
    pub fn with_target_url(mut self, target_url: Option<String>) -> Self {
        if let Some(url) = target_url {
            self.target_url = url;
        }
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    fn user_config_path() -> PathBuf {
        match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home).join(".config/alerts-export/config.toml"),
            Err(_) => PathBuf::from("~/.config/alerts-export/config.toml"),
        }
    }
}
