//! Command-line interface for alerts-export
//!
//! Argument parsing with clap, logging setup and command dispatch.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

pub mod commands;
mod output;

pub use output::Output;

/// Flag that sets the export target, spelled the way scanners pass it
pub const TARGET_URL_FLAG: &str = "alertsexporturl";

/// alerts-export - push scan reports to an HTTP endpoint when scans complete
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    /// Target URL that receives scan reports (also accepted as -alertsexporturl)
    #[arg(long = TARGET_URL_FLAG, value_name = "URL", global = true)]
    pub target_url: Option<String>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Consume events (JSON lines) and export reports for completed scans
    Listen(commands::listen::ListenArgs),
    /// Export the last scan report once, tagged with the given scan id
    Export(commands::export::ExportArgs),
    /// Configuration management
    Config(commands::config::ConfigArgs),
    /// Show version information
    Version,
}

impl Cli {
    /// Parse process arguments, accepting the single-dash target flag
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args()))
    }

    pub async fn run(self) -> Result<()> {
        setup_logging(self.verbose, self.quiet);

        let output = Output::new(self.verbose > 0, self.quiet);
        let config = self.config.as_deref();

        match self.command {
            Some(Commands::Listen(args)) => {
                commands::listen::execute(args, config, self.target_url, &output).await
            }
            Some(Commands::Export(args)) => {
                commands::export::execute(args, config, self.target_url, &output).await
            }
            Some(Commands::Config(args)) => {
                commands::config::execute(args, config, self.target_url, &output).await
            }
            Some(Commands::Version) => commands::version::execute(&output).await,
            None => {
                let mut cmd = Cli::command();
                cmd.print_help()?;
                Ok(())
            }
        }
    }
}

/// Rewrite `-alertsexporturl` (and `-alertsexporturl=URL`) to the long form clap expects
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let single_dash = format!("-{}", TARGET_URL_FLAG);
    args.into_iter()
        .map(|arg| {
            if arg == single_dash || arg.starts_with(&format!("{}=", single_dash)) {
                format!("-{}", arg)
            } else {
                arg
            }
        })
        .collect()
}

fn setup_logging(verbose: u8, quiet: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            return tracing_subscriber::EnvFilter::new("warn");
        }
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("info"),
            1 => tracing_subscriber::EnvFilter::new("debug,hyper=info,reqwest=info"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    // Ignore the error when a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_single_dash_flag() {
        let normalized = normalize_args(args(&[
            "alerts-export",
            "-alertsexporturl",
            "http://collector/",
            "listen",
        ]));
        assert_eq!(normalized[1], "--alertsexporturl");
        assert_eq!(normalized[2], "http://collector/");
    }

    #[test]
    fn test_normalize_equals_form_and_leaves_others() {
        let normalized = normalize_args(args(&["x", "-alertsexporturl=http://a/", "-v", "--quiet"]));
        assert_eq!(normalized, args(&["x", "--alertsexporturl=http://a/", "-v", "--quiet"]));
    }

    #[test]
    fn test_cli_parses_target_url() {
        let cli = Cli::parse_from(normalize_args(args(&[
            "alerts-export",
            "-alertsexporturl",
            "http://collector/",
            "export",
            "--scan-id",
            "7",
        ])));
        assert_eq!(cli.target_url.as_deref(), Some("http://collector/"));
        assert!(matches!(cli.command, Some(Commands::Export(ref a)) if a.scan_id == "7"));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
