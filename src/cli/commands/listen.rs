//! Listen command
//!
//! Wires an event bus, registers the exporter and feeds it events read as
//! JSON lines from stdin or a file. Returns once the input is exhausted.

use crate::cli::Output;
use crate::config::ExportConfig;
use crate::events::{Event, EventBus};
use crate::exporter::AlertsExporter;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Args)]
pub struct ListenArgs {
    /// Read events from FILE instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Events buffered between the reader and the exporter
    #[arg(long, default_value_t = 64)]
    pub buffer: usize,
}

pub async fn execute(
    args: ListenArgs,
    custom_config: Option<&str>,
    target_url: Option<String>,
    output: &Output,
) -> Result<()> {
    let config = ExportConfig::load_with_custom_config(custom_config)?.with_target_url(target_url);
    if config.target_url.is_empty() {
        output.warning("No target URL configured, completed scan reports will be dropped");
    }

    let exporter = Arc::new(AlertsExporter::from_config(&config));
    let mut bus = EventBus::new();
    exporter.hook(&mut bus);

    output.verbose(&format!("Exporting to {}", exporter.target()));

    let (tx, rx) = mpsc::channel(args.buffer.max(1));
    let (read, processed) = tokio::join!(pump(args.input, tx), bus.run(rx));

    exporter.unload(&mut bus);

    let accepted = read?;
    output.success(&format!(
        "Processed {} events ({} accepted from input)",
        processed, accepted
    ));
    Ok(())
}

async fn pump(input: Option<PathBuf>, tx: mpsc::Sender<Event>) -> Result<usize> {
    match input {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("Failed to open event input: {}", path.display()))?;
            read_events(BufReader::new(file), tx).await
        }
        None => read_events(BufReader::new(tokio::io::stdin()), tx).await,
    }
}

/// Forward every parseable JSON line from `reader` to `tx`.
///
/// Blank lines and `#` comments are ignored; unreadable lines are logged and
/// skipped, including lines that are not valid UTF-8. Returns the number of events forwarded.
pub async fn read_events<R>(mut reader: R, tx: mpsc::Sender<Event>) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut forwarded = 0;
    let mut line_number = 0;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .context("Failed to read event input")?;
        if read == 0 {
            break;
        }
        line_number += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                warn!(line = line_number, error = %e, "Skipping non UTF-8 event line");
                continue;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match Event::from_json_line(trimmed) {
            Ok(event) => {
                if tx.send(event).await.is_err() {
                    break;
                }
                forwarded += 1;
            }
            Err(e) => warn!(line = line_number, error = %e, "Skipping unreadable event"),
        }
    }

    Ok(forwarded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_read_events_skips_noise() {
        let input = b"# scanner events\n\
            {\"type\":\"scan-completed\",\"parameters\":{\"scanId\":\"1\"}}\n\
            \n\
            {\"type\":\"unknown\"}\n\
            garbage\n\
            {\"type\":\"alert-added\",\"parameters\":{\"alertId\":\"5\"}}\n";

        let (tx, mut rx) = mpsc::channel(8);
        let forwarded = read_events(&input[..], tx).await.unwrap();
        assert_eq!(forwarded, 2);

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::ScanCompleted);
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::AlertAdded);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_read_events_survives_invalid_utf8() {
        let mut input = b"{\"type\":\"scan-completed\",\"parameters\":{\"scanId\":\"1\"}}\n".to_vec();
        input.extend_from_slice(b"\xff\xfe garbage\n");
        input.extend_from_slice(b"{\"type\":\"scan-completed\",\"parameters\":{\"scanId\":\"2\"}}");

        let (tx, mut rx) = mpsc::channel(8);
        let forwarded = read_events(&input[..], tx).await.unwrap();
        assert_eq!(forwarded, 2);

        assert_eq!(rx.recv().await.unwrap().parameter("scanId"), Some("1"));
        assert_eq!(rx.recv().await.unwrap().parameter("scanId"), Some("2"));
        assert!(rx.recv().await.is_none());
    }
}
