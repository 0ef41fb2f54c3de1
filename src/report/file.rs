use super::ReportGenerator;
use crate::errors::RenderError;
use std::path::PathBuf;

/// Reads the last scan report the scanner wrote to disk
#[derive(Debug, Clone)]
pub struct FileReportGenerator {
    path: PathBuf,
}

impl FileReportGenerator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportGenerator for FileReportGenerator {
    fn render_last_scan(&self) -> Result<String, RenderError> {
        let display = self.path.display().to_string();
        if !self.path.exists() {
            return Err(RenderError::NotAvailable(display));
        }

        let report = std::fs::read_to_string(&self.path).map_err(|source| RenderError::Io {
            path: display.clone(),
            source,
        })?;

        if report.trim().is_empty() {
            return Err(RenderError::Empty(display));
        }
        Ok(report)
    }
}
