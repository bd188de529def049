use crate::error::Result;
use crate::io::ensure_parent_dir;
use crate::types::{CleaningSummary, DatasetStatistics};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Machine-readable record of a cleaning run.
///
/// Printed to stdout with `--json` and written to disk with `--emit-report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Local time the report was generated
    pub generated_at: String,
    pub input_file: String,
    pub output_csv: String,
    pub output_xlsx: String,
    pub summary: CleaningSummary,
    pub statistics: DatasetStatistics,
}

impl CleaningReport {
    pub fn new(
        input_file: &Path,
        output_csv: &Path,
        output_xlsx: &Path,
        summary: CleaningSummary,
        statistics: DatasetStatistics,
    ) -> Self {
        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.display().to_string(),
            output_csv: output_csv.display().to_string(),
            output_xlsx: output_xlsx.display().to_string(),
            summary,
            statistics,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON to `path`, creating parent directories.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        ensure_parent_dir(path)?;
        let mut file = File::create(path)?;
        file.write_all(self.to_json()?.as_bytes())?;

        info!("Report saved: {}", path.display());
        Ok(())
    }
}
