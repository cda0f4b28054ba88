//! JSON run report written after a batch.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use stdpdf_shared::{DownloadAttempt, Result, RunId, StdpdfError, write_atomic};

use crate::pipeline::RunSummary;

/// On-disk shape of the report.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub run_id: &'a RunId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub missing_total: usize,
    pub attempted: usize,
    pub downloaded: usize,
    pub already_present: usize,
    pub failed: usize,
    pub total_mappings: usize,
    pub bytes_downloaded: u64,
    pub elapsed_secs: f64,
    pub items: &'a [DownloadAttempt],
}

impl<'a> From<&'a RunSummary> for RunReport<'a> {
    fn from(summary: &'a RunSummary) -> Self {
        Self {
            run_id: &summary.run_id,
            started_at: summary.started_at,
            finished_at: Utc::now(),
            missing_total: summary.missing_total,
            attempted: summary.attempted,
            downloaded: summary.downloaded,
            already_present: summary.already_present,
            failed: summary.failed,
            total_mappings: summary.total_mappings,
            bytes_downloaded: summary.bytes_downloaded,
            elapsed_secs: summary.elapsed.as_secs_f64(),
            items: &summary.attempts,
        }
    }
}

/// Serialize `summary` and write it to `path` atomically.
pub fn write_report(path: &Path, summary: &RunSummary) -> Result<()> {
    let report = RunReport::from(summary);
    let json = serde_json::to_vec_pretty(&report)
        .map_err(|e| StdpdfError::io(path, std::io::Error::other(e)))?;
    write_atomic(path, &json)?;
    info!(path = %path.display(), "run report written");
    Ok(())
}
