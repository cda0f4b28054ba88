//! Batch pipeline: catalog → missing items → candidates → fetch → availability map.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use stdpdf_catalog::{AvailabilityMap, load_catalog, select_missing};
use stdpdf_fetcher::{CandidateSource, FetchOutcome, PdfFetcher, TemplateCandidates, pdf_filename};
use stdpdf_shared::{
    AttemptOutcome, DownloadAttempt, Result, RunConfig, RunId, StandardRecord, StdpdfError,
};

use crate::report;

/// Result of one batch invocation.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Identifier of this invocation.
    pub run_id: RunId,
    /// When the batch started.
    pub started_at: DateTime<Utc>,
    /// Missing current records before the batch limit was applied.
    pub missing_total: usize,
    /// Items processed this run (at most `max_downloads`).
    pub attempted: usize,
    /// Items that now have a local PDF (fetched or already on disk).
    pub downloaded: usize,
    /// Of `downloaded`, how many were already on disk.
    pub already_present: usize,
    /// Items whose candidates were all exhausted or whose write failed.
    pub failed: usize,
    /// Size of the availability map after the run.
    pub total_mappings: usize,
    /// Bytes written for newly fetched PDFs.
    pub bytes_downloaded: u64,
    /// Wall-clock duration of the batch.
    pub elapsed: Duration,
    /// Per-item records, in processing order.
    pub attempts: Vec<DownloadAttempt>,
}

/// One item as it would be processed, for `--dry-run`.
#[derive(Debug, Clone)]
pub struct PlannedItem {
    pub code: String,
    pub slug: String,
    pub filename: String,
    /// The destination already exists, so no URL would be tried.
    pub exists: bool,
    pub urls: Vec<String>,
}

/// Progress reporting trait for the batch pipeline.
pub trait ProgressReporter: Send + Sync {
    /// Called once the missing list is known, before any network activity.
    fn start(&self, missing_total: usize, planned: usize);
    /// Called after each processed item.
    fn item(&self, attempt: &DownloadAttempt, current: usize, planned: usize);
    /// Called when the batch completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn start(&self, _missing_total: usize, _planned: usize) {}
    fn item(&self, _attempt: &DownloadAttempt, _current: usize, _planned: usize) {}
    fn done(&self, _summary: &RunSummary) {}
}

/// The console line for a processed item: `[SKIP]`, `[OK]` or `[FAIL]`.
pub fn progress_line(attempt: &DownloadAttempt) -> String {
    match &attempt.outcome {
        AttemptOutcome::AlreadyPresent => format!("  [SKIP] {} - already exists", attempt.code),
        AttemptOutcome::Downloaded { source_url, .. } => {
            format!("  [OK] {} <- {source_url}", attempt.code)
        }
        AttemptOutcome::Exhausted => format!("  [FAIL] {} - {}", attempt.code, attempt.title),
        AttemptOutcome::WriteFailed { message, .. } => {
            format!("  [FAIL] {} - {} ({message})", attempt.code, attempt.title)
        }
    }
}

/// Run one bounded batch with the configured URL templates.
pub async fn run_batch(config: &RunConfig, progress: &dyn ProgressReporter) -> Result<RunSummary> {
    let candidates = TemplateCandidates::new(config.templates.clone());
    let fetcher = PdfFetcher::new(config.fetch.clone())?;
    run_batch_with(config, &candidates, &fetcher, progress).await
}

/// Run one bounded batch.
///
/// 1. Load catalog and availability map (fatal on any config error)
/// 2. Create the PDF directory
/// 3. For each of the first `max_downloads` missing records: shortcut if the
///    file exists, otherwise try candidates in order
/// 4. Save the availability map (after each success if `persist_each`, and
///    always at the end)
/// 5. Write the optional JSON report
#[instrument(skip_all, fields(catalog = %config.catalog_path.display(), max = config.max_downloads))]
pub async fn run_batch_with(
    config: &RunConfig,
    candidates: &dyn CandidateSource,
    fetcher: &PdfFetcher,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary> {
    let start = Instant::now();
    let started_at = Utc::now();
    let run_id = RunId::new();

    let catalog = load_catalog(&config.catalog_path)?;
    let mut available = AvailabilityMap::load(&config.availability_path)?;

    std::fs::create_dir_all(&config.pdf_dir)
        .map_err(|e| StdpdfError::io(&config.pdf_dir, e))?;

    let missing = select_missing(&catalog, &available, &config.current_status);
    let missing_total = missing.len();
    let planned: Vec<&StandardRecord> = missing.into_iter().take(config.max_downloads).collect();

    info!(%run_id, missing_total, planned = planned.len(), "starting batch");
    progress.start(missing_total, planned.len());

    let mut attempts: Vec<DownloadAttempt> = Vec::with_capacity(planned.len());
    let mut bytes_downloaded: u64 = 0;

    for (i, record) in planned.iter().enumerate() {
        let attempt = process_item(record, &config.pdf_dir, candidates, fetcher).await;

        if attempt.is_available() {
            available.insert(record.slug.clone(), attempt.filename.clone());
        }

        if let AttemptOutcome::Downloaded { bytes, .. } = &attempt.outcome {
            bytes_downloaded += bytes;
            if config.persist_each {
                available.save(&config.availability_path)?;
            }
        }

        progress.item(&attempt, i + 1, planned.len());

        let touched_network = attempt.touched_network();
        attempts.push(attempt);

        if touched_network && config.pause_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.pause_ms)).await;
        }
    }

    available.save(&config.availability_path)?;

    let downloaded = attempts.iter().filter(|a| a.is_available()).count();
    let already_present = attempts
        .iter()
        .filter(|a| matches!(a.outcome, AttemptOutcome::AlreadyPresent))
        .count();

    let summary = RunSummary {
        run_id,
        started_at,
        missing_total,
        attempted: attempts.len(),
        downloaded,
        already_present,
        failed: attempts.len() - downloaded,
        total_mappings: available.len(),
        bytes_downloaded,
        elapsed: start.elapsed(),
        attempts,
    };

    if let Some(path) = &config.report_path {
        report::write_report(path, &summary)?;
    }

    info!(
        downloaded = summary.downloaded,
        failed = summary.failed,
        total_mappings = summary.total_mappings,
        elapsed_ms = summary.elapsed.as_millis(),
        "batch completed"
    );
    progress.done(&summary);

    Ok(summary)
}

/// List what a batch would do without touching the network or writing files.
pub fn plan_batch(config: &RunConfig, candidates: &dyn CandidateSource) -> Result<(usize, Vec<PlannedItem>)> {
    let catalog = load_catalog(&config.catalog_path)?;
    let available = AvailabilityMap::load(&config.availability_path)?;

    let missing = select_missing(&catalog, &available, &config.current_status);
    let missing_total = missing.len();

    let items = missing
        .into_iter()
        .take(config.max_downloads)
        .map(|record| {
            let filename = pdf_filename(&record.code);
            let exists = config.pdf_dir.join(&filename).exists();
            let urls = if exists {
                Vec::new()
            } else {
                candidates.candidates(&record.code)
            };
            PlannedItem {
                code: record.code.clone(),
                slug: record.slug.clone(),
                filename,
                exists,
                urls,
            }
        })
        .collect();

    Ok((missing_total, items))
}

/// Process one missing record. Never fails: every per-item problem becomes
/// part of the returned attempt.
#[instrument(skip_all, fields(code = %record.code))]
async fn process_item(
    record: &StandardRecord,
    pdf_dir: &Path,
    candidates: &dyn CandidateSource,
    fetcher: &PdfFetcher,
) -> DownloadAttempt {
    let filename = pdf_filename(&record.code);
    let dest: PathBuf = pdf_dir.join(&filename);

    let mut attempt = DownloadAttempt {
        code: record.code.clone(),
        slug: record.slug.clone(),
        title: record.title.clone(),
        filename,
        tried: Vec::new(),
        outcome: AttemptOutcome::AlreadyPresent,
    };

    if dest.exists() {
        debug!(dest = %dest.display(), "destination exists, skipping fetch");
        return attempt;
    }

    attempt.tried = candidates.candidates(&record.code);

    attempt.outcome = match fetcher.fetch_first(&attempt.tried, &dest).await {
        FetchOutcome::Downloaded { url, bytes, sha256 } => AttemptOutcome::Downloaded {
            source_url: url,
            bytes,
            sha256,
        },
        FetchOutcome::Exhausted { tried } => {
            debug!(tried, "all candidates failed");
            AttemptOutcome::Exhausted
        }
        FetchOutcome::WriteFailed { url, error } => {
            warn!(%url, error = %error, "download succeeded but file write failed");
            AttemptOutcome::WriteFailed {
                source_url: url,
                message: error.to_string(),
            }
        }
    };

    attempt
}
