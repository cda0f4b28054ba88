//! CLI definition, tracing setup, and the run/plan handlers.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use stdpdf_core::pipeline::{
    ProgressReporter, RunSummary, plan_batch, progress_line, run_batch,
};
use stdpdf_shared::{DownloadAttempt, RunConfig, init_config, load_config, load_config_from};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// stdpdf: fetch missing standard PDFs by guessing their download URLs.
#[derive(Parser)]
#[command(
    name = "stdpdf",
    version,
    about = "Download missing standard PDFs and update the availability map.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Maximum number of missing standards to process this run (default 20).
    pub max: Option<usize>,

    /// Config file (defaults to ~/.stdpdf/stdpdf.toml).
    #[arg(long, env = "STDPDF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the items and candidate URLs without fetching or writing.
    #[arg(long)]
    pub dry_run: bool,

    /// Write a JSON run report to this path.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Write a default config file and exit.
    #[arg(long)]
    pub init_config: bool,

    /// Print the resolved configuration as TOML and exit.
    #[arg(long)]
    pub show_config: bool,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout carries
/// the progress lines and summary.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "stdpdf=info",
        1 => "stdpdf=debug",
        _ => "stdpdf=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Resolve configuration and run the batch (or the dry-run plan).
pub(crate) async fn run(cli: Cli) -> Result<()> {
    if cli.init_config {
        let path = init_config()?;
        println!("Config initialized at: {}", path.display());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    if cli.show_config {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let mut run_config = RunConfig::from(&config);
    if let Some(max) = cli.max {
        run_config.max_downloads = max;
    }
    if let Some(path) = cli.report {
        run_config.report_path = Some(path);
    }
    run_config.dry_run = cli.dry_run;

    if run_config.dry_run {
        cmd_plan(&run_config)
    } else {
        cmd_download(&run_config).await
    }
}

async fn cmd_download(config: &RunConfig) -> Result<()> {
    info!(
        catalog = %config.catalog_path.display(),
        pdf_dir = %config.pdf_dir.display(),
        max = config.max_downloads,
        "downloading missing standards"
    );

    let reporter = CliProgress::new(&config.current_status);
    let summary = run_batch(config, &reporter).await?;

    println!();
    println!("--- Results ---");
    println!("Downloaded: {}", summary.downloaded);
    println!("Failed: {}", summary.failed);
    println!("Total PDF mappings: {}", summary.total_mappings);
    println!("Time: {:.1}s", summary.elapsed.as_secs_f64());
    if let Some(path) = &config.report_path {
        println!("Report: {}", path.display());
    }

    Ok(())
}

fn cmd_plan(config: &RunConfig) -> Result<()> {
    let candidates = stdpdf_fetcher::TemplateCandidates::new(config.templates.clone());
    let (missing_total, items) = plan_batch(config, &candidates)?;

    println!("Total missing ({}): {missing_total}", config.current_status);
    for item in &items {
        if item.exists {
            println!("  [SKIP] {} - already exists", item.code);
            continue;
        }
        println!("  [PLAN] {} -> {}", item.code, item.filename);
        for url in &item.urls {
            println!("      {url}");
        }
    }
    println!();
    println!("Dry run: {} item(s), nothing fetched or written.", items.len());

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter: an indicatif bar with SKIP/OK/FAIL lines above it.
struct CliProgress {
    bar: ProgressBar,
    current_status: String,
}

impl CliProgress {
    fn new(current_status: &str) -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        Self {
            bar,
            current_status: current_status.to_string(),
        }
    }
}

impl ProgressReporter for CliProgress {
    fn start(&self, missing_total: usize, planned: usize) {
        self.bar.suspend(|| {
            println!("Total missing ({}): {missing_total}", self.current_status);
        });
        self.bar.set_length(planned as u64);
        self.bar.enable_steady_tick(std::time::Duration::from_millis(80));
    }

    fn item(&self, attempt: &DownloadAttempt, current: usize, _planned: usize) {
        self.bar.suspend(|| println!("{}", progress_line(attempt)));
        self.bar.set_position(current as u64);
        self.bar.set_message(attempt.code.clone());
    }

    fn done(&self, _summary: &RunSummary) {
        self.bar.finish_and_clear();
    }
}
