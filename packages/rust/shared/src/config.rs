//! Application configuration for stdpdf.
//!
//! User config lives at `~/.stdpdf/stdpdf.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, StdpdfError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "stdpdf.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".stdpdf";

/// Placeholder substituted with each code variant in a URL template.
pub const CODE_PLACEHOLDER: &str = "{code}";

/// Lifecycle tag of standards currently in force.
pub const CURRENT_STATUS: &str = "现行";

/// Length of the `%PDF-` signature; `min_bytes` can never go below it.
const PDF_SIGNATURE_LEN: u64 = 5;

/// URL templates tried for every code variant, most likely host first.
pub const DEFAULT_TEMPLATES: &[&str] = &[
    "https://www.nhc.gov.cn/ewebeditor/uploadfile/2024/{code}.pdf",
    "https://www.nhc.gov.cn/ewebeditor/uploadfile/2023/{code}.pdf",
    "https://www.nhc.gov.cn/ewebeditor/uploadfile/2022/{code}.pdf",
    "https://niohp.chinacdc.cn/zyysjk/zywsbzml/P020{code}.pdf",
    "https://www.chinacdc.cn/jkyj/hjwsyzdkz/bzxg/{code}.pdf",
];

/// Government hosts known to serve broken certificate chains.
pub const DEFAULT_INSECURE_HOSTS: &[&str] =
    &["www.nhc.gov.cn", "niohp.chinacdc.cn", "www.chinacdc.cn"];

// ---------------------------------------------------------------------------
// Config structs (matching stdpdf.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Catalog filtering.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Per-request fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Batch size, pacing and persistence.
    #[serde(default)]
    pub batch: BatchConfig,

    /// Candidate URL templates.
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Standards catalog (read-only).
    #[serde(default = "default_catalog_path")]
    pub catalog: PathBuf,

    /// Availability map (read-modify-write).
    #[serde(default = "default_availability_path")]
    pub availability: PathBuf,

    /// Directory downloaded PDFs are written to.
    #[serde(default = "default_pdf_dir")]
    pub pdf_dir: PathBuf,

    /// Optional JSON run report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog_path(),
            availability: default_availability_path(),
            pdf_dir: default_pdf_dir(),
            report: None,
        }
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("content/standards/standards-catalog.json")
}
fn default_availability_path() -> PathBuf {
    PathBuf::from("content/standards/pdf-availability.json")
}
fn default_pdf_dir() -> PathBuf {
    PathBuf::from("public/pdf-files")
}

/// `[catalog]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Only records with this status are download candidates.
    #[serde(default = "default_current_status")]
    pub current_status: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            current_status: default_current_status(),
        }
    }
}

fn default_current_status() -> String {
    CURRENT_STATUS.into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Connect timeout and per-read timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Browser-like User-Agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// A body must be strictly longer than this to be accepted.
    #[serde(default = "default_min_bytes")]
    pub min_bytes: u64,

    /// Responses declaring a larger Content-Length are rejected unread.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Hosts for which TLS certificate validation is disabled.
    #[serde(default = "default_insecure_hosts")]
    pub insecure_hosts: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            min_bytes: default_min_bytes(),
            max_bytes: default_max_bytes(),
            insecure_hosts: default_insecure_hosts(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    15
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36".into()
}
fn default_min_bytes() -> u64 {
    5000
}
fn default_max_bytes() -> u64 {
    200 * 1024 * 1024
}
fn default_insecure_hosts() -> Vec<String> {
    DEFAULT_INSECURE_HOSTS.iter().map(|h| h.to_string()).collect()
}

/// `[batch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of missing items processed per invocation.
    #[serde(default = "default_max_downloads")]
    pub max_downloads: usize,

    /// Pause after each item that touched the network, in ms.
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,

    /// Save the availability map after every successful item.
    #[serde(default = "default_true")]
    pub persist_each: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_downloads: default_max_downloads(),
            pause_ms: default_pause_ms(),
            persist_each: true,
        }
    }
}

fn default_max_downloads() -> usize {
    20
}
fn default_pause_ms() -> u64 {
    500
}
fn default_true() -> bool {
    true
}

/// `[sources]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// URL templates containing a `{code}` placeholder.
    #[serde(default = "default_templates")]
    pub templates: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            templates: default_templates(),
        }
    }
}

fn default_templates() -> Vec<String> {
    DEFAULT_TEMPLATES.iter().map(|t| t.to_string()).collect()
}

impl AppConfig {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.sources.templates.is_empty() {
            return Err(StdpdfError::config("[sources] templates must not be empty"));
        }

        for template in &self.sources.templates {
            if !template.contains(CODE_PLACEHOLDER) {
                return Err(StdpdfError::config(format!(
                    "template '{template}' has no {CODE_PLACEHOLDER} placeholder"
                )));
            }
            let sample = template.replace(CODE_PLACEHOLDER, "GBZ1-2010");
            Url::parse(&sample).map_err(|e| {
                StdpdfError::config(format!("template '{template}' is not a valid URL: {e}"))
            })?;
        }

        if self.fetch.timeout_secs == 0 {
            return Err(StdpdfError::config("[fetch] timeout_secs must be positive"));
        }

        if self.fetch.min_bytes < PDF_SIGNATURE_LEN {
            return Err(StdpdfError::config(format!(
                "[fetch] min_bytes must be at least {PDF_SIGNATURE_LEN}"
            )));
        }

        if self.fetch.max_bytes <= self.fetch.min_bytes {
            return Err(StdpdfError::config(
                "[fetch] max_bytes must be greater than min_bytes",
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Run config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime batch configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Standards catalog path.
    pub catalog_path: PathBuf,
    /// Availability map path.
    pub availability_path: PathBuf,
    /// PDF output directory.
    pub pdf_dir: PathBuf,
    /// Where to write the JSON run report, if anywhere.
    pub report_path: Option<PathBuf>,
    /// Status tag selecting download candidates.
    pub current_status: String,
    /// Per-request fetch settings.
    pub fetch: FetchConfig,
    /// Maximum items processed this run.
    pub max_downloads: usize,
    /// Pause between network-touching items, in ms.
    pub pause_ms: u64,
    /// Save the availability map after each success.
    pub persist_each: bool,
    /// URL templates for candidate generation.
    pub templates: Vec<String>,
    /// List what would be fetched without touching the network or disk.
    pub dry_run: bool,
}

impl From<&AppConfig> for RunConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            catalog_path: config.paths.catalog.clone(),
            availability_path: config.paths.availability.clone(),
            pdf_dir: config.paths.pdf_dir.clone(),
            report_path: config.paths.report.clone(),
            current_status: config.catalog.current_status.clone(),
            fetch: config.fetch.clone(),
            max_downloads: config.batch.max_downloads,
            pause_ms: config.batch.pause_ms,
            persist_each: config.batch.persist_each,
            templates: config.sources.templates.clone(),
            dry_run: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.stdpdf/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| StdpdfError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.stdpdf/stdpdf.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load and validate the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        StdpdfError::config(format!("failed to read {}: {e}", path.display()))
    })?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        StdpdfError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    config.validate()?;
    tracing::debug!(?path, "loaded config");
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| StdpdfError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| StdpdfError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| StdpdfError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("pdf_dir"));
        assert!(toml_str.contains("现行"));
        assert!(toml_str.contains("www.nhc.gov.cn"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.fetch.timeout_secs, 15);
        assert_eq!(parsed.fetch.min_bytes, 5000);
        assert_eq!(parsed.sources.templates.len(), DEFAULT_TEMPLATES.len());
        parsed.validate().expect("defaults are valid");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[paths]
pdf_dir = "/srv/site/public/pdf-files"

[batch]
max_downloads = 50
persist_each = false
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.paths.pdf_dir, PathBuf::from("/srv/site/public/pdf-files"));
        assert_eq!(config.paths.catalog, default_catalog_path());
        assert_eq!(config.batch.max_downloads, 50);
        assert_eq!(config.batch.pause_ms, 500);
        assert!(!config.batch.persist_each);
        assert_eq!(config.catalog.current_status, CURRENT_STATUS);
    }

    #[test]
    fn run_config_from_app_config() {
        let app = AppConfig::default();
        let run = RunConfig::from(&app);
        assert_eq!(run.max_downloads, 20);
        assert_eq!(run.pause_ms, 500);
        assert!(run.persist_each);
        assert!(!run.dry_run);
        assert!(run.report_path.is_none());
    }

    #[test]
    fn validate_rejects_bad_templates() {
        let mut config = AppConfig::default();
        config.sources.templates = vec![];
        assert!(config.validate().is_err());

        config.sources.templates = vec!["https://example.com/static.pdf".into()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("placeholder"));

        config.sources.templates = vec!["not a url/{code}.pdf".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_limits() {
        let mut config = AppConfig::default();
        config.fetch.min_bytes = 2;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.fetch.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.fetch.max_bytes = config.fetch.min_bytes;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_from_missing_file_is_config_error() {
        let path = std::env::temp_dir()
            .join(format!("stdpdf-config-{}", uuid::Uuid::now_v7()))
            .join("stdpdf.toml");
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, StdpdfError::Config { .. }));
    }

    #[test]
    fn load_config_from_file() {
        let dir = std::env::temp_dir().join(format!("stdpdf-config-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("stdpdf.toml");
        std::fs::write(
            &path,
            "[fetch]\ntimeout_secs = 30\ninsecure_hosts = []\n",
        )
        .unwrap();

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.fetch.timeout_secs, 30);
        assert!(config.fetch.insecure_hosts.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
