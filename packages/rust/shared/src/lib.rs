//! Shared types, error model, and configuration for stdpdf.
//!
//! This crate is the foundation depended on by all other stdpdf crates.
//! It provides:
//! - [`StdpdfError`]: the unified error type
//! - Domain types ([`StandardRecord`], [`Catalog`], [`DownloadAttempt`], [`RunId`])
//! - Configuration ([`AppConfig`], [`RunConfig`], config loading)
//! - [`write_atomic`] for every file the tool writes

pub mod config;
pub mod error;
pub mod fs;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BatchConfig, CODE_PLACEHOLDER, CURRENT_STATUS, CatalogConfig, DEFAULT_INSECURE_HOSTS,
    DEFAULT_TEMPLATES, FetchConfig, PathsConfig, RunConfig, SourcesConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, StdpdfError};
pub use fs::write_atomic;
pub use types::{AttemptOutcome, Catalog, DownloadAttempt, RunId, StandardRecord};
