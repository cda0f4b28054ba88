//! Core domain types for the standards catalog and download attempts.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one batch invocation (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// One document in the standards catalog.
///
/// Fields absent from the catalog file default to the empty string; any
/// extra fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardRecord {
    /// Human-readable document number, e.g. `GBZ 188-2025`.
    #[serde(default)]
    pub code: String,
    /// Free-text title.
    #[serde(default)]
    pub title: String,
    /// Lifecycle tag, e.g. `现行` for "currently in force".
    #[serde(default)]
    pub status: String,
    /// Stable short key used in the availability map.
    #[serde(default)]
    pub slug: String,
}

/// Root structure of `standards-catalog.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// All records, in file order.
    pub standards: Vec<StandardRecord>,
}

// ---------------------------------------------------------------------------
// DownloadAttempt
// ---------------------------------------------------------------------------

/// How a single catalog item ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The destination file was already on disk; nothing was fetched.
    AlreadyPresent,
    /// A candidate URL yielded a verified PDF which was written to disk.
    Downloaded {
        /// The URL that worked.
        source_url: String,
        /// Payload size in bytes.
        bytes: u64,
        /// SHA-256 of the payload, lowercase hex.
        sha256: String,
    },
    /// Every candidate URL failed.
    Exhausted,
    /// A verified payload could not be written to the destination.
    WriteFailed {
        source_url: String,
        message: String,
    },
}

/// A per-item record of what was tried and how it ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadAttempt {
    pub code: String,
    pub slug: String,
    pub title: String,
    /// Destination filename inside the PDF directory.
    pub filename: String,
    /// Candidate URLs in the order they were generated.
    pub tried: Vec<String>,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

impl DownloadAttempt {
    /// Whether the item now has a local PDF.
    pub fn is_available(&self) -> bool {
        matches!(
            self.outcome,
            AttemptOutcome::AlreadyPresent | AttemptOutcome::Downloaded { .. }
        )
    }

    /// Whether this item performed network work.
    pub fn touched_network(&self) -> bool {
        !matches!(self.outcome, AttemptOutcome::AlreadyPresent)
    }
}
