//! The persisted `slug -> filename` map of documents with a local PDF.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use stdpdf_shared::{Result, StdpdfError, write_atomic};

/// Documents already confirmed to have a local PDF, keyed by slug.
///
/// Serialized as a flat JSON object. Keys are kept sorted so repeated saves
/// produce stable diffs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailabilityMap(BTreeMap<String, String>);

impl AvailabilityMap {
    /// Load the map from `path`.
    ///
    /// A missing file, unreadable file or anything other than a flat
    /// string-to-string object is a config error.
    pub fn load(path: &Path) -> Result<Self> {
        let map: Self = crate::read_json(path, "availability map")?;
        debug!(?path, entries = map.len(), "loaded availability map");
        Ok(map)
    }

    /// Write the whole map to `path` atomically, pretty-printed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_vec_pretty(self)
            .map_err(|e| StdpdfError::io(path, std::io::Error::other(e)))?;
        json.push(b'\n');
        write_atomic(path, &json)?;
        debug!(?path, entries = self.len(), "saved availability map");
        Ok(())
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.0.contains_key(slug)
    }

    pub fn get(&self, slug: &str) -> Option<&str> {
        self.0.get(slug).map(String::as_str)
    }

    /// Record that `slug` now has a local file. Returns the previous filename, if any.
    pub fn insert(&mut self, slug: impl Into<String>, filename: impl Into<String>) -> Option<String> {
        self.0.insert(slug.into(), filename.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for AvailabilityMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
