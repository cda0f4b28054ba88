//! Catalog loading and candidate selection.
//!
//! Reads the standards catalog and the availability map, and decides which
//! records still need a PDF. A malformed input aborts the run with
//! [`StdpdfError::Config`]; there is no partial recovery.

mod availability;

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use stdpdf_shared::{Catalog, Result, StandardRecord, StdpdfError};

pub use availability::AvailabilityMap;

/// Load the standards catalog (`{"standards": [...]}`) from `path`.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let catalog: Catalog = read_json(path, "catalog")?;
    info!(records = catalog.standards.len(), "loaded catalog");
    Ok(catalog)
}

/// Records that still need a PDF, in catalog order.
///
/// A record is selected iff its slug is absent from `available` and its
/// status equals `current_status`. Everything else is skipped silently.
pub fn select_missing<'a>(
    catalog: &'a Catalog,
    available: &AvailabilityMap,
    current_status: &str,
) -> Vec<&'a StandardRecord> {
    let missing: Vec<_> = catalog
        .standards
        .iter()
        .filter(|r| r.status == current_status && !available.contains(&r.slug))
        .collect();

    debug!(
        total = catalog.standards.len(),
        missing = missing.len(),
        current_status,
        "selected download candidates"
    );

    missing
}

/// Read and deserialize a JSON file, mapping every failure to a config error.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        StdpdfError::config(format!("failed to read {what} {}: {e}", path.display()))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        StdpdfError::config(format!("failed to parse {what} {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stdpdf_shared::CURRENT_STATUS;
    use uuid::Uuid;

    const CATALOG_FIXTURE: &str = "../../../fixtures/json/standards-catalog.fixture.json";
    const AVAILABILITY_FIXTURE: &str = "../../../fixtures/json/pdf-availability.fixture.json";

    fn record(code: &str, status: &str, slug: &str) -> StandardRecord {
        StandardRecord {
            code: code.into(),
            title: format!("title of {code}"),
            status: status.into(),
            slug: slug.into(),
        }
    }

    #[test]
    fn catalog_fixture_loads_in_order() {
        let catalog = load_catalog(Path::new(CATALOG_FIXTURE)).expect("load fixture");
        assert_eq!(catalog.standards.len(), 4);
        assert_eq!(catalog.standards[0].code, "GBZ 1-2010");
        assert_eq!(catalog.standards[3].code, "GBZ/T 229.1-2010");
    }

    #[test]
    fn fixture_selection_skips_available_and_withdrawn() {
        let catalog = load_catalog(Path::new(CATALOG_FIXTURE)).unwrap();
        let available = AvailabilityMap::load(Path::new(AVAILABILITY_FIXTURE)).unwrap();

        let missing = select_missing(&catalog, &available, CURRENT_STATUS);
        let slugs: Vec<_> = missing.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["gbz-2-1-2019", "gbz-t-229-1-2010"]);
    }

    #[test]
    fn non_current_records_are_never_selected() {
        let catalog = Catalog {
            standards: vec![
                record("GBZ 188-2014", "废止", "gbz-188-2014"),
                record("GBZ 188-2025", "即将实施", "gbz-188-2025"),
                record("GBZ 2.2-2007", "现行", "gbz-2-2-2007"),
            ],
        };

        let missing = select_missing(&catalog, &AvailabilityMap::default(), CURRENT_STATUS);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].slug, "gbz-2-2-2007");
    }

    #[test]
    fn custom_status_tag() {
        let catalog = Catalog {
            standards: vec![
                record("GBZ 1-2010", "current", "a"),
                record("GBZ 2-2010", "现行", "b"),
            ],
        };

        let missing = select_missing(&catalog, &AvailabilityMap::default(), "current");
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].slug, "a");
    }

    #[test]
    fn malformed_catalog_is_config_error() {
        let dir = std::env::temp_dir().join(format!("stdpdf-catalog-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();

        let not_json = dir.join("broken.json");
        std::fs::write(&not_json, "{\"standards\": [").unwrap();
        assert!(matches!(load_catalog(&not_json), Err(StdpdfError::Config { .. })));

        let wrong_shape = dir.join("shape.json");
        std::fs::write(&wrong_shape, r#"[{"code": "GBZ 1-2010"}]"#).unwrap();
        assert!(matches!(load_catalog(&wrong_shape), Err(StdpdfError::Config { .. })));

        let missing = dir.join("absent.json");
        let err = load_catalog(&missing).unwrap_err();
        assert!(err.to_string().contains("failed to read catalog"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
