//! Filesystem helpers shared by the catalog, fetcher and report writers.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Result, StdpdfError};

/// Write `bytes` to `path` via a sibling `.part` file and a rename, so readers
/// never observe a half-written file. Parent directories are created.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StdpdfError::io(parent, e))?;
    }

    let tmp_path = part_path(path);
    std::fs::write(&tmp_path, bytes).map_err(|e| StdpdfError::io(&tmp_path, e))?;

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(StdpdfError::io(path, e));
    }

    Ok(())
}

fn part_path(path: &Path) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("stdpdf"));
    name.push(".part");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_path_keeps_full_name() {
        let p = part_path(Path::new("/srv/pdf/GBZ-2.1-2019.pdf"));
        assert_eq!(p, PathBuf::from("/srv/pdf/GBZ-2.1-2019.pdf.part"));
    }

    #[test]
    fn write_atomic_creates_parents_and_replaces() {
        let dir = std::env::temp_dir().join(format!("stdpdf-fs-{}", uuid::Uuid::now_v7()));
        let path = dir.join("nested").join("map.json");

        write_atomic(&path, b"{}").expect("first write");
        write_atomic(&path, b"{\"a\": \"b\"}").expect("overwrite");

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"a\": \"b\"}");
        assert!(!part_path(&path).exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
