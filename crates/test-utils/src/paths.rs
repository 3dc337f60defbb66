//! Locating optional AREA files for tests that exercise real imagery.

use std::path::PathBuf;

/// Workspace root, two levels above this crate's manifest.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent()
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// `crates/{crate_name}/testdata/`
pub fn crate_testdata_dir(crate_name: &str) -> PathBuf {
    workspace_root()
        .join("crates")
        .join(crate_name)
        .join("testdata")
}

/// Look for a test file, in order: `$TEST_DATA_DIR`, the reader and
/// conversion crates' `testdata/`, then the workspace `testdata/`.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(dir).join(name));
    }
    candidates.push(crate_testdata_dir("area-reader").join(name));
    candidates.push(crate_testdata_dir("conversion").join(name));
    candidates.push(workspace_root().join("testdata").join(name));

    candidates.into_iter().find(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }

    #[test]
    fn test_crate_testdata_dir() {
        let dir = crate_testdata_dir("area-reader");
        assert!(dir.ends_with("crates/area-reader/testdata"));
    }

    #[test]
    fn test_missing_file() {
        assert!(find_test_file("no_such_image.area").is_none());
    }
}
