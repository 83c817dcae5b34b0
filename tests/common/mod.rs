// tests/common/mod.rs

//! Shared fixture builders for the integration tests.

use nawabs::config::{Config, ConfigOverrides, RECIPES_DIR};
use tempfile::TempDir;

/// A throwaway workspace: a `TempDir` holding the reserved `.nawabs`
/// directory, plus a `Config` discovered from it. Keep the `TempDir` alive
/// for the lifetime of the test or the directory is removed.
pub fn workspace() -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(RECIPES_DIR).join("packages")).unwrap();
    let cfg = Config::discover(dir.path(), ConfigOverrides::default()).unwrap();
    (dir, cfg)
}

pub fn write_shard(dir: &std::path::Path, name: &str, body: &str) {
    std::fs::write(dir.join(RECIPES_DIR).join("packages").join(name), body).unwrap();
}
