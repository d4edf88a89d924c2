//! Shared fixtures for integration tests

use delivery_state::config::EngineConfig;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write an engine.toml whose data directory lives inside `dir`
pub fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("engine.toml");
    let data_dir = dir.join("data");
    let contents = format!(
        "[bitset]\nblock_size = 64\n\n[storage]\ndata_dir = \"{}\"\n{}",
        data_dir.display().to_string().replace('\\', "/"),
        extra
    );
    std::fs::write(&path, contents).unwrap();
    path
}

/// Temporary directory plus the loaded config inside it
pub fn engine(extra: &str) -> (TempDir, EngineConfig) {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), extra);
    let (config, loaded) = EngineConfig::load(Some(path.as_path())).unwrap();
    assert_eq!(loaded.as_deref(), Some(path.as_path()));
    (dir, config)
}
