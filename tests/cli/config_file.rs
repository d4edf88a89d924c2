//! Configuration discovery and error exits

use super::dstate;
use crate::common;
use tempfile::TempDir;

#[test]
fn test_block_size_from_config_file() {
    let (dir, config) = common::engine("");
    let layout = config.layout("orders").unwrap();
    let delayed = layout.open_delayed(1000).unwrap();
    delayed.register_at(1_000, 1);
    delayed.close().unwrap();

    let config_file = dir.path().join("engine.toml");
    let output = dstate(&[
        "-c",
        config_file.to_str().unwrap(),
        "buckets",
        layout.delayed_path().to_str().unwrap(),
    ]);
    assert!(output.status.success());
}

#[test]
fn test_missing_config_file_exits() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");
    let output = dstate(&["-c", missing.to_str().unwrap(), "version"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.toml"));
}

#[test]
fn test_invalid_config_exits() {
    let dir = TempDir::new().unwrap();
    let path = common::write_config(dir.path(), "\n[delayed]\nslot_millis = 0\n");
    let output = dstate(&["-c", path.to_str().unwrap(), "version"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("slot_millis"));
}

#[test]
fn test_missing_state_file_exits() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.bits");
    let output = dstate(&["buckets", missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
}
