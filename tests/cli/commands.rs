//! Subcommand output

use super::dstate;
use crate::common;
use delivery_state::collections::Priority;
use delivery_state::config::EngineConfig;
use delivery_state::state::RollbackPriority;
use serde_json::Value;
use std::path::Path;

fn seed(config: &EngineConfig) {
    let layout = config.layout("orders").unwrap();
    let state = layout
        .open_subscription("billing", RollbackPriority::Maintain)
        .unwrap();
    state.register(1, Priority::Low);
    state.register(2, Priority::Highest);
    state.register(130, Priority::Highest);
    state.close().unwrap();

    let delayed = layout.open_delayed(1000).unwrap();
    delayed.register_at(3_200, 7);
    delayed.register_at(4_100, 8);
    delayed.close().unwrap();
}

fn json(output: &std::process::Output) -> Value {
    assert!(
        output.status.success(),
        "dstate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[test]
fn test_inspect_json() {
    let (_dir, config) = common::engine("");
    seed(&config);
    let file = path_arg(&config.layout("orders").unwrap().at_rest_path("billing"));

    let report = json(&dstate(&["-b", "64", "--format", "json", "inspect", file.as_str()]));
    let owners: Vec<u64> = report["owners"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["owner"].as_u64().unwrap())
        .collect();
    assert_eq!(owners, vec![2, 9]);
    assert_eq!(report["owners"][1]["identifiers"], 2);
    assert_eq!(report["owners"][1]["last"], 130);
}

#[test]
fn test_dump_json() {
    let (_dir, config) = common::engine("");
    seed(&config);
    let file = path_arg(&config.layout("orders").unwrap().at_rest_path("billing"));

    let report = json(&dstate(&[
        "-b", "64", "--format", "json", "dump", file.as_str(), "--owner", "9",
    ]));
    assert_eq!(report["identifiers"], serde_json::json!([2, 130]));
}

#[test]
fn test_dump_unknown_owner_fails() {
    let (_dir, config) = common::engine("");
    seed(&config);
    let file = path_arg(&config.layout("orders").unwrap().at_rest_path("billing"));

    let output = dstate(&["-b", "64", "dump", file.as_str(), "--owner", "5"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_buckets_text() {
    let (_dir, config) = common::engine("");
    seed(&config);
    let file = path_arg(&config.layout("orders").unwrap().delayed_path());

    let output = dstate(&["-b", "64", "buckets", file.as_str()]);
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("Bucket"));
    assert!(text.contains("3000"));
    assert!(text.contains("4000"));
}

#[test]
fn test_version() {
    let report = json(&dstate(&["--format", "json", "version"]));
    assert_eq!(report["name"], "delivery-state");
    assert_eq!(report["version"], env!("CARGO_PKG_VERSION"));
}
