pub mod commands;
pub mod config_file;

use std::process::{Command, Output};

/// Run `dstate` with colour off and the given arguments
pub fn dstate(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dstate"))
        .arg("--no-color")
        .args(args)
        .output()
        .unwrap()
}
