//! `dstate` application: argument parsing, startup and commands

pub mod cli;
pub mod commands;
pub mod error;
pub mod startup;

#[cfg(test)]
mod tests;
