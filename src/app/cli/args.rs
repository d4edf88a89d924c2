//! Command-line arguments for `dstate`

use crate::config::EngineConfig;
use crate::core::logging::LogFormat;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "dstate")]
#[command(about = "Inspect message delivery state files")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", global = true,
          value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", global = true,
          value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path
    #[arg(long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Force colored output
    #[arg(long = "color", global = true)]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", conflicts_with = "color", global = true)]
    pub no_color: bool,

    /// Identifiers per block in the file (overrides [bitset] block_size)
    #[arg(short = 'b', long = "block-size", value_name = "BITS", global = true)]
    pub block_size: Option<u64>,

    /// Output format
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the owners stored in a bitset file
    Inspect {
        /// Bitset file
        file: PathBuf,
    },
    /// Print every identifier held by one owner
    Dump {
        /// Bitset file
        file: PathBuf,
        /// Owner id (priority level or bucket key)
        #[arg(long = "owner", value_name = "ID")]
        owner: u64,
    },
    /// List the delay or transaction buckets stored in a bitset file
    Buckets {
        /// Bitset file
        file: PathBuf,
    },
    /// Show version and storage format information
    Version,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Args {
    /// `--color` forces, `--no-color` disables, otherwise colour on a terminal
    pub fn use_color(&self) -> bool {
        if self.no_color {
            return false;
        }
        self.color || std::io::stdout().is_terminal()
    }

    /// Block size from the command line, else from the config file
    pub fn block_size(&self, config: &EngineConfig) -> u64 {
        self.block_size.unwrap_or(config.bitset.block_size)
    }

    /// Log level from the command line, else the config file, else `info`
    pub fn log_level<'a>(&'a self, config: &'a EngineConfig) -> &'a str {
        self.log_level
            .as_deref()
            .or(config.logging.level.as_deref())
            .unwrap_or("info")
    }

    pub fn log_format(&self, config: &EngineConfig) -> LogFormat {
        self.log_format
            .as_deref()
            .or(config.logging.format.as_deref())
            .and_then(LogFormat::parse)
            .unwrap_or(LogFormat::Text)
    }

    pub fn log_file<'a>(&'a self, config: &'a EngineConfig) -> Option<&'a std::path::Path> {
        self.log_file.as_deref().or(config.logging.file.as_deref())
    }
}
