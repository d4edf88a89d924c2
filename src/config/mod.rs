//! Engine configuration
//!
//! Settings come from an optional TOML file:
//!
//! ```toml
//! [bitset]
//! block_size = 4096          # identifiers per block, multiple of 64
//!
//! [state]
//! rollback_priority = "maintain"   # or "increment"
//!
//! [delayed]
//! slot_millis = 1000
//!
//! [storage]
//! data_dir = "/var/lib/delivery-state"
//!
//! [logging]
//! level = "info"
//! format = "text"            # text | ext | json
//! file = "/var/log/dstate.log"
//! ```
//!
//! Every section and key is optional.

mod engine;
mod error;
mod layout;

pub use engine::{
    BitSetConfig, DelayedConfig, EngineConfig, LoggingConfig, StateConfig, StorageConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use layout::StorageLayout;

/// Directory name used under the platform config and data directories
pub const APP_DIR: &str = "delivery-state";

/// Config file name inside the platform config directory
pub const CONFIG_FILE: &str = "engine.toml";

#[cfg(test)]
mod tests;
