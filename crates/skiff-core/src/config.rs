//! Invocation configuration.
//!
//! One `Config` value is built at startup and passed down explicitly — there
//! is no process-wide silent flag or log sink swap; the monitor and lister
//! each receive `quiet` at construction.

use std::path::PathBuf;

use crate::paths;

/// Environment variable naming the default store (switches the resolver into
/// implicit mode).
pub const DEFAULT_STORE_VAR: &str = "SKIFF_STORE";

/// Configuration for one CLI invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default store id; when set, operands are bare absolute paths.
    pub default_store: Option<String>,
    /// Suppress all progress rendering on stderr.
    pub quiet: bool,
    /// Base directory holding local index files.
    pub data_dir: PathBuf,
}

impl Config {
    /// Build a config from the environment plus the CLI quiet flag.
    pub fn from_env(quiet: bool) -> Self {
        let default_store = std::env::var(DEFAULT_STORE_VAR)
            .ok()
            .filter(|s| !s.is_empty());
        Self {
            default_store,
            quiet,
            data_dir: paths::data_dir(),
        }
    }

    /// Directory holding committed and staged index files.
    pub fn stores_dir(&self) -> PathBuf {
        self.data_dir.join("stores")
    }
}
