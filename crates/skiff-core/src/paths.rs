//! Local filesystem locations for store index files.
//!
//! Index files live under the XDG data directory by default:
//!
//! | Purpose | Path |
//! |---------|------|
//! | Committed index | `$XDG_DATA_HOME/skiff/stores/<store>.idx` |
//! | Staged index | `$XDG_DATA_HOME/skiff/stores/<store>.idx.staging` |
//!
//! `SKIFF_DATA_DIR` overrides the base for tests and scripted use.

use std::path::PathBuf;

use directories::BaseDirs;

/// Base data directory for skiff state.
///
/// Uses `SKIFF_DATA_DIR` if set, else `$XDG_DATA_HOME/skiff`, else
/// `~/.local/share/skiff`.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SKIFF_DATA_DIR") {
        return PathBuf::from(dir);
    }
    BaseDirs::new()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| dirs_fallback().join(".local").join("share"))
        .join("skiff")
}

/// Fallback home directory when BaseDirs fails.
fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_data_dir_ends_with_skiff() {
        // Only meaningful when the override is unset, which is the common
        // case for unit test runs.
        if std::env::var("SKIFF_DATA_DIR").is_err() {
            assert!(data_dir().ends_with("skiff"));
        }
    }
}
