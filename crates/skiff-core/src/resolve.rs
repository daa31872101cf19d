//! Path token resolution.
//!
//! A command operand names a location inside a store. Two addressing modes,
//! selected by whether a default store is configured:
//!
//! - **explicit**: `store::/absolute/path` — the token carries the store id
//! - **implicit**: `/absolute/path` — the store id comes from configuration
//!
//! In both modes `+` in the path decodes to a space, so space-bearing paths
//! survive shell tokenization without quoting.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Shape of an explicit-mode token: a non-empty store id (no `/`), the `::`
/// separator, then an absolute path.
static EXPLICIT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^([^/]+?)::(/.*)$").expect("token pattern compiles")
});

/// A resolved `(store id, absolute path)` pair. Immutable; lives for one
/// command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreReference {
    pub store_id: String,
    pub path: String,
}

impl std::fmt::Display for StoreReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.store_id, self.path)
    }
}

/// Check whether `token` is a well-formed path under the active mode.
///
/// Exposed separately from [`resolve`] so command code can pre-check and emit
/// a command-specific usage message.
pub fn is_valid_path(token: &str, default_store: Option<&str>) -> bool {
    match default_store {
        Some(_) => token.starts_with('/'),
        None => EXPLICIT_TOKEN.is_match(token),
    }
}

/// Resolve a raw token into a [`StoreReference`], or fail with
/// [`Error::InvalidPathFormat`].
pub fn resolve(token: &str, default_store: Option<&str>) -> Result<StoreReference> {
    match default_store {
        Some(store_id) => {
            if !token.starts_with('/') {
                return Err(Error::InvalidPathFormat(token.to_string()));
            }
            Ok(StoreReference {
                store_id: store_id.to_string(),
                path: decode_spaces(token),
            })
        }
        None => {
            let caps = EXPLICIT_TOKEN
                .captures(token)
                .ok_or_else(|| Error::InvalidPathFormat(token.to_string()))?;
            Ok(StoreReference {
                store_id: caps[1].to_string(),
                path: decode_spaces(&caps[2]),
            })
        }
    }
}

/// Decode the `+` space placeholder in a path portion.
fn decode_spaces(path: &str) -> String {
    path.replace('+', " ")
}
