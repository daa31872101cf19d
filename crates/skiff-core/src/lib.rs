//! skiff-core: the client logic between the CLI surface and the store.
//!
//! This crate provides:
//!
//! - **resolve**: path token → `(store id, absolute path)` resolution under
//!   explicit (`store::/path`) and implicit (default store) addressing
//! - **staging**: the committed/staged index lifecycle — every mutation lands
//!   in a staging file, only `save` promotes it to the committed file
//! - **transfer**: byte-counter polling, rate/ETA tracking, progress rendering
//! - **listing**: natural-sorted, column-aligned directory listings
//!
//! The CLI crate wires these to argv; skiff-store owns everything below the
//! index boundary.

pub mod config;
pub mod error;
pub mod fmt;
pub mod listing;
pub mod paths;
pub mod resolve;
pub mod staging;
pub mod transfer;

pub use config::Config;
pub use error::{Error, Result};
pub use resolve::StoreReference;
pub use staging::{OpenState, StoreHandle};
pub use transfer::{TransferKind, TransferMonitor};
