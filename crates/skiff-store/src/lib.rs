//! skiff-store: the store collaborator skiff's core talks to.
//!
//! This crate owns everything below the index boundary:
//!
//! - **Entry**: the file/directory tree node, with serde derives
//! - **Index**: an in-memory index tree with lookup and mutation operations
//! - **codec**: whole-stream serialization of an index to and from bytes
//! - **streams**: byte-counted async read/write streams over file payloads
//!
//! The core crate never touches Entry fields mutably; all mutation goes
//! through `Index` operations, and all durability goes through the codec.

mod codec;
mod entry;
mod index;
mod stream;

pub use entry::{DirectoryEntry, Entry, FileEntry};
pub use index::Index;
pub use stream::{ReadStream, TransferProgress, WriteStream};
