//! Entry — a node in a store's index tree.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file node: metadata plus the payload bytes.
///
/// The payload is embedded in the serialized index as base64 so the whole
/// store round-trips through one sequential byte stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Payload size in bytes.
    pub size: u64,
    /// When the file was first written to the store.
    pub created_at: DateTime<Utc>,
    /// Payload bytes.
    #[serde(with = "payload")]
    pub data: Vec<u8>,
}

/// A directory node: named children, kept sorted for deterministic output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub items: BTreeMap<String, Entry>,
}

/// A node in the index tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entry {
    File(FileEntry),
    Directory(DirectoryEntry),
}

impl FileEntry {
    /// Build a file entry from payload bytes, stamped now.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            size: data.len() as u64,
            created_at: Utc::now(),
            data,
        }
    }
}

impl Entry {
    /// Create an empty directory entry.
    pub fn empty_directory() -> Self {
        Entry::Directory(DirectoryEntry::default())
    }

    /// Create a file entry from payload bytes, stamped now.
    pub fn file(data: Vec<u8>) -> Self {
        Entry::File(FileEntry::new(data))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Entry::Directory(_))
    }

    /// Tag used as the leading component of listing sort keys.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Entry::File(_) => "file",
            Entry::Directory(_) => "directory",
        }
    }
}

mod payload {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(data: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(de)?;
        STANDARD.decode(encoded).map_err(D::Error::custom)
    }
}
