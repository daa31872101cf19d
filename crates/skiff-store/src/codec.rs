//! Whole-stream index codec.
//!
//! One sequential read or write of the entire serialized index; the staging
//! layer decides which file the bytes come from or go to. `BTreeMap` children
//! make serialization deterministic, so identical indexes encode to identical
//! bytes.

use std::io;

use crate::index::Index;

impl Index {
    /// Decode an index from a complete serialized byte stream.
    pub fn from_slice(bytes: &[u8]) -> io::Result<Index> {
        serde_json::from_slice(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Encode this index to its serialized byte form.
    pub fn to_vec(&self) -> io::Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(io::Error::other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;

    #[test]
    fn empty_index_round_trips() {
        let index = Index::new();
        let bytes = index.to_vec().unwrap();
        let back = Index::from_slice(&bytes).unwrap();
        assert_eq!(index, back);
    }

    #[test]
    fn nested_tree_round_trips() {
        let mut index = Index::new();
        for (path, data) in [
            ("/docs/readme.txt", b"hello".as_slice()),
            ("/docs/img/logo.bin", &[0u8, 159, 146, 150]),
            ("/top.txt", b"top"),
        ] {
            let Entry::File(file) = Entry::file(data.to_vec()) else {
                unreachable!()
            };
            index.insert_file(path, file).unwrap();
        }

        let bytes = index.to_vec().unwrap();
        let back = Index::from_slice(&bytes).unwrap();
        assert_eq!(index, back);
    }

    #[test]
    fn encoding_is_deterministic() {
        let mut index = Index::new();
        let Entry::File(file) = Entry::file(b"x".to_vec()) else {
            unreachable!()
        };
        index.insert_file("/a.txt", file).unwrap();

        assert_eq!(index.to_vec().unwrap(), index.to_vec().unwrap());
    }

    #[test]
    fn garbage_is_invalid_data() {
        let err = Index::from_slice(b"definitely not an index").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
