//! In-memory index tree: lookup and mutation operations.
//!
//! All paths are absolute, `/`-separated, within one store's namespace. A
//! trailing slash is tolerated (it matters to callers, not to the tree).
//! Mutations are synchronous and purely in-memory; durability belongs to the
//! staging layer above.

use std::io;

use serde::{Deserialize, Serialize};

use crate::entry::{Entry, FileEntry};
use crate::stream::{ReadStream, WriteStream};

/// A store's index: the root directory tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    root: Entry,
}

impl Default for Index {
    fn default() -> Self {
        Self {
            root: Entry::empty_directory(),
        }
    }
}

/// Split an absolute path into components, ignoring empty segments.
fn components(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

impl Index {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the entry at `path`. `/` resolves to the root directory.
    pub fn lookup(&self, path: &str) -> Option<&Entry> {
        let mut current = &self.root;
        for name in components(path) {
            match current {
                Entry::Directory(dir) => current = dir.items.get(name)?,
                Entry::File(_) => return None,
            }
        }
        Some(current)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Walk to the directory at `comps`, optionally creating missing
    /// directories along the way.
    fn dir_mut(
        &mut self,
        comps: &[&str],
        create: bool,
        path: &str,
    ) -> io::Result<&mut crate::entry::DirectoryEntry> {
        let mut current = &mut self.root;
        for name in comps {
            let dir = match current {
                Entry::Directory(dir) => dir,
                Entry::File(_) => return Err(not_a_directory(path)),
            };
            current = if create {
                dir.items
                    .entry((*name).to_string())
                    .or_insert_with(Entry::empty_directory)
            } else {
                dir.items.get_mut(*name).ok_or_else(|| not_found(path))?
            };
        }
        match current {
            Entry::Directory(dir) => Ok(dir),
            Entry::File(_) => Err(not_a_directory(path)),
        }
    }

    /// Insert an entry at `path`, creating parent directories on demand.
    ///
    /// Overwriting a file is allowed; overwriting a directory is not.
    fn insert_entry(&mut self, path: &str, entry: Entry) -> io::Result<()> {
        let comps = components(path);
        let (name, parents) = comps
            .split_last()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "missing entry name"))?;

        let parent = self.dir_mut(parents, true, path)?;
        if let Some(Entry::Directory(_)) = parent.items.get(*name) {
            return Err(is_a_directory(path));
        }
        parent.items.insert((*name).to_string(), entry);
        Ok(())
    }

    /// Insert a file entry at `path`.
    pub fn insert_file(&mut self, path: &str, file: FileEntry) -> io::Result<()> {
        self.insert_entry(path, Entry::File(file))
    }

    /// Remove the entry at `path`, returning it. Directories are removed
    /// with their whole subtree.
    pub fn remove(&mut self, path: &str) -> io::Result<Entry> {
        let comps = components(path);
        let Some((name, parents)) = comps.split_last() else {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "cannot remove store root",
            ));
        };

        let parent = self.dir_mut(parents, false, path)?;
        parent.items.remove(*name).ok_or_else(|| not_found(path))
    }

    /// Move the entry at `from` to `to` within this index.
    pub fn move_entry(&mut self, from: &str, to: &str) -> io::Result<()> {
        if is_inside(from, to) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot move {from} into itself"),
            ));
        }
        // Clone-insert-remove keeps the tree intact if the insert fails.
        let entry = self.lookup(from).cloned().ok_or_else(|| not_found(from))?;
        self.insert_entry(to, entry)?;
        self.remove(from)?;
        Ok(())
    }

    /// Copy the entry at `from` to `to` within this index.
    pub fn copy_entry(&mut self, from: &str, to: &str) -> io::Result<()> {
        let entry = self.lookup(from).cloned().ok_or_else(|| not_found(from))?;
        self.insert_entry(to, entry)
    }

    /// Open a byte-counted read stream over the file at `path`.
    pub fn read_stream(&self, path: &str) -> io::Result<ReadStream> {
        match self.lookup(path) {
            Some(Entry::File(file)) => Ok(ReadStream::new(file.data.clone())),
            Some(Entry::Directory(_)) => Err(is_a_directory(path)),
            None => Err(not_found(path)),
        }
    }

    /// Open a byte-counted write stream destined for `path`.
    ///
    /// The stream buffers payload bytes; once the producer has shut it down,
    /// pass it back through [`Index::insert_written`] to land the entry.
    pub fn write_stream(&self, path: &str) -> io::Result<WriteStream> {
        if components(path).is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "missing entry name",
            ));
        }
        if let Some(Entry::Directory(_)) = self.lookup(path) {
            return Err(is_a_directory(path));
        }
        Ok(WriteStream::new(path))
    }

    /// Land a completed write stream as a file entry at its destination.
    pub fn insert_written(&mut self, stream: WriteStream) -> io::Result<()> {
        let (path, file) = stream.into_file_entry();
        self.insert_file(&path, file)
    }
}

/// True if `to` is `from` itself or nested below it.
fn is_inside(from: &str, to: &str) -> bool {
    let from = components(from);
    let to = components(to);
    to.len() >= from.len() && to[..from.len()] == from[..]
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("not found: {path}"))
}

fn not_a_directory(path: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotADirectory,
        format!("not a directory: {path}"),
    )
}

fn is_a_directory(path: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::IsADirectory,
        format!("is a directory: {path}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(paths: &[(&str, &[u8])]) -> Index {
        let mut index = Index::new();
        for (path, data) in paths {
            index
                .insert_file(path, file_entry(data))
                .unwrap_or_else(|e| panic!("insert {path}: {e}"));
        }
        index
    }

    fn file_entry(data: &[u8]) -> FileEntry {
        match Entry::file(data.to_vec()) {
            Entry::File(f) => f,
            Entry::Directory(_) => unreachable!(),
        }
    }

    #[test]
    fn lookup_root_is_directory() {
        let index = Index::new();
        assert!(index.lookup("/").is_some_and(Entry::is_directory));
    }

    #[test]
    fn insert_creates_parent_directories() {
        let index = index_with(&[("/a/b/c.txt", b"nested")]);
        assert!(index.lookup("/a").is_some_and(Entry::is_directory));
        assert!(index.lookup("/a/b").is_some_and(Entry::is_directory));
        assert!(index.exists("/a/b/c.txt"));
    }

    #[test]
    fn lookup_missing_is_none() {
        let index = Index::new();
        assert!(index.lookup("/nope").is_none());
        assert!(!index.exists("/nope"));
    }

    #[test]
    fn lookup_through_file_is_none() {
        let index = index_with(&[("/a.txt", b"x")]);
        assert!(index.lookup("/a.txt/below").is_none());
    }

    #[test]
    fn remove_file() {
        let mut index = index_with(&[("/a.txt", b"x")]);
        index.remove("/a.txt").unwrap();
        assert!(!index.exists("/a.txt"));
    }

    #[test]
    fn remove_directory_takes_subtree() {
        let mut index = index_with(&[("/dir/a.txt", b"a"), ("/dir/sub/b.txt", b"b")]);
        index.remove("/dir").unwrap();
        assert!(!index.exists("/dir"));
        assert!(!index.exists("/dir/sub/b.txt"));
    }

    #[test]
    fn remove_missing_is_not_found() {
        let mut index = Index::new();
        let err = index.remove("/nope").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn remove_root_is_denied() {
        let mut index = Index::new();
        let err = index.remove("/").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn move_file() {
        let mut index = index_with(&[("/old.txt", b"content")]);
        index.move_entry("/old.txt", "/dir/new.txt").unwrap();
        assert!(!index.exists("/old.txt"));
        assert!(index.exists("/dir/new.txt"));
    }

    #[test]
    fn move_directory_keeps_children() {
        let mut index = index_with(&[("/dir/a.txt", b"a"), ("/dir/sub/b.txt", b"b")]);
        index.move_entry("/dir", "/renamed").unwrap();
        assert!(index.exists("/renamed/a.txt"));
        assert!(index.exists("/renamed/sub/b.txt"));
        assert!(!index.exists("/dir"));
    }

    #[test]
    fn move_into_itself_is_rejected() {
        let mut index = index_with(&[("/dir/a.txt", b"a")]);
        let err = index.move_entry("/dir", "/dir/sub").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(index.exists("/dir/a.txt"));
    }

    #[test]
    fn move_missing_is_not_found() {
        let mut index = Index::new();
        let err = index.move_entry("/nope", "/dest").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn copy_leaves_source() {
        let mut index = index_with(&[("/a.txt", b"x")]);
        index.copy_entry("/a.txt", "/b.txt").unwrap();
        assert!(index.exists("/a.txt"));
        assert!(index.exists("/b.txt"));
    }

    #[test]
    fn overwriting_directory_with_file_is_rejected() {
        let mut index = index_with(&[("/dir/a.txt", b"a")]);
        let err = index.insert_file("/dir", file_entry(b"x")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::IsADirectory);
    }

    #[test]
    fn trailing_slash_is_tolerated() {
        let index = index_with(&[("/dir/a.txt", b"a")]);
        assert!(index.exists("/dir/"));
        assert!(index.exists("/dir/a.txt"));
    }

    #[test]
    fn read_stream_on_directory_fails() {
        let index = index_with(&[("/dir/a.txt", b"a")]);
        let err = index.read_stream("/dir").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::IsADirectory);
    }
}
