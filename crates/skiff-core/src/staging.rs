//! Committed/staged index lifecycle.
//!
//! Per store, two local files:
//!
//! - `<store>.idx` — the committed index, written only by an explicit save
//! - `<store>.idx.staging` — the working copy, written by every mutation
//!
//! Readers always prefer staging over committed, so an interrupted session's
//! edits are never silently discarded. A corrupt staging file is a hard
//! failure; falling back to the committed file would drop staged edits.
//!
//! No cross-process lock is taken: each invocation is a short-lived single
//! writer, and concurrent invocations against one store are the caller's
//! problem to serialize.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use skiff_store::Index;
use tokio::fs;
use tracing::debug;

use crate::error::{Error, Result};

/// Suffix distinguishing the staged copy from the committed file.
pub const STAGING_SUFFIX: &str = ".staging";

/// What was found on disk when the store was opened. Resolved exactly once,
/// in [`StoreHandle::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenState {
    /// A staging file existed; the index carries uncommitted edits.
    Staged,
    /// Only the committed file existed; the in-memory copy is the edit base.
    Committed,
    /// Neither file existed; the store has never been saved.
    Fresh,
}

/// An open store: its in-memory index plus the two local file locations.
#[derive(Debug)]
pub struct StoreHandle {
    store_id: String,
    committed_path: PathBuf,
    staging_path: PathBuf,
    state: OpenState,
    index: Index,
}

impl StoreHandle {
    /// Open a store, loading the staged index if present, else the committed
    /// one, else starting empty.
    pub async fn open(store_id: &str, stores_dir: &Path) -> Result<Self> {
        let committed_path = stores_dir.join(format!("{store_id}.idx"));
        let staging_path = stores_dir.join(format!("{store_id}.idx{STAGING_SUFFIX}"));

        let (index, state) = if fs::try_exists(&staging_path).await? {
            (load_index(&staging_path).await?, OpenState::Staged)
        } else if fs::try_exists(&committed_path).await? {
            (load_index(&committed_path).await?, OpenState::Committed)
        } else {
            (Index::new(), OpenState::Fresh)
        };

        debug!(store_id, ?state, "opened store");
        Ok(Self {
            store_id: store_id.to_string(),
            committed_path,
            staging_path,
            state,
            index,
        })
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn state(&self) -> OpenState {
        self.state
    }

    pub fn committed_path(&self) -> &Path {
        &self.committed_path
    }

    pub fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut Index {
        &mut self.index
    }

    /// Persist the in-memory index.
    ///
    /// With `commit` false (every mutating command): write the staging file
    /// and leave the committed file untouched. With `commit` true (only the
    /// save command): write the committed file to completion, then delete the
    /// staging file — in that order, so an interruption between the steps
    /// leaves a valid committed file plus a redundant staging file.
    pub async fn persist(&mut self, commit: bool) -> Result<()> {
        let bytes = self.index.to_vec()?;
        if commit {
            write_atomic(&self.committed_path, bytes).await?;
            if fs::try_exists(&self.staging_path).await? {
                fs::remove_file(&self.staging_path).await?;
            }
            self.state = OpenState::Committed;
            debug!(store_id = %self.store_id, "committed index");
        } else {
            write_atomic(&self.staging_path, bytes).await?;
            self.state = OpenState::Staged;
            debug!(store_id = %self.store_id, "staged index");
        }
        Ok(())
    }
}

async fn load_index(path: &Path) -> Result<Index> {
    let bytes = fs::read(path).await?;
    Index::from_slice(&bytes).map_err(|source| Error::CorruptIndex {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `bytes` to `path` via a temp file in the same directory plus a
/// rename, so a half-written index is never observable.
async fn write_atomic(path: &Path, bytes: Vec<u8>) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent dir"))?;
    fs::create_dir_all(dir).await?;

    let path = path.to_path_buf();
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(std::io::Error::other)??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiff_store::FileEntry;

    fn stores_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[tokio::test]
    async fn fresh_store_opens_empty() {
        let dir = stores_dir();
        let handle = StoreHandle::open("new", dir.path()).await.unwrap();
        assert_eq!(handle.state(), OpenState::Fresh);
        assert!(handle.index().lookup("/").is_some());
    }

    #[tokio::test]
    async fn staging_persist_creates_only_staging_file() {
        let dir = stores_dir();
        let mut handle = StoreHandle::open("new", dir.path()).await.unwrap();
        handle.persist(false).await.unwrap();

        assert!(handle.staging_path().exists());
        assert!(!handle.committed_path().exists());
        assert_eq!(handle.state(), OpenState::Staged);
    }

    #[tokio::test]
    async fn persist_is_idempotent_byte_for_byte() {
        let dir = stores_dir();
        let mut handle = StoreHandle::open("s", dir.path()).await.unwrap();
        handle
            .index_mut()
            .insert_file("/a.txt", FileEntry::new(b"data".to_vec()))
            .unwrap();

        handle.persist(false).await.unwrap();
        let first = std::fs::read(handle.staging_path()).unwrap();
        handle.persist(false).await.unwrap();
        let second = std::fs::read(handle.staging_path()).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn commit_after_restart_reflects_staged_mutation() {
        let dir = stores_dir();

        // First invocation: mutate and stage.
        let mut handle = StoreHandle::open("s", dir.path()).await.unwrap();
        handle
            .index_mut()
            .insert_file("/kept.txt", FileEntry::new(b"kept".to_vec()))
            .unwrap();
        handle.persist(false).await.unwrap();
        drop(handle);

        // Second invocation: save.
        let mut handle = StoreHandle::open("s", dir.path()).await.unwrap();
        assert_eq!(handle.state(), OpenState::Staged);
        handle.persist(true).await.unwrap();

        assert!(handle.committed_path().exists());
        assert!(!handle.staging_path().exists());

        // Third invocation sees the committed mutation.
        let handle = StoreHandle::open("s", dir.path()).await.unwrap();
        assert_eq!(handle.state(), OpenState::Committed);
        assert!(handle.index().exists("/kept.txt"));
    }

    #[tokio::test]
    async fn staging_is_preferred_over_committed() {
        let dir = stores_dir();

        let mut handle = StoreHandle::open("s", dir.path()).await.unwrap();
        handle
            .index_mut()
            .insert_file("/committed.txt", FileEntry::new(b"old".to_vec()))
            .unwrap();
        handle.persist(true).await.unwrap();

        let mut handle = StoreHandle::open("s", dir.path()).await.unwrap();
        handle
            .index_mut()
            .insert_file("/staged.txt", FileEntry::new(b"new".to_vec()))
            .unwrap();
        handle.persist(false).await.unwrap();

        let handle = StoreHandle::open("s", dir.path()).await.unwrap();
        assert_eq!(handle.state(), OpenState::Staged);
        assert!(handle.index().exists("/committed.txt"));
        assert!(handle.index().exists("/staged.txt"));
    }

    #[tokio::test]
    async fn corrupt_staging_file_is_fatal() {
        let dir = stores_dir();

        let mut handle = StoreHandle::open("s", dir.path()).await.unwrap();
        handle.persist(true).await.unwrap();
        std::fs::write(handle.staging_path(), b"not an index").unwrap();

        let err = StoreHandle::open("s", dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::CorruptIndex { .. }));
    }

    #[tokio::test]
    async fn committed_file_untouched_by_staging_persist() {
        let dir = stores_dir();

        let mut handle = StoreHandle::open("s", dir.path()).await.unwrap();
        handle.persist(true).await.unwrap();
        let committed_before = std::fs::read(handle.committed_path()).unwrap();

        let mut handle = StoreHandle::open("s", dir.path()).await.unwrap();
        handle
            .index_mut()
            .insert_file("/x.txt", FileEntry::new(b"x".to_vec()))
            .unwrap();
        handle.persist(false).await.unwrap();

        let committed_after = std::fs::read(handle.committed_path()).unwrap();
        assert_eq!(committed_before, committed_after);
    }
}
