//! Byte-counted transfer streams.
//!
//! Both stream types expose a cloneable [`TransferProgress`] handle: a
//! monotonically increasing byte counter plus a completion flag. The transfer
//! monitor polls the handle while `tokio::io::copy` drives the stream on the
//! same task, so no locking is involved beyond the atomics.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::entry::FileEntry;

/// Shared view of an in-flight transfer: cumulative bytes and completion.
#[derive(Debug, Clone, Default)]
pub struct TransferProgress {
    bytes: Arc<AtomicU64>,
    done: Arc<AtomicBool>,
}

impl TransferProgress {
    /// Cumulative bytes moved so far.
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    /// True once the stream has seen its last byte.
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Relaxed)
    }

    fn add(&self, n: u64) {
        self.bytes.fetch_add(n, Ordering::Relaxed);
    }

    fn finish(&self) {
        self.done.store(true, Ordering::Relaxed);
    }
}

/// Byte-counted reader over a file payload.
#[derive(Debug)]
pub struct ReadStream {
    data: Vec<u8>,
    pos: usize,
    progress: TransferProgress,
}

impl ReadStream {
    pub(crate) fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            pos: 0,
            progress: TransferProgress::default(),
        }
    }

    /// Total payload length, known up front for downloads.
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn progress(&self) -> TransferProgress {
        self.progress.clone()
    }
}

impl AsyncRead for ReadStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let remaining = &this.data[this.pos..];
        let n = remaining.len().min(buf.remaining());
        buf.put_slice(&remaining[..n]);
        this.pos += n;
        this.progress.add(n as u64);
        // The flag flips on the read that consumes the final byte, so the
        // monitor's last sample already carries the full count.
        if this.pos == this.data.len() {
            this.progress.finish();
        }
        Poll::Ready(Ok(()))
    }
}

/// Byte-counted writer buffering a file payload for `path`.
#[derive(Debug)]
pub struct WriteStream {
    path: String,
    buf: Vec<u8>,
    progress: TransferProgress,
}

impl WriteStream {
    pub(crate) fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            buf: Vec::new(),
            progress: TransferProgress::default(),
        }
    }

    pub fn progress(&self) -> TransferProgress {
        self.progress.clone()
    }

    /// Consume the stream into its destination path and file entry.
    pub(crate) fn into_file_entry(self) -> (String, FileEntry) {
        (self.path, FileEntry::new(self.buf))
    }
}

impl AsyncWrite for WriteStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        data: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        this.buf.extend_from_slice(data);
        this.progress.add(data.len() as u64);
        Poll::Ready(Ok(data.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.get_mut().progress.finish();
        Poll::Ready(Ok(()))
    }
}
