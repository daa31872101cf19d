//! Transfer monitoring.
//!
//! The monitor polls a [`TransferProgress`] handle on a fixed cadence and
//! renders one status line per tick on stderr, never touching stdout (which
//! carries file data). It runs as a plain future raced with the copy future
//! on one task; the sleep between samples is its only suspension point, so
//! it never blocks the stream's own progress.

use std::io::Write as _;
use std::pin::pin;
use std::time::Duration;

use skiff_store::TransferProgress;

use crate::fmt::{format_duration, format_size};

/// Polling cadence between samples.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Width of the download progress bar, in cells.
const BAR_WIDTH: usize = 24;

/// What kind of transfer is being monitored.
///
/// Downloads know the total size up front and get a bar, percent, and ETA;
/// uploads only learn their size when the stream ends, so they render the
/// byte count and rate alone.
#[derive(Debug, Clone, Copy)]
pub enum TransferKind {
    Download { total: u64 },
    Upload,
}

impl TransferKind {
    fn gerund(&self) -> &'static str {
        match self {
            TransferKind::Download { .. } => "Downloading",
            TransferKind::Upload => "Uploading",
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            TransferKind::Download { .. } => "Download",
            TransferKind::Upload => "Upload",
        }
    }
}

/// Instantaneous-rate tracker over cumulative byte samples.
///
/// The rate is recomputed only when the counter moved since the last sample;
/// a stalled transfer holds the previous rate instead of decaying to zero,
/// which keeps the display steady across brief stalls.
#[derive(Debug, Default)]
pub struct RateTracker {
    last_bytes: u64,
    rate: f64,
}

impl RateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one cumulative sample taken `interval` after the previous one;
    /// returns the current rate in bytes per second.
    pub fn sample(&mut self, bytes: u64, interval: Duration) -> f64 {
        if bytes != self.last_bytes {
            let delta = bytes.saturating_sub(self.last_bytes);
            self.rate = delta as f64 / interval.as_secs_f64();
            self.last_bytes = bytes;
        }
        self.rate
    }
}

/// Drives the render loop for one transfer.
#[derive(Debug, Clone)]
pub struct TransferMonitor {
    interval: Duration,
    quiet: bool,
}

impl TransferMonitor {
    pub fn new(quiet: bool) -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            quiet,
        }
    }

    /// Override the polling cadence (tests use a short one).
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Poll and render until the transfer completes.
    ///
    /// The completion flag is read before the byte counter each tick, so the
    /// final render always carries the full count; one render happens after
    /// the flag flips, then a single "finished" line. Quiet mode skips all
    /// rendering but still awaits completion.
    pub async fn run(&self, progress: &TransferProgress, kind: TransferKind) {
        if self.quiet {
            while !progress.is_done() {
                tokio::time::sleep(self.interval).await;
            }
            return;
        }

        let mut tracker = RateTracker::new();
        // Elapsed time is tick-driven, not wall-clock, so the display is
        // deterministic for a given cadence.
        let mut elapsed = Duration::ZERO;

        loop {
            let done = progress.is_done();
            let bytes = progress.bytes();
            let rate = tracker.sample(bytes, self.interval);

            let mut stderr = std::io::stderr().lock();
            let _ = write!(stderr, "\r{}", render(kind, bytes, rate, elapsed));
            let _ = stderr.flush();
            drop(stderr);

            if done {
                break;
            }
            tokio::time::sleep(self.interval).await;
            elapsed += self.interval;
        }

        eprintln!();
        eprintln!("{} finished.", kind.verb());
    }

    /// Drive a copy future to completion while rendering its progress.
    ///
    /// [`run`](Self::run) alone returns only once the progress handle reports
    /// completion, and a failed copy never flips that flag. Racing the two
    /// lets a copy error cancel the renderer and surface immediately; a
    /// successful copy still waits for the final render and the finished
    /// line.
    pub async fn watch<T, F>(
        &self,
        progress: &TransferProgress,
        kind: TransferKind,
        copy: F,
    ) -> std::io::Result<T>
    where
        F: Future<Output = std::io::Result<T>>,
    {
        let mut copy = pin!(copy);
        let mut render = pin!(self.run(progress, kind));
        tokio::select! {
            copied = &mut copy => {
                let value = copied?;
                render.await;
                Ok(value)
            }
            () = &mut render => copy.await,
        }
    }
}

/// One status line for the current tick.
fn render(kind: TransferKind, bytes: u64, rate: f64, elapsed: Duration) -> String {
    let rate_cell = format!("{}/s", format_size(rate.round() as u64));
    let elapsed_cell = format!("{} elapsed", format_duration(elapsed));

    match kind {
        TransferKind::Download { total } => {
            let fraction = if total == 0 {
                1.0
            } else {
                (bytes as f64 / total as f64).clamp(0.0, 1.0)
            };
            let percent = (fraction * 100.0).floor() as u64;
            format!(
                "{}: {} {percent}% - {} / {} - {rate_cell} - ETA {} - {elapsed_cell}",
                kind.gerund(),
                bar(fraction),
                format_size(bytes),
                format_size(total),
                eta(bytes, total, rate),
            )
        }
        TransferKind::Upload => {
            format!(
                "{}: {} sent - {rate_cell} - {elapsed_cell}",
                kind.gerund(),
                format_size(bytes),
            )
        }
    }
}

/// Fixed-width progress bar for a completion fraction.
fn bar(fraction: f64) -> String {
    let filled = (fraction * BAR_WIDTH as f64).floor() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}

/// Estimated time remaining, or `--` before the rate is known.
fn eta(bytes: u64, total: u64, rate: f64) -> String {
    if rate <= 0.0 || bytes >= total {
        return "--".to_string();
    }
    let remaining = (total - bytes) as f64 / rate;
    format_duration(Duration::from_secs(remaining.ceil() as u64))
}
