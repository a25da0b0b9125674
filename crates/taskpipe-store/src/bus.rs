//! Append-only JSONL event bus.
//!
//! One JSON object per line, one line per envelope, appended to a per-topic
//! log file. Appends run under an fs2 advisory exclusive lock with a
//! bounded acquisition timeout, so a wedged writer degrades into a dropped
//! event (logged by the pipeline) instead of stalled user-visible latency.
//!
//! Delivery is at-least-once in the weakest sense: one attempt per
//! mutation, no retry, no idempotency key. Consumers tail the file and
//! must tolerate gaps after outages.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use fs2::FileExt;

use taskpipe_core::error::DownstreamError;
use taskpipe_core::event::Envelope;
use taskpipe_core::ports::EventPublisher;

/// Publishes envelopes by appending to a per-topic JSONL log.
#[derive(Debug, Clone)]
pub struct JsonlEventBus {
    path: PathBuf,
    lock_timeout: Duration,
}

impl JsonlEventBus {
    /// Bus writing to the log file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            lock_timeout,
        }
    }

    /// The log file this bus appends to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every envelope currently in the log, oldest first.
    ///
    /// Consumer-side helper; blank lines are skipped, a malformed line is
    /// an error (the writer enforces the one-line invariant, so a torn
    /// line means real corruption).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line fails to
    /// parse. A missing file reads as an empty log.
    pub fn read_back(&self) -> Result<Vec<Envelope>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("read event log {}", self.path.display()))?;

        let mut envelopes = Vec::new();
        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let envelope: Envelope = serde_json::from_str(line).with_context(|| {
                format!("parse event log line {} of {}", number + 1, self.path.display())
            })?;
            envelopes.push(envelope);
        }
        Ok(envelopes)
    }

    fn append(&self, line: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create event log directory {}", parent.display()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open event log {}", self.path.display()))?;

        acquire_exclusive(&file, &self.path, self.lock_timeout)?;
        let result = write_line(&mut file, line);
        let _ = FileExt::unlock(&file);
        result
    }
}

impl EventPublisher for JsonlEventBus {
    fn publish(&self, envelope: &Envelope) -> Result<(), DownstreamError> {
        let line = envelope
            .to_json_line()
            .map_err(|e| DownstreamError::Publish(e.into()))?;
        self.append(&line).map_err(DownstreamError::Publish)
    }
}

/// Try-lock loop with a deadline; fs2 has no blocking-with-timeout lock.
fn acquire_exclusive(file: &File, path: &Path, timeout: Duration) -> Result<()> {
    let start = Instant::now();
    loop {
        if file.try_lock_exclusive().is_ok() {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(anyhow!(
                "event log lock timed out after {:?} at {}",
                start.elapsed(),
                path.display()
            ));
        }
        thread::sleep(Duration::from_millis(10));
    }
}

fn write_line(file: &mut File, line: &str) -> Result<()> {
    file.write_all(line.as_bytes()).context("append event line")?;
    file.write_all(b"\n").context("append event newline")?;
    file.flush().context("flush event log")?;
    Ok(())
}
