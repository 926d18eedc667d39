//! Scoped per-box operation logs.
//!
//! A `LogSink` opens a `BoxLogWriter` for one box at the start of a lifecycle
//! operation. The writer forwards bytes to the sink's backing store, mirrors
//! each completed line to `tracing`, and flushes when dropped, so every exit
//! path of the operation releases it.

use crate::ProvisionError;
use hangar_schema::{BoxId, ManagedBox};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Longest unterminated line kept for tracing before it is emitted as-is.
const MAX_PENDING_BYTES: usize = 8 * 1024;

pub trait LogSink: Send + Sync {
    fn open(&self, target: &ManagedBox) -> Result<BoxLogWriter, ProvisionError>;
}

pub struct BoxLogWriter {
    box_id: BoxId,
    inner: Box<dyn Write + Send>,
    pending: Vec<u8>,
}

impl BoxLogWriter {
    pub fn new(box_id: BoxId, inner: Box<dyn Write + Send>) -> Self {
        Self {
            box_id,
            inner,
            pending: Vec::new(),
        }
    }

    pub fn box_id(&self) -> &BoxId {
        &self.box_id
    }

    fn trace_lines(&mut self) {
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line);
            debug!(box_id = %self.box_id, "{}", text.trim_end());
        }
        if self.pending.len() >= MAX_PENDING_BYTES {
            let text = String::from_utf8_lossy(&self.pending);
            debug!(box_id = %self.box_id, "{text}");
            self.pending.clear();
        }
    }
}

impl Write for BoxLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write_all(buf)?;
        self.pending.extend_from_slice(buf);
        self.trace_lines();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Drop for BoxLogWriter {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            let text = String::from_utf8_lossy(&self.pending);
            debug!(box_id = %self.box_id, "{text}");
        }
        if let Err(e) = self.inner.flush() {
            tracing::warn!("failed to flush log for box {}: {e}", self.box_id);
        }
        debug!("closed log writer for box {}", self.box_id);
    }
}

/// Appends each box's output to `<dir>/<box id>.log`.
#[derive(Debug, Clone)]
pub struct FileLogSink {
    dir: PathBuf,
}

impl FileLogSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn log_path(&self, box_id: &str) -> PathBuf {
        let file_name: String = box_id
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.dir.join(format!("{file_name}.log"))
    }
}

impl LogSink for FileLogSink {
    fn open(&self, target: &ManagedBox) -> Result<BoxLogWriter, ProvisionError> {
        fs::create_dir_all(&self.dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(&target.id))?;
        Ok(BoxLogWriter::new(target.id.clone(), Box::new(file)))
    }
}

type SharedLogs = Arc<Mutex<HashMap<BoxId, Vec<u8>>>>;

/// Keeps each box's output in memory. Reopening a box appends to its buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogSink {
    logs: SharedLogs,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written for `box_id` so far, or an empty string.
    pub fn contents(&self, box_id: &str) -> String {
        self.logs
            .lock()
            .map(|logs| {
                logs.get(box_id)
                    .map(|b| String::from_utf8_lossy(b).into_owned())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }
}

struct MemoryBuffer {
    logs: SharedLogs,
    box_id: BoxId,
}

impl Write for MemoryBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut logs = self
            .logs
            .lock()
            .map_err(|e| io::Error::other(format!("log buffer poisoned: {e}")))?;
        logs.entry(self.box_id.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogSink for MemoryLogSink {
    fn open(&self, target: &ManagedBox) -> Result<BoxLogWriter, ProvisionError> {
        let buffer = MemoryBuffer {
            logs: Arc::clone(&self.logs),
            box_id: target.id.clone(),
        };
        Ok(BoxLogWriter::new(target.id.clone(), Box::new(buffer)))
    }
}
