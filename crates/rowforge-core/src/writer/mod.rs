//! # Writers
//!
//! Writers consume table chunks and deliver them to a sink: files on disk,
//! a message queue, or one file per batch. All three variants sit behind
//! one contract:
//!
//! - `write` never panics and never raises for data-level problems — any
//!   error is returned inside the `WriteResult`;
//! - an empty chunk is a successful no-op;
//! - after `finalize()` every further `write` fails;
//! - writers are single-consumer and never shared across processors.

pub mod batch;
pub mod file;
pub mod formats;
pub mod stream;

use std::path::PathBuf;

use serde::Serialize;

use crate::error::Result;
use crate::table::Table;

/// Batch stamp carried in queue envelopes and batch-file sidecars.
#[derive(Debug, Clone, Serialize)]
pub struct BatchInfo {
    pub batch_index: usize,
    pub batch_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_batches: Option<usize>,
    pub config_name: String,
    /// ISO-8601.
    pub timestamp: String,
}

impl BatchInfo {
    pub fn new(batch_index: usize, batch_size: usize, config_name: &str) -> Self {
        BatchInfo {
            batch_index,
            batch_size,
            total_batches: None,
            config_name: config_name.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Per-write metadata handed down by the processor.
#[derive(Debug, Clone, Default)]
pub struct WriteMetadata {
    pub batch: Option<BatchInfo>,
    /// Set when the chunk is the entire dataset (normal mode); file writers
    /// flush immediately instead of accumulating.
    pub complete: bool,
}

impl WriteMetadata {
    pub fn complete() -> Self {
        WriteMetadata {
            batch: None,
            complete: true,
        }
    }

    pub fn chunk(batch: BatchInfo) -> Self {
        WriteMetadata {
            batch: Some(batch),
            complete: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteStatus {
    Success,
    Skipped,
    Failed,
}

/// Outcome of one `write` call. Failures are values, not panics; the
/// processor records them and decides whether to continue.
#[derive(Debug, Clone, Serialize)]
pub struct WriteResult {
    pub status: WriteStatus,
    pub rows_written: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WriteResult {
    pub fn success(rows_written: usize) -> Self {
        WriteResult {
            status: WriteStatus::Success,
            rows_written,
            message: None,
        }
    }

    pub fn skipped(reason: &str) -> Self {
        WriteResult {
            status: WriteStatus::Skipped,
            rows_written: 0,
            message: Some(reason.to_string()),
        }
    }

    pub fn failed(message: String) -> Self {
        WriteResult {
            status: WriteStatus::Failed,
            rows_written: 0,
            message: Some(message),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == WriteStatus::Failed
    }
}

/// Summary returned by `finalize()`, included in the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct WriterSummary {
    pub writer_type: &'static str,
    pub rows_written: usize,
    pub chunks_written: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// The common writer contract. See the module docs for the invariants.
pub trait Writer: Send {
    fn write(&mut self, table: &Table, meta: &WriteMetadata) -> WriteResult;

    fn finalize(&mut self) -> Result<WriterSummary>;

    /// Cheap configuration sanity check, called before a run starts.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}
