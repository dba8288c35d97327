//! # Orchestrator
//!
//! Wires a validated configuration to the right processor + writer pair
//! and drives one run to completion:
//!
//! - neither stream nor batch → NormalProcessor + FileWriter (or an
//!   in-memory capture when no file sinks are configured, for API callers
//!   that want the rows back);
//! - stream → StreamingProcessor + StreamWriter;
//! - batch → StreamingProcessor + BatchWriter;
//! - stream and batch together is a CRITICAL configuration error.
//!
//! Non-critical errors are collected and reported without masking an
//! otherwise successful run; any ERROR fails the overall status; CRITICAL
//! halts immediately.

use serde::Serialize;
use tracing::info;

use crate::config::{BatchConfig, GeneratorConfig, StreamConfig};
use crate::error::{Result, RowForgeError};
use crate::perf::{PerfReport, PerfTimer};
use crate::processor::{NormalProcessor, ProcessOutcome, StreamingProcessor};
use crate::report::{ErrorCollector, ErrorContext, ErrorSummary};
use crate::writer::batch::BatchWriter;
use crate::writer::file::FileWriter;
use crate::writer::stream::StreamWriter;
use crate::writer::{WriteMetadata, WriteResult, Writer, WriterSummary};

/// Mode selection passed alongside the main configuration.
#[derive(Debug, Default)]
pub struct ModeHints {
    pub stream: Option<StreamConfig>,
    pub batch: Option<BatchConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
}

/// Final run summary returned to callers (CLI, HTTP layer).
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub status: RunStatus,
    pub config_name: String,
    pub rows_generated: usize,
    pub chunks: usize,
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writer: Option<WriterSummary>,
    pub errors: ErrorSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perf: Option<PerfReport>,
    /// Generated rows, present only for in-memory normal runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<serde_json::Value>>,
}

pub struct Orchestrator {
    config: GeneratorConfig,
    hints: ModeHints,
    perf_report: bool,
    report_dir: Option<std::path::PathBuf>,
}

impl Orchestrator {
    pub fn new(config: GeneratorConfig, hints: ModeHints, perf_report: bool) -> Self {
        Orchestrator {
            config,
            hints,
            perf_report,
            report_dir: Some(std::path::PathBuf::from("./output")),
        }
    }

    /// Where structured error reports are exported; `None` disables export.
    pub fn report_dir(mut self, dir: Option<std::path::PathBuf>) -> Self {
        self.report_dir = dir;
        self
    }

    /// Run to completion. Never panics; every failure lands in the summary.
    pub fn run(self) -> RunSummary {
        let mut collector = ErrorCollector::with_export_dir(self.report_dir.clone());
        let mut perf = PerfTimer::new(self.perf_report);
        let config_name = self.config.config_name().to_string();

        info!("Starting data generation for '{}'", config_name);

        let outcome = self.execute(&mut collector, &mut perf);

        let summary = match outcome {
            Ok((outcome, data)) => {
                let status = if collector.has_failures() {
                    RunStatus::Failed
                } else {
                    RunStatus::Success
                };
                RunSummary {
                    status,
                    config_name,
                    rows_generated: outcome.rows_generated,
                    chunks: outcome.chunks,
                    columns: outcome.columns,
                    writer: Some(outcome.writer_summary),
                    errors: collector.summary(),
                    perf: perf.report(),
                    data,
                }
            }
            Err(e) => {
                collector.record(&e, ErrorContext::default());
                RunSummary {
                    status: RunStatus::Failed,
                    config_name,
                    rows_generated: 0,
                    chunks: 0,
                    columns: Vec::new(),
                    writer: None,
                    errors: collector.summary(),
                    perf: perf.report(),
                    data: None,
                }
            }
        };

        collector.generate_report();
        match summary.status {
            RunStatus::Success => info!("Run completed successfully"),
            RunStatus::Failed => info!("Run completed with failures"),
        }
        summary
    }

    fn execute(
        self,
        collector: &mut ErrorCollector,
        perf: &mut PerfTimer,
    ) -> Result<(ProcessOutcome, Option<Vec<serde_json::Value>>)> {
        if self.hints.stream.is_some() && self.hints.batch.is_some() {
            return Err(RowForgeError::InvalidRunningMode);
        }

        let issues = self.config.validate();
        if !issues.is_empty() {
            for issue in &issues {
                collector.record(&issue.error, ErrorContext::config_path(&issue.path));
            }
            return Err(RowForgeError::Config {
                message: format!("configuration validation failed with {} issue(s)", issues.len()),
            });
        }

        let config_name = self.config.config_name().to_string();
        let Orchestrator { config, hints, .. } = self;

        if let Some(stream_config) = hints.stream {
            stream_config.validate()?;
            let streaming = &stream_config.streaming;
            let mut processor =
                StreamingProcessor::new(config, streaming.batch_size, streaming.chunk_size)?;
            let mut writer = StreamWriter::connect(&stream_config, &config_name)?;
            let outcome = processor.process(&mut writer, collector, perf)?;
            return Ok((outcome, None));
        }

        if let Some(batch_config) = hints.batch {
            batch_config.validate()?;
            let writer_config = &batch_config.batch_writer;
            let mut processor = StreamingProcessor::new(
                config,
                writer_config.batch_size,
                writer_config.chunk_size,
            )?;
            let mut writer = BatchWriter::from_config(writer_config, &config_name)?;
            let outcome = processor.process(&mut writer, collector, perf)?;
            return Ok((outcome, None));
        }

        let mut processor = NormalProcessor::new(config.clone())?;
        if config.file_writer.is_empty() {
            // No sinks configured: capture rows for the caller instead.
            let mut writer = MemoryWriter::default();
            let outcome = processor.process(&mut writer, collector, perf)?;
            return Ok((outcome, Some(writer.rows)));
        }

        let mut writer = FileWriter::from_configs(&config.file_writer)?;
        writer.validate()?;
        let outcome = processor.process(&mut writer, collector, perf)?;
        Ok((outcome, None))
    }
}

/// Captures rows as JSON objects for API callers without file sinks.
#[derive(Default)]
struct MemoryWriter {
    rows: Vec<serde_json::Value>,
    chunks_written: usize,
    finalized: bool,
}

impl Writer for MemoryWriter {
    fn write(&mut self, table: &crate::table::Table, _meta: &WriteMetadata) -> WriteResult {
        if self.finalized {
            return WriteResult::failed(RowForgeError::WriterFinalized.to_string());
        }
        let rows = table.row_count();
        self.rows
            .extend(crate::writer::formats::json::rows_as_json(table));
        self.chunks_written += 1;
        WriteResult::success(rows)
    }

    fn finalize(&mut self) -> Result<WriterSummary> {
        self.finalized = true;
        Ok(WriterSummary {
            writer_type: "memory",
            rows_written: self.rows.len(),
            chunks_written: self.chunks_written,
            files: Vec::new(),
            endpoint: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config(file_writer: serde_json::Value) -> GeneratorConfig {
        serde_json::from_value(serde_json::json!({
            "metadata": {"name": "demo"},
            "column_name": ["id"],
            "num_of_rows": 4,
            "shuffle": false,
            "configs": [
                {"names": ["id"], "strategy": {"name": "SERIES_STRATEGY",
                 "params": {"start": 1}}},
            ],
            "file_writer": file_writer,
        }))
        .unwrap()
    }

    #[test]
    fn test_stream_and_batch_mutually_exclusive() {
        let stream: StreamConfig = serde_json::from_value(serde_json::json!({
            "amqp": {"url": "amqp://localhost:5672", "queue": "rows"}
        }))
        .unwrap();
        let batch: BatchConfig = serde_json::from_value(serde_json::json!({
            "batch_writer": {"output_dir": "/tmp/batches"}
        }))
        .unwrap();

        let summary = Orchestrator::new(
            base_config(serde_json::json!([])),
            ModeHints {
                stream: Some(stream),
                batch: Some(batch),
            },
            false,
        )
        .report_dir(None)
        .run();

        assert_eq!(summary.status, RunStatus::Failed);
        assert_eq!(summary.errors.critical, 1);
        assert_eq!(summary.rows_generated, 0);
    }

    #[test]
    fn test_normal_mode_memory_capture() {
        let summary =
            Orchestrator::new(base_config(serde_json::json!([])), ModeHints::default(), false)
                .report_dir(None)
                .run();

        assert_eq!(summary.status, RunStatus::Success);
        assert_eq!(summary.rows_generated, 4);
        assert_eq!(summary.chunks, 1);
        let data = summary.data.unwrap();
        assert_eq!(data.len(), 4);
        assert_eq!(data[0]["id"], 1);
        assert_eq!(data[3]["id"], 4);
    }

    #[test]
    fn test_normal_mode_file_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let summary = Orchestrator::new(
            base_config(serde_json::json!([
                {"type": "CSV_WRITER", "params": {"output_path": path.to_str().unwrap()}}
            ])),
            ModeHints::default(),
            false,
        )
        .report_dir(None)
        .run();

        assert_eq!(summary.status, RunStatus::Success);
        assert!(path.exists());
        let writer = summary.writer.unwrap();
        assert_eq!(writer.writer_type, "file");
        assert_eq!(writer.rows_written, 4);
        assert!(summary.data.is_none());
    }

    #[test]
    fn test_batch_mode_produces_files() {
        let dir = tempfile::tempdir().unwrap();
        let batch: BatchConfig = serde_json::from_value(serde_json::json!({
            "batch_writer": {
                "output_dir": dir.path().to_str().unwrap(),
                "file_prefix": "part",
                "file_format": "json",
                "batch_size": 2,
                "chunk_size": 2,
            }
        }))
        .unwrap();

        let summary = Orchestrator::new(
            base_config(serde_json::json!([])),
            ModeHints {
                stream: None,
                batch: Some(batch),
            },
            false,
        )
        .report_dir(None)
        .run();

        assert_eq!(summary.status, RunStatus::Success);
        assert_eq!(summary.chunks, 2);
        assert!(dir.path().join("part_0000.json").exists());
        assert!(dir.path().join("part_0001.json").exists());
    }

    #[test]
    fn test_invalid_config_fails_before_generation() {
        let config: GeneratorConfig = serde_json::from_value(serde_json::json!({
            "column_name": ["x"],
            "num_of_rows": 5,
            "configs": [
                {"names": ["x"], "strategy": {"name": "NO_SUCH_STRATEGY", "params": {}}}
            ],
        }))
        .unwrap();
        let summary = Orchestrator::new(config, ModeHints::default(), false)
            .report_dir(None)
            .run();
        assert_eq!(summary.status, RunStatus::Failed);
        assert!(summary.errors.critical >= 1);
        assert_eq!(summary.rows_generated, 0);
    }

    #[test]
    fn test_unreachable_stream_endpoint_fails_with_no_chunks() {
        let stream: StreamConfig = serde_json::from_value(serde_json::json!({
            "amqp": {"url": "amqp://127.0.0.1:1", "queue": "rows"}
        }))
        .unwrap();
        let summary = Orchestrator::new(
            base_config(serde_json::json!([])),
            ModeHints {
                stream: Some(stream),
                batch: None,
            },
            false,
        )
        .report_dir(None)
        .run();

        assert_eq!(summary.status, RunStatus::Failed);
        assert_eq!(summary.chunks, 0, "no chunk may be emitted");
        assert!(summary.errors.error >= 1);
    }

    #[test]
    fn test_perf_report_included_when_requested() {
        let summary =
            Orchestrator::new(base_config(serde_json::json!([])), ModeHints::default(), true)
                .report_dir(None)
                .run();
        let perf = summary.perf.unwrap();
        assert!(!perf.phases.is_empty());
    }
}
