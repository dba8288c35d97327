//! # File Writer
//!
//! Fans a table out to one or more file sinks (format + path + params).
//! Chunked writes accumulate in memory and flush at `finalize()`; a write
//! flagged complete (normal mode hands the whole table over at once)
//! flushes immediately. Parent directories are created on flush.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::FileSinkConfig;
use crate::error::{Result, RowForgeError};
use crate::strategy::ParamMap;
use crate::table::Table;

use super::formats;
use super::{WriteMetadata, WriteResult, Writer, WriterSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Json,
    Parquet,
    Feather,
    Html,
    Excel,
    Sqlite,
}

impl FileFormat {
    pub fn from_sink_type(sink_type: &str) -> Result<Self> {
        match sink_type {
            "CSV_WRITER" => Ok(FileFormat::Csv),
            "JSON_WRITER" => Ok(FileFormat::Json),
            "PARQUET_WRITER" => Ok(FileFormat::Parquet),
            "FEATHER_WRITER" => Ok(FileFormat::Feather),
            "HTML_WRITER" => Ok(FileFormat::Html),
            "EXCEL_WRITER" => Ok(FileFormat::Excel),
            "SQLITE_WRITER" => Ok(FileFormat::Sqlite),
            other => Err(RowForgeError::Config {
                message: format!("unknown writer type '{}'", other),
            }),
        }
    }

    /// File extension used for batch-mode file naming.
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Json => "json",
            FileFormat::Parquet => "parquet",
            FileFormat::Feather => "feather",
            FileFormat::Html => "html",
            FileFormat::Excel => "xlsx",
            FileFormat::Sqlite => "db",
        }
    }
}

/// One resolved output target.
#[derive(Debug, Clone)]
pub struct FileSink {
    pub format: FileFormat,
    pub path: PathBuf,
    pub params: ParamMap,
}

impl FileSink {
    pub fn from_config(config: &FileSinkConfig) -> Result<Self> {
        let format = FileFormat::from_sink_type(&config.sink_type)?;
        let path = config
            .params
            .get("output_path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| RowForgeError::Config {
                message: format!(
                    "writer '{}' params must include a string 'output_path'",
                    config.sink_type
                ),
            })?;
        Ok(FileSink {
            format,
            path: PathBuf::from(path),
            params: config.params.clone(),
        })
    }

    fn emit(&self, table: &Table) -> Result<()> {
        create_parent_dirs(&self.path)?;
        debug!(
            "Writing {} rows to {} ({:?})",
            table.row_count(),
            self.path.display(),
            self.format
        );
        match self.format {
            FileFormat::Csv => formats::csv::write(&self.path, table, &self.params),
            FileFormat::Json => formats::json::write(&self.path, table, &self.params),
            FileFormat::Parquet => formats::parquet::write(&self.path, table, &self.params),
            FileFormat::Feather => formats::feather::write(&self.path, table, &self.params),
            FileFormat::Html => formats::html::write(&self.path, table, &self.params),
            FileFormat::Excel => formats::excel::write(&self.path, table, &self.params),
            FileFormat::Sqlite => formats::sqlite::write(&self.path, table, &self.params),
        }
    }
}

pub(crate) fn create_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| RowForgeError::Io {
                action: format!("creating directory {}", parent.display()),
                source: e,
            })?;
        }
    }
    Ok(())
}

pub struct FileWriter {
    sinks: Vec<FileSink>,
    accumulator: Table,
    rows_written: usize,
    chunks_written: usize,
    files_written: Vec<PathBuf>,
    finalized: bool,
}

impl FileWriter {
    pub fn from_configs(configs: &[FileSinkConfig]) -> Result<Self> {
        let sinks = configs
            .iter()
            .map(FileSink::from_config)
            .collect::<Result<Vec<_>>>()?;
        Ok(FileWriter::new(sinks))
    }

    pub fn new(sinks: Vec<FileSink>) -> Self {
        FileWriter {
            sinks,
            accumulator: Table::default(),
            rows_written: 0,
            chunks_written: 0,
            files_written: Vec::new(),
            finalized: false,
        }
    }

    fn flush(&mut self, table: &Table) -> Result<()> {
        for sink in &self.sinks {
            sink.emit(table)?;
            if !self.files_written.contains(&sink.path) {
                self.files_written.push(sink.path.clone());
            }
        }
        Ok(())
    }
}

impl Writer for FileWriter {
    fn write(&mut self, table: &Table, meta: &WriteMetadata) -> WriteResult {
        if self.finalized {
            return WriteResult::failed(RowForgeError::WriterFinalized.to_string());
        }
        if table.is_empty() {
            return WriteResult {
                message: Some("empty chunk".to_string()),
                ..WriteResult::success(0)
            };
        }

        let rows = table.row_count();
        if meta.complete {
            if let Err(e) = self.flush(table) {
                return WriteResult::failed(e.to_string());
            }
        } else {
            self.accumulator.append(table);
        }

        self.rows_written += rows;
        self.chunks_written += 1;
        WriteResult::success(rows)
    }

    fn finalize(&mut self) -> Result<WriterSummary> {
        if !self.finalized && !self.accumulator.is_empty() {
            let pending = std::mem::take(&mut self.accumulator);
            self.flush(&pending)?;
        }
        self.finalized = true;

        info!(
            "File writer finalized: {} rows across {} file(s)",
            self.rows_written,
            self.files_written.len()
        );
        Ok(WriterSummary {
            writer_type: "file",
            rows_written: self.rows_written,
            chunks_written: self.chunks_written,
            files: self.files_written.clone(),
            endpoint: None,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.sinks.is_empty() {
            return Err(RowForgeError::Config {
                message: "file writer requires at least one sink".to_string(),
            });
        }
        Ok(())
    }
}
