//! # Batch Writer
//!
//! A decorator that turns each chunk into its own file:
//! `{output_dir}/{file_prefix}_{NNNN}.{format}`. Every chunk gets a batch
//! stamp; JSON batches carry the full envelope, CSV and Parquet batches
//! write the bare data plus a `_meta.json` sidecar with the envelope
//! metadata. Actual file I/O is delegated to a per-batch file writer.

use std::path::PathBuf;

use tracing::info;

use crate::config::BatchWriterConfig;
use crate::error::{Result, RowForgeError};
use crate::queue::Envelope;
use crate::strategy::ParamMap;
use crate::table::Table;

use super::file::{create_parent_dirs, FileFormat, FileSink, FileWriter};
use super::{BatchInfo, WriteMetadata, WriteResult, Writer, WriterSummary};

pub struct BatchWriter {
    output_dir: PathBuf,
    file_prefix: String,
    format: FileFormat,
    config_name: String,
    rows_written: usize,
    batches_written: usize,
    files_written: Vec<PathBuf>,
    finalized: bool,
}

impl BatchWriter {
    pub fn from_config(config: &BatchWriterConfig, config_name: &str) -> Result<Self> {
        let format = match config.file_format.as_str() {
            "json" => FileFormat::Json,
            "csv" => FileFormat::Csv,
            "parquet" => FileFormat::Parquet,
            other => {
                return Err(RowForgeError::Config {
                    message: format!("unsupported batch file_format '{}'", other),
                })
            }
        };
        Ok(BatchWriter {
            output_dir: config.output_dir.clone(),
            file_prefix: config.file_prefix.clone(),
            format,
            config_name: config_name.to_string(),
            rows_written: 0,
            batches_written: 0,
            files_written: Vec::new(),
            finalized: false,
        })
    }

    fn batch_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{:04}.{}",
            self.file_prefix,
            index,
            self.format.extension()
        ))
    }

    fn sidecar_path(&self, index: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}_{:04}_meta.json", self.file_prefix, index))
    }

    fn write_batch(&mut self, table: &Table, batch_info: BatchInfo) -> Result<()> {
        let index = batch_info.batch_index;
        let path = self.batch_path(index);

        if self.format == FileFormat::Json {
            // JSON batches are the envelope itself.
            create_parent_dirs(&path)?;
            let envelope = Envelope::from_table(table, batch_info);
            let body = serde_json::to_string_pretty(&envelope)
                .map_err(|e| RowForgeError::Other(format!("serializing batch envelope: {}", e)))?;
            std::fs::write(&path, body).map_err(|e| RowForgeError::Io {
                action: format!("writing batch file {}", path.display()),
                source: e,
            })?;
        } else {
            // Delegate the data file to a single-sink file writer, then put
            // the envelope metadata in the sidecar.
            let mut params = ParamMap::new();
            params.insert(
                "output_path".into(),
                serde_json::json!(path.to_string_lossy()),
            );
            let mut inner = FileWriter::new(vec![FileSink {
                format: self.format,
                path: path.clone(),
                params,
            }]);
            let result = inner.write(table, &WriteMetadata::complete());
            if result.is_failure() {
                return Err(RowForgeError::Format {
                    format: self.format.extension().to_string(),
                    path: path.display().to_string(),
                    message: result.message.unwrap_or_default(),
                });
            }
            inner.finalize()?;

            let sidecar = self.sidecar_path(index);
            let envelope = Envelope::from_table(table, batch_info);
            let meta_body = serde_json::json!({
                "batch_info": envelope.batch_info,
                "metadata": envelope.metadata,
            });
            std::fs::write(
                &sidecar,
                serde_json::to_string_pretty(&meta_body)
                    .map_err(|e| RowForgeError::Other(format!("serializing sidecar: {}", e)))?,
            )
            .map_err(|e| RowForgeError::Io {
                action: format!("writing sidecar {}", sidecar.display()),
                source: e,
            })?;
            self.files_written.push(sidecar);
        }

        self.files_written.push(path);
        Ok(())
    }
}

impl Writer for BatchWriter {
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

        let mut batch_info = meta.batch.clone().unwrap_or_else(|| {
            BatchInfo::new(self.batches_written, table.row_count(), &self.config_name)
        });
        // The writer owns batch numbering: indices are contiguous even when
        // the processor stamps its own metadata.
        batch_info.batch_index = self.batches_written;

        match self.write_batch(table, batch_info) {
            Ok(()) => {
                let rows = table.row_count();
                self.rows_written += rows;
                self.batches_written += 1;
                WriteResult::success(rows)
            }
            Err(e) => WriteResult::failed(e.to_string()),
        }
    }

    fn finalize(&mut self) -> Result<WriterSummary> {
        self.finalized = true;
        info!(
            "Batch writer finalized: {} batches, {} rows under {}",
            self.batches_written,
            self.rows_written,
            self.output_dir.display()
        );
        Ok(WriterSummary {
            writer_type: "batch",
            rows_written: self.rows_written,
            chunks_written: self.batches_written,
            files: self.files_written.clone(),
            endpoint: None,
        })
    }
}
