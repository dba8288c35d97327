//! # Stream Writer
//!
//! Serializes each chunk into the JSON envelope and hands it to a queue
//! producer. The connection is established at construction, so unreachable
//! brokers fail a run before any chunk is generated.

use tracing::{debug, warn};

use crate::config::StreamConfig;
use crate::error::Result;
use crate::queue::{self, Envelope, QueueProducer};
use crate::table::Table;

use super::{BatchInfo, WriteMetadata, WriteResult, Writer, WriterSummary};

pub struct StreamWriter {
    producer: Box<dyn QueueProducer>,
    config_name: String,
    include_metadata: bool,
    rows_written: usize,
    batches_sent: usize,
    finalized: bool,
}

impl StreamWriter {
    /// Connect to the configured endpoint. Fails with `NETWORK:ERROR`
    /// within the connect timeout when the broker is unreachable.
    pub fn connect(config: &StreamConfig, config_name: &str) -> Result<Self> {
        let producer = queue::connect(config)?;
        Ok(StreamWriter {
            producer,
            config_name: config_name.to_string(),
            include_metadata: config.streaming.include_metadata,
            rows_written: 0,
            batches_sent: 0,
            finalized: false,
        })
    }

    /// Test seam: wrap an already-connected producer.
    pub fn with_producer(producer: Box<dyn QueueProducer>, config_name: &str) -> Self {
        StreamWriter {
            producer,
            config_name: config_name.to_string(),
            include_metadata: true,
            rows_written: 0,
            batches_sent: 0,
            finalized: false,
        }
    }
}

impl Writer for StreamWriter {
    fn write(&mut self, table: &Table, meta: &WriteMetadata) -> WriteResult {
        if self.finalized {
            return WriteResult::failed(crate::error::RowForgeError::WriterFinalized.to_string());
        }
        if table.is_empty() {
            return WriteResult {
                message: Some("empty chunk".to_string()),
                ..WriteResult::success(0)
            };
        }

        let batch_info = meta.batch.clone().unwrap_or_else(|| {
            BatchInfo::new(self.batches_sent, table.row_count(), &self.config_name)
        });

        let mut envelope = Envelope::from_table(table, batch_info);
        if !self.include_metadata {
            envelope.metadata.dtypes.clear();
        }

        match self.producer.send(&envelope) {
            Ok(()) => {
                let rows = table.row_count();
                self.rows_written += rows;
                self.batches_sent += 1;
                debug!(
                    "Sent batch {} ({} rows) to {}",
                    envelope.batch_info.batch_index,
                    rows,
                    self.producer.endpoint()
                );
                WriteResult::success(rows)
            }
            Err(e) => WriteResult::failed(e.to_string()),
        }
    }

    fn finalize(&mut self) -> Result<WriterSummary> {
        if !self.finalized {
            if let Err(e) = self.producer.disconnect() {
                warn!("Error disconnecting from queue: {}", e);
            }
            self.finalized = true;
        }
        Ok(WriterSummary {
            writer_type: "stream",
            rows_written: self.rows_written,
            chunks_written: self.batches_sent,
            files: Vec::new(),
            endpoint: Some(self.producer.endpoint()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RowForgeError;
    use crate::table::{DataKind, Value};
    use std::sync::{Arc, Mutex};

    /// Captures envelopes instead of touching a broker.
    struct CaptureProducer {
        sent: Arc<Mutex<Vec<Envelope>>>,
        fail: bool,
    }

    impl QueueProducer for CaptureProducer {
        fn send(&mut self, envelope: &Envelope) -> Result<()> {
            if self.fail {
                return Err(RowForgeError::QueuePublish {
                    queue: "test".into(),
                    message: "broker gone".into(),
                });
            }
            self.sent.lock().unwrap().push(envelope.clone());
            Ok(())
        }

        fn disconnect(&mut self) -> Result<()> {
            Ok(())
        }

        fn endpoint(&self) -> String {
            "test://".to_string()
        }
    }

    fn sample_table(rows: usize) -> Table {
        let mut t = Table::empty(&["n"], rows);
        t.set_column(
            "n",
            DataKind::Integer,
            (0..rows as i64).map(Value::Int).collect(),
        );
        t
    }

    #[test]
    fn test_chunks_sent_in_order_with_indices() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut writer = StreamWriter::with_producer(
            Box::new(CaptureProducer {
                sent: sent.clone(),
                fail: false,
            }),
            "demo",
        );

        for _ in 0..3 {
            let result = writer.write(&sample_table(4), &WriteMetadata::default());
            assert!(!result.is_failure());
        }
        let summary = writer.finalize().unwrap();
        assert_eq!(summary.rows_written, 12);
        assert_eq!(summary.chunks_written, 3);

        let envelopes = sent.lock().unwrap();
        let indices: Vec<usize> = envelopes.iter().map(|e| e.batch_info.batch_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(envelopes.iter().all(|e| e.metadata.rows == e.data.len()));
    }

    #[test]
    fn test_send_failure_returned_not_raised() {
        let mut writer = StreamWriter::with_producer(
            Box::new(CaptureProducer {
                sent: Arc::new(Mutex::new(Vec::new())),
                fail: true,
            }),
            "demo",
        );
        let result = writer.write(&sample_table(2), &WriteMetadata::default());
        assert!(result.is_failure());
        assert!(result.message.unwrap().contains("broker gone"));
    }

    #[test]
    fn test_write_after_finalize_fails() {
        let mut writer = StreamWriter::with_producer(
            Box::new(CaptureProducer {
                sent: Arc::new(Mutex::new(Vec::new())),
                fail: false,
            }),
            "demo",
        );
        writer.finalize().unwrap();
        assert!(writer
            .write(&sample_table(1), &WriteMetadata::default())
            .is_failure());
    }

    #[test]
    fn test_empty_chunk_noop() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut writer = StreamWriter::with_producer(
            Box::new(CaptureProducer {
                sent: sent.clone(),
                fail: false,
            }),
            "demo",
        );
        let result = writer.write(&Table::default(), &WriteMetadata::default());
        assert!(!result.is_failure());
        assert!(sent.lock().unwrap().is_empty());
    }
}
