//! Chunked execution: the same pipeline as normal mode, run per chunk,
//! with strategy instances persisting across chunks so stateful
//! progressions continue correctly.
//!
//! Shuffle in this mode permutes within each chunk only — a documented
//! weakening of the global-shuffle contract; cross-chunk shuffle would
//! require holding the whole dataset.

use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::error::{Result, RowForgeError};
use crate::perf::PerfTimer;
use crate::report::{ErrorCollector, ErrorContext};
use crate::writer::{BatchInfo, WriteMetadata, Writer};

use super::{generate_table, prepare_strategies, shuffle_rng, PreparedColumn, ProcessOutcome};

pub struct StreamingProcessor {
    config: GeneratorConfig,
    prepared: Vec<PreparedColumn>,
    shuffle_rng: StdRng,
    chunk_size: usize,
}

impl StreamingProcessor {
    /// `chunk_size` is capped at `batch_size`.
    pub fn new(config: GeneratorConfig, batch_size: usize, chunk_size: usize) -> Result<Self> {
        let prepared = prepare_strategies(&config)?;
        let chunk_size = chunk_size.min(batch_size).max(1);
        Ok(StreamingProcessor {
            config,
            prepared,
            shuffle_rng: shuffle_rng(),
            chunk_size,
        })
    }

    pub fn process(
        &mut self,
        writer: &mut dyn Writer,
        collector: &mut ErrorCollector,
        perf: &mut PerfTimer,
    ) -> Result<ProcessOutcome> {
        let target = self.config.effective_rows();
        let total_batches = target.div_ceil(self.chunk_size);
        info!(
            "Streaming processing: {} rows in chunks of {}",
            target, self.chunk_size
        );

        let mut total_generated = 0usize;
        let mut batch_index = 0usize;
        let mut columns: Vec<String> = Vec::new();

        while total_generated < target {
            let n = self.chunk_size.min(target - total_generated);
            debug!(
                "Chunk {}: size={}, generated so far={}",
                batch_index, n, total_generated
            );

            let chunk = perf.time("chunk_generation", Some(n), || {
                generate_table(
                    &self.config,
                    n,
                    &mut self.prepared,
                    &mut self.shuffle_rng,
                    collector,
                )
            });
            if columns.is_empty() {
                columns = chunk.column_names().map(|s| s.to_string()).collect();
            }

            let mut batch_info = BatchInfo::new(batch_index, n, self.config.config_name());
            batch_info.total_batches = Some(total_batches);

            let result = perf.time("chunk_write", Some(n), || {
                writer.write(&chunk, &WriteMetadata::chunk(batch_info))
            });
            if result.is_failure() {
                let err = RowForgeError::Other(format!(
                    "chunk {} write failed: {}",
                    batch_index,
                    result.message.unwrap_or_default()
                ));
                collector.record(&err, ErrorContext::default());
            }

            total_generated += n;
            batch_index += 1;
        }

        let writer_summary = writer.finalize()?;

        info!(
            "Streaming processing complete: {} rows in {} chunks",
            total_generated, batch_index
        );
        Ok(ProcessOutcome {
            rows_generated: total_generated,
            chunks: batch_index,
            columns,
            writer_summary,
        })
    }
}
