//! Single-shot execution: materialize the whole table, write once,
//! finalize.

use rand::rngs::StdRng;
use tracing::info;

use crate::config::GeneratorConfig;
use crate::error::{Result, RowForgeError};
use crate::perf::PerfTimer;
use crate::report::{ErrorCollector, ErrorContext};
use crate::writer::{WriteMetadata, Writer};

use super::{generate_table, prepare_strategies, shuffle_rng, PreparedColumn, ProcessOutcome};

pub struct NormalProcessor {
    config: GeneratorConfig,
    prepared: Vec<PreparedColumn>,
    shuffle_rng: StdRng,
}

impl NormalProcessor {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let prepared = prepare_strategies(&config)?;
        Ok(NormalProcessor {
            config,
            prepared,
            shuffle_rng: shuffle_rng(),
        })
    }

    pub fn process(
        &mut self,
        writer: &mut dyn Writer,
        collector: &mut ErrorCollector,
        perf: &mut PerfTimer,
    ) -> Result<ProcessOutcome> {
        let rows = self.config.effective_rows();
        info!("Normal processing: {} rows", rows);

        let table = perf.time("data_generation", Some(rows), || {
            generate_table(
                &self.config,
                rows,
                &mut self.prepared,
                &mut self.shuffle_rng,
                collector,
            )
        });

        let result = perf.time("write", Some(table.row_count()), || {
            writer.write(&table, &WriteMetadata::complete())
        });
        if result.is_failure() {
            let err = RowForgeError::Other(format!(
                "write failed: {}",
                result.message.unwrap_or_default()
            ));
            collector.record(&err, ErrorContext::default());
        }

        let writer_summary = writer.finalize()?;

        info!(
            "Normal processing complete: {} rows, {} columns",
            table.row_count(),
            table.column_count()
        );
        Ok(ProcessOutcome {
            rows_generated: table.row_count(),
            chunks: 1,
            columns: table.column_names().map(|s| s.to_string()).collect(),
            writer_summary,
        })
    }
}
