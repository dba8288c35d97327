//! # Processors
//!
//! A processor drives one generation run: it instantiates every strategy
//! once, then repeatedly materializes tables (whole-dataset or chunked),
//! applies strategies in configuration order with mask filtering, shuffles,
//! drops intermediate columns, and hands the result to the writer.
//!
//! Strategy instances live for the whole run and are shared across chunks.
//! Together with the chunk-equivalence law this makes the streaming output
//! identical to the single-shot output for the same seeds.

pub mod normal;
pub mod streaming;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::error::{Result, RowForgeError};
use crate::mask::MaskExpr;
use crate::report::{ErrorCollector, ErrorContext};
use crate::strategy::{registry, Strategy};
use crate::table::Table;
use crate::writer::WriterSummary;

pub use normal::NormalProcessor;
pub use streaming::StreamingProcessor;

/// What a completed run hands back to the orchestrator.
#[derive(Debug)]
pub struct ProcessOutcome {
    pub rows_generated: usize,
    pub chunks: usize,
    pub columns: Vec<String>,
    pub writer_summary: WriterSummary,
}

/// One column's live strategy plus its application settings.
pub(crate) struct PreparedColumn {
    pub column: String,
    pub strategy_name: String,
    pub strategy: Box<dyn Strategy>,
    pub mask: Option<String>,
    pub intermediate: bool,
}

/// Instantiate a strategy per target column, in configuration order.
/// Disabled entries are skipped.
pub(crate) fn prepare_strategies(config: &GeneratorConfig) -> Result<Vec<PreparedColumn>> {
    let mut prepared = Vec::new();
    for entry in &config.configs {
        if entry.disabled {
            debug!("Skipping disabled entry {:?}", entry.names);
            continue;
        }
        for column in &entry.names {
            let mut strategy = registry::create(
                &entry.strategy.name,
                &entry.strategy.params,
                entry.strategy.unique,
            )?;
            strategy.bind_column(column);
            prepared.push(PreparedColumn {
                column: column.clone(),
                strategy_name: entry.strategy.name.clone(),
                strategy,
                mask: entry.mask.clone(),
                intermediate: entry.intermediate,
            });
        }
    }
    Ok(prepared)
}

/// Apply one prepared strategy to the table.
///
/// Mask handling follows the fallback contract: zero matches leave the
/// column untouched with one warning; an unparseable or unevaluable mask
/// applies to all rows with one warning. Strategy runtime failures are
/// recorded as errors and the run continues with the next column.
pub(crate) fn apply_column(
    table: &mut Table,
    prepared: &mut PreparedColumn,
    collector: &mut ErrorCollector,
) {
    table.ensure_column(&prepared.column, prepared.intermediate);

    let rows: Vec<usize> = match &prepared.mask {
        None => (0..table.row_count()).collect(),
        Some(mask_text) => {
            let evaluated = MaskExpr::parse(mask_text)
                .map_err(|e| e.to_string())
                .and_then(|expr| table_matches(&expr, table));
            match evaluated {
                Ok(selected) if selected.is_empty() => {
                    collector.record(
                        &RowForgeError::MaskNoMatch {
                            column: prepared.column.clone(),
                            mask: mask_text.clone(),
                        },
                        ErrorContext::strategy(&prepared.strategy_name, &prepared.column),
                    );
                    return;
                }
                Ok(selected) => selected,
                Err(reason) => {
                    collector.record(
                        &RowForgeError::MaskInvalid {
                            column: prepared.column.clone(),
                            mask: mask_text.clone(),
                            reason,
                        },
                        ErrorContext::strategy(&prepared.strategy_name, &prepared.column),
                    );
                    (0..table.row_count()).collect()
                }
            }
        }
    };

    match prepared
        .strategy
        .transform(&*table, &prepared.column, &rows)
    {
        Ok(values) => {
            let kind = prepared.strategy.data_kind();
            table.write_rows(&prepared.column, &rows, kind, values);
        }
        Err(e) => {
            collector.record(
                &e,
                ErrorContext::strategy(&prepared.strategy_name, &prepared.column),
            );
        }
    }

    for warning in prepared.strategy.take_warnings() {
        collector.record(
            &warning,
            ErrorContext::strategy(&prepared.strategy_name, &prepared.column),
        );
    }
}

fn table_matches(expr: &MaskExpr, table: &Table) -> std::result::Result<Vec<usize>, String> {
    let matches = expr.evaluate(table).map_err(|e| e.to_string())?;
    Ok(matches
        .iter()
        .enumerate()
        .filter_map(|(i, m)| if *m { Some(i) } else { None })
        .collect())
}

/// Materialize one table of `size` rows: apply every strategy in order,
/// shuffle if enabled, drop intermediates, fix the output column order.
pub(crate) fn generate_table(
    config: &GeneratorConfig,
    size: usize,
    prepared: &mut [PreparedColumn],
    shuffle_rng: &mut StdRng,
    collector: &mut ErrorCollector,
) -> Table {
    let mut table = Table::empty(&config.column_name, size);
    for column in prepared.iter_mut() {
        apply_column(&mut table, column, collector);
    }
    if config.shuffle {
        table.shuffle(shuffle_rng);
    }
    table.into_output(&config.column_name)
}

/// Shuffle source for a run. Shuffling is not covered by strategy seeds;
/// each run draws its own.
pub(crate) fn shuffle_rng() -> StdRng {
    StdRng::from_os_rng()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::table::Table;
    use crate::writer::{WriteMetadata, WriteResult, Writer, WriterSummary};

    /// Collects written chunks in memory for assertions.
    #[derive(Default)]
    pub struct CaptureWriter {
        pub chunks: Vec<(Table, WriteMetadata)>,
        pub finalized: bool,
    }

    impl Writer for CaptureWriter {
        fn write(&mut self, table: &Table, meta: &WriteMetadata) -> WriteResult {
            if self.finalized {
                return WriteResult::failed("finalized".into());
            }
            let rows = table.row_count();
            self.chunks.push((table.clone(), meta.clone()));
            WriteResult::success(rows)
        }

        fn finalize(&mut self) -> crate::error::Result<WriterSummary> {
            self.finalized = true;
            Ok(WriterSummary {
                writer_type: "capture",
                rows_written: self.chunks.iter().map(|(t, _)| t.row_count()).sum(),
                chunks_written: self.chunks.len(),
                files: Vec::new(),
                endpoint: None,
            })
        }
    }

    pub fn config_from(json: serde_json::Value) -> GeneratorConfig {
        serde_json::from_value(json).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::config_from;
    use super::*;
    use crate::table::Value;

    fn run_generate(config: &GeneratorConfig, collector: &mut ErrorCollector) -> Table {
        let mut prepared = prepare_strategies(config).unwrap();
        let mut rng = shuffle_rng();
        generate_table(config, config.effective_rows(), &mut prepared, &mut rng, collector)
    }

    #[test]
    fn test_generation_in_config_order_with_concat() {
        let config = config_from(serde_json::json!({
            "column_name": ["id", "code"],
            "num_of_rows": 3,
            "shuffle": false,
            "configs": [
                {"names": ["id"], "strategy": {"name": "SERIES_STRATEGY", "params": {"start": 1}}},
                {"names": ["code"], "strategy": {
                    "name": "CONCAT_STRATEGY",
                    "params": {"lhs_col": "id", "rhs_col": "id", "prefix": "ROW-", "separator": "."}
                }},
            ],
        }));
        let mut collector = ErrorCollector::with_export_dir(None);
        let table = run_generate(&config, &mut collector);

        assert_eq!(table.cell("code", 0), Some(&Value::Text("ROW-1.1".into())));
        assert_eq!(table.cell("code", 2), Some(&Value::Text("ROW-3.3".into())));
        assert!(!collector.has_errors());
    }

    #[test]
    fn test_mask_restricts_application() {
        let config = config_from(serde_json::json!({
            "column_name": ["id", "flag"],
            "num_of_rows": 4,
            "shuffle": false,
            "configs": [
                {"names": ["id"], "strategy": {"name": "SERIES_STRATEGY", "params": {"start": 1}}},
                {"names": ["flag"], "strategy": {
                    "name": "DISTRIBUTED_CHOICE_STRATEGY",
                    "params": {"choices": {"big": 100}, "seed": 1}
                }, "mask": "id > 2"},
            ],
        }));
        let mut collector = ErrorCollector::with_export_dir(None);
        let table = run_generate(&config, &mut collector);

        assert_eq!(table.cell("flag", 0), Some(&Value::Null));
        assert_eq!(table.cell("flag", 1), Some(&Value::Null));
        assert_eq!(table.cell("flag", 2), Some(&Value::Text("big".into())));
        assert_eq!(table.cell("flag", 3), Some(&Value::Text("big".into())));
    }

    #[test]
    fn test_zero_match_mask_leaves_column_and_warns_once() {
        let config = config_from(serde_json::json!({
            "column_name": ["id", "flag"],
            "num_of_rows": 3,
            "shuffle": false,
            "configs": [
                {"names": ["id"], "strategy": {"name": "SERIES_STRATEGY", "params": {"start": 1}}},
                {"names": ["flag"], "strategy": {
                    "name": "DISTRIBUTED_CHOICE_STRATEGY",
                    "params": {"choices": {"x": 100}}
                }, "mask": "id > 100"},
            ],
        }));
        let mut collector = ErrorCollector::with_export_dir(None);
        let table = run_generate(&config, &mut collector);

        for i in 0..3 {
            assert_eq!(table.cell("flag", i), Some(&Value::Null));
        }
        let summary = collector.summary();
        assert_eq!(summary.warning, 1, "exactly one warning");
        assert!(!collector.has_failures());
    }

    #[test]
    fn test_invalid_mask_falls_back_to_all_rows() {
        let config = config_from(serde_json::json!({
            "column_name": ["flag"],
            "num_of_rows": 3,
            "shuffle": false,
            "configs": [
                {"names": ["flag"], "strategy": {
                    "name": "DISTRIBUTED_CHOICE_STRATEGY",
                    "params": {"choices": {"x": 100}}
                }, "mask": "this is (not a mask"},
            ],
        }));
        let mut collector = ErrorCollector::with_export_dir(None);
        let table = run_generate(&config, &mut collector);

        for i in 0..3 {
            assert_eq!(table.cell("flag", i), Some(&Value::Text("x".into())));
        }
        assert_eq!(collector.summary().warning, 1);
    }

    #[test]
    fn test_delete_with_mask_erases_matches_only() {
        let config = config_from(serde_json::json!({
            "column_name": ["id"],
            "num_of_rows": 5,
            "shuffle": false,
            "configs": [
                {"names": ["id"], "strategy": {"name": "SERIES_STRATEGY", "params": {"start": 1}}},
                {"names": ["id"], "strategy": {"name": "DELETE_STRATEGY", "params": {}},
                 "mask": "id >= 4"},
            ],
        }));
        let mut collector = ErrorCollector::with_export_dir(None);
        let table = run_generate(&config, &mut collector);

        assert_eq!(table.cell("id", 0), Some(&Value::Int(1)));
        assert_eq!(table.cell("id", 2), Some(&Value::Int(3)));
        assert_eq!(table.cell("id", 3), Some(&Value::Null));
        assert_eq!(table.cell("id", 4), Some(&Value::Null));
    }

    #[test]
    fn test_intermediate_columns_dropped_from_output() {
        let config = config_from(serde_json::json!({
            "column_name": ["label"],
            "num_of_rows": 2,
            "shuffle": false,
            "configs": [
                {"names": ["scratch"], "strategy": {"name": "SERIES_STRATEGY", "params": {"start": 10}},
                 "intermediate": true},
                {"names": ["label"], "strategy": {
                    "name": "CONCAT_STRATEGY",
                    "params": {"lhs_col": "scratch", "rhs_col": "scratch", "separator": "-"}
                }},
            ],
        }));
        let mut collector = ErrorCollector::with_export_dir(None);
        let table = run_generate(&config, &mut collector);

        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["label"]);
        assert_eq!(table.cell("label", 0), Some(&Value::Text("10-10".into())));
    }

    #[test]
    fn test_disabled_entry_skipped() {
        let config = config_from(serde_json::json!({
            "column_name": ["id"],
            "num_of_rows": 2,
            "shuffle": false,
            "configs": [
                {"names": ["id"], "strategy": {"name": "SERIES_STRATEGY", "params": {"start": 1}},
                 "disabled": true},
            ],
        }));
        let mut collector = ErrorCollector::with_export_dir(None);
        let table = run_generate(&config, &mut collector);
        assert_eq!(table.cell("id", 0), Some(&Value::Null));
    }

    #[test]
    fn test_unconfigured_column_stays_null() {
        let config = config_from(serde_json::json!({
            "column_name": ["id", "untouched"],
            "num_of_rows": 2,
            "shuffle": false,
            "configs": [
                {"names": ["id"], "strategy": {"name": "SERIES_STRATEGY", "params": {"start": 1}}},
            ],
        }));
        let mut collector = ErrorCollector::with_export_dir(None);
        let table = run_generate(&config, &mut collector);
        assert_eq!(table.cell("untouched", 0), Some(&Value::Null));
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["id", "untouched"]);
    }
}
