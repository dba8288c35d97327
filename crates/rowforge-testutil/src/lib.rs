//! Shared fixtures for Rowforge tests and benches: a fluent config builder
//! and an in-memory writer for asserting on emitted chunks.

use rowforge_core::config::GeneratorConfig;
use rowforge_core::table::{Table, Value};
use rowforge_core::writer::{WriteMetadata, WriteResult, Writer, WriterSummary};

/// Builds `GeneratorConfig` documents for tests without hand-writing JSON
/// everywhere.
pub struct ConfigBuilder {
    name: String,
    columns: Vec<String>,
    rows: usize,
    shuffle: bool,
    entries: Vec<serde_json::Value>,
    file_writer: Vec<serde_json::Value>,
}

impl ConfigBuilder {
    pub fn new(rows: usize) -> Self {
        ConfigBuilder {
            name: "test".to_string(),
            columns: Vec::new(),
            rows,
            shuffle: false,
            entries: Vec::new(),
            file_writer: Vec::new(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Add a strategy entry targeting `names`.
    pub fn strategy(mut self, names: &[&str], strategy: &str, params: serde_json::Value) -> Self {
        self.entries.push(serde_json::json!({
            "names": names,
            "strategy": {"name": strategy, "params": params},
        }));
        self
    }

    /// Add a strategy entry with extra fields (mask, unique, intermediate,
    /// disabled) merged in.
    pub fn strategy_with(
        mut self,
        names: &[&str],
        strategy: &str,
        params: serde_json::Value,
        extra: serde_json::Value,
    ) -> Self {
        let mut entry = serde_json::json!({
            "names": names,
            "strategy": {"name": strategy, "params": params},
        });
        if let (Some(obj), Some(extra_obj)) = (entry.as_object_mut(), extra.as_object()) {
            for (k, v) in extra_obj {
                if k == "unique" {
                    obj["strategy"]["unique"] = v.clone();
                } else {
                    obj.insert(k.clone(), v.clone());
                }
            }
        }
        self.entries.push(entry);
        self
    }

    pub fn file_sink(mut self, sink_type: &str, output_path: &str) -> Self {
        self.file_writer.push(serde_json::json!({
            "type": sink_type,
            "params": {"output_path": output_path},
        }));
        self
    }

    pub fn build(self) -> GeneratorConfig {
        serde_json::from_value(serde_json::json!({
            "metadata": {"name": self.name},
            "column_name": self.columns,
            "num_of_rows": self.rows,
            "shuffle": self.shuffle,
            "configs": self.entries,
            "file_writer": self.file_writer,
        }))
        .expect("builder produced an invalid config document")
    }
}

/// Collects written chunks in memory for assertions.
#[derive(Default)]
pub struct CaptureWriter {
    pub chunks: Vec<(Table, WriteMetadata)>,
    pub finalized: bool,
}

impl CaptureWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured chunks appended into one table.
    pub fn combined(&self) -> Table {
        let mut combined = Table::default();
        for (chunk, _) in &self.chunks {
            combined.append(chunk);
        }
        combined
    }
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

    fn finalize(&mut self) -> rowforge_core::Result<WriterSummary> {
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

/// Clone out one column's values for comparisons.
pub fn column_values(table: &Table, name: &str) -> Vec<Value> {
    (0..table.row_count())
        .map(|i| {
            table
                .cell(name, i)
                .cloned()
                .unwrap_or(Value::Null)
        })
        .collect()
}
