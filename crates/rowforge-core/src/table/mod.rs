//! # Column-major Table
//!
//! The in-memory unit of work for the whole pipeline. A `Table` maps column
//! names (in configuration order) to typed value vectors of one shared
//! length. Processors build tables, strategies fill individual columns, and
//! writers consume them.
//!
//! Rows are materialized lazily via [`Table::rows`] only at serialization
//! boundaries; everything else stays column-major.

pub mod value;

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;

pub use value::Value;

/// Logical column type, inferred from the producing strategy and reported
/// in envelope `dtypes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Integer,
    Float,
    Text,
    Date,
    Time,
    Categorical,
    Null,
}

impl DataKind {
    /// Name used in envelope metadata (`dtypes` map).
    pub fn dtype_name(&self) -> &'static str {
        match self {
            DataKind::Integer => "integer",
            DataKind::Float => "float",
            DataKind::Text => "string",
            DataKind::Date => "date",
            DataKind::Time => "time",
            DataKind::Categorical => "categorical",
            DataKind::Null => "null",
        }
    }
}

/// One column: a kind tag, the intermediate flag, and the values.
#[derive(Debug, Clone)]
pub struct Column {
    pub kind: DataKind,
    pub intermediate: bool,
    pub values: Vec<Value>,
}

impl Column {
    pub fn null(len: usize) -> Self {
        Column {
            kind: DataKind::Null,
            intermediate: false,
            values: vec![Value::Null; len],
        }
    }
}

/// An ordered, column-major table. All columns share one length.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: IndexMap<String, Column>,
    row_count: usize,
}

impl Table {
    /// Create a table of `rows` all-null rows with the given column order.
    pub fn empty<S: AsRef<str>>(column_names: &[S], rows: usize) -> Self {
        let mut columns = IndexMap::with_capacity(column_names.len());
        for name in column_names {
            columns.insert(name.as_ref().to_string(), Column::null(rows));
        }
        Table {
            columns,
            row_count: rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|s| s.as_str())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Ensure a column exists, appending an all-null one when missing.
    /// Columns introduced by a strategy (e.g. intermediates not listed in
    /// `column_name`) land after the configured ones.
    pub fn ensure_column(&mut self, name: &str, intermediate: bool) {
        let rows = self.row_count;
        let col = self
            .columns
            .entry(name.to_string())
            .or_insert_with(|| Column::null(rows));
        col.intermediate = col.intermediate || intermediate;
    }

    /// Overwrite a whole column. The value count must equal the row count.
    pub fn set_column(&mut self, name: &str, kind: DataKind, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.row_count);
        let intermediate = self
            .columns
            .get(name)
            .map(|c| c.intermediate)
            .unwrap_or(false);
        self.columns.insert(
            name.to_string(),
            Column {
                kind,
                intermediate,
                values,
            },
        );
    }

    /// Scatter `values` into the given row positions of one column,
    /// leaving the other rows untouched. Used by masked application.
    /// `DataKind::Null` keeps the column's current kind (transforms that
    /// preserve or erase existing values).
    pub fn write_rows(&mut self, name: &str, rows: &[usize], kind: DataKind, values: Vec<Value>) {
        debug_assert_eq!(rows.len(), values.len());
        self.ensure_column(name, false);
        let col = self.columns.get_mut(name).expect("column just ensured");
        if kind != DataKind::Null {
            col.kind = kind;
        }
        for (row, value) in rows.iter().zip(values) {
            col.values[*row] = value;
        }
    }

    /// Uniformly permute all rows in place. Every column sees the same
    /// permutation, so rows stay intact.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        let mut perm: Vec<usize> = (0..self.row_count).collect();
        perm.shuffle(rng);
        for col in self.columns.values_mut() {
            let mut reordered = Vec::with_capacity(col.values.len());
            for &i in &perm {
                reordered.push(col.values[i].clone());
            }
            col.values = reordered;
        }
    }

    /// Remove intermediate columns and reorder the remainder so that columns
    /// named in `output_order` come first, in that order. Extra columns a
    /// strategy introduced (and did not mark intermediate) follow in their
    /// creation order.
    pub fn into_output<S: AsRef<str>>(mut self, output_order: &[S]) -> Table {
        self.columns.retain(|_, col| !col.intermediate);

        let mut ordered = IndexMap::with_capacity(self.columns.len());
        for name in output_order {
            if let Some(col) = self.columns.shift_remove(name.as_ref()) {
                ordered.insert(name.as_ref().to_string(), col);
            }
        }
        for (name, col) in self.columns {
            ordered.insert(name, col);
        }
        Table {
            columns: ordered,
            row_count: self.row_count,
        }
    }

    /// Append another table's rows. Column sets must match; kinds are taken
    /// from the first non-null side.
    pub fn append(&mut self, other: &Table) {
        if self.columns.is_empty() {
            *self = other.clone();
            return;
        }
        for (name, col) in &other.columns {
            if let Some(existing) = self.columns.get_mut(name) {
                if existing.kind == DataKind::Null {
                    existing.kind = col.kind;
                }
                existing.values.extend(col.values.iter().cloned());
            }
        }
        self.row_count += other.row_count;
    }

    /// Iterate rows as ordered (column name, value) maps. Materializes one
    /// row at a time; used at serialization boundaries only.
    pub fn rows(&self) -> impl Iterator<Item = IndexMap<&str, &Value>> + '_ {
        (0..self.row_count).map(move |i| {
            self.columns
                .iter()
                .map(|(name, col)| (name.as_str(), &col.values[i]))
                .collect()
        })
    }

    /// Map of column name to dtype name, as carried in envelope metadata.
    pub fn dtypes(&self) -> IndexMap<String, String> {
        self.columns
            .iter()
            .map(|(name, col)| (name.clone(), col.kind.dtype_name().to_string()))
            .collect()
    }

    /// The value at (row, column), if both exist.
    pub fn cell(&self, name: &str, row: usize) -> Option<&Value> {
        self.columns.get(name).and_then(|c| c.values.get(row))
    }
}

/// A contiguous row-slice produced in one processor step. Row indices are
/// contiguous starting at `offset` (the running total of rows generated
/// before this chunk).
#[derive(Debug, Clone)]
pub struct Chunk {
    pub table: Table,
    pub offset: usize,
}
