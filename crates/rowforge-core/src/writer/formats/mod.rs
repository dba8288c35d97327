//! Per-format file emitters. Each format takes the table, the output path,
//! and the sink's parameter map; parent directories are created by the
//! owning writer before these run.

pub mod csv;
pub mod excel;
pub mod feather;
pub mod html;
pub mod json;
pub mod parquet;
pub mod sqlite;

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::error::{Result, RowForgeError};
use crate::table::{DataKind, Table, Value};

/// Convert a table to an Arrow record batch for the columnar formats
/// (Parquet, Feather). Integer columns map to Int64, floats to Float64,
/// everything else is rendered to Utf8. Nulls stay null.
pub(crate) fn to_record_batch(table: &Table) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(table.column_count());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.column_count());

    for name in table.column_names() {
        let column = table.column(name).expect("iterating existing columns");
        match column.kind {
            DataKind::Integer => {
                let data: Vec<Option<i64>> = column.values.iter().map(|v| v.as_int()).collect();
                fields.push(Field::new(name, DataType::Int64, true));
                arrays.push(Arc::new(Int64Array::from(data)));
            }
            DataKind::Float => {
                let data: Vec<Option<f64>> = column.values.iter().map(|v| v.as_f64()).collect();
                fields.push(Field::new(name, DataType::Float64, true));
                arrays.push(Arc::new(Float64Array::from(data)));
            }
            _ => {
                let data: Vec<Option<String>> = column
                    .values
                    .iter()
                    .map(|v| match v {
                        Value::Null => None,
                        other => Some(other.render()),
                    })
                    .collect();
                fields.push(Field::new(name, DataType::Utf8, true));
                arrays.push(Arc::new(StringArray::from(data)));
            }
        }
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).map_err(|e| {
        RowForgeError::Other(format!("building arrow batch: {}", e))
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;

    #[test]
    fn test_record_batch_shape() {
        let batch = to_record_batch(&test_support::sample_table()).unwrap();
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.num_columns(), 3);
        assert_eq!(batch.schema().field(0).data_type(), &DataType::Int64);
        assert_eq!(batch.schema().field(1).data_type(), &DataType::Float64);
        assert_eq!(batch.schema().field(2).data_type(), &DataType::Utf8);
    }

    #[test]
    fn test_record_batch_nulls_preserved() {
        let batch = to_record_batch(&test_support::sample_table()).unwrap();
        assert!(batch.column(1).is_null(1));
        assert!(batch.column(2).is_null(2));
    }
}
