//! JSON emission as an array of row objects. Params: `pretty` (default
//! false).

use std::path::Path;

use crate::error::{Result, RowForgeError};
use crate::strategy::ParamMap;
use crate::table::Table;

pub fn write(path: &Path, table: &Table, params: &ParamMap) -> Result<()> {
    let pretty = params
        .get("pretty")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let records = rows_as_json(table);
    let body = if pretty {
        serde_json::to_string_pretty(&records)
    } else {
        serde_json::to_string(&records)
    }
    .map_err(|e| RowForgeError::Other(format!("serializing JSON rows: {}", e)))?;

    std::fs::write(path, body).map_err(|e| RowForgeError::Io {
        action: format!("writing JSON to {}", path.display()),
        source: e,
    })
}

/// Rows as ordered JSON objects, shared with envelope construction.
pub fn rows_as_json(table: &Table) -> Vec<serde_json::Value> {
    table
        .rows()
        .map(|row| {
            let map: serde_json::Map<String, serde_json::Value> = row
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_json()))
                .collect();
            serde_json::Value::Object(map)
        })
        .collect()
}
