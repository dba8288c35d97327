//! Feather (Arrow IPC file) emission.

use std::path::Path;

use arrow::ipc::writer::FileWriter;

use crate::error::{Result, RowForgeError};
use crate::strategy::ParamMap;
use crate::table::Table;

use super::to_record_batch;

pub fn write(path: &Path, table: &Table, _params: &ParamMap) -> Result<()> {
    let batch = to_record_batch(table)?;
    let file = std::fs::File::create(path).map_err(|e| RowForgeError::Io {
        action: format!("creating {}", path.display()),
        source: e,
    })?;

    let format_err = |e: arrow::error::ArrowError| RowForgeError::Format {
        format: "feather".to_string(),
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut writer = FileWriter::try_new(file, batch.schema_ref()).map_err(format_err)?;
    writer.write(&batch).map_err(format_err)?;
    writer.finish().map_err(format_err)?;
    Ok(())
}
