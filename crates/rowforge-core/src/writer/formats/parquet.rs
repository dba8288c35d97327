//! Parquet emission via the Arrow writer. Params: `compression`
//! (snappy | zstd | uncompressed, default snappy).

use std::path::Path;

use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;

use crate::error::{Result, RowForgeError};
use crate::strategy::ParamMap;
use crate::table::Table;

use super::to_record_batch;

pub fn write(path: &Path, table: &Table, params: &ParamMap) -> Result<()> {
    let compression = match params
        .get("compression")
        .and_then(|v| v.as_str())
        .unwrap_or("snappy")
    {
        "snappy" => Compression::SNAPPY,
        "zstd" => Compression::ZSTD(ZstdLevel::default()),
        "uncompressed" => Compression::UNCOMPRESSED,
        other => {
            return Err(RowForgeError::Format {
                format: "parquet".to_string(),
                path: path.display().to_string(),
                message: format!("unsupported compression '{}'", other),
            })
        }
    };

    let batch = to_record_batch(table)?;
    let file = std::fs::File::create(path).map_err(|e| RowForgeError::Io {
        action: format!("creating {}", path.display()),
        source: e,
    })?;

    let format_err = |e: parquet::errors::ParquetError| RowForgeError::Format {
        format: "parquet".to_string(),
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let props = WriterProperties::builder()
        .set_compression(compression)
        .build();
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), Some(props)).map_err(format_err)?;
    writer.write(&batch).map_err(format_err)?;
    writer.close().map_err(format_err)?;
    Ok(())
}
