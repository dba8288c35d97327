//! Excel (xlsx) emission. Params: `sheet_name` (default Sheet1).

use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::error::{Result, RowForgeError};
use crate::strategy::ParamMap;
use crate::table::{Table, Value};

pub fn write(path: &Path, table: &Table, params: &ParamMap) -> Result<()> {
    let sheet_name = params
        .get("sheet_name")
        .and_then(|v| v.as_str())
        .unwrap_or("Sheet1");

    let format_err = |e: rust_xlsxwriter::XlsxError| RowForgeError::Format {
        format: "excel".to_string(),
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name).map_err(format_err)?;

    for (col, name) in table.column_names().enumerate() {
        sheet
            .write_string(0, col as u16, name)
            .map_err(format_err)?;
    }

    for (i, row) in table.rows().enumerate() {
        let excel_row = (i + 1) as u32;
        for (col, value) in row.values().enumerate() {
            let col = col as u16;
            match value {
                Value::Null => {}
                Value::Int(n) => {
                    sheet
                        .write_number(excel_row, col, *n as f64)
                        .map_err(format_err)?;
                }
                Value::Float(f) => {
                    sheet.write_number(excel_row, col, *f).map_err(format_err)?;
                }
                other => {
                    sheet
                        .write_string(excel_row, col, other.render())
                        .map_err(format_err)?;
                }
            }
        }
    }

    workbook.save(path).map_err(format_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sample_table;
    use super::*;

    #[test]
    fn test_excel_file_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write(&path, &sample_table(), &serde_json::Map::new()).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
        // xlsx files are zip archives
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn test_invalid_sheet_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let mut params = serde_json::Map::new();
        // Square brackets are not allowed in sheet names.
        params.insert("sheet_name".into(), serde_json::json!("bad[name]"));
        assert!(write(&path, &sample_table(), &params).is_err());
    }
}
