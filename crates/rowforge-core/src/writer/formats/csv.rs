//! CSV emission. Params: `delimiter` (default `,`), `header` (default true).

use std::io::Write;
use std::path::Path;

use crate::error::{Result, RowForgeError};
use crate::strategy::ParamMap;
use crate::table::Table;

pub fn write(path: &Path, table: &Table, params: &ParamMap) -> Result<()> {
    let delimiter = params
        .get("delimiter")
        .and_then(|v| v.as_str())
        .unwrap_or(",")
        .to_string();
    let header = params
        .get("header")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);

    let file = std::fs::File::create(path).map_err(|e| RowForgeError::Io {
        action: format!("creating {}", path.display()),
        source: e,
    })?;
    let mut out = std::io::BufWriter::new(file);

    let io_err = |e: std::io::Error| RowForgeError::Io {
        action: format!("writing CSV to {}", path.display()),
        source: e,
    };

    if header {
        let names: Vec<String> = table
            .column_names()
            .map(|c| csv_escape(c, &delimiter))
            .collect();
        writeln!(out, "{}", names.join(&delimiter)).map_err(io_err)?;
    }

    for row in table.rows() {
        let cells: Vec<String> = row
            .values()
            .map(|v| csv_escape(&v.render(), &delimiter))
            .collect();
        writeln!(out, "{}", cells.join(&delimiter)).map_err(io_err)?;
    }

    out.flush().map_err(io_err)
}

/// Quote a field if it contains the delimiter, a quote, or a newline.
fn csv_escape(s: &str, delimiter: &str) -> String {
    if s.contains(delimiter) || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sample_table;
    use super::*;

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("hello", ","), "hello");
        assert_eq!(csv_escape("hello,world", ","), "\"hello,world\"");
        assert_eq!(csv_escape("say \"hi\"", ","), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_write_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write(&path, &sample_table(), &serde_json::Map::new()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "id,score,label");
        assert_eq!(lines[1], "1,0.5,plain");
        assert_eq!(lines[2], "2,,\"with,comma\"");
        assert_eq!(lines[3], "3,2.25,");
    }

    #[test]
    fn test_custom_delimiter_no_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut params = serde_json::Map::new();
        params.insert("delimiter".into(), serde_json::json!(";"));
        params.insert("header".into(), serde_json::json!(false));
        write(&path, &sample_table(), &params).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("1;0.5;plain"));
    }
}
