//! Self-contained HTML table emission. Params: `table_title` (optional
//! heading above the table).

use std::io::Write;
use std::path::Path;

use crate::error::{Result, RowForgeError};
use crate::strategy::ParamMap;
use crate::table::Table;

const STYLE: &str = "\
table { border-collapse: collapse; font-family: sans-serif; }\n\
th, td { border: 1px solid #999; padding: 4px 10px; text-align: left; }\n\
th { background: #f0f0f0; }\n\
tr:nth-child(even) { background: #fafafa; }";

pub fn write(path: &Path, table: &Table, params: &ParamMap) -> Result<()> {
    let title = params.get("table_title").and_then(|v| v.as_str());

    let file = std::fs::File::create(path).map_err(|e| RowForgeError::Io {
        action: format!("creating {}", path.display()),
        source: e,
    })?;
    let mut out = std::io::BufWriter::new(file);

    let io_err = |e: std::io::Error| RowForgeError::Io {
        action: format!("writing HTML to {}", path.display()),
        source: e,
    };

    writeln!(
        out,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n{}\n</style>\n</head>\n<body>",
        STYLE
    )
    .map_err(io_err)?;

    if let Some(title) = title {
        writeln!(out, "<h2>{}</h2>", escape(title)).map_err(io_err)?;
    }

    writeln!(out, "<table>\n<thead>\n<tr>").map_err(io_err)?;
    for name in table.column_names() {
        writeln!(out, "<th>{}</th>", escape(name)).map_err(io_err)?;
    }
    writeln!(out, "</tr>\n</thead>\n<tbody>").map_err(io_err)?;

    for row in table.rows() {
        write!(out, "<tr>").map_err(io_err)?;
        for value in row.values() {
            write!(out, "<td>{}</td>", escape(&value.render())).map_err(io_err)?;
        }
        writeln!(out, "</tr>").map_err(io_err)?;
    }

    writeln!(out, "</tbody>\n</table>\n</body>\n</html>").map_err(io_err)?;
    out.flush().map_err(io_err)
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
