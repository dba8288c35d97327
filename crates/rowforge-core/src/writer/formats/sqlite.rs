//! SQLite emission: drop-and-recreate a table, then insert all rows in one
//! transaction. Params: `table_name` (default "data").

use std::path::Path;

use crate::error::{Result, RowForgeError};
use crate::strategy::ParamMap;
use crate::table::{DataKind, Table, Value};

pub fn write(path: &Path, table: &Table, params: &ParamMap) -> Result<()> {
    let table_name = params
        .get("table_name")
        .and_then(|v| v.as_str())
        .unwrap_or("data");

    let format_err = |e: rusqlite::Error| RowForgeError::Format {
        format: "sqlite".to_string(),
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut conn = rusqlite::Connection::open(path).map_err(format_err)?;

    let columns: Vec<(String, &'static str)> = table
        .column_names()
        .map(|name| {
            let kind = table.column(name).map(|c| c.kind).unwrap_or(DataKind::Text);
            let sql_type = match kind {
                DataKind::Integer => "INTEGER",
                DataKind::Float => "REAL",
                _ => "TEXT",
            };
            (name.to_string(), sql_type)
        })
        .collect();

    let column_defs: Vec<String> = columns
        .iter()
        .map(|(name, sql_type)| format!("{} {}", quote_ident(name), sql_type))
        .collect();

    conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS {ident}; CREATE TABLE {ident} ({defs});",
        ident = quote_ident(table_name),
        defs = column_defs.join(", ")
    ))
    .map_err(format_err)?;

    let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
    let insert_sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table_name),
        columns
            .iter()
            .map(|(name, _)| quote_ident(name))
            .collect::<Vec<_>>()
            .join(", "),
        placeholders.join(", ")
    );

    let tx = conn.transaction().map_err(format_err)?;
    {
        let mut stmt = tx.prepare(&insert_sql).map_err(format_err)?;
        for row in table.rows() {
            let values: Vec<rusqlite::types::Value> =
                row.values().map(|&v| to_sql_value(v)).collect();
            stmt.execute(rusqlite::params_from_iter(values))
                .map_err(format_err)?;
        }
    }
    tx.commit().map_err(format_err)?;
    Ok(())
}

fn to_sql_value(value: &Value) -> rusqlite::types::Value {
    match value {
        Value::Null => rusqlite::types::Value::Null,
        Value::Int(i) => rusqlite::types::Value::Integer(*i),
        Value::Float(f) => rusqlite::types::Value::Real(*f),
        other => rusqlite::types::Value::Text(other.render()),
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sample_table;
    use super::*;

    #[test]
    fn test_sqlite_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.db");
        write(&path, &sample_table(), &serde_json::Map::new()).unwrap();

        let conn = rusqlite::Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM data", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 3);

        let label: Option<String> = conn
            .query_row("SELECT label FROM data WHERE id = 2", [], |r| r.get(0))
            .unwrap();
        assert_eq!(label.as_deref(), Some("with,comma"));

        let null_score: Option<f64> = conn
            .query_row("SELECT score FROM data WHERE id = 2", [], |r| r.get(0))
            .unwrap();
        assert!(null_score.is_none());
    }

    #[test]
    fn test_rewrite_replaces_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.db");
        write(&path, &sample_table(), &serde_json::Map::new()).unwrap();
        write(&path, &sample_table(), &serde_json::Map::new()).unwrap();

        let conn = rusqlite::Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM data", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 3, "second write must replace, not append");
    }

    #[test]
    fn test_custom_table_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.db");
        let mut params = serde_json::Map::new();
        params.insert("table_name".into(), serde_json::json!("rows"));
        write(&path, &sample_table(), &params).unwrap();

        let conn = rusqlite::Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM rows", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 3);
    }
}
