//! Row-wise string concatenation of two existing columns:
//! `prefix + lhs + separator + rhs + suffix`.
//!
//! Referenced columns must be produced by earlier config entries; the
//! validator rejects forward references before a run starts.

use crate::error::{Result, RowForgeError};
use crate::table::{DataKind, Table, Value};

use super::{opt_string_field, string_field, ParamMap, StateMap, Strategy};

const NAME: &str = "CONCAT_STRATEGY";

pub struct ConcatStrategy {
    lhs_col: String,
    rhs_col: String,
    prefix: String,
    separator: String,
    suffix: String,
}

impl ConcatStrategy {
    pub fn from_params(params: &ParamMap) -> Result<Self> {
        Ok(ConcatStrategy {
            lhs_col: string_field(NAME, params, "lhs_col")?,
            rhs_col: string_field(NAME, params, "rhs_col")?,
            prefix: opt_string_field(NAME, params, "prefix")?.unwrap_or_default(),
            separator: opt_string_field(NAME, params, "separator")?.unwrap_or_default(),
            suffix: opt_string_field(NAME, params, "suffix")?.unwrap_or_default(),
        })
    }

    /// Columns this strategy reads, used by the forward-reference check.
    pub fn referenced_columns(params: &ParamMap) -> Vec<String> {
        ["lhs_col", "rhs_col"]
            .iter()
            .filter_map(|key| params.get(*key).and_then(|v| v.as_str()))
            .map(|s| s.to_string())
            .collect()
    }
}

impl Strategy for ConcatStrategy {
    fn data_kind(&self) -> DataKind {
        DataKind::Text
    }

    fn generate_chunk(&mut self, _n: usize) -> Result<Vec<Value>> {
        Err(RowForgeError::StrategyFailure {
            strategy: NAME.to_string(),
            column: String::new(),
            message: "concat reads existing columns and cannot generate standalone values"
                .to_string(),
        })
    }

    fn transform(&mut self, table: &Table, target: &str, rows: &[usize]) -> Result<Vec<Value>> {
        for col in [&self.lhs_col, &self.rhs_col] {
            if !table.contains_column(col) {
                return Err(RowForgeError::StrategyFailure {
                    strategy: NAME.to_string(),
                    column: target.to_string(),
                    message: format!("referenced column '{}' does not exist", col),
                });
            }
        }

        Ok(rows
            .iter()
            .map(|&row| {
                let lhs = table.cell(&self.lhs_col, row).unwrap_or(&Value::Null);
                let rhs = table.cell(&self.rhs_col, row).unwrap_or(&Value::Null);
                Value::Text(
                    format!(
                        "{}{}{}{}{}",
                        self.prefix,
                        lhs.render(),
                        self.separator,
                        rhs.render(),
                        self.suffix
                    )
                    .into(),
                )
            })
            .collect())
    }

    fn reset(&mut self) {}

    fn describe_state(&self) -> StateMap {
        let mut state = StateMap::new();
        state.insert("strategy".into(), NAME.into());
        state.insert("lhs_col".into(), self.lhs_col.clone().into());
        state.insert("rhs_col".into(), self.rhs_col.clone().into());
        state
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::params;
    use super::*;
    use crate::table::DataKind;

    fn name_table() -> Table {
        let mut t = Table::empty(&["first", "last"], 2);
        t.set_column(
            "first",
            DataKind::Text,
            vec![Value::Text("Ada".into()), Value::Text("Alan".into())],
        );
        t.set_column(
            "last",
            DataKind::Text,
            vec![Value::Text("Lovelace".into()), Value::Text("Turing".into())],
        );
        t
    }

    #[test]
    fn test_basic_concat() {
        let p = params(serde_json::json!({
            "lhs_col": "first", "rhs_col": "last", "separator": " "
        }));
        let mut s = ConcatStrategy::from_params(&p).unwrap();
        let out = s.transform(&name_table(), "full", &[0, 1]).unwrap();
        assert_eq!(out[0], Value::Text("Ada Lovelace".into()));
        assert_eq!(out[1], Value::Text("Alan Turing".into()));
    }

    #[test]
    fn test_prefix_and_suffix() {
        let p = params(serde_json::json!({
            "lhs_col": "first", "rhs_col": "last",
            "prefix": "<", "separator": "|", "suffix": ">"
        }));
        let mut s = ConcatStrategy::from_params(&p).unwrap();
        let out = s.transform(&name_table(), "tag", &[0]).unwrap();
        assert_eq!(out[0], Value::Text("<Ada|Lovelace>".into()));
    }

    #[test]
    fn test_numeric_columns_render() {
        let mut t = Table::empty(&["a", "b"], 1);
        t.set_column("a", DataKind::Integer, vec![Value::Int(7)]);
        t.set_column("b", DataKind::Float, vec![Value::Float(1.5)]);
        let p = params(serde_json::json!({"lhs_col": "a", "rhs_col": "b", "separator": "-"}));
        let mut s = ConcatStrategy::from_params(&p).unwrap();
        let out = s.transform(&t, "c", &[0]).unwrap();
        assert_eq!(out[0], Value::Text("7-1.5".into()));
    }

    #[test]
    fn test_null_renders_empty() {
        let mut t = Table::empty(&["a", "b"], 1);
        t.set_column("a", DataKind::Text, vec![Value::Text("x".into())]);
        let p = params(serde_json::json!({"lhs_col": "a", "rhs_col": "b", "separator": "/"}));
        let mut s = ConcatStrategy::from_params(&p).unwrap();
        let out = s.transform(&t, "c", &[0]).unwrap();
        assert_eq!(out[0], Value::Text("x/".into()));
    }

    #[test]
    fn test_missing_column_fails() {
        let p = params(serde_json::json!({"lhs_col": "first", "rhs_col": "ghost"}));
        let mut s = ConcatStrategy::from_params(&p).unwrap();
        let err = s.transform(&name_table(), "out", &[0]).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_referenced_columns_helper() {
        let p = params(serde_json::json!({"lhs_col": "x", "rhs_col": "y"}));
        assert_eq!(ConcatStrategy::referenced_columns(&p), vec!["x", "y"]);
    }

    #[test]
    fn test_missing_cols_rejected() {
        assert!(ConcatStrategy::from_params(&params(serde_json::json!({"lhs_col": "a"}))).is_err());
    }
}
