//! Replaces occurrences of one value by another in the target column.
//!
//! A transform, not a generator: it reads the column produced by an earlier
//! config entry and rewrites matching cells. Validation rejects configs
//! where the target has not been produced yet.

use crate::error::{Result, RowForgeError};
use crate::table::{DataKind, Table, Value};

use super::{require, ParamMap, StateMap, Strategy};

const NAME: &str = "REPLACEMENT_STRATEGY";

pub struct ReplacementStrategy {
    from_value: Value,
    to_value: Value,
}

impl ReplacementStrategy {
    pub fn from_params(params: &ParamMap) -> Result<Self> {
        let from_value = Value::from_json(require(NAME, params, "from_value")?);
        let to_value = Value::from_json(require(NAME, params, "to_value")?);
        Ok(ReplacementStrategy {
            from_value,
            to_value,
        })
    }
}

impl Strategy for ReplacementStrategy {
    fn data_kind(&self) -> DataKind {
        // Preserve the column's existing kind.
        DataKind::Null
    }

    fn generate_chunk(&mut self, _n: usize) -> Result<Vec<Value>> {
        Err(RowForgeError::StrategyFailure {
            strategy: NAME.to_string(),
            column: String::new(),
            message: "replacement reads an existing column and cannot generate standalone values"
                .to_string(),
        })
    }

    fn transform(&mut self, table: &Table, target: &str, rows: &[usize]) -> Result<Vec<Value>> {
        let column = table
            .column(target)
            .ok_or_else(|| RowForgeError::StrategyFailure {
                strategy: NAME.to_string(),
                column: target.to_string(),
                message: "target column does not exist yet".to_string(),
            })?;

        Ok(rows
            .iter()
            .map(|&row| {
                let current = &column.values[row];
                if current.loose_eq(&self.from_value) {
                    self.to_value.clone()
                } else {
                    current.clone()
                }
            })
            .collect())
    }

    fn reset(&mut self) {}

    fn describe_state(&self) -> StateMap {
        let mut state = StateMap::new();
        state.insert("strategy".into(), NAME.into());
        state.insert("from".into(), self.from_value.to_json());
        state.insert("to".into(), self.to_value.to_json());
        state
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::params;
    use super::*;
    use crate::table::DataKind;

    fn status_table() -> Table {
        let mut t = Table::empty(&["status"], 4);
        t.set_column(
            "status",
            DataKind::Text,
            vec![
                Value::Text("active".into()),
                Value::Text("inactive".into()),
                Value::Text("active".into()),
                Value::Null,
            ],
        );
        t
    }

    #[test]
    fn test_replaces_matching_values() {
        let p = params(serde_json::json!({"from_value": "active", "to_value": "enabled"}));
        let mut s = ReplacementStrategy::from_params(&p).unwrap();
        let out = s
            .transform(&status_table(), "status", &[0, 1, 2, 3])
            .unwrap();
        assert_eq!(out[0], Value::Text("enabled".into()));
        assert_eq!(out[1], Value::Text("inactive".into()));
        assert_eq!(out[2], Value::Text("enabled".into()));
        assert_eq!(out[3], Value::Null);
    }

    #[test]
    fn test_respects_row_subset() {
        let p = params(serde_json::json!({"from_value": "active", "to_value": "enabled"}));
        let mut s = ReplacementStrategy::from_params(&p).unwrap();
        let out = s.transform(&status_table(), "status", &[2]).unwrap();
        assert_eq!(out, vec![Value::Text("enabled".into())]);
    }

    #[test]
    fn test_numeric_replacement() {
        let mut t = Table::empty(&["n"], 3);
        t.set_column(
            "n",
            DataKind::Integer,
            vec![Value::Int(0), Value::Int(1), Value::Int(0)],
        );
        let p = params(serde_json::json!({"from_value": 0, "to_value": -1}));
        let mut s = ReplacementStrategy::from_params(&p).unwrap();
        let out = s.transform(&t, "n", &[0, 1, 2]).unwrap();
        assert_eq!(out, vec![Value::Int(-1), Value::Int(1), Value::Int(-1)]);
    }

    #[test]
    fn test_missing_target_column_fails() {
        let p = params(serde_json::json!({"from_value": "a", "to_value": "b"}));
        let mut s = ReplacementStrategy::from_params(&p).unwrap();
        let t = Table::empty(&["other"], 2);
        assert!(s.transform(&t, "missing", &[0]).is_err());
    }

    #[test]
    fn test_missing_params_rejected() {
        assert!(
            ReplacementStrategy::from_params(&params(serde_json::json!({"from_value": "a"})))
                .is_err()
        );
    }
}
