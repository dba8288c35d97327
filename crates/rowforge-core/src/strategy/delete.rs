//! Erases values: yields null for every row the mask matches.
//!
//! A zero-match mask is a no-op with a warning, like every other strategy —
//! deletion never blanks rows the mask did not select.

use crate::error::Result;
use crate::table::{DataKind, Value};

use super::{StateMap, Strategy};

const NAME: &str = "DELETE_STRATEGY";

#[derive(Default)]
pub struct DeleteStrategy;

impl DeleteStrategy {
    pub fn new() -> Self {
        DeleteStrategy
    }
}

impl Strategy for DeleteStrategy {
    fn data_kind(&self) -> DataKind {
        // Preserve the column's existing kind.
        DataKind::Null
    }

    fn generate_chunk(&mut self, n: usize) -> Result<Vec<Value>> {
        Ok(vec![Value::Null; n])
    }

    fn reset(&mut self) {}

    fn describe_state(&self) -> StateMap {
        let mut state = StateMap::new();
        state.insert("strategy".into(), NAME.into());
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yields_nulls() {
        let mut s = DeleteStrategy::new();
        let out = s.generate_chunk(5).unwrap();
        assert_eq!(out.len(), 5);
        assert!(out.iter().all(|v| v.is_null()));
    }
}
