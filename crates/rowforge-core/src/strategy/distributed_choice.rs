//! Categorical values with integer weights summing to 100.
//!
//! Each row draws independently by cumulative-weight selection, so observed
//! counts follow the weights statistically while generation stays
//! prefix-stable across chunks.

use crate::error::Result;
use crate::table::{DataKind, Value};

use super::{
    check_weight_sum, invalid, pick_weighted, seed_param, weight_value, ParamMap, SeededRng,
    StateMap, Strategy,
};

const NAME: &str = "DISTRIBUTED_CHOICE_STRATEGY";

#[derive(Debug)]
pub struct DistributedChoiceStrategy {
    choices: Vec<String>,
    weights: Vec<i64>,
    source: SeededRng,
}

impl DistributedChoiceStrategy {
    pub fn from_params(params: &ParamMap) -> Result<Self> {
        let raw = match params.get("choices") {
            Some(serde_json::Value::Object(map)) if !map.is_empty() => map,
            Some(serde_json::Value::Object(_)) => {
                return Err(invalid(NAME, "choices", "choices must not be empty"))
            }
            _ => {
                return Err(invalid(
                    NAME,
                    "choices",
                    "missing required parameter (map of value to weight)",
                ))
            }
        };

        // serde_json with preserve_order keeps the document order of keys,
        // which fixes the cumulative-pick order and thus the sequence for a
        // given seed.
        let mut choices = Vec::with_capacity(raw.len());
        let mut weights = Vec::with_capacity(raw.len());
        for (value, weight) in raw {
            choices.push(value.clone());
            weights.push(weight_value(NAME, value, weight)?);
        }
        check_weight_sum(NAME, &weights)?;

        Ok(DistributedChoiceStrategy {
            choices,
            weights,
            source: SeededRng::new(seed_param(NAME, params)?),
        })
    }
}

impl Strategy for DistributedChoiceStrategy {
    fn data_kind(&self) -> DataKind {
        DataKind::Categorical
    }

    fn generate_chunk(&mut self, n: usize) -> Result<Vec<Value>> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            let idx = pick_weighted(&mut self.source.rng, &self.weights);
            out.push(Value::Text(self.choices[idx].clone().into()));
        }
        Ok(out)
    }

    fn reset(&mut self) {
        self.source.reset();
    }

    fn describe_state(&self) -> StateMap {
        let mut state = StateMap::new();
        state.insert("strategy".into(), NAME.into());
        state.insert("seed".into(), self.source.seed().into());
        state.insert("choices".into(), (self.choices.len() as u64).into());
        state
    }
}
