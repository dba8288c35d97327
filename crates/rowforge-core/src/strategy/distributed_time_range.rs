//! Times drawn from a weighted union of time ranges. Individual ranges may
//! wrap past midnight, same as the single-range strategy.

use crate::error::Result;
use crate::table::{DataKind, Value};

use super::time_range::{TimeSpan, DEFAULT_TIME_FORMAT};
use super::{
    check_weight_sum, invalid, pick_weighted, seed_param, weight_value, ParamMap, SeededRng,
    StateMap, Strategy,
};

const NAME: &str = "DISTRIBUTED_TIME_RANGE_STRATEGY";

pub struct DistributedTimeRangeStrategy {
    spans: Vec<TimeSpan>,
    weights: Vec<i64>,
    source: SeededRng,
}

impl DistributedTimeRangeStrategy {
    pub fn from_params(params: &ParamMap) -> Result<Self> {
        let raw = match params.get("ranges") {
            Some(serde_json::Value::Array(items)) if !items.is_empty() => items,
            Some(serde_json::Value::Array(_)) => {
                return Err(invalid(NAME, "ranges", "ranges must not be empty"))
            }
            _ => return Err(invalid(NAME, "ranges", "missing required parameter")),
        };

        let mut spans = Vec::with_capacity(raw.len());
        let mut weights = Vec::with_capacity(raw.len());
        for (i, item) in raw.iter().enumerate() {
            let obj = item.as_object().ok_or_else(|| {
                invalid(NAME, "ranges", format!("range at index {} must be an object", i))
            })?;
            let field = |key: &str| -> Result<&str> {
                obj.get(key).and_then(|v| v.as_str()).ok_or_else(|| {
                    invalid(
                        NAME,
                        "ranges",
                        format!("range at index {} is missing string field '{}'", i, key),
                    )
                })
            };
            let format = obj
                .get("format")
                .and_then(|v| v.as_str())
                .unwrap_or(DEFAULT_TIME_FORMAT);
            let weight = obj.get("distribution").ok_or_else(|| {
                invalid(
                    NAME,
                    "ranges",
                    format!("range at index {} is missing 'distribution'", i),
                )
            })?;

            spans.push(TimeSpan::parse(
                field("start")?,
                field("end")?,
                format.to_string(),
            )?);
            weights.push(weight_value(NAME, "distribution", weight)?);
        }

        check_weight_sum(NAME, &weights)?;

        Ok(DistributedTimeRangeStrategy {
            spans,
            weights,
            source: SeededRng::new(seed_param(NAME, params)?),
        })
    }
}

impl Strategy for DistributedTimeRangeStrategy {
    fn data_kind(&self) -> DataKind {
        DataKind::Time
    }

    fn generate_chunk(&mut self, n: usize) -> Result<Vec<Value>> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            let idx = pick_weighted(&mut self.source.rng, &self.weights);
            out.push(self.spans[idx].sample(&mut self.source.rng));
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
        state.insert("ranges".into(), (self.spans.len() as u64).into());
        state
    }
}
