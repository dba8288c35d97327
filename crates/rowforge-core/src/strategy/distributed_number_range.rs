//! Numbers drawn from a weighted union of sub-ranges.
//!
//! Each value picks a range by cumulative-weight selection, then samples
//! uniformly within it. Aggregated over a chunk the per-range counts follow
//! the multinomial over the normalized weights, and generation stays
//! prefix-stable across chunk boundaries.

use crate::error::Result;
use crate::table::{DataKind, Value};

use super::number_range::Bounds;
use super::{
    check_weight_sum, invalid, pick_weighted, seed_param, weight_value, ParamMap, SeededRng,
    StateMap, Strategy,
};

const NAME: &str = "DISTRIBUTED_NUMBER_RANGE_STRATEGY";

#[derive(Debug)]
struct WeightedRange {
    bounds: Bounds,
    weight: i64,
}

#[derive(Debug)]
pub struct DistributedNumberRangeStrategy {
    ranges: Vec<WeightedRange>,
    weights: Vec<i64>,
    source: SeededRng,
}

impl DistributedNumberRangeStrategy {
    pub fn from_params(params: &ParamMap) -> Result<Self> {
        let raw = match params.get("ranges") {
            Some(serde_json::Value::Array(items)) if !items.is_empty() => items,
            Some(serde_json::Value::Array(_)) => {
                return Err(invalid(NAME, "ranges", "ranges must not be empty"))
            }
            _ => return Err(invalid(NAME, "ranges", "missing required parameter")),
        };

        let mut ranges = Vec::with_capacity(raw.len());
        for (i, item) in raw.iter().enumerate() {
            let obj = item.as_object().ok_or_else(|| {
                invalid(NAME, "ranges", format!("range at index {} must be an object", i))
            })?;
            let start = match obj.get("start").and_then(|v| v.as_number()) {
                Some(n) => n.clone(),
                None => {
                    return Err(invalid(
                        NAME,
                        "ranges",
                        format!("range at index {} is missing a numeric 'start'", i),
                    ))
                }
            };
            let end = match obj.get("end").and_then(|v| v.as_number()) {
                Some(n) => n.clone(),
                None => {
                    return Err(invalid(
                        NAME,
                        "ranges",
                        format!("range at index {} is missing a numeric 'end'", i),
                    ))
                }
            };
            let weight = obj.get("distribution").ok_or_else(|| {
                invalid(
                    NAME,
                    "ranges",
                    format!("range at index {} is missing 'distribution'", i),
                )
            })?;
            ranges.push(WeightedRange {
                bounds: Bounds::from_numbers(NAME, &start, &end)?,
                weight: weight_value(NAME, "distribution", weight)?,
            });
        }

        let weights: Vec<i64> = ranges.iter().map(|r| r.weight).collect();
        check_weight_sum(NAME, &weights)?;

        Ok(DistributedNumberRangeStrategy {
            ranges,
            weights,
            source: SeededRng::new(seed_param(NAME, params)?),
        })
    }
}

impl Strategy for DistributedNumberRangeStrategy {
    fn data_kind(&self) -> DataKind {
        if self.ranges.iter().all(|r| r.bounds.is_integer()) {
            DataKind::Integer
        } else {
            DataKind::Float
        }
    }

    fn generate_chunk(&mut self, n: usize) -> Result<Vec<Value>> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            let idx = pick_weighted(&mut self.source.rng, &self.weights);
            out.push(self.ranges[idx].bounds.sample(&mut self.source.rng));
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
        state.insert("ranges".into(), (self.ranges.len() as u64).into());
        state
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{assert_chunk_equivalence, params};
    use super::*;
    use crate::error::RowForgeError;

    fn three_ranges(w: (i64, i64, i64)) -> serde_json::Value {
        serde_json::json!({
            "seed": 11,
            "ranges": [
                {"start": 0, "end": 9, "distribution": w.0},
                {"start": 100, "end": 109, "distribution": w.1},
                {"start": 1000, "end": 1009, "distribution": w.2},
            ]
        })
    }

    #[test]
    fn test_values_fall_in_some_range() {
        let mut s =
            DistributedNumberRangeStrategy::from_params(&params(three_ranges((60, 30, 10))))
                .unwrap();
        for v in s.generate_chunk(500).unwrap() {
            let i = v.as_int().unwrap();
            assert!(
                (0..=9).contains(&i) || (100..=109).contains(&i) || (1000..=1009).contains(&i),
                "value {} outside every range",
                i
            );
        }
    }

    #[test]
    fn test_weight_proportions_roughly_hold() {
        let mut s =
            DistributedNumberRangeStrategy::from_params(&params(three_ranges((80, 10, 10))))
                .unwrap();
        let values = s.generate_chunk(2000).unwrap();
        let low = values
            .iter()
            .filter(|v| (0..=9).contains(&v.as_int().unwrap()))
            .count();
        assert!(
            (1400..=1800).contains(&low),
            "expected ~1600 values from the 80% range, got {}",
            low
        );
    }

    #[test]
    fn test_weights_must_sum_to_100() {
        let err = DistributedNumberRangeStrategy::from_params(&params(three_ranges((30, 30, 30))))
            .unwrap_err();
        match err {
            RowForgeError::WeightSum { observed, .. } => assert_eq!(observed, 90),
            other => panic!("expected WeightSum, got {:?}", other),
        }
    }

    #[test]
    fn test_chunk_equivalence() {
        let mut s =
            DistributedNumberRangeStrategy::from_params(&params(three_ranges((50, 25, 25))))
                .unwrap();
        assert_chunk_equivalence(&mut s, 30);
    }

    #[test]
    fn test_mixed_float_range_sets_kind() {
        let p = params(serde_json::json!({
            "ranges": [
                {"start": 0, "end": 10, "distribution": 50},
                {"start": 0.5, "end": 1.5, "distribution": 50},
            ]
        }));
        let s = DistributedNumberRangeStrategy::from_params(&p).unwrap();
        assert_eq!(s.data_kind(), DataKind::Float);
    }

    #[test]
    fn test_empty_ranges_rejected() {
        let err = DistributedNumberRangeStrategy::from_params(&params(
            serde_json::json!({"ranges": []}),
        ))
        .unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let p = params(serde_json::json!({
            "ranges": [{"start": 0, "end": 1, "distribution": -5}]
        }));
        assert!(DistributedNumberRangeStrategy::from_params(&p).is_err());
    }
}
