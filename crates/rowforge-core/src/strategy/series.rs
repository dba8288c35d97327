//! Arithmetic progressions: start, start+step, start+2*step, …

use crate::error::Result;
use crate::table::{DataKind, Value};

use super::{invalid, number_field, ParamMap, StateMap, Strategy};

const NAME: &str = "SERIES_STRATEGY";

/// Fixed-point scale used for non-integer progressions. Computing in scaled
/// integers keeps long runs drift-free; the emitted value is the nearest
/// float.
const MICROS: i128 = 1_000_000;

#[derive(Debug)]
enum Progression {
    Int { start: i64, step: i64 },
    Fixed { start_micros: i128, step_micros: i128 },
}

#[derive(Debug)]
pub struct SeriesStrategy {
    progression: Progression,
    index: u64,
}

impl SeriesStrategy {
    pub fn from_params(params: &ParamMap) -> Result<Self> {
        let start = number_field(NAME, params, "start")?;
        let step = match params.get("step") {
            None => None,
            Some(serde_json::Value::Number(n)) => Some(n.clone()),
            Some(other) => {
                return Err(invalid(
                    NAME,
                    "step",
                    format!("step must be numeric, got {}", other),
                ))
            }
        };

        let progression = match (start.as_i64(), step.as_ref().map(|s| s.as_i64())) {
            (Some(start), None) => Progression::Int { start, step: 1 },
            (Some(start), Some(Some(step))) => Progression::Int { start, step },
            _ => {
                let start = start
                    .as_f64()
                    .ok_or_else(|| invalid(NAME, "start", "start must be numeric"))?;
                let step = match step {
                    None => 0.1,
                    Some(n) => n
                        .as_f64()
                        .ok_or_else(|| invalid(NAME, "step", "step must be numeric"))?,
                };
                Progression::Fixed {
                    start_micros: to_micros(start),
                    step_micros: to_micros(step),
                }
            }
        };

        Ok(SeriesStrategy {
            progression,
            index: 0,
        })
    }
}

fn to_micros(x: f64) -> i128 {
    (x * MICROS as f64).round() as i128
}

impl Strategy for SeriesStrategy {
    fn data_kind(&self) -> DataKind {
        match self.progression {
            Progression::Int { .. } => DataKind::Integer,
            Progression::Fixed { .. } => DataKind::Float,
        }
    }

    fn generate_chunk(&mut self, n: usize) -> Result<Vec<Value>> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            let i = self.index as i128;
            let value = match self.progression {
                Progression::Int { start, step } => {
                    Value::Int((start as i128 + i * step as i128) as i64)
                }
                Progression::Fixed {
                    start_micros,
                    step_micros,
                } => Value::Float((start_micros + i * step_micros) as f64 / MICROS as f64),
            };
            out.push(value);
            self.index += 1;
        }
        Ok(out)
    }

    fn reset(&mut self) {
        self.index = 0;
    }

    fn describe_state(&self) -> StateMap {
        let mut state = StateMap::new();
        state.insert("strategy".into(), NAME.into());
        state.insert("index".into(), self.index.into());
        match self.progression {
            Progression::Int { start, step } => {
                state.insert("start".into(), start.into());
                state.insert("step".into(), step.into());
            }
            Progression::Fixed {
                start_micros,
                step_micros,
            } => {
                state.insert(
                    "start".into(),
                    (start_micros as f64 / MICROS as f64).into(),
                );
                state.insert("step".into(), (step_micros as f64 / MICROS as f64).into());
            }
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{assert_chunk_equivalence, params};
    use super::*;

    #[test]
    fn test_integer_series() {
        let mut s =
            SeriesStrategy::from_params(&params(serde_json::json!({"start": 10, "step": 2})))
                .unwrap();
        let values = s.generate_chunk(5).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Int(10),
                Value::Int(12),
                Value::Int(14),
                Value::Int(16),
                Value::Int(18)
            ]
        );
        assert_eq!(s.data_kind(), DataKind::Integer);
    }

    #[test]
    fn test_step_defaults_to_one() {
        let mut s = SeriesStrategy::from_params(&params(serde_json::json!({"start": 1}))).unwrap();
        assert_eq!(
            s.generate_chunk(3).unwrap(),
            vec![Value::Int(1), Value::Int(2), Value::Int(3)]
        );
    }

    #[test]
    fn test_float_series_no_drift() {
        let mut s =
            SeriesStrategy::from_params(&params(serde_json::json!({"start": 0.1, "step": 0.1})))
                .unwrap();
        let values = s.generate_chunk(1000).unwrap();
        // 0.1 + 999 * 0.1 computed in floats would accumulate error;
        // fixed-point arithmetic keeps it exact.
        assert_eq!(values[999], Value::Float(100.0));
        assert_eq!(s.data_kind(), DataKind::Float);
    }

    #[test]
    fn test_negative_step() {
        let mut s =
            SeriesStrategy::from_params(&params(serde_json::json!({"start": 0, "step": -3})))
                .unwrap();
        assert_eq!(
            s.generate_chunk(3).unwrap(),
            vec![Value::Int(0), Value::Int(-3), Value::Int(-6)]
        );
    }

    #[test]
    fn test_reset_restarts() {
        let mut s =
            SeriesStrategy::from_params(&params(serde_json::json!({"start": 5, "step": 5})))
                .unwrap();
        let first = s.generate_chunk(4).unwrap();
        s.reset();
        let second = s.generate_chunk(4).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_chunk_equivalence() {
        let mut s =
            SeriesStrategy::from_params(&params(serde_json::json!({"start": 7, "step": 3})))
                .unwrap();
        assert_chunk_equivalence(&mut s, 20);

        let mut s =
            SeriesStrategy::from_params(&params(serde_json::json!({"start": 0.5, "step": 0.25})))
                .unwrap();
        assert_chunk_equivalence(&mut s, 20);
    }

    #[test]
    fn test_missing_start_rejected() {
        assert!(SeriesStrategy::from_params(&params(serde_json::json!({}))).is_err());
    }

    #[test]
    fn test_non_numeric_step_rejected() {
        let err = SeriesStrategy::from_params(&params(
            serde_json::json!({"start": 1, "step": "fast"}),
        ))
        .unwrap_err();
        assert!(err.to_string().contains("step"));
    }
}
