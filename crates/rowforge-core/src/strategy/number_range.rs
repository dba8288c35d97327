//! Uniform numbers over [start, end]. The column is integer exactly when
//! both bounds are JSON integers; a `0.0` in either bound yields floats.

use rand::Rng;

use crate::error::Result;
use crate::table::{DataKind, Value};

use super::{invalid, number_field, seed_param, ParamMap, SeededRng, StateMap, Strategy};

const NAME: &str = "NUMBER_RANGE_STRATEGY";

#[derive(Debug, Clone, Copy)]
pub(crate) enum Bounds {
    Int { start: i64, end: i64 },
    Float { start: f64, end: f64 },
}

impl Bounds {
    /// Build bounds from two JSON numbers, enforcing start < end.
    pub(crate) fn from_numbers(
        strategy: &str,
        start: &serde_json::Number,
        end: &serde_json::Number,
    ) -> Result<Self> {
        match (start.as_i64(), end.as_i64()) {
            (Some(s), Some(e)) => {
                if s >= e {
                    return Err(invalid(
                        strategy,
                        "start",
                        format!("start ({}) must be less than end ({})", s, e),
                    ));
                }
                Ok(Bounds::Int { start: s, end: e })
            }
            _ => {
                let s = start
                    .as_f64()
                    .ok_or_else(|| invalid(strategy, "start", "must be numeric"))?;
                let e = end
                    .as_f64()
                    .ok_or_else(|| invalid(strategy, "end", "must be numeric"))?;
                if s >= e {
                    return Err(invalid(
                        strategy,
                        "start",
                        format!("start ({}) must be less than end ({})", s, e),
                    ));
                }
                Ok(Bounds::Float { start: s, end: e })
            }
        }
    }

    pub(crate) fn is_integer(&self) -> bool {
        matches!(self, Bounds::Int { .. })
    }

    pub(crate) fn sample<R: Rng>(&self, rng: &mut R) -> Value {
        match *self {
            Bounds::Int { start, end } => Value::Int(rng.random_range(start..=end)),
            Bounds::Float { start, end } => Value::Float(rng.random_range(start..=end)),
        }
    }
}

#[derive(Debug)]
pub struct NumberRangeStrategy {
    bounds: Bounds,
    source: SeededRng,
}

impl NumberRangeStrategy {
    pub fn from_params(params: &ParamMap) -> Result<Self> {
        let start = number_field(NAME, params, "start")?;
        let end = number_field(NAME, params, "end")?;
        let bounds = Bounds::from_numbers(NAME, &start, &end)?;
        Ok(NumberRangeStrategy {
            bounds,
            source: SeededRng::new(seed_param(NAME, params)?),
        })
    }
}

impl Strategy for NumberRangeStrategy {
    fn data_kind(&self) -> DataKind {
        if self.bounds.is_integer() {
            DataKind::Integer
        } else {
            DataKind::Float
        }
    }

    fn generate_chunk(&mut self, n: usize) -> Result<Vec<Value>> {
        Ok((0..n).map(|_| self.bounds.sample(&mut self.source.rng)).collect())
    }

    fn reset(&mut self) {
        self.source.reset();
    }

    fn describe_state(&self) -> StateMap {
        let mut state = StateMap::new();
        state.insert("strategy".into(), NAME.into());
        state.insert("seed".into(), self.source.seed().into());
        state.insert("integer".into(), self.bounds.is_integer().into());
        state
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{assert_chunk_equivalence, params};
    use super::*;

    #[test]
    fn test_integer_bounds_give_integers() {
        let mut s = NumberRangeStrategy::from_params(&params(
            serde_json::json!({"start": 0, "end": 10, "seed": 42}),
        ))
        .unwrap();
        assert_eq!(s.data_kind(), DataKind::Integer);
        for v in s.generate_chunk(100).unwrap() {
            let i = v.as_int().expect("integer value");
            assert!((0..=10).contains(&i));
        }
    }

    #[test]
    fn test_float_bound_gives_floats() {
        let mut s = NumberRangeStrategy::from_params(&params(
            serde_json::json!({"start": 0.0, "end": 10, "seed": 42}),
        ))
        .unwrap();
        assert_eq!(s.data_kind(), DataKind::Float);
        for v in s.generate_chunk(50).unwrap() {
            let f = v.as_f64().expect("float value");
            assert!((0.0..=10.0).contains(&f));
            assert!(matches!(v, Value::Float(_)));
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let p = params(serde_json::json!({"start": 0, "end": 1000, "seed": 42}));
        let mut a = NumberRangeStrategy::from_params(&p).unwrap();
        let mut b = NumberRangeStrategy::from_params(&p).unwrap();
        assert_eq!(a.generate_chunk(20).unwrap(), b.generate_chunk(20).unwrap());
    }

    #[test]
    fn test_chunk_equivalence() {
        let mut s = NumberRangeStrategy::from_params(&params(
            serde_json::json!({"start": -50, "end": 50, "seed": 7}),
        ))
        .unwrap();
        assert_chunk_equivalence(&mut s, 24);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = NumberRangeStrategy::from_params(&params(
            serde_json::json!({"start": 10, "end": 5}),
        ))
        .unwrap_err();
        assert!(err.to_string().contains("less than"));
    }

    #[test]
    fn test_missing_bound_rejected() {
        assert!(
            NumberRangeStrategy::from_params(&params(serde_json::json!({"start": 1}))).is_err()
        );
    }
}
