//! # Strategy Engine
//!
//! A strategy is a stateful value generator bound to one column. One instance
//! is created per target column at the start of a run and reused across
//! chunks, so stateful progressions (series counters, RNG streams, unique
//! sets) continue correctly in streaming and batch modes.
//!
//! Every strategy obeys the chunk-equivalence law: after `reset()`, any
//! partition of N rows into `generate_chunk` calls concatenates to the same
//! sequence as one `generate_chunk(N)`. This is what makes streaming output
//! bit-identical to single-shot output.

pub mod concat;
pub mod date_generator;
pub mod delete;
pub mod distributed_choice;
pub mod distributed_date_range;
pub mod distributed_number_range;
pub mod distributed_time_range;
pub mod number_range;
pub mod pattern;
pub mod random_name;
pub mod registry;
pub mod replacement;
pub mod series;
pub mod time_range;

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, RowForgeError};
use crate::table::{DataKind, Table, Value};

/// Raw strategy parameters as parsed from the configuration document.
pub type ParamMap = serde_json::Map<String, serde_json::Value>;

/// Debug snapshot of a strategy's internal state.
pub type StateMap = BTreeMap<String, serde_json::Value>;

/// The capability set every strategy variant implements.
///
/// `generate_chunk` is the stateful producer; `transform` exists for the
/// strategies that read other columns (Concat, Replacement) — its default
/// body ignores the table and delegates. Strategies never write the table
/// themselves; the processor owns all column mutation.
pub trait Strategy: Send {
    /// Logical type of the produced values. `DataKind::Null` means
    /// "preserve whatever type the column already has" (Delete, Replacement).
    fn data_kind(&self) -> DataKind;

    /// Produce exactly `n` values, advancing internal state.
    fn generate_chunk(&mut self, n: usize) -> Result<Vec<Value>>;

    /// Produce one value per entry of `rows`, with read access to the
    /// current table. `target` is the column being populated.
    fn transform(&mut self, table: &Table, target: &str, rows: &[usize]) -> Result<Vec<Value>> {
        let _ = (table, target);
        self.generate_chunk(rows.len())
    }

    /// Tell the strategy which column it populates, for warning context.
    /// Called once by the processor before the first application.
    fn bind_column(&mut self, column: &str) {
        let _ = column;
    }

    /// Restore the initial, seed-determined state.
    fn reset(&mut self);

    /// State snapshot for debugging and tests.
    fn describe_state(&self) -> StateMap;

    /// Drain warnings accumulated during generation (e.g. unique-pattern
    /// padding). The processor records them after each application.
    fn take_warnings(&mut self) -> Vec<RowForgeError> {
        Vec::new()
    }
}

/// A deterministic random source with a remembered seed.
///
/// When the configuration provides no seed, one is drawn from process
/// entropy at instantiation and kept, so `reset()` still replays the exact
/// same sequence within the run.
#[derive(Debug)]
pub struct SeededRng {
    seed: u64,
    pub rng: StdRng,
}

impl SeededRng {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        SeededRng {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }
}

/// Cumulative-weight selection: returns the index of the picked weight.
///
/// Drawing one index per value keeps chunked generation prefix-stable while
/// the per-chunk counts still follow the multinomial distribution over the
/// normalized weights.
pub(crate) fn pick_weighted<R: Rng>(rng: &mut R, weights: &[i64]) -> usize {
    let total: i64 = weights.iter().sum();
    debug_assert!(total > 0);
    let roll = rng.random_range(0..total);
    let mut cumulative = 0;
    for (i, w) in weights.iter().enumerate() {
        cumulative += w;
        if roll < cumulative {
            return i;
        }
    }
    weights.len() - 1
}

/// Validate that integer weights sum to exactly 100, reporting the observed
/// sum otherwise.
pub(crate) fn check_weight_sum(strategy: &str, weights: &[i64]) -> Result<()> {
    let observed: i64 = weights.iter().sum();
    if observed != 100 {
        return Err(RowForgeError::WeightSum {
            strategy: strategy.to_string(),
            observed,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Parameter extraction helpers
// ---------------------------------------------------------------------------

pub(crate) fn invalid(strategy: &str, field: &str, reason: impl Into<String>) -> RowForgeError {
    RowForgeError::InvalidParam {
        strategy: strategy.to_string(),
        field: field.to_string(),
        reason: reason.into(),
    }
}

pub(crate) fn require<'a>(
    strategy: &str,
    params: &'a ParamMap,
    field: &str,
) -> Result<&'a serde_json::Value> {
    params
        .get(field)
        .ok_or_else(|| invalid(strategy, field, "missing required parameter"))
}

pub(crate) fn number_field(
    strategy: &str,
    params: &ParamMap,
    field: &str,
) -> Result<serde_json::Number> {
    match require(strategy, params, field)? {
        serde_json::Value::Number(n) => Ok(n.clone()),
        other => Err(invalid(
            strategy,
            field,
            format!("expected a number, got {}", other),
        )),
    }
}

pub(crate) fn string_field(strategy: &str, params: &ParamMap, field: &str) -> Result<String> {
    match require(strategy, params, field)? {
        serde_json::Value::String(s) => Ok(s.clone()),
        other => Err(invalid(
            strategy,
            field,
            format!("expected a string, got {}", other),
        )),
    }
}

pub(crate) fn opt_string_field(
    strategy: &str,
    params: &ParamMap,
    field: &str,
) -> Result<Option<String>> {
    match params.get(field) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(invalid(
            strategy,
            field,
            format!("expected a string, got {}", other),
        )),
    }
}

/// Optional deterministic seed; any JSON integer is accepted.
pub(crate) fn seed_param(strategy: &str, params: &ParamMap) -> Result<Option<u64>> {
    match params.get("seed") {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i as u64))
            .map(Some)
            .ok_or_else(|| invalid(strategy, "seed", "seed must be an integer")),
        Some(other) => Err(invalid(
            strategy,
            "seed",
            format!("seed must be an integer, got {}", other),
        )),
    }
}

/// An integer weight in (0, 100].
pub(crate) fn weight_value(strategy: &str, field: &str, v: &serde_json::Value) -> Result<i64> {
    let w = v
        .as_i64()
        .ok_or_else(|| invalid(strategy, field, format!("weight must be an integer, got {}", v)))?;
    if w <= 0 {
        return Err(invalid(
            strategy,
            field,
            format!("weight must be positive, got {}", w),
        ));
    }
    Ok(w)
}
