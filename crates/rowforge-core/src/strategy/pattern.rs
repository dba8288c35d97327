//! Random strings matching a regular expression, via `rand_regex`.
//!
//! With `unique` set, generation keeps a seen-set and retries collisions up
//! to 3n attempts for a chunk of n; after that it pads by resampling
//! already-emitted uniques and surfaces a warning. The bound keeps
//! low-cardinality patterns (e.g. `[0-9]`) from livelocking the generator.

use std::collections::HashSet;

use rand::Rng;

use crate::error::{Result, RowForgeError};
use crate::table::{DataKind, Value};

use super::{invalid, seed_param, string_field, ParamMap, SeededRng, StateMap, Strategy};

const NAME: &str = "PATTERN_STRATEGY";

/// Cap on the expansion of unbounded repetitions (`*`, `+`, `{n,}`).
const MAX_REPEAT: u32 = 100;

pub struct PatternStrategy {
    pattern: String,
    dist: rand_regex::Regex,
    unique: bool,
    // Membership test plus an indexable list for padding draws.
    seen: HashSet<String>,
    seen_order: Vec<String>,
    source: SeededRng,
    warnings: Vec<RowForgeError>,
    column_hint: String,
}

impl PatternStrategy {
    pub fn from_params(params: &ParamMap, unique: bool) -> Result<Self> {
        let pattern = string_field(NAME, params, "regex")?;

        // Validate general regex syntax first for a familiar error message,
        // then build the generator, which rejects unsupported constructs
        // (anchors, backreferences).
        regex::Regex::new(&pattern)
            .map_err(|e| invalid(NAME, "regex", format!("invalid regex: {}", e)))?;
        let hir = regex_syntax::ParserBuilder::new()
            .build()
            .parse(&pattern)
            .map_err(|e| invalid(NAME, "regex", format!("invalid regex: {}", e)))?;
        let dist = rand_regex::Regex::with_hir(hir, MAX_REPEAT)
            .map_err(|e| invalid(NAME, "regex", format!("not generatable: {}", e)))?;

        Ok(PatternStrategy {
            pattern,
            dist,
            unique,
            seen: HashSet::new(),
            seen_order: Vec::new(),
            source: SeededRng::new(seed_param(NAME, params)?),
            warnings: Vec::new(),
            column_hint: String::new(),
        })
    }

    fn generate_unique(&mut self, n: usize) -> Vec<Value> {
        let max_attempts = n * 3;
        let mut attempts = 0;
        let mut out: Vec<Value> = Vec::with_capacity(n);

        while out.len() < n && attempts < max_attempts {
            attempts += 1;
            let candidate: String = self.source.rng.sample(&self.dist);
            if self.seen.insert(candidate.clone()) {
                self.seen_order.push(candidate.clone());
                out.push(Value::Text(candidate.into()));
            }
        }

        if out.len() < n {
            let padded = n - out.len();
            if self.seen_order.is_empty() {
                // Nothing to resample: fall back to non-unique values.
                for _ in 0..padded {
                    let s: String = self.source.rng.sample(&self.dist);
                    out.push(Value::Text(s.into()));
                }
            } else {
                for _ in 0..padded {
                    let idx = self.source.rng.random_range(0..self.seen_order.len());
                    out.push(Value::Text(self.seen_order[idx].clone().into()));
                }
            }
            self.warnings.push(RowForgeError::UniquePadding {
                column: self.column_hint.clone(),
                distinct: self.seen_order.len(),
                attempts: max_attempts,
                padded,
            });
        }

        out
    }
}

impl Strategy for PatternStrategy {
    fn data_kind(&self) -> DataKind {
        DataKind::Text
    }

    fn bind_column(&mut self, column: &str) {
        self.column_hint = column.to_string();
    }

    fn generate_chunk(&mut self, n: usize) -> Result<Vec<Value>> {
        if self.unique {
            return Ok(self.generate_unique(n));
        }
        Ok((0..n)
            .map(|_| {
                let s: String = self.source.rng.sample(&self.dist);
                Value::Text(s.into())
            })
            .collect())
    }

    fn reset(&mut self) {
        self.source.reset();
        self.seen.clear();
        self.seen_order.clear();
    }

    fn describe_state(&self) -> StateMap {
        let mut state = StateMap::new();
        state.insert("strategy".into(), NAME.into());
        state.insert("pattern".into(), self.pattern.clone().into());
        state.insert("seed".into(), self.source.seed().into());
        state.insert("unique".into(), self.unique.into());
        state.insert("unique_count".into(), (self.seen.len() as u64).into());
        state
    }

    fn take_warnings(&mut self) -> Vec<RowForgeError> {
        std::mem::take(&mut self.warnings)
    }
}
