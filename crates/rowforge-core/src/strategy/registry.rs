//! # Strategy Registry
//!
//! A process-wide static table mapping each strategy name to its
//! constructor and parameter schema descriptor. Built at compile time —
//! there is no runtime plugin discovery; the strategy set is closed.
//! The table is read-only and safe for concurrent reads.

use serde::Serialize;

use crate::error::{Result, RowForgeError};

use super::concat::ConcatStrategy;
use super::date_generator::DateGeneratorStrategy;
use super::delete::DeleteStrategy;
use super::distributed_choice::DistributedChoiceStrategy;
use super::distributed_date_range::DistributedDateRangeStrategy;
use super::distributed_number_range::DistributedNumberRangeStrategy;
use super::distributed_time_range::DistributedTimeRangeStrategy;
use super::number_range::NumberRangeStrategy;
use super::pattern::PatternStrategy;
use super::random_name::RandomNameStrategy;
use super::replacement::ReplacementStrategy;
use super::series::SeriesStrategy;
use super::time_range::TimeRangeStrategy;
use super::{ParamMap, Strategy};

/// One declared parameter in a strategy's schema.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParamField {
    pub name: &'static str,
    pub kind: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// Machine-readable parameter schema, served by `describe_strategies()`
/// for external API discovery.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParamSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: &'static [ParamField],
    /// Whether the `unique` flag changes behavior for this strategy.
    pub supports_unique: bool,
    /// Whether the strategy reads previously generated columns.
    pub reads_columns: bool,
}

type BuildFn = fn(&ParamMap, bool) -> Result<Box<dyn Strategy>>;

struct StrategyEntry {
    schema: ParamSchema,
    build: BuildFn,
}

const fn field(
    name: &'static str,
    kind: &'static str,
    required: bool,
    description: &'static str,
) -> ParamField {
    ParamField {
        name,
        kind,
        required,
        description,
    }
}

static REGISTRY: &[StrategyEntry] = &[
    StrategyEntry {
        schema: ParamSchema {
            name: "NUMBER_RANGE_STRATEGY",
            description: "Uniform numbers in [start, end]; integer iff both bounds are integers",
            fields: &[
                field("start", "number", true, "inclusive lower bound"),
                field("end", "number", true, "inclusive upper bound"),
                field("seed", "integer", false, "deterministic seed"),
            ],
            supports_unique: false,
            reads_columns: false,
        },
        build: |params, _| Ok(Box::new(NumberRangeStrategy::from_params(params)?)),
    },
    StrategyEntry {
        schema: ParamSchema {
            name: "DISTRIBUTED_NUMBER_RANGE_STRATEGY",
            description: "Numbers from a weighted union of sub-ranges; weights sum to 100",
            fields: &[
                field(
                    "ranges",
                    "array",
                    true,
                    "list of {start, end, distribution}",
                ),
                field("seed", "integer", false, "deterministic seed"),
            ],
            supports_unique: false,
            reads_columns: false,
        },
        build: |params, _| {
            Ok(Box::new(DistributedNumberRangeStrategy::from_params(
                params,
            )?))
        },
    },
    StrategyEntry {
        schema: ParamSchema {
            name: "SERIES_STRATEGY",
            description: "Arithmetic progression start, start+step, …",
            fields: &[
                field("start", "number", true, "first value"),
                field("step", "number", false, "increment (default 1, or 0.1 for floats)"),
            ],
            supports_unique: false,
            reads_columns: false,
        },
        build: |params, _| Ok(Box::new(SeriesStrategy::from_params(params)?)),
    },
    StrategyEntry {
        schema: ParamSchema {
            name: "DATE_GENERATOR_STRATEGY",
            description: "Uniform dates in [start_date, end_date] at day resolution",
            fields: &[
                field("start_date", "string", true, "range start"),
                field("end_date", "string", true, "range end"),
                field("format", "string", false, "parse format (default %Y-%m-%d)"),
                field(
                    "output_format",
                    "string",
                    false,
                    "emission format (default %Y-%m-%d)",
                ),
                field("seed", "integer", false, "deterministic seed"),
            ],
            supports_unique: false,
            reads_columns: false,
        },
        build: |params, _| Ok(Box::new(DateGeneratorStrategy::from_params(params)?)),
    },
    StrategyEntry {
        schema: ParamSchema {
            name: "DISTRIBUTED_DATE_RANGE_STRATEGY",
            description: "Dates from a weighted union of date ranges; weights sum to 100",
            fields: &[
                field(
                    "ranges",
                    "array",
                    true,
                    "list of {start_date, end_date, format?, output_format?, distribution}",
                ),
                field("seed", "integer", false, "deterministic seed"),
            ],
            supports_unique: false,
            reads_columns: false,
        },
        build: |params, _| {
            Ok(Box::new(DistributedDateRangeStrategy::from_params(params)?))
        },
    },
    StrategyEntry {
        schema: ParamSchema {
            name: "TIME_RANGE_STRATEGY",
            description: "Uniform times in [start_time, end_time]; wraps past midnight when end < start",
            fields: &[
                field("start_time", "string", true, "range start"),
                field("end_time", "string", true, "range end"),
                field("format", "string", false, "time format (default %H:%M:%S)"),
                field("seed", "integer", false, "deterministic seed"),
            ],
            supports_unique: false,
            reads_columns: false,
        },
        build: |params, _| Ok(Box::new(TimeRangeStrategy::from_params(params)?)),
    },
    StrategyEntry {
        schema: ParamSchema {
            name: "DISTRIBUTED_TIME_RANGE_STRATEGY",
            description: "Times from a weighted union of time ranges; weights sum to 100",
            fields: &[
                field(
                    "ranges",
                    "array",
                    true,
                    "list of {start, end, format?, distribution}",
                ),
                field("seed", "integer", false, "deterministic seed"),
            ],
            supports_unique: false,
            reads_columns: false,
        },
        build: |params, _| {
            Ok(Box::new(DistributedTimeRangeStrategy::from_params(params)?))
        },
    },
    StrategyEntry {
        schema: ParamSchema {
            name: "PATTERN_STRATEGY",
            description: "Random strings matching a regex; `unique` enforces distinct values",
            fields: &[
                field("regex", "string", true, "generating regular expression"),
                field("seed", "integer", false, "deterministic seed"),
            ],
            supports_unique: true,
            reads_columns: false,
        },
        build: |params, unique| Ok(Box::new(PatternStrategy::from_params(params, unique)?)),
    },
    StrategyEntry {
        schema: ParamSchema {
            name: "DISTRIBUTED_CHOICE_STRATEGY",
            description: "Categorical values with integer weights summing to 100",
            fields: &[
                field("choices", "object", true, "map of value to weight"),
                field("seed", "integer", false, "deterministic seed"),
            ],
            supports_unique: false,
            reads_columns: false,
        },
        build: |params, _| Ok(Box::new(DistributedChoiceStrategy::from_params(params)?)),
    },
    StrategyEntry {
        schema: ParamSchema {
            name: "RANDOM_NAME_STRATEGY",
            description: "Person names from bundled lists; first/last/full, gender and case options",
            fields: &[
                field("name_type", "string", false, "first | last | full (default first)"),
                field("gender", "string", false, "any | male | female (default any)"),
                field("case", "string", false, "title | upper | lower (default title)"),
                field("seed", "integer", false, "deterministic seed"),
            ],
            supports_unique: false,
            reads_columns: false,
        },
        build: |params, _| Ok(Box::new(RandomNameStrategy::from_params(params)?)),
    },
    StrategyEntry {
        schema: ParamSchema {
            name: "REPLACEMENT_STRATEGY",
            description: "Replaces occurrences of from_value by to_value in the target column",
            fields: &[
                field("from_value", "any", true, "value to replace"),
                field("to_value", "any", true, "replacement value"),
            ],
            supports_unique: false,
            reads_columns: true,
        },
        build: |params, _| Ok(Box::new(ReplacementStrategy::from_params(params)?)),
    },
    StrategyEntry {
        schema: ParamSchema {
            name: "CONCAT_STRATEGY",
            description: "prefix + lhs_col + separator + rhs_col + suffix, row-wise",
            fields: &[
                field("lhs_col", "string", true, "left column name"),
                field("rhs_col", "string", true, "right column name"),
                field("prefix", "string", false, "leading literal"),
                field("separator", "string", false, "separator literal"),
                field("suffix", "string", false, "trailing literal"),
            ],
            supports_unique: false,
            reads_columns: true,
        },
        build: |params, _| Ok(Box::new(ConcatStrategy::from_params(params)?)),
    },
    StrategyEntry {
        schema: ParamSchema {
            name: "DELETE_STRATEGY",
            description: "Yields null for every row the mask matches",
            fields: &[],
            supports_unique: false,
            reads_columns: false,
        },
        build: |_, _| Ok(Box::new(DeleteStrategy::new())),
    },
];

fn entry(name: &str) -> Result<&'static StrategyEntry> {
    REGISTRY
        .iter()
        .find(|e| e.schema.name == name)
        .ok_or_else(|| RowForgeError::UnsupportedStrategy {
            name: name.to_string(),
        })
}

/// Look up, validate parameters, and instantiate a strategy.
pub fn create(name: &str, params: &ParamMap, unique: bool) -> Result<Box<dyn Strategy>> {
    let entry = entry(name)?;
    (entry.build)(params, unique)
}

/// Schema-driven parameter validation without keeping the instance.
pub fn validate(name: &str, params: &ParamMap) -> Result<()> {
    create(name, params, false).map(|_| ())
}

/// All registered strategy names, in registration order.
pub fn list_names() -> Vec<&'static str> {
    REGISTRY.iter().map(|e| e.schema.name).collect()
}

pub fn describe(name: &str) -> Result<&'static ParamSchema> {
    entry(name).map(|e| &e.schema)
}

pub fn describe_all() -> Vec<&'static ParamSchema> {
    REGISTRY.iter().map(|e| &e.schema).collect()
}

/// Columns a strategy's parameters reference in earlier config entries.
/// Used by the forward-reference validation.
pub fn referenced_columns(name: &str, params: &ParamMap) -> Vec<String> {
    match name {
        "CONCAT_STRATEGY" => ConcatStrategy::referenced_columns(params),
        _ => Vec::new(),
    }
}

/// Whether the strategy rewrites its own target column (Replacement), which
/// requires the target to have been produced by an earlier entry.
pub fn rewrites_target(name: &str) -> bool {
    name == "REPLACEMENT_STRATEGY"
}

#[cfg(test)]
mod tests {
    use super::super::test_support::params;
    use super::*;

    #[test]
    fn test_all_strategies_registered() {
        let names = list_names();
        assert_eq!(names.len(), 13);
        for expected in [
            "NUMBER_RANGE_STRATEGY",
            "DISTRIBUTED_NUMBER_RANGE_STRATEGY",
            "SERIES_STRATEGY",
            "DATE_GENERATOR_STRATEGY",
            "DISTRIBUTED_DATE_RANGE_STRATEGY",
            "TIME_RANGE_STRATEGY",
            "DISTRIBUTED_TIME_RANGE_STRATEGY",
            "PATTERN_STRATEGY",
            "DISTRIBUTED_CHOICE_STRATEGY",
            "RANDOM_NAME_STRATEGY",
            "REPLACEMENT_STRATEGY",
            "CONCAT_STRATEGY",
            "DELETE_STRATEGY",
        ] {
            assert!(names.contains(&expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_create_unknown_is_unsupported() {
        let err = match create("MAGIC_STRATEGY", &params(serde_json::json!({})), false) {
            Err(e) => e,
            Ok(_) => panic!("expected error"),
        };
        assert!(matches!(err, RowForgeError::UnsupportedStrategy { .. }));
        assert!(err.is_critical());
    }

    #[test]
    fn test_create_validates_params() {
        // Missing required `start`
        let err = match create("SERIES_STRATEGY", &params(serde_json::json!({})), false) {
            Err(e) => e,
            Ok(_) => panic!("expected error"),
        };
        assert!(matches!(err, RowForgeError::InvalidParam { .. }));
    }

    #[test]
    fn test_create_returns_working_strategy() {
        let mut s = create(
            "SERIES_STRATEGY",
            &params(serde_json::json!({"start": 1, "step": 1})),
            false,
        )
        .unwrap();
        assert_eq!(s.generate_chunk(2).unwrap().len(), 2);
    }

    #[test]
    fn test_describe_known_and_unknown() {
        let schema = describe("PATTERN_STRATEGY").unwrap();
        assert!(schema.supports_unique);
        assert!(describe("NOPE").is_err());
    }

    #[test]
    fn test_describe_all_serializes() {
        let schemas = describe_all();
        let json = serde_json::to_value(&schemas).unwrap();
        assert!(json.as_array().unwrap().len() == 13);
    }

    #[test]
    fn test_referenced_columns() {
        let p = params(serde_json::json!({"lhs_col": "a", "rhs_col": "b"}));
        assert_eq!(referenced_columns("CONCAT_STRATEGY", &p), vec!["a", "b"]);
        assert!(referenced_columns("SERIES_STRATEGY", &p).is_empty());
    }
}
