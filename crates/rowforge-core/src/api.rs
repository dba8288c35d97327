//! # Public API Facade
//!
//! The entry points external layers (HTTP, CLI) build on. Each is a thin
//! wrapper so that a subcommand or route handler stays at 1–3 lines.

use indexmap::IndexMap;

use crate::config::{GeneratorConfig, ValidationIssue};
use crate::orchestrator::{ModeHints, Orchestrator, RunSummary};
use crate::strategy::registry::{self, ParamSchema};

/// Names of every available strategy.
pub fn list_strategies() -> Vec<&'static str> {
    registry::list_names()
}

/// Parameter schemas for every strategy, keyed by name.
pub fn describe_strategies() -> IndexMap<&'static str, &'static ParamSchema> {
    registry::describe_all()
        .into_iter()
        .map(|schema| (schema.name, schema))
        .collect()
}

/// Validate a configuration without running it. Empty means valid.
pub fn validate_config(config: &GeneratorConfig) -> Vec<ValidationIssue> {
    config.validate()
}

/// Run a configuration to completion under the given mode hints.
pub fn run(config: GeneratorConfig, hints: ModeHints, perf_report: bool) -> RunSummary {
    Orchestrator::new(config, hints, perf_report).run()
}
