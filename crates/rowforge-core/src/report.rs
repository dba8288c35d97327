//! # Run-level Error Collection
//!
//! The collector accumulates every error a run produces, logs each at the
//! tracing level matching its severity, and renders a severity-grouped
//! report at the end. A structured JSON report file is exported when a
//! CRITICAL error occurred or the ERROR count exceeds a threshold.
//!
//! Processing policy: WARNING and below never affect the run; ERROR fails
//! the run's overall status but lets it continue; CRITICAL halts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{Result, RowForgeError, Severity};

/// Context bag attached to each recorded error.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ErrorContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ErrorContext {
    pub fn column(column: &str) -> Self {
        ErrorContext {
            column: Some(column.to_string()),
            ..Default::default()
        }
    }

    pub fn strategy(strategy: &str, column: &str) -> Self {
        ErrorContext {
            strategy: Some(strategy.to_string()),
            column: Some(column.to_string()),
            ..Default::default()
        }
    }

    pub fn config_path(path: &str) -> Self {
        ErrorContext {
            config_path: Some(path.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordedError {
    pub code: &'static str,
    pub message: String,
    pub severity: Severity,
    pub category: crate::error::Category,
    pub timestamp: String,
    pub context: ErrorContext,
}

/// Per-severity counts, included in the run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ErrorSummary {
    pub info: usize,
    pub warning: usize,
    pub error: usize,
    pub critical: usize,
}

impl ErrorSummary {
    pub fn total(&self) -> usize {
        self.info + self.warning + self.error + self.critical
    }
}

/// How many ERRORs trigger the structured report export.
const EXPORT_ERROR_THRESHOLD: usize = 5;

#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<RecordedError>,
    /// Where the structured report lands; `None` disables export.
    export_dir: Option<PathBuf>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        ErrorCollector {
            errors: Vec::new(),
            export_dir: Some(PathBuf::from("./output")),
        }
    }

    pub fn with_export_dir(dir: Option<PathBuf>) -> Self {
        ErrorCollector {
            errors: Vec::new(),
            export_dir: dir,
        }
    }

    /// Record an error with context, logging it at the matching level.
    pub fn record(&mut self, err: &RowForgeError, context: ErrorContext) {
        let severity = err.severity();
        let message = err.to_string();
        match severity {
            Severity::Critical => error!("[{}] CRITICAL: {}", err.code(), message),
            Severity::Error => error!("[{}] {}", err.code(), message),
            Severity::Warning => warn!("[{}] {}", err.code(), message),
            Severity::Info => info!("[{}] {}", err.code(), message),
        }

        self.errors.push(RecordedError {
            code: err.code(),
            message,
            severity,
            category: err.category(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            context,
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_critical(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.severity == Severity::Critical)
    }

    /// ERROR or CRITICAL present: the run's overall status is failed.
    pub fn has_failures(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.severity >= Severity::Error)
    }

    pub fn should_continue(&self) -> bool {
        !self.has_critical()
    }

    pub fn errors(&self) -> &[RecordedError] {
        &self.errors
    }

    pub fn summary(&self) -> ErrorSummary {
        let mut summary = ErrorSummary::default();
        for e in &self.errors {
            match e.severity {
                Severity::Info => summary.info += 1,
                Severity::Warning => summary.warning += 1,
                Severity::Error => summary.error += 1,
                Severity::Critical => summary.critical += 1,
            }
        }
        summary
    }

    /// Emit the severity-grouped report via tracing and export the
    /// structured file when warranted. Returns the export path, if written.
    pub fn generate_report(&self) -> Option<PathBuf> {
        if self.errors.is_empty() {
            return None;
        }

        let summary = self.summary();
        error!("=== ERROR REPORT ===");
        error!("Total: {}", summary.total());
        let mut grouped: BTreeMap<Severity, Vec<&RecordedError>> = BTreeMap::new();
        for e in &self.errors {
            grouped.entry(e.severity).or_default().push(e);
        }
        for (severity, entries) in grouped.iter().rev() {
            error!("{}: {}", severity, entries.len());
            for e in entries {
                match (&e.context.strategy, &e.context.column) {
                    (Some(s), Some(c)) => error!("  [{}] {} (strategy {}, column {})", e.code, e.message, s, c),
                    (None, Some(c)) => error!("  [{}] {} (column {})", e.code, e.message, c),
                    _ => error!("  [{}] {}", e.code, e.message),
                }
            }
        }

        if self.has_critical() || summary.error > EXPORT_ERROR_THRESHOLD {
            match self.export_report() {
                Ok(Some(path)) => {
                    info!("Detailed error report exported to {}", path.display());
                    return Some(path);
                }
                Ok(None) => {}
                Err(e) => error!("Failed to export error report: {}", e),
            }
        }
        None
    }

    /// Write the structured JSON report. Creates the export directory.
    pub fn export_report(&self) -> Result<Option<PathBuf>> {
        let Some(dir) = &self.export_dir else {
            return Ok(None);
        };
        std::fs::create_dir_all(dir).map_err(|e| RowForgeError::Io {
            action: format!("creating report directory {}", dir.display()),
            source: e,
        })?;

        let path = dir.join(format!(
            "error_report_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        ));
        let body = serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "summary": self.summary(),
            "total_errors": self.errors.len(),
            "has_critical_errors": self.has_critical(),
            "errors": self.errors,
        });
        write_json_file(&path, &body)?;
        Ok(Some(path))
    }
}

fn write_json_file(path: &Path, body: &serde_json::Value) -> Result<()> {
    let rendered = serde_json::to_string_pretty(body).map_err(|e| RowForgeError::Other(
        format!("serializing error report: {}", e),
    ))?;
    std::fs::write(path, rendered).map_err(|e| RowForgeError::Io {
        action: format!("writing error report {}", path.display()),
        source: e,
    })
}
