//! Lightweight phase timing for the optional performance report.

use std::time::Instant;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PhaseTiming {
    pub name: String,
    pub millis: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
}

/// Collects named phase durations during a run. When disabled every call is
/// a near-noop, so processors can time unconditionally.
#[derive(Debug, Default)]
pub struct PerfTimer {
    enabled: bool,
    phases: Vec<PhaseTiming>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerfReport {
    pub phases: Vec<PhaseTiming>,
    pub total_millis: u128,
}

impl PerfTimer {
    pub fn new(enabled: bool) -> Self {
        PerfTimer {
            enabled,
            phases: Vec::new(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Time a closure under `name`, attributing `rows` processed rows.
    pub fn time<T>(&mut self, name: &str, rows: Option<usize>, f: impl FnOnce() -> T) -> T {
        if !self.enabled {
            return f();
        }
        let start = Instant::now();
        let out = f();
        self.phases.push(PhaseTiming {
            name: name.to_string(),
            millis: start.elapsed().as_millis(),
            rows,
        });
        out
    }

    pub fn report(&self) -> Option<PerfReport> {
        if !self.enabled {
            return None;
        }
        Some(PerfReport {
            total_millis: self.phases.iter().map(|p| p.millis).sum(),
            phases: self.phases.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_reports_nothing() {
        let mut timer = PerfTimer::new(false);
        let v = timer.time("phase", None, || 42);
        assert_eq!(v, 42);
        assert!(timer.report().is_none());
    }

    #[test]
    fn test_enabled_collects_phases() {
        let mut timer = PerfTimer::new(true);
        timer.time("generate", Some(100), || ());
        timer.time("write", Some(100), || ());
        let report = timer.report().unwrap();
        assert_eq!(report.phases.len(), 2);
        assert_eq!(report.phases[0].name, "generate");
        assert_eq!(report.phases[0].rows, Some(100));
    }
}
