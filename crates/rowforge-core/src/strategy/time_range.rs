//! Uniform times in [start_time, end_time] at second resolution. When the
//! end precedes the start the range wraps past midnight (an overnight
//! shift like 22:00–02:00).

use chrono::{NaiveTime, Timelike};
use rand::Rng;

use crate::error::{Result, RowForgeError};
use crate::table::{DataKind, Value};

use super::{opt_string_field, seed_param, string_field, ParamMap, SeededRng, StateMap, Strategy};

const NAME: &str = "TIME_RANGE_STRATEGY";
pub(crate) const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";
const DAY_SECONDS: u32 = 24 * 3600;

#[derive(Debug, Clone)]
pub(crate) struct TimeSpan {
    start_seconds: u32,
    end_seconds: u32, // may exceed DAY_SECONDS after overnight adjustment
    pub format: String,
}

impl TimeSpan {
    pub(crate) fn parse(start_time: &str, end_time: &str, format: String) -> Result<Self> {
        let start = parse_time(start_time, &format)?;
        let end = parse_time(end_time, &format)?;
        let start_seconds = start.num_seconds_from_midnight();
        let mut end_seconds = end.num_seconds_from_midnight();
        if end_seconds < start_seconds {
            end_seconds += DAY_SECONDS;
        }
        Ok(TimeSpan {
            start_seconds,
            end_seconds,
            format,
        })
    }

    pub(crate) fn sample<R: Rng>(&self, rng: &mut R) -> Value {
        let seconds = rng.random_range(self.start_seconds..=self.end_seconds) % DAY_SECONDS;
        let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
            .unwrap_or(NaiveTime::MIN);
        Value::Text(time.format(&self.format).to_string().into())
    }

    pub(crate) fn wraps_midnight(&self) -> bool {
        self.end_seconds >= DAY_SECONDS
    }
}

pub(crate) fn parse_time(value: &str, format: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, format).map_err(|_| RowForgeError::BadTemporalFormat {
        what: "time",
        value: value.to_string(),
        format: format.to_string(),
    })
}

#[derive(Debug)]
pub struct TimeRangeStrategy {
    span: TimeSpan,
    source: SeededRng,
}

impl TimeRangeStrategy {
    pub fn from_params(params: &ParamMap) -> Result<Self> {
        let start_time = string_field(NAME, params, "start_time")?;
        let end_time = string_field(NAME, params, "end_time")?;
        let format = opt_string_field(NAME, params, "format")?
            .unwrap_or_else(|| DEFAULT_TIME_FORMAT.to_string());

        Ok(TimeRangeStrategy {
            span: TimeSpan::parse(&start_time, &end_time, format)?,
            source: SeededRng::new(seed_param(NAME, params)?),
        })
    }
}

impl Strategy for TimeRangeStrategy {
    fn data_kind(&self) -> DataKind {
        DataKind::Time
    }

    fn generate_chunk(&mut self, n: usize) -> Result<Vec<Value>> {
        Ok((0..n).map(|_| self.span.sample(&mut self.source.rng)).collect())
    }

    fn reset(&mut self) {
        self.source.reset();
    }

    fn describe_state(&self) -> StateMap {
        let mut state = StateMap::new();
        state.insert("strategy".into(), NAME.into());
        state.insert("seed".into(), self.source.seed().into());
        state.insert("wraps_midnight".into(), self.span.wraps_midnight().into());
        state
    }
}
