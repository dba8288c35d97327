//! Uniform dates in [start_date, end_date] at day resolution, emitted as
//! strings in `output_format` (chrono strftime syntax).

use chrono::{Duration, NaiveDate};
use rand::Rng;

use crate::error::{Result, RowForgeError};
use crate::table::{DataKind, Value};

use super::{opt_string_field, seed_param, string_field, ParamMap, SeededRng, StateMap, Strategy};

const NAME: &str = "DATE_GENERATOR_STRATEGY";
pub(crate) const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub(crate) struct DateSpan {
    pub start: NaiveDate,
    pub span_days: i64,
    pub output_format: String,
}

impl DateSpan {
    pub(crate) fn parse(
        strategy: &str,
        start_date: &str,
        end_date: &str,
        format: &str,
        output_format: String,
    ) -> Result<Self> {
        let start = parse_date(start_date, format)?;
        let end = parse_date(end_date, format)?;
        if start >= end {
            return Err(super::invalid(
                strategy,
                "start_date",
                format!("start_date ({}) must be before end_date ({})", start_date, end_date),
            ));
        }
        Ok(DateSpan {
            start,
            span_days: (end - start).num_days(),
            output_format,
        })
    }

    /// Uniform over the span, both endpoints included.
    pub(crate) fn sample<R: Rng>(&self, rng: &mut R) -> Value {
        let offset = rng.random_range(0..=self.span_days);
        let date = self.start + Duration::days(offset);
        Value::Text(date.format(&self.output_format).to_string().into())
    }
}

pub(crate) fn parse_date(value: &str, format: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, format).map_err(|_| RowForgeError::BadTemporalFormat {
        what: "date",
        value: value.to_string(),
        format: format.to_string(),
    })
}

#[derive(Debug)]
pub struct DateGeneratorStrategy {
    span: DateSpan,
    source: SeededRng,
}

impl DateGeneratorStrategy {
    pub fn from_params(params: &ParamMap) -> Result<Self> {
        let start_date = string_field(NAME, params, "start_date")?;
        let end_date = string_field(NAME, params, "end_date")?;
        let format = opt_string_field(NAME, params, "format")?
            .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string());
        let output_format = opt_string_field(NAME, params, "output_format")?
            .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string());

        Ok(DateGeneratorStrategy {
            span: DateSpan::parse(NAME, &start_date, &end_date, &format, output_format)?,
            source: SeededRng::new(seed_param(NAME, params)?),
        })
    }
}

impl Strategy for DateGeneratorStrategy {
    fn data_kind(&self) -> DataKind {
        DataKind::Date
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
        state.insert("span_days".into(), self.span.span_days.into());
        state
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{assert_chunk_equivalence, params};
    use super::*;

    fn base_params() -> ParamMap {
        params(serde_json::json!({
            "start_date": "2024-01-01",
            "end_date": "2024-12-31",
            "seed": 5,
        }))
    }

    #[test]
    fn test_dates_within_range() {
        let mut s = DateGeneratorStrategy::from_params(&base_params()).unwrap();
        for v in s.generate_chunk(200).unwrap() {
            let d = NaiveDate::parse_from_str(v.as_str().unwrap(), "%Y-%m-%d").unwrap();
            assert!(d >= NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
            assert!(d <= NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        }
    }

    #[test]
    fn test_custom_output_format() {
        let mut p = base_params();
        p.insert("output_format".into(), serde_json::json!("%d/%m/%Y"));
        let mut s = DateGeneratorStrategy::from_params(&p).unwrap();
        let v = s.generate_chunk(1).unwrap();
        let text = v[0].as_str().unwrap();
        assert_eq!(text.len(), 10);
        assert_eq!(&text[2..3], "/");
    }

    #[test]
    fn test_custom_input_format() {
        let p = params(serde_json::json!({
            "start_date": "01/01/2024",
            "end_date": "31/12/2024",
            "format": "%d/%m/%Y",
            "seed": 1,
        }));
        assert!(DateGeneratorStrategy::from_params(&p).is_ok());
    }

    #[test]
    fn test_bad_format_rejected() {
        let p = params(serde_json::json!({
            "start_date": "January 1st",
            "end_date": "2024-12-31",
        }));
        let err = DateGeneratorStrategy::from_params(&p).unwrap_err();
        assert!(matches!(err, RowForgeError::BadTemporalFormat { .. }));
    }

    #[test]
    fn test_start_after_end_rejected() {
        let p = params(serde_json::json!({
            "start_date": "2024-12-31",
            "end_date": "2024-01-01",
        }));
        assert!(DateGeneratorStrategy::from_params(&p).is_err());
    }

    #[test]
    fn test_chunk_equivalence() {
        let mut s = DateGeneratorStrategy::from_params(&base_params()).unwrap();
        assert_chunk_equivalence(&mut s, 25);
    }
}
