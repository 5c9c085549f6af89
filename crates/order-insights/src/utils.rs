//! Shared utilities for the order analysis pipeline.
//!
//! Parsing helpers used by the cleaner's coercion step and the series
//! helpers shared by the imputers and the summarizer.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Currency symbols and padding stripped before numeric parsing.
///
/// Separators are kept: `10,5` and `1,234.56` do not parse.
pub const NUMERIC_FORMAT_CHARS: [char; 4] = ['$', '€', '£', ' '];

/// Common error/missing value markers in data.
pub const ERROR_MARKERS: [&str; 9] = [
    "error", "unknown", "n/a", "na", "nan", "null", "missing", "none", "#n/a",
];

/// Date/time layouts accepted for `purchase_date`, tried in order.
pub const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts accepted for `purchase_date`; midnight is assumed.
pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Clean a string for numeric parsing by removing formatting characters.
pub fn clean_numeric_string(s: &str) -> String {
    let mut result = s.trim().to_string();
    for c in NUMERIC_FORMAT_CHARS {
        result = result.replace(c, "");
    }
    result
}

/// Check if a string is an error/missing value marker.
pub fn is_error_marker(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    ERROR_MARKERS.iter().any(|&marker| lower == marker)
}

/// Try to parse a string as a finite numeric value.
///
/// Handles currency symbols. Anything else that is not a plain decimal
/// number, including decimal commas and grouped thousands, is rejected.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    if is_error_marker(s) {
        return None;
    }
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Try to parse a calendar date or date/time.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() || is_error_marker(trimmed) {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Trim a categorical value; blank strings are missing.
pub fn normalize_text(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// =============================================================================
// Mode
// =============================================================================

/// Most frequent value; ties go to the value seen first.
pub fn mode_first_seen<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&'a str, usize> = HashMap::new();
    let mut order: Vec<&'a str> = Vec::new();

    for val in values {
        let count = counts.entry(val).or_insert(0);
        if *count == 0 {
            order.push(val);
        }
        *count += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for val in order {
        let count = counts[&val];
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((val, count));
        }
    }
    best.map(|(val, _)| val.to_string())
}

// =============================================================================
// Series Extraction Utilities
// =============================================================================

/// Values of a numeric series as `f64`, nulls preserved.
pub fn f64_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let cast = series.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

/// Values of a datetime series as epoch milliseconds, nulls preserved.
pub fn millis_values(series: &Series) -> PolarsResult<Vec<Option<i64>>> {
    let ms = series.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    let physical = ms.cast(&DataType::Int64)?;
    Ok(physical.i64()?.into_iter().collect())
}

/// Values of a string series, nulls preserved.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let cast = series.cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Build a millisecond datetime series from epoch milliseconds.
pub fn datetime_series(name: &str, millis: Vec<Option<i64>>) -> PolarsResult<Series> {
    Series::new(name.into(), millis).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
}

/// Fill null values in a numeric Series with a specific value.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let filled: Vec<f64> = f64_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a string Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let filled: Vec<String> = string_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or_else(|| fill_value.to_string()))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null instants in a datetime Series with a specific epoch millisecond.
pub fn fill_datetime_nulls(series: &Series, fill_millis: i64) -> PolarsResult<Series> {
    let filled: Vec<Option<i64>> = millis_values(series)?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_millis)))
        .collect();
    datetime_series(series.name().as_str(), filled)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_clean_numeric_string() {
        assert_eq!(clean_numeric_string("$1234.56"), "1234.56");
        assert_eq!(clean_numeric_string("€100"), "100");
        assert_eq!(clean_numeric_string("10,5"), "10,5");
        assert_eq!(clean_numeric_string("42%"), "42%");
    }

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string("42"), Some(42.0));
        assert_eq!(parse_numeric_string(" 19.90 "), Some(19.9));
        assert_eq!(parse_numeric_string("$1234.56"), Some(1234.56));
        assert_eq!(parse_numeric_string("£ 20"), Some(20.0));
        assert_eq!(parse_numeric_string(""), None);
        assert_eq!(parse_numeric_string("abc"), None);
        assert_eq!(parse_numeric_string("N/A"), None);
        assert_eq!(parse_numeric_string("NaN"), None);
        assert_eq!(parse_numeric_string("inf"), None);
    }

    #[test]
    fn test_parse_numeric_string_rejects_separators() {
        assert_eq!(parse_numeric_string("10,5"), None);
        assert_eq!(parse_numeric_string("1.234,56"), None);
        assert_eq!(parse_numeric_string("$1,234.56"), None);
        assert_eq!(parse_numeric_string("42%"), None);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let dt = parse_timestamp("2018-03-04 10:20:30").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2018, 3, 4));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (10, 20, 30));

        let dt = parse_timestamp("2018-03-04T10:20:30.000").unwrap();
        assert_eq!(dt.hour(), 10);

        let dt = parse_timestamp("2018-03-04 10:20:30.250").unwrap();
        assert_eq!(dt.and_utc().timestamp_subsec_millis(), 250);

        let dt = parse_timestamp("2018-03-04").unwrap();
        assert_eq!((dt.day(), dt.hour()), (4, 0));

        let dt = parse_timestamp("03/04/2018").unwrap();
        assert_eq!((dt.month(), dt.day()), (3, 4));

        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("2018-13-40").is_none());
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  card "), Some("card".to_string()));
        assert_eq!(normalize_text("   "), None);
    }

    #[test]
    fn test_mode_first_seen() {
        assert_eq!(mode_first_seen(["a", "a", "b"]), Some("a".to_string()));
        assert_eq!(mode_first_seen(["b", "a", "a", "b"]), Some("b".to_string()));
        assert_eq!(mode_first_seen(["x", "y", "z"]), Some("x".to_string()));
        assert_eq!(mode_first_seen(Vec::<&str>::new()), None);
    }

    #[test]
    fn test_fill_numeric_nulls() {
        let series = Series::new("test".into(), &[Some(1.0), None, Some(3.0)]);
        let filled = fill_numeric_nulls(&series, 0.0).unwrap();

        assert_eq!(filled.null_count(), 0);
        assert_eq!(f64_values(&filled).unwrap(), vec![Some(1.0), Some(0.0), Some(3.0)]);
    }

    #[test]
    fn test_fill_string_nulls() {
        let series = Series::new("test".into(), &[Some("a"), None]);
        let filled = fill_string_nulls(&series, "z").unwrap();

        assert_eq!(
            string_values(&filled).unwrap(),
            vec![Some("a".to_string()), Some("z".to_string())]
        );
    }

    #[test]
    fn test_fill_datetime_nulls() {
        let series = datetime_series("when", vec![Some(1_000), None]).unwrap();
        let filled = fill_datetime_nulls(&series, 5_000).unwrap();

        assert_eq!(
            filled.dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
        assert_eq!(millis_values(&filled).unwrap(), vec![Some(1_000), Some(5_000)]);
    }
}
