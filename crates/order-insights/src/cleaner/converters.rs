//! Type coercion functions for data cleaning.
//!
//! Every converter returns the coerced series together with the number of
//! present values it had to turn into missing ones.

use crate::error::{AnalysisError, Result};
use crate::types::ColumnKind;
use crate::utils::{
    datetime_series, f64_values, is_numeric_dtype, normalize_text, parse_numeric_string,
    parse_timestamp, string_values,
};
use polars::prelude::*;

/// Coerce a column to the storage type of its kind.
pub(crate) fn coerce_column(series: &Series, kind: ColumnKind) -> Result<(Series, usize)> {
    match kind {
        ColumnKind::Numeric => to_numeric(series),
        ColumnKind::Timestamp => to_timestamp(series),
        ColumnKind::Categorical => to_categorical(series),
    }
}

/// Convert a column to Float64. Unparseable text becomes missing.
pub(crate) fn to_numeric(series: &Series) -> Result<(Series, usize)> {
    match series.dtype() {
        DataType::String => {
            let mut failures = 0;
            let values: Vec<Option<f64>> = series
                .str()?
                .into_iter()
                .map(|opt_val| {
                    opt_val.and_then(|val| {
                        let parsed = parse_numeric_string(val);
                        if parsed.is_none() && !val.trim().is_empty() {
                            failures += 1;
                        }
                        parsed
                    })
                })
                .collect();
            Ok((Series::new(series.name().clone(), values), failures))
        }
        dtype if is_numeric_dtype(dtype) => {
            // NaN from an upstream float column counts as missing
            let values: Vec<Option<f64>> = f64_values(series)?
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect();
            Ok((Series::new(series.name().clone(), values), 0))
        }
        dtype => Err(AnalysisError::UnsupportedType {
            column: series.name().to_string(),
            dtype: dtype.to_string(),
        }),
    }
}

/// Convert a column to millisecond Datetime. Unparseable text becomes missing.
pub(crate) fn to_timestamp(series: &Series) -> Result<(Series, usize)> {
    match series.dtype() {
        DataType::String => {
            let mut failures = 0;
            let millis: Vec<Option<i64>> = series
                .str()?
                .into_iter()
                .map(|opt_val| {
                    opt_val.and_then(|val| {
                        let parsed = parse_timestamp(val);
                        if parsed.is_none() && !val.trim().is_empty() {
                            failures += 1;
                        }
                        parsed.map(|dt| dt.and_utc().timestamp_millis())
                    })
                })
                .collect();
            Ok((datetime_series(series.name().as_str(), millis)?, failures))
        }
        DataType::Datetime(_, _) | DataType::Date => {
            let ms = series.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
            Ok((ms, 0))
        }
        dtype => Err(AnalysisError::UnsupportedType {
            column: series.name().to_string(),
            dtype: dtype.to_string(),
        }),
    }
}

/// Convert a column to trimmed text. Blank strings become missing.
pub(crate) fn to_categorical(series: &Series) -> Result<(Series, usize)> {
    let values: Vec<Option<String>> = string_values(series)?
        .into_iter()
        .map(|v| v.and_then(|s| normalize_text(&s)))
        .collect();
    Ok((Series::new(series.name().clone(), values), 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::millis_values;

    #[test]
    fn test_to_numeric_from_strings() {
        let series = Series::new(
            "price".into(),
            &[Some("10.5"), Some("abc"), None, Some(" "), Some("$1000"), Some("10,5")],
        );
        let (converted, failures) = to_numeric(&series).unwrap();

        assert_eq!(converted.dtype(), &DataType::Float64);
        assert_eq!(
            f64_values(&converted).unwrap(),
            vec![Some(10.5), None, None, None, Some(1000.0), None]
        );
        assert_eq!(failures, 2);
    }

    #[test]
    fn test_to_numeric_keeps_numbers() {
        let series = Series::new("quantity".into(), &[Some(1i64), None, Some(3)]);
        let (converted, failures) = to_numeric(&series).unwrap();

        assert_eq!(f64_values(&converted).unwrap(), vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(failures, 0);
    }

    #[test]
    fn test_to_numeric_rejects_booleans() {
        let series = Series::new("flag".into(), &[true, false]);
        assert!(matches!(
            to_numeric(&series),
            Err(AnalysisError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_to_timestamp_from_strings() {
        let series = Series::new(
            "purchase_date".into(),
            &[Some("1970-01-01 00:00:01"), Some("garbage"), None],
        );
        let (converted, failures) = to_timestamp(&series).unwrap();

        assert_eq!(
            converted.dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
        assert_eq!(millis_values(&converted).unwrap(), vec![Some(1_000), None, None]);
        assert_eq!(failures, 1);
    }

    #[test]
    fn test_to_timestamp_is_stable_on_datetimes() {
        let series = datetime_series("purchase_date", vec![Some(5), None]).unwrap();
        let (converted, _) = to_timestamp(&series).unwrap();
        assert_eq!(millis_values(&converted).unwrap(), vec![Some(5), None]);
    }

    #[test]
    fn test_to_categorical_trims_and_blanks() {
        let series = Series::new("payment_type".into(), &[Some(" card "), Some(""), None]);
        let (converted, _) = to_categorical(&series).unwrap();

        assert_eq!(
            string_values(&converted).unwrap(),
            vec![Some("card".to_string()), None, None]
        );
    }
}
