//! Type conversion functions for the cleaning stages.
//!
//! Conversions never fail on cell data: anything unparseable becomes null.

use super::{column, text_column};
use crate::error::Result;
use crate::utils::{parse_numeric_string, parse_timestamp, round_to};
use polars::prelude::*;
use tracing::debug;

/// Parses columns to `Float64`, treating unparseable values as missing.
pub struct NumericCoercer;

impl NumericCoercer {
    /// Coerce `column` to `Float64` in place.
    ///
    /// Returns how many present cells could not be parsed and became null.
    pub fn coerce(df: &mut DataFrame, name: &str) -> Result<usize> {
        let series = column(df, name)?;
        let nulls_before = series.null_count();

        let coerced = if series.dtype() == &DataType::String {
            let values: Vec<Option<f64>> = series
                .str()?
                .into_iter()
                .map(|cell| cell.and_then(parse_numeric_string))
                .collect();
            Series::new(name.into(), values)
        } else {
            series.cast(&DataType::Float64)?
        };

        let newly_missing = coerced.null_count().saturating_sub(nulls_before);
        df.replace(name, coerced)?;

        if newly_missing > 0 {
            debug!("'{}': {} values could not be parsed as numbers", name, newly_missing);
        }
        Ok(newly_missing)
    }
}

/// Parse a text column into `Datetime(ms)`; unparseable cells become null.
///
/// Returns how many present cells could not be parsed.
pub(crate) fn coerce_timestamps(df: &mut DataFrame, name: &str) -> Result<usize> {
    let series = column(df, name)?;
    if matches!(series.dtype(), DataType::Datetime(_, _)) {
        let converted = series.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
        df.replace(name, converted)?;
        return Ok(0);
    }

    let series = text_column(df, name)?;
    let nulls_before = series.null_count();
    let millis: Vec<Option<i64>> = series
        .str()?
        .into_iter()
        .map(|cell| {
            cell.and_then(parse_timestamp)
                .map(|dt| dt.and_utc().timestamp_millis())
        })
        .collect();

    let timestamps = Series::new(name.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    let unparseable = timestamps.null_count().saturating_sub(nulls_before);
    df.replace(name, timestamps)?;
    Ok(unparseable)
}

/// Epoch milliseconds of a `Datetime` column, in row order.
pub(crate) fn timestamp_millis(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let series = column(df, name)?.cast(&DataType::Int64)?;
    Ok(series.i64()?.into_iter().collect())
}

/// Round a `Float64` column to `places` decimals. Nulls stay null.
pub(crate) fn round_column(df: &mut DataFrame, name: &str, places: u32) -> Result<()> {
    let series = column(df, name)?.cast(&DataType::Float64)?;
    let rounded: Vec<Option<f64>> = series
        .f64()?
        .into_iter()
        .map(|v| v.map(|x| round_to(x, places)))
        .collect();
    df.replace(name, Series::new(name.into(), rounded))?;
    Ok(())
}

/// Cast a numeric column to `Int64`, truncating toward zero.
pub(crate) fn cast_to_integer(df: &mut DataFrame, name: &str) -> Result<()> {
    let series = column(df, name)?.cast(&DataType::Int64)?;
    df.replace(name, series)?;
    Ok(())
}
