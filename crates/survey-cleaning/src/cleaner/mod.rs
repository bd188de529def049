//! Column-level cleaning primitives.
//!
//! This module provides functionality for:
//! - Exact-match value remapping and default fills
//! - Numeric and timestamp coercion (failures become nulls)
//! - Comment normalization

mod comments;
mod converters;
mod mapping;

pub use comments::CommentNormalizer;
pub use converters::NumericCoercer;
pub use mapping::ValueMapper;

pub(crate) use converters::{cast_to_integer, coerce_timestamps, round_column, timestamp_millis};

use crate::error::{CleaningError, Result};
use polars::prelude::*;

/// Fetch a column as an owned Series, mapping absence to `ColumnNotFound`.
pub(crate) fn column(df: &DataFrame, name: &str) -> Result<Series> {
    df.column(name)
        .map(|c| c.as_materialized_series().clone())
        .map_err(|_| CleaningError::ColumnNotFound(name.to_string()))
}

/// Fetch a column cast to `String`.
pub(crate) fn text_column(df: &DataFrame, name: &str) -> Result<Series> {
    let series = column(df, name)?;
    if series.dtype() == &DataType::String {
        Ok(series)
    } else {
        Ok(series.cast(&DataType::String)?)
    }
}
