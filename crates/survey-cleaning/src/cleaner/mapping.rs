//! Exact-match value replacement for text columns.

use super::text_column;
use crate::config::{MappingKey, ValueMapping};
use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

/// Applies [`ValueMapping`] tables and default fills to text columns.
pub struct ValueMapper;

impl ValueMapper {
    /// Replace every cell whose raw value (or missing marker) is a key of
    /// `mapping`. Unmatched values pass through verbatim.
    ///
    /// Returns the number of replaced cells.
    pub fn map_values(df: &mut DataFrame, column: &str, mapping: &ValueMapping) -> Result<usize> {
        let series = text_column(df, column)?;
        let str_series = series.str()?;

        let mut replaced = 0;
        let mapped: Vec<Option<String>> = str_series
            .into_iter()
            .map(|cell| match mapping.lookup(MappingKey::from(cell)) {
                Some(replacement) => {
                    replaced += 1;
                    Some(replacement.to_string())
                }
                None => cell.map(str::to_string),
            })
            .collect();

        df.replace(column, Series::new(column.into(), mapped))?;
        debug!("Mapped {} values in '{}'", replaced, column);
        Ok(replaced)
    }

    /// Replace every remaining missing cell with `default`.
    ///
    /// Returns the number of filled cells.
    pub fn fill_missing(df: &mut DataFrame, column: &str, default: &str) -> Result<usize> {
        let series = text_column(df, column)?;
        let missing = series.null_count();
        if missing == 0 {
            return Ok(0);
        }

        let filled: Vec<Option<String>> = series
            .str()?
            .into_iter()
            .map(|cell| Some(cell.unwrap_or(default).to_string()))
            .collect();

        df.replace(column, Series::new(column.into(), filled))?;
        debug!("Filled {} missing values in '{}' with '{}'", missing, column, default);
        Ok(missing)
    }

    /// Apply `transform` to every present cell of a text column.
    pub fn transform_text<F>(df: &mut DataFrame, column: &str, transform: F) -> Result<()>
    where
        F: Fn(&str) -> String,
    {
        let series = text_column(df, column)?;
        let transformed: Vec<Option<String>> = series
            .str()?
            .into_iter()
            .map(|cell| cell.map(&transform))
            .collect();

        df.replace(column, Series::new(column.into(), transformed))?;
        Ok(())
    }
}
