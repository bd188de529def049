//! Row filtering on numeric bounds.

use crate::cleaner::column;
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Keeps rows whose value lies in `[min, max]`; `max = None` means unbounded.
///
/// Missing values never satisfy the bound, so their rows are dropped too.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    pub min: f64,
    pub max: Option<f64>,
}

impl RangeFilter {
    /// Inclusive range on both ends.
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// Lower bound only.
    pub fn at_least(min: f64) -> Self {
        Self { min, max: None }
    }

    /// Whether a cell passes the filter.
    pub fn accepts(&self, value: Option<f64>) -> bool {
        match value {
            Some(v) => v >= self.min && self.max.is_none_or(|max| v <= max),
            None => false,
        }
    }

    /// Drop rows failing the filter on `column`.
    ///
    /// Returns the number of rows removed.
    pub fn apply(&self, df: &mut DataFrame, name: &str) -> Result<usize> {
        let series = column(df, name)?.cast(&DataType::Float64)?;
        let mask_values: Vec<bool> = series
            .f64()?
            .into_iter()
            .map(|v| self.accepts(v))
            .collect();

        let before = df.height();
        let mask = BooleanChunked::from_slice("mask".into(), &mask_values);
        *df = df.filter(&mask)?;

        let removed = before - df.height();
        debug!(
            "Removed {} rows outside [{}, {}] in '{}'",
            removed,
            self.min,
            self.max.map_or_else(|| "inf".to_string(), |m| m.to_string()),
            name
        );
        Ok(removed)
    }
}

/// Drop rows where `column` is null.
///
/// Returns the number of rows removed.
pub(crate) fn drop_missing(df: &mut DataFrame, name: &str) -> Result<usize> {
    let series = column(df, name)?;
    if series.null_count() == 0 {
        return Ok(0);
    }

    let before = df.height();
    let mask = series.is_not_null();
    *df = df.filter(&mask)?;
    Ok(before - df.height())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_inclusive_bounds() {
        let age = RangeFilter::between(18.0, 60.0);
        assert!(age.accepts(Some(18.0)));
        assert!(age.accepts(Some(60.0)));
        assert!(!age.accepts(Some(17.0)));
        assert!(!age.accepts(Some(60.5)));
        assert!(!age.accepts(None));
    }

    #[test]
    fn test_accepts_unbounded_above() {
        let gpa = RangeFilter::at_least(1.0);
        assert!(gpa.accepts(Some(1.0)));
        assert!(gpa.accepts(Some(12.0)));
        assert!(!gpa.accepts(Some(0.99)));
        assert!(!gpa.accepts(None));
    }

    #[test]
    fn test_apply_removes_rows() {
        let mut df = df!(
            "Age" => [Some(17.0), Some(60.0), None, Some(30.0)],
            "Student_ID" => ["a", "b", "c", "d"]
        )
        .unwrap();

        let removed = RangeFilter::between(18.0, 60.0).apply(&mut df, "Age").unwrap();

        assert_eq!(removed, 2);
        assert_eq!(df.height(), 2);
        let ids: Vec<Option<&str>> = df
            .column("Student_ID")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(ids, vec![Some("b"), Some("d")]);
    }

    #[test]
    fn test_drop_missing() {
        let mut df = df!("Timestamp" => [Some(1i64), None, Some(3)]).unwrap();
        assert_eq!(drop_missing(&mut df, "Timestamp").unwrap(), 1);
        assert_eq!(df.height(), 2);
    }
}
