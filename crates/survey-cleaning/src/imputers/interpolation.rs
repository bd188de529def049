use crate::cleaner::column;
use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

/// Positional linear interpolation for numeric columns.
///
/// Missing cells between two present neighbours are filled on the straight
/// line joining them, by row position. Leading and trailing runs have only one
/// neighbour and stay missing; nothing is extrapolated.
pub struct LinearInterpolator;

impl LinearInterpolator {
    /// Interpolate `column` in place, in the frame's current row order.
    ///
    /// Returns the number of filled cells.
    pub fn apply(df: &mut DataFrame, name: &str) -> Result<usize> {
        let series = column(df, name)?.cast(&DataType::Float64)?;
        let values: Vec<Option<f64>> = series.f64()?.into_iter().collect();

        let filled = interpolate_linear(&values);
        let imputed = filled
            .iter()
            .zip(&values)
            .filter(|(after, before)| after.is_some() && before.is_none())
            .count();

        df.replace(name, Series::new(name.into(), filled))?;
        debug!("Interpolated {} values in '{}'", imputed, name);
        Ok(imputed)
    }
}

/// Fill interior gaps of `values` by linear interpolation over position.
///
/// ```rust,ignore
/// assert_eq!(
///     interpolate_linear(&[Some(2.0), None, Some(4.0)]),
///     vec![Some(2.0), Some(3.0), Some(4.0)]
/// );
/// ```
pub fn interpolate_linear(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut result = values.to_vec();
    let mut last_known: Option<(usize, f64)> = None;

    for (idx, value) in values.iter().enumerate() {
        let Some(current) = *value else {
            continue;
        };

        if let Some((start, start_value)) = last_known
            && idx - start > 1
        {
            let span = (idx - start) as f64;
            let step = (current - start_value) / span;
            for (offset, slot) in result[start + 1..idx].iter_mut().enumerate() {
                *slot = Some(start_value + step * (offset + 1) as f64);
            }
        }

        last_known = Some((idx, current));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_gap() {
        assert_eq!(
            interpolate_linear(&[Some(2.0), None, Some(4.0)]),
            vec![Some(2.0), Some(3.0), Some(4.0)]
        );
    }

    #[test]
    fn test_multi_gap() {
        assert_eq!(
            interpolate_linear(&[Some(1.0), None, None, Some(4.0)]),
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]
        );
    }

    #[test]
    fn test_leading_gap_stays_missing() {
        assert_eq!(
            interpolate_linear(&[None, Some(5.0)]),
            vec![None, Some(5.0)]
        );
    }

    #[test]
    fn test_trailing_gap_stays_missing() {
        assert_eq!(
            interpolate_linear(&[Some(3.0), Some(2.0), None, None]),
            vec![Some(3.0), Some(2.0), None, None]
        );
    }

    #[test]
    fn test_present_values_untouched() {
        let values = vec![Some(0.5), Some(7.25), Some(-1.0)];
        assert_eq!(interpolate_linear(&values), values);
    }

    #[test]
    fn test_all_missing_and_empty() {
        assert_eq!(interpolate_linear(&[None, None]), vec![None, None]);
        assert_eq!(interpolate_linear(&[]), Vec::<Option<f64>>::new());
    }

    #[test]
    fn test_apply_on_frame() {
        let mut df = df!("GPA" => [None, Some(2.0), None, Some(4.0), None]).unwrap();

        let imputed = LinearInterpolator::apply(&mut df, "GPA").unwrap();

        assert_eq!(imputed, 1);
        let values: Vec<Option<f64>> = df
            .column("GPA")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![None, Some(2.0), Some(3.0), Some(4.0), None]);
    }
}
