use crate::error::{CleaningError, Result, ResultExt};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Load a delimited text file with a header row.
///
/// Every column is read as `String` (no schema inference), so the cleaning
/// stages decide how each column is parsed. Empty fields become null.
///
/// # Errors
///
/// Returns [`CleaningError::InputNotFound`] when `path` does not exist.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(CleaningError::InputNotFound(path.to_path_buf()));
    }

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .context(format!("Failed to read '{}'", path.display()))?;

    let emptied = empty_strings_to_null(&mut df)?;
    if emptied > 0 {
        debug!("Treated {} empty fields as missing", emptied);
    }

    info!(
        "Loaded {} records with {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Replace `""` cells in every text column with null.
fn empty_strings_to_null(df: &mut DataFrame) -> Result<usize> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut total = 0;
    for name in &names {
        let series = df.column(name)?.as_materialized_series().clone();
        if series.dtype() != &DataType::String {
            continue;
        }

        let str_series = series.str()?;
        let empties = str_series
            .into_iter()
            .filter(|cell| matches!(cell, Some("")))
            .count();
        if empties == 0 {
            continue;
        }

        let cleaned: Vec<Option<&str>> = str_series
            .into_iter()
            .map(|cell| cell.filter(|v| !v.is_empty()))
            .collect();
        df.replace(name, Series::new(name.as_str().into(), cleaned))?;
        total += empties;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file() {
        let err = read_table(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(err.is_input_not_found());
    }

    #[test]
    fn test_reads_everything_as_text() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Age,GPA,Comments").unwrap();
        writeln!(file, "20,3.5,fine").unwrap();
        writeln!(file, "abc,,").unwrap();
        file.flush().unwrap();

        let df = read_table(file.path()).unwrap();

        assert_eq!(df.shape(), (2, 3));
        for column in df.get_columns() {
            assert_eq!(column.dtype(), &DataType::String);
        }
        let gpa = df.column("GPA").unwrap();
        assert_eq!(gpa.null_count(), 1);
        let ages: Vec<Option<&str>> = df
            .column("Age")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(ages, vec![Some("20"), Some("abc")]);
    }
}
