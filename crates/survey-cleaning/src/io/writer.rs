use crate::error::{CleaningError, Result};
use crate::utils::millis_to_datetime;
use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::fs;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

const EXCEL_DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Create the parent directory of `path` if it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
        debug!("Created output directory {}", parent.display());
    }
    Ok(())
}

/// Write `df` as comma-separated text with a header row.
///
/// Datetime columns are rendered with `timestamp_format`; nulls are written
/// as empty fields.
pub fn write_csv(df: &DataFrame, path: &Path, timestamp_format: &str) -> Result<()> {
    let mut out = format_datetimes(df, timestamp_format)?;

    write_atomically(path, |tmp| {
        CsvWriter::new(tmp.as_file_mut())
            .include_header(true)
            .with_separator(b',')
            .finish(&mut out)?;
        Ok(())
    })?;

    info!("Saved cleaned data to {}", path.display());
    Ok(())
}

/// Write `df` to a single-sheet XLSX workbook.
///
/// Datetimes become Excel datetimes, numeric columns become numbers and
/// nulls are left as blank cells.
pub fn write_spreadsheet(df: &DataFrame, path: &Path, sheet_name: &str) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;
    fill_worksheet(worksheet, df)?;
    worksheet.autofit();

    write_atomically(path, |tmp| {
        workbook.save_to_writer(tmp.as_file_mut())?;
        Ok(())
    })?;

    info!("Saved cleaned data to {}", path.display());
    Ok(())
}

/// Run `write` against a temp file in the destination directory, then rename
/// it over `path`. The temp file is removed if anything fails.
fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> Result<()>,
{
    ensure_parent_dir(path)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    write(&mut tmp).map_err(|e| output_failed(path, e))?;
    tmp.persist(path)
        .map_err(|e| output_failed(path, CleaningError::Io(e.error)))?;
    Ok(())
}

fn output_failed(path: &Path, error: CleaningError) -> CleaningError {
    CleaningError::OutputFailed {
        path: path.to_path_buf(),
        reason: error.to_string(),
    }
}

/// Copy of `df` with every datetime column rendered as text.
fn format_datetimes(df: &DataFrame, timestamp_format: &str) -> Result<DataFrame> {
    let mut out = df.clone();
    for column in df.get_columns() {
        if !matches!(column.dtype(), DataType::Datetime(_, _)) {
            continue;
        }

        let name = column.name().clone();
        let millis = column
            .as_materialized_series()
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .cast(&DataType::Int64)?;
        let formatted: Vec<Option<String>> = millis
            .i64()?
            .into_iter()
            .map(|cell| {
                cell.and_then(millis_to_datetime)
                    .map(|dt| dt.format(timestamp_format).to_string())
            })
            .collect();

        out.replace(name.as_str(), Series::new(name.clone(), formatted))?;
    }
    Ok(out)
}

fn fill_worksheet(worksheet: &mut Worksheet, df: &DataFrame) -> Result<()> {
    let header = Format::new().set_bold();
    let datetime = Format::new().set_num_format(EXCEL_DATETIME_FORMAT);

    for (idx, column) in df.get_columns().iter().enumerate() {
        let col = u16::try_from(idx).map_err(|_| {
            CleaningError::InvalidConfig(format!("too many columns for a worksheet: {}", idx))
        })?;
        worksheet.write_string_with_format(0, col, column.name().as_str(), &header)?;

        let series = column.as_materialized_series();
        match series.dtype() {
            DataType::Datetime(_, _) => {
                let millis = series
                    .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
                    .cast(&DataType::Int64)?;
                for (row, cell) in millis.i64()?.into_iter().enumerate() {
                    if let Some(dt) = cell.and_then(millis_to_datetime) {
                        worksheet.write_datetime_with_format(
                            data_row(row)?,
                            col,
                            &dt,
                            &datetime,
                        )?;
                    }
                }
            }
            dtype if dtype.is_primitive_numeric() => {
                let values = series.cast(&DataType::Float64)?;
                for (row, cell) in values.f64()?.into_iter().enumerate() {
                    if let Some(value) = cell {
                        worksheet.write_number(data_row(row)?, col, value)?;
                    }
                }
            }
            _ => {
                let values = series.cast(&DataType::String)?;
                for (row, cell) in values.str()?.into_iter().enumerate() {
                    if let Some(value) = cell {
                        worksheet.write_string(data_row(row)?, col, value)?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Worksheet row for data row `row`; row 0 holds the header.
fn data_row(row: usize) -> Result<u32> {
    u32::try_from(row + 1).map_err(|_| {
        CleaningError::InvalidConfig(format!("too many rows for a worksheet: {}", row))
    })
}
