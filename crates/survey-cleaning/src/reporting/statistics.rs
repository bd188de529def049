use crate::cleaner::{column, timestamp_millis};
use crate::error::Result;
use crate::types::{DatasetStatistics, columns};
use crate::utils::millis_to_datetime;
use polars::prelude::*;
use tracing::info;

impl DatasetStatistics {
    /// Compute headline statistics from a cleaned frame.
    ///
    /// Ranges and means are `None` when the frame is empty.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        Ok(Self {
            record_count: df.height(),
            date_range: date_range(df)?,
            age_range: age_range(df)?,
            mean_gpa: column_mean(df, columns::GPA)?,
            mean_satisfaction: column_mean(df, columns::SATISFACTION)?,
        })
    }
}

fn date_range(df: &DataFrame) -> Result<Option<(String, String)>> {
    let millis: Vec<i64> = timestamp_millis(df, columns::TIMESTAMP)?
        .into_iter()
        .flatten()
        .collect();

    let (Some(min), Some(max)) = (millis.iter().min(), millis.iter().max()) else {
        return Ok(None);
    };
    let as_date = |ms: i64| millis_to_datetime(ms).map(|dt| dt.date().to_string());

    Ok(as_date(*min).zip(as_date(*max)))
}

fn age_range(df: &DataFrame) -> Result<Option<(i64, i64)>> {
    let ages = column(df, columns::AGE)?.cast(&DataType::Int64)?;
    let ages = ages.i64()?;
    Ok(ages.min().zip(ages.max()))
}

fn column_mean(df: &DataFrame, name: &str) -> Result<Option<f64>> {
    Ok(column(df, name)?.cast(&DataType::Float64)?.mean())
}

/// Log the end-of-run banner.
pub fn log_statistics(stats: &DatasetStatistics, output_csv: &str, output_xlsx: &str) {
    let rule = "=".repeat(60);
    info!("{}", rule);
    info!("DATA CLEANING PIPELINE COMPLETE");
    info!("{}", rule);
    info!("Final dataset: {} records", stats.record_count);
    if let Some((first, last)) = &stats.date_range {
        info!("Date range: {} to {}", first, last);
    }
    if let Some((min, max)) = stats.age_range {
        info!("Age range: {}-{} years", min, max);
    }
    if let Some(gpa) = stats.mean_gpa {
        info!("Average GPA: {:.2}", gpa);
    }
    if let Some(satisfaction) = stats.mean_satisfaction {
        info!("Average satisfaction: {:.2}", satisfaction);
    }
    info!("Files saved: {}, {}", output_csv, output_xlsx);
}
