//! The eight column stages of the cleaning pipeline.
//!
//! Each stage takes the whole frame and returns it together with a
//! [`StageReport`]. Order matters: interpolation works on the row order left
//! by the earlier row drops, and comments are indexed after the final sort.

use crate::cleaner::{
    CommentNormalizer, NumericCoercer, ValueMapper, cast_to_integer, coerce_timestamps,
    column, round_column,
};
use crate::config::{CleaningConfig, ValueMapping};
use crate::error::{CleaningError, Result};
use crate::imputers::LinearInterpolator;
use crate::pipeline::filters::{RangeFilter, drop_missing};
use crate::pipeline::progress::CleaningStage;
use crate::types::{StageReport, columns};
use crate::utils::title_case;
use polars::prelude::*;
use tracing::{debug, info};

/// Signature shared by all column stages.
pub type StageFn = fn(DataFrame, &CleaningConfig) -> Result<(DataFrame, StageReport)>;

/// The column stages paired with their implementation, in execution order.
pub fn ordered_stages() -> [(CleaningStage, StageFn); 8] {
    [
        (CleaningStage::Timestamp, clean_timestamps),
        (CleaningStage::StudentId, clean_student_ids),
        (CleaningStage::Age, clean_ages),
        (CleaningStage::Gender, clean_gender),
        (CleaningStage::Department, clean_departments),
        (CleaningStage::Gpa, clean_gpa),
        (CleaningStage::Satisfaction, clean_satisfaction),
        (CleaningStage::Comments, clean_comments),
    ]
}

/// Parse timestamps and drop rows whose timestamp is unparseable or missing.
pub fn clean_timestamps(
    mut df: DataFrame,
    _config: &CleaningConfig,
) -> Result<(DataFrame, StageReport)> {
    let mut report = StageReport::new(CleaningStage::Timestamp, df.height());

    report.values_coerced_to_missing = coerce_timestamps(&mut df, columns::TIMESTAMP)?;
    drop_missing(&mut df, columns::TIMESTAMP)?;

    report.rows_after = df.height();
    info!(
        "Timestamp cleaning: {} invalid records removed",
        report.rows_removed()
    );
    Ok((df, report))
}

/// Rename `Student ID` to `Student_ID`, then lower-case and trim every value.
///
/// Frames that were already cleaned once carry `Student_ID` and skip the rename.
pub fn clean_student_ids(
    mut df: DataFrame,
    _config: &CleaningConfig,
) -> Result<(DataFrame, StageReport)> {
    let report = StageReport::new(CleaningStage::StudentId, df.height());
    let names = df.get_column_names_str();

    if names.contains(&columns::STUDENT_ID_RAW) {
        df.rename(columns::STUDENT_ID_RAW, columns::STUDENT_ID.into())?;
    } else if !names.contains(&columns::STUDENT_ID) {
        return Err(CleaningError::ColumnNotFound(
            columns::STUDENT_ID_RAW.to_string(),
        ));
    }

    ValueMapper::transform_text(&mut df, columns::STUDENT_ID, |id| id.trim().to_lowercase())?;

    let unique_ids = column(&df, columns::STUDENT_ID)?.n_unique()?;
    info!("Student IDs processed: {} unique IDs", unique_ids);
    Ok((df, report))
}

/// Coerce ages to numbers, keep `[age_min, age_max]`, and cast to integers.
pub fn clean_ages(mut df: DataFrame, config: &CleaningConfig) -> Result<(DataFrame, StageReport)> {
    let mut report = StageReport::new(CleaningStage::Age, df.height());

    report.values_coerced_to_missing = NumericCoercer::coerce(&mut df, columns::AGE)?;
    RangeFilter::between(config.age_min, config.age_max).apply(&mut df, columns::AGE)?;
    cast_to_integer(&mut df, columns::AGE)?;

    report.rows_after = df.height();
    info!(
        "Age validation: {} records removed (invalid/out-of-range)",
        report.rows_removed()
    );
    Ok((df, report))
}

/// Map gender spellings, fill missing values, and title-case.
pub fn clean_gender(
    mut df: DataFrame,
    config: &CleaningConfig,
) -> Result<(DataFrame, StageReport)> {
    let mut report = StageReport::new(CleaningStage::Gender, df.height());

    report.values_mapped =
        ValueMapper::map_values(&mut df, columns::GENDER, &config.gender_mapping)?;
    report.values_mapped +=
        ValueMapper::fill_missing(&mut df, columns::GENDER, &config.gender_default)?;
    ValueMapper::transform_text(&mut df, columns::GENDER, title_case)?;

    info!(
        "Gender distribution: {}",
        value_distribution(&df, columns::GENDER)?
    );
    Ok((df, report))
}

/// Expand department abbreviations and fill missing values.
pub fn clean_departments(
    mut df: DataFrame,
    config: &CleaningConfig,
) -> Result<(DataFrame, StageReport)> {
    let mut report = StageReport::new(CleaningStage::Department, df.height());

    report.values_mapped =
        ValueMapper::map_values(&mut df, columns::DEPARTMENT, &config.department_mapping)?;
    report.values_mapped +=
        ValueMapper::fill_missing(&mut df, columns::DEPARTMENT, &config.department_default)?;

    let unique = column(&df, columns::DEPARTMENT)?.n_unique()?;
    info!("Departments processed: {} unique departments", unique);
    Ok((df, report))
}

/// Convert letter grades, coerce, interpolate, round, and drop GPAs below the minimum.
pub fn clean_gpa(mut df: DataFrame, config: &CleaningConfig) -> Result<(DataFrame, StageReport)> {
    let mut report = StageReport::new(CleaningStage::Gpa, df.height());

    let grades = ValueMapping::from_numeric(&config.grade_scale);
    report.values_mapped = ValueMapper::map_values(&mut df, columns::GPA, &grades)?;

    impute_and_filter(
        &mut df,
        columns::GPA,
        config.decimal_places,
        RangeFilter::at_least(config.gpa_min),
        &mut report,
    )?;

    info!(
        "GPA processing: {} values imputed, {} outliers removed",
        report.values_imputed,
        report.rows_removed()
    );
    Ok((df, report))
}

/// Coerce, interpolate, round, and drop satisfaction scores below the minimum.
pub fn clean_satisfaction(
    mut df: DataFrame,
    config: &CleaningConfig,
) -> Result<(DataFrame, StageReport)> {
    let mut report = StageReport::new(CleaningStage::Satisfaction, df.height());

    impute_and_filter(
        &mut df,
        columns::SATISFACTION,
        config.decimal_places,
        RangeFilter::at_least(config.satisfaction_min),
        &mut report,
    )?;

    info!(
        "Satisfaction processing: {} values imputed, {} outliers removed",
        report.values_imputed,
        report.rows_removed()
    );
    Ok((df, report))
}

/// Fill missing comments, sort by timestamp, and normalize each comment with
/// its post-sort position.
pub fn clean_comments(
    mut df: DataFrame,
    config: &CleaningConfig,
) -> Result<(DataFrame, StageReport)> {
    let mut report = StageReport::new(CleaningStage::Comments, df.height());

    report.values_mapped =
        ValueMapper::fill_missing(&mut df, columns::COMMENTS, &config.comments.canned_text)?;

    let mut df = sort_by_timestamp(&df)?;
    CommentNormalizer::new(&config.comments).apply(&mut df, columns::COMMENTS)?;

    info!("Comments standardized: {} comments processed", df.height());
    Ok((df, report))
}

/// Shared tail of the GPA and Satisfaction stages.
fn impute_and_filter(
    df: &mut DataFrame,
    name: &str,
    decimal_places: u32,
    filter: RangeFilter,
    report: &mut StageReport,
) -> Result<()> {
    report.values_coerced_to_missing = NumericCoercer::coerce(df, name)?;
    let missing = column(df, name)?.null_count();

    report.values_imputed = LinearInterpolator::apply(df, name)?;
    debug!(
        "'{}': {} missing, {} interpolated",
        name, missing, report.values_imputed
    );

    round_column(df, name, decimal_places)?;
    filter.apply(df, name)?;
    report.rows_after = df.height();
    Ok(())
}

/// Stable ascending sort on the Timestamp column.
///
/// Rows with equal timestamps keep their relative order.
fn sort_by_timestamp(df: &DataFrame) -> Result<DataFrame> {
    // missing column surfaces as ColumnNotFound
    column(df, columns::TIMESTAMP)?;
    Ok(df.sort(
        [columns::TIMESTAMP],
        SortMultipleOptions::default().with_maintain_order(true),
    )?)
}

/// `value: count` pairs for a text column, most frequent first.
fn value_distribution(df: &DataFrame, name: &str) -> Result<String> {
    let counts = column(df, name)?.value_counts(true, false, "count".into(), false)?;
    let values = counts.column(name)?.as_materialized_series().clone();
    let totals = counts
        .column("count")?
        .as_materialized_series()
        .cast(&DataType::Int64)?;

    let mut pairs: Vec<(&str, i64)> = values
        .str()?
        .into_iter()
        .zip(totals.i64()?)
        .filter_map(|(value, count)| Some((value?, count?)))
        .collect();
    // equal counts are listed alphabetically
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    Ok(pairs
        .iter()
        .map(|(v, c)| format!("{}: {}", v, c))
        .collect::<Vec<_>>()
        .join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .cast(&DataType::Float64)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    fn some(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn test_stage_order_matches_column_stages() {
        let stages: Vec<CleaningStage> = ordered_stages().iter().map(|(s, _)| *s).collect();
        assert_eq!(stages, CleaningStage::COLUMN_STAGES.to_vec());
    }

    #[test]
    fn test_clean_timestamps_drops_invalid() {
        let df = df!(
            "Timestamp" => [Some("2025-10-01 08:00:00"), Some("yesterday"), None],
            "Age" => ["20", "21", "22"]
        )
        .unwrap();

        let (df, report) = clean_timestamps(df, &CleaningConfig::default()).unwrap();

        assert_eq!(df.height(), 1);
        assert_eq!(report.rows_removed(), 2);
        assert_eq!(report.values_coerced_to_missing, 1);
        assert_eq!(strings(&df, "Age"), some(&["20"]));
    }

    #[test]
    fn test_clean_student_ids() {
        let df = df!("Student ID" => [Some("  AB123 "), Some("cd456"), None]).unwrap();

        let (df, _) = clean_student_ids(df, &CleaningConfig::default()).unwrap();

        assert!(df.column("Student ID").is_err());
        assert_eq!(
            strings(&df, "Student_ID"),
            vec![Some("ab123".to_string()), Some("cd456".to_string()), None]
        );
    }

    #[test]
    fn test_clean_student_ids_accepts_cleaned_name() {
        let df = df!("Student_ID" => ["XY9"]).unwrap();
        let (df, _) = clean_student_ids(df, &CleaningConfig::default()).unwrap();
        assert_eq!(strings(&df, "Student_ID"), some(&["xy9"]));
    }

    #[test]
    fn test_clean_student_ids_missing_column() {
        let df = df!("Age" => ["20"]).unwrap();
        let err = clean_student_ids(df, &CleaningConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_clean_ages() {
        let df = df!("Age" => [Some("17"), Some("60"), Some("abc"), Some("18"), None, Some("61")])
            .unwrap();

        let (df, report) = clean_ages(df, &CleaningConfig::default()).unwrap();

        assert_eq!(df.column("Age").unwrap().dtype(), &DataType::Int64);
        let ages: Vec<Option<i64>> = df
            .column("Age")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(ages, vec![Some(60), Some(18)]);
        assert_eq!(report.rows_removed(), 4);
    }

    #[test]
    fn test_clean_gender() {
        let df = df!("Gender" => [Some("Femal"), Some("Malee"), Some("Othr"), None, Some("fEMALE")])
            .unwrap();

        let (df, report) = clean_gender(df, &CleaningConfig::default()).unwrap();

        assert_eq!(
            strings(&df, "Gender"),
            some(&["Female", "Male", "Other", "Other", "Female"])
        );
        assert_eq!(report.values_mapped, 4);
    }

    #[test]
    fn test_clean_departments() {
        let df = df!("Department" => [Some("Comp Sci"), None, Some("Physics"), Some("Zoo")]).unwrap();

        let (df, _) = clean_departments(df, &CleaningConfig::default()).unwrap();

        assert_eq!(
            strings(&df, "Department"),
            some(&["Computer Science", "Undeclared", "Physics", "Zoology"])
        );
    }

    #[test]
    fn test_clean_gpa() {
        let df = df!(
            "GPA" => [Some("B"), Some("2.3"), Some("2.0"), None, Some("4.0"), Some("0.5"), None]
        )
        .unwrap();

        let (df, report) = clean_gpa(df, &CleaningConfig::default()).unwrap();

        assert_eq!(
            floats(&df, "GPA"),
            vec![Some(3.5), Some(2.3), Some(2.0), Some(3.0), Some(4.0)]
        );
        assert_eq!(report.values_mapped, 1);
        assert_eq!(report.values_imputed, 1);
        assert_eq!(report.rows_removed(), 2);
    }

    #[test]
    fn test_clean_gpa_rounds_ties_to_even() {
        let df = df!(
            "GPA" => [Some("3.0"), None, Some("3.25"), Some("0.125"), Some("2.345")]
        )
        .unwrap();

        let (df, report) = clean_gpa(df, &CleaningConfig::default()).unwrap();

        // 3.125 interpolated, 0.125 below the minimum
        assert_eq!(
            floats(&df, "GPA"),
            vec![Some(3.0), Some(3.12), Some(3.25), Some(2.34)]
        );
        assert_eq!(report.values_imputed, 1);
    }

    #[test]
    fn test_clean_gpa_leading_missing_is_dropped() {
        let df = df!("GPA" => [None, Some("5.0")]).unwrap();

        let (df, _) = clean_gpa(df, &CleaningConfig::default()).unwrap();

        assert_eq!(floats(&df, "GPA"), vec![Some(5.0)]);
    }

    #[test]
    fn test_clean_satisfaction_rounds() {
        let df = df!("Satisfaction (1-5)" => [Some("1"), None, Some("2"), Some("4.456")]).unwrap();

        let (df, report) = clean_satisfaction(df, &CleaningConfig::default()).unwrap();

        assert_eq!(
            floats(&df, "Satisfaction (1-5)"),
            vec![Some(1.0), Some(1.5), Some(2.0), Some(4.46)]
        );
        assert_eq!(report.values_imputed, 1);
    }

    #[test]
    fn test_clean_comments_sorts_and_indexes() {
        let df = df!(
            "Timestamp" => ["2025-10-03 10:00:00", "2025-10-01 10:00:00", "2025-10-02 10:00:00", "2025-10-01 10:00:00"],
            "Comments" => [Some("This is spam, buy now!"), Some("first"), None, Some("Comment 2: tied")]
        )
        .unwrap();
        let (df, _) = clean_timestamps(df, &CleaningConfig::default()).unwrap();

        let (df, report) = clean_comments(df, &CleaningConfig::default()).unwrap();

        assert_eq!(report.values_mapped, 1);
        assert_eq!(
            strings(&df, "Comments"),
            some(&[
                "Comment 0: first",
                "Comment 1: tied",
                "Comment 2: The course was great!",
                "Comment 3: The course was great!",
            ])
        );
    }

    #[test]
    fn test_value_distribution() {
        let df = df!("Gender" => ["Male", "Female", "Male"]).unwrap();
        assert_eq!(
            value_distribution(&df, "Gender").unwrap(),
            "Male: 2, Female: 1"
        );
    }
}
