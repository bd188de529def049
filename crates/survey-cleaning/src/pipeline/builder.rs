//! The cleaning pipeline and its builder.
//!
//! [`CleaningPipeline::clean`] runs the eight column stages over an
//! in-memory frame. [`CleaningPipeline::run`] adds loading, dual-format
//! output and the end-of-run statistics.

use crate::config::CleaningConfig;
use crate::error::{CleaningError, Result, ResultExt};
use crate::io::{read_table, write_csv, write_spreadsheet};
use crate::pipeline::progress::{
    CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::pipeline::stages::ordered_stages;
use crate::reporting::log_statistics;
use crate::types::{CleaningResult, CleaningSummary, DatasetStatistics, columns};
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// The student survey cleaning pipeline.
///
/// Use [`CleaningPipeline::builder()`] to create a pipeline with a custom
/// configuration or progress reporter.
///
/// # Example
///
/// ```rust,ignore
/// use survey_cleaning::{CleaningConfig, CleaningPipeline};
///
/// let config = CleaningConfig::builder().age_range(16.0, 70.0).build()?;
///
/// let (result, stats) = CleaningPipeline::builder()
///     .config(config)
///     .on_progress(|update| println!("[{:.0}%] {}", update.progress * 100.0, update.message))
///     .build()?
///     .run(input, output_csv, output_xlsx)?;
/// ```
pub struct CleaningPipeline {
    config: CleaningConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(CleaningPipeline: Send);

impl Default for CleaningPipeline {
    fn default() -> Self {
        Self {
            config: CleaningConfig::default(),
            progress_reporter: None,
        }
    }
}

impl CleaningPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Run the column stages over `df`.
    ///
    /// # Errors
    ///
    /// Returns [`CleaningError::ColumnNotFound`] if any required column is
    /// absent. Bad cell values never fail the run.
    pub fn clean(&self, df: DataFrame) -> Result<CleaningResult> {
        match self.clean_internal(df) {
            Ok(result) => {
                self.report_progress(
                    ProgressUpdate::complete("Cleaning completed successfully")
                        .with_rows(result.data.height()),
                );
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Error in data cleaning pipeline: {}", e);
                Err(e)
            }
        }
    }

    /// Load `input`, clean it, write both outputs and log statistics.
    ///
    /// Parent directories of the outputs are created as needed.
    ///
    /// # Errors
    ///
    /// Returns [`CleaningError::InputNotFound`] if `input` does not exist.
    pub fn run(
        &self,
        input: &Path,
        output_csv: &Path,
        output_xlsx: &Path,
    ) -> Result<(CleaningResult, DatasetStatistics)> {
        match self.run_internal(input, output_csv, output_xlsx) {
            Ok((result, statistics)) => {
                self.report_progress(
                    ProgressUpdate::complete("Data cleaning completed successfully")
                        .with_rows(statistics.record_count),
                );
                Ok((result, statistics))
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Error in data cleaning pipeline: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn clean_internal(&self, df: DataFrame) -> Result<CleaningResult> {
        let start_time = Instant::now();
        check_required_columns(&df)?;

        let mut summary = CleaningSummary::new(df.height(), df.width());
        let mut df = df;

        for (stage, run_stage) in ordered_stages() {
            info!("Processing {}...", stage.display_name().to_lowercase());
            self.report_progress(
                ProgressUpdate::new(stage, 0.0, format!("Processing {}", stage.display_name()))
                    .with_rows(df.height()),
            );

            let (next, report) = run_stage(df, &self.config)
                .context(format!("{} stage failed", stage.display_name()))?;
            df = next;
            if df.height() == 0 && report.rows_before > 0 {
                warn!("{} stage removed every remaining record", stage.display_name());
            }

            self.report_progress(
                ProgressUpdate::new(stage, 1.0, format!("{} done", stage.display_name()))
                    .with_rows(report.rows_after),
            );
            summary.add_stage(report);
        }

        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Cleaning finished in {} ms: {} -> {} rows",
            summary.duration_ms, summary.rows_before, summary.rows_after
        );

        Ok(CleaningResult { data: df, summary })
    }

    fn run_internal(
        &self,
        input: &Path,
        output_csv: &Path,
        output_xlsx: &Path,
    ) -> Result<(CleaningResult, DatasetStatistics)> {
        info!("Starting data cleaning pipeline for: {}", input.display());
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Loading,
            0.0,
            format!("Loading {}", input.display()),
        ));

        let df = read_table(input)?;
        info!("Dataset loaded: {} records, {} columns", df.height(), df.width());
        self.report_progress(
            ProgressUpdate::new(CleaningStage::Loading, 1.0, "Dataset loaded").with_rows(df.height()),
        );

        let mut result = self.clean_internal(df)?;
        let statistics = self.write_outputs(&mut result, output_csv, output_xlsx)?;

        log_statistics(
            &statistics,
            &output_csv.display().to_string(),
            &output_xlsx.display().to_string(),
        );
        Ok((result, statistics))
    }

    fn write_outputs(
        &self,
        result: &mut CleaningResult,
        output_csv: &Path,
        output_xlsx: &Path,
    ) -> Result<DatasetStatistics> {
        let start_time = Instant::now();
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Writing,
            0.0,
            "Writing cleaned outputs",
        ));

        write_csv(&result.data, output_csv, &self.config.timestamp_format)?;
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Writing,
            0.5,
            format!("Saved {}", output_csv.display()),
        ));

        write_spreadsheet(&result.data, output_xlsx, &self.config.sheet_name)?;
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Writing,
            1.0,
            format!("Saved {}", output_xlsx.display()),
        ));

        result.summary.duration_ms += start_time.elapsed().as_millis() as u64;
        DatasetStatistics::from_frame(&result.data)
    }
}

/// Fail fast when the input lacks a column the stages need.
///
/// `Student_ID` is accepted in place of `Student ID` so cleaned output can be
/// fed back in.
fn check_required_columns(df: &DataFrame) -> Result<()> {
    let names = df.get_column_names_str();
    for required in columns::REQUIRED {
        let present = names.contains(&required)
            || (required == columns::STUDENT_ID_RAW && names.contains(&columns::STUDENT_ID));
        if !present {
            return Err(CleaningError::ColumnNotFound(required.to_string()));
        }
    }
    Ok(())
}

/// Builder for creating a [`CleaningPipeline`] with custom configuration.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<CleaningConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the cleaning configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving stage updates.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// For reporters with their own state, use
    /// [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<CleaningPipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(CleaningPipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}

/// Clean `input` with the default configuration and write both outputs.
///
/// Returns the cleaned frame.
pub fn clean_student_data(input: &Path, output_csv: &Path, output_xlsx: &Path) -> Result<DataFrame> {
    let (result, _) = CleaningPipeline::default().run(input, output_csv, output_xlsx)?;
    Ok(result.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::CleaningStage;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn raw_frame() -> DataFrame {
        df!(
            "Timestamp" => [
                Some("2025-10-02 10:00:00"),
                Some("not a date"),
                Some("2025-10-01 09:00:00"),
                Some("2025-10-03 11:00:00"),
            ],
            "Student ID" => ["S001", "S002", " S003 ", "S004"],
            "Age" => ["21", "22", "17", "35"],
            "Gender" => [Some("Femal"), Some("Male"), None, Some("Othr")],
            "Department" => [Some("Comp Sci"), Some("Bio"), Some("Geo"), None],
            "GPA" => [Some("B"), Some("3.0"), Some("2.0"), Some("3.8")],
            "Satisfaction (1-5)" => [Some("4"), Some("5"), Some("2"), Some("3")],
            "Comments" => [Some("Comment 9: solid"), None, Some("ok"), Some("This is spam, click")]
        )
        .unwrap()
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = CleaningPipeline::builder().build().unwrap();
        assert!(pipeline.progress_reporter.is_none());
        assert_eq!(pipeline.config(), &CleaningConfig::default());
    }

    #[test]
    fn test_pipeline_builder_with_config() {
        let config = CleaningConfig::builder()
            .age_range(16.0, 70.0)
            .build()
            .unwrap();

        let pipeline = CleaningPipeline::builder().config(config).build().unwrap();

        assert_eq!(pipeline.config().age_min, 16.0);
        assert_eq!(pipeline.config().age_max, 70.0);
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let config = CleaningConfig {
            age_min: 60.0,
            age_max: 18.0,
            ..CleaningConfig::default()
        };
        assert!(CleaningPipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_clean_runs_all_stages() {
        let pipeline = CleaningPipeline::builder().build().unwrap();

        let result = pipeline.clean(raw_frame()).unwrap();

        // "not a date" and age 17 are dropped
        assert_eq!(result.data.height(), 2);
        assert_eq!(result.summary.rows_before, 4);
        assert_eq!(result.summary.rows_removed, 2);
        assert_eq!(result.summary.stages.len(), 8);
        assert_eq!(
            result.summary.stage(CleaningStage::Timestamp).unwrap().rows_removed(),
            1
        );
        assert!(result.data.column("Student_ID").is_ok());

        let comments: Vec<Option<&str>> = result
            .data
            .column("Comments")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(
            comments,
            vec![
                Some("Comment 0: solid"),
                Some("Comment 1: The course was great!")
            ]
        );
    }

    #[test]
    fn test_clean_missing_column() {
        let df = raw_frame().drop("GPA").unwrap();
        let pipeline = CleaningPipeline::default();

        let err = pipeline.clean(df).unwrap_err();

        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
        assert_eq!(err.to_string(), "Column 'GPA' not found in dataset");
    }

    #[test]
    fn test_pipeline_builder_with_progress_callback() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let pipeline = CleaningPipeline::builder()
            .on_progress(move |_update| {
                call_count_clone.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        pipeline.report_progress(ProgressUpdate::new(CleaningStage::Gpa, 0.5, "Test"));

        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clean_reports_every_stage() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = stages.clone();

        let pipeline = CleaningPipeline::builder()
            .on_progress(move |update| sink.lock().unwrap().push(update.stage))
            .build()
            .unwrap();
        pipeline.clean(raw_frame()).unwrap();

        let seen = stages.lock().unwrap();
        for stage in CleaningStage::COLUMN_STAGES {
            assert_eq!(seen.iter().filter(|s| **s == stage).count(), 2);
        }
        assert_eq!(seen.last(), Some(&CleaningStage::Complete));
    }

    #[test]
    fn test_failed_clean_reports_failure() {
        let last = Arc::new(Mutex::new(None));
        let sink = last.clone();

        let pipeline = CleaningPipeline::builder()
            .on_progress(move |update| *sink.lock().unwrap() = Some(update.stage))
            .build()
            .unwrap();
        let df = raw_frame().drop("Comments").unwrap();

        assert!(pipeline.clean(df).is_err());
        assert_eq!(*last.lock().unwrap(), Some(CleaningStage::Failed));
    }
}
