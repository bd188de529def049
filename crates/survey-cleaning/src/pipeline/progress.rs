//! Progress reporting for the cleaning pipeline.
//!
//! The pipeline reports every stage boundary to an optional
//! [`ProgressReporter`]. This is the hook for callers that want more than
//! the `tracing` output, e.g. a progress bar or a test probe.
//!
//! # Example
//!
//! ```rust,ignore
//! use survey_cleaning::CleaningPipeline;
//!
//! let result = CleaningPipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}: {}", update.progress * 100.0, update.stage.display_name(), update.message);
//!     })
//!     .build()?
//!     .clean(df)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the cleaning pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// Reading the raw export
    Loading,
    /// Parsing timestamps, dropping unparseable rows
    Timestamp,
    /// Renaming and normalizing student identifiers
    StudentId,
    /// Coercing and range-checking ages
    Age,
    /// Mapping gender spellings
    Gender,
    /// Expanding department abbreviations
    Department,
    /// Converting grades, imputing and filtering GPA
    Gpa,
    /// Imputing and filtering satisfaction scores
    Satisfaction,
    /// Sorting by timestamp and normalizing comments
    Comments,
    /// Writing the CSV and spreadsheet outputs
    Writing,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl CleaningStage {
    /// The eight column stages, in the order they must run.
    pub const COLUMN_STAGES: [CleaningStage; 8] = [
        Self::Timestamp,
        Self::StudentId,
        Self::Age,
        Self::Gender,
        Self::Department,
        Self::Gpa,
        Self::Satisfaction,
        Self::Comments,
    ];

    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Timestamp => "Timestamps",
            Self::StudentId => "Student IDs",
            Self::Age => "Ages",
            Self::Gender => "Gender",
            Self::Department => "Departments",
            Self::Gpa => "GPA",
            Self::Satisfaction => "Satisfaction",
            Self::Comments => "Comments",
            Self::Writing => "Writing Outputs",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall run attributed to this stage.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.10,
            Self::Writing => 0.18,
            Self::Complete | Self::Failed => 0.0,
            // column stages split the remainder evenly
            _ => 0.09,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Writing => 0.82,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
            column_stage => {
                let position = Self::COLUMN_STAGES
                    .iter()
                    .position(|s| s == column_stage)
                    .unwrap_or(0);
                0.10 + 0.09 * position as f32
            }
        }
    }
}

/// A progress notification sent at stage boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: CleaningStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,

    /// Row count at the time of the update, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
}

impl ProgressUpdate {
    pub fn new(stage: CleaningStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
            rows: None,
        }
    }

    /// Attach the current row count.
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
            rows: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
            rows: None,
        }
    }
}

/// Receives progress updates from the pipeline.
///
/// Implementations must be `Send + Sync` so a pipeline holding one can be
/// moved to a worker thread.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
