use crate::pipeline::CleaningStage;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Column names of the survey export.
pub mod columns {
    pub const TIMESTAMP: &str = "Timestamp";
    /// Name of the identifier column in the raw export.
    pub const STUDENT_ID_RAW: &str = "Student ID";
    /// Name of the identifier column after cleaning.
    pub const STUDENT_ID: &str = "Student_ID";
    pub const AGE: &str = "Age";
    pub const GENDER: &str = "Gender";
    pub const DEPARTMENT: &str = "Department";
    pub const GPA: &str = "GPA";
    pub const SATISFACTION: &str = "Satisfaction (1-5)";
    pub const COMMENTS: &str = "Comments";

    /// Columns the raw export must contain.
    pub const REQUIRED: [&str; 8] = [
        TIMESTAMP,
        STUDENT_ID_RAW,
        AGE,
        GENDER,
        DEPARTMENT,
        GPA,
        SATISFACTION,
        COMMENTS,
    ];
}

/// What a single stage did to the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: CleaningStage,
    pub rows_before: usize,
    pub rows_after: usize,
    /// Cells replaced through a mapping table or a default fill.
    pub values_mapped: usize,
    /// Cells filled by interpolation.
    pub values_imputed: usize,
    /// Cells that failed to parse and became missing.
    pub values_coerced_to_missing: usize,
}

impl StageReport {
    pub fn new(stage: CleaningStage, rows_before: usize) -> Self {
        Self {
            stage,
            rows_before,
            rows_after: rows_before,
            values_mapped: 0,
            values_imputed: 0,
            values_coerced_to_missing: 0,
        }
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// Aggregate of all stage reports for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,
    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_removed: usize,
    pub columns: usize,
    pub stages: Vec<StageReport>,
}

impl CleaningSummary {
    pub fn new(rows_before: usize, columns: usize) -> Self {
        Self {
            rows_before,
            rows_after: rows_before,
            columns,
            ..Default::default()
        }
    }

    pub fn add_stage(&mut self, report: StageReport) {
        self.rows_after = report.rows_after;
        self.rows_removed = self.rows_before.saturating_sub(self.rows_after);
        self.stages.push(report);
    }

    pub fn stage(&self, stage: CleaningStage) -> Option<&StageReport> {
        self.stages.iter().find(|r| r.stage == stage)
    }
}

/// Headline statistics of a cleaned dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStatistics {
    pub record_count: usize,
    /// First and last response date (`YYYY-MM-DD`).
    pub date_range: Option<(String, String)>,
    pub age_range: Option<(i64, i64)>,
    pub mean_gpa: Option<f64>,
    pub mean_satisfaction: Option<f64>,
}

/// Output of [`CleaningPipeline::clean`](crate::CleaningPipeline::clean).
#[derive(Debug, Clone)]
pub struct CleaningResult {
    pub data: DataFrame,
    pub summary: CleaningSummary,
}
