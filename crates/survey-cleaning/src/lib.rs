//! Student Survey Cleaning Library
//!
//! Cleans raw student survey exports built with Rust and Polars.
//!
//! # Overview
//!
//! The pipeline runs eight column stages in a fixed order:
//!
//! - **Timestamp**: parse, drop unparseable rows
//! - **Student ID**: rename to `Student_ID`, lower-case and trim
//! - **Age**: coerce, keep `[18, 60]`, cast to integers
//! - **Gender / Department**: map known spellings and abbreviations, fill defaults
//! - **GPA / Satisfaction**: grade conversion, linear interpolation, rounding, lower bounds
//! - **Comments**: sort by timestamp and rewrite as `Comment {i}: {content}`
//!
//! The cleaned table is written as CSV and as a single-sheet XLSX workbook.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use survey_cleaning::clean_student_data;
//! use std::path::Path;
//!
//! let df = clean_student_data(
//!     Path::new("data/raw/forms_responses_12955.csv"),
//!     Path::new("data/cleaned/cleaned_student_data.csv"),
//!     Path::new("data/cleaned/cleaned_student_data.xlsx"),
//! )?;
//! println!("{} records ready for analysis", df.height());
//! ```
//!
//! # Configuration
//!
//! Mapping tables, bounds and output settings live in [`CleaningConfig`]:
//!
//! ```rust,ignore
//! use survey_cleaning::{CleaningConfig, CleaningPipeline, ValueMapping};
//!
//! let config = CleaningConfig::builder()
//!     .age_range(17.0, 65.0)
//!     .gender_mapping(ValueMapping::new().with_value("F", "Female").with_missing("Other"))
//!     .sheet_name("Survey 2025")
//!     .build()?;
//!
//! let result = CleaningPipeline::builder()
//!     .config(config)
//!     .on_progress(|update| println!("[{:?}] {}", update.stage, update.message))
//!     .build()?
//!     .clean(df)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{CommentNormalizer, NumericCoercer, ValueMapper};
pub use config::{
    CleaningConfig, CleaningConfigBuilder, CommentRules, ConfigValidationError, MappingKey,
    ValueMapping,
};
pub use error::{CleaningError, Result as SurveyCleaningResult, ResultExt};
pub use imputers::{LinearInterpolator, interpolate_linear};
pub use pipeline::{
    CleaningPipeline, CleaningStage, ClosureProgressReporter, PipelineBuilder, ProgressReporter,
    ProgressUpdate, RangeFilter, clean_student_data,
};
pub use reporting::CleaningReport;
pub use types::{CleaningResult, CleaningSummary, DatasetStatistics, StageReport};
pub use utils::{parse_numeric_string, parse_timestamp, title_case};
