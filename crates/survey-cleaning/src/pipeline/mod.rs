//! Pipeline module.
//!
//! This module provides the cleaning pipeline, its ordered column stages
//! and the row filters they use.

mod builder;
pub mod filters;
pub mod progress;
pub mod stages;

pub use builder::{CleaningPipeline, PipelineBuilder, clean_student_data};
pub use filters::RangeFilter;
pub use progress::{
    CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
pub use stages::{StageFn, ordered_stages};
