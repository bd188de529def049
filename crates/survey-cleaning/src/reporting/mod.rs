//! Run statistics and reports.
//!
//! [`DatasetStatistics`](crate::types::DatasetStatistics) summarizes a cleaned
//! frame and is logged at the end of every run. [`CleaningReport`] bundles
//! the statistics with the [`CleaningSummary`](crate::types::CleaningSummary)
//! for JSON output:
//! - stdout (`--json` CLI flag)
//! - a file (`--emit-report` CLI flag)
//!
//! # Example
//!
//! ```rust,ignore
//! use survey_cleaning::reporting::CleaningReport;
//!
//! let report = CleaningReport::new(&input, &csv, &xlsx, result.summary, stats);
//! println!("{}", report.to_json()?);
//! ```

mod report;
mod statistics;

pub use report::CleaningReport;
pub use statistics::log_statistics;
