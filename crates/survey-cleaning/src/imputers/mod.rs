//! Imputation module for handling missing values.
//!
//! Only positional linear interpolation is provided; missing values that
//! cannot be interpolated are left for the range filters to drop.

mod interpolation;

pub use interpolation::{LinearInterpolator, interpolate_linear};
