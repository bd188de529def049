//! Configuration types for the survey cleaning pipeline.
//!
//! The mapping tables, bounds and canned texts used by the cleaning stages
//! live here as immutable data owned by the pipeline. Use
//! [`CleaningConfig::builder()`] to override individual pieces, or load a
//! JSON document with [`CleaningConfig::from_json_file`].

use crate::error::{CleaningError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Excel refuses sheet names longer than this.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Upper bound for `decimal_places`; an f64 carries about 15 decimal digits.
pub const MAX_DECIMAL_PLACES: u32 = 15;

/// Characters Excel does not allow in a sheet name.
const INVALID_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Key used to look up a cell in a [`ValueMapping`].
///
/// `Missing` never compares equal to any `Value`, including the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingKey<'a> {
    Missing,
    Value(&'a str),
}

impl<'a> From<Option<&'a str>> for MappingKey<'a> {
    fn from(cell: Option<&'a str>) -> Self {
        match cell {
            Some(v) => MappingKey::Value(v),
            None => MappingKey::Missing,
        }
    }
}

/// Exact-match replacement table for a text column.
///
/// # Example
///
/// ```rust,ignore
/// use survey_cleaning::config::{MappingKey, ValueMapping};
///
/// let mapping = ValueMapping::new()
///     .with_value("Femal", "Female")
///     .with_missing("Other");
///
/// assert_eq!(mapping.lookup(MappingKey::Value("Femal")), Some("Female"));
/// assert_eq!(mapping.lookup(MappingKey::Missing), Some("Other"));
/// assert_eq!(mapping.lookup(MappingKey::Value("Female")), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueMapping {
    /// Raw value -> replacement.
    #[serde(default)]
    pub values: BTreeMap<String, String>,

    /// Replacement for a missing cell, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<String>,
}

impl ValueMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw value replacement.
    pub fn with_value(mut self, raw: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.values.insert(raw.into(), replacement.into());
        self
    }

    /// Set the replacement for missing cells.
    pub fn with_missing(mut self, replacement: impl Into<String>) -> Self {
        self.missing = Some(replacement.into());
        self
    }

    /// Build a mapping whose replacements are numbers rendered as text.
    pub fn from_numeric(scale: &BTreeMap<String, f64>) -> Self {
        Self {
            values: scale
                .iter()
                .map(|(raw, value)| (raw.clone(), value.to_string()))
                .collect(),
            missing: None,
        }
    }

    /// Look up the replacement for a cell.
    pub fn lookup(&self, key: MappingKey<'_>) -> Option<&str> {
        match key {
            MappingKey::Missing => self.missing.as_deref(),
            MappingKey::Value(raw) => self.values.get(raw).map(String::as_str),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len() + usize::from(self.missing.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Texts used by the comment normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentRules {
    /// Comments starting with this prefix are treated as spam.
    pub spam_prefix: String,

    /// Prefix of comments that were already normalized once.
    pub comment_prefix: String,

    /// Content substituted for spam, and used to pre-fill missing comments.
    pub canned_text: String,

    /// Content used when nothing usable remains.
    pub empty_text: String,
}

impl Default for CommentRules {
    fn default() -> Self {
        Self {
            spam_prefix: "This is spam".to_string(),
            comment_prefix: "Comment".to_string(),
            canned_text: "The course was great!".to_string(),
            empty_text: "No comment".to_string(),
        }
    }
}

/// Configuration for the cleaning pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use survey_cleaning::config::CleaningConfig;
///
/// let config = CleaningConfig::builder()
///     .age_range(16.0, 70.0)
///     .sheet_name("Survey 2025")
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Typo corrections for the Gender column.
    pub gender_mapping: ValueMapping,

    /// Fill for Gender cells still missing after mapping.
    /// Default: "Other"
    pub gender_default: String,

    /// Abbreviation expansions for the Department column.
    pub department_mapping: ValueMapping,

    /// Fill for Department cells still missing after mapping.
    /// Default: "Undeclared"
    pub department_default: String,

    /// Letter grade -> GPA points.
    pub grade_scale: BTreeMap<String, f64>,

    /// Inclusive lower bound for Age. Default: 18
    pub age_min: f64,

    /// Inclusive upper bound for Age. Default: 60
    pub age_max: f64,

    /// Inclusive lower bound for GPA. Default: 1.0
    pub gpa_min: f64,

    /// Inclusive lower bound for Satisfaction. Default: 1.0
    pub satisfaction_min: f64,

    /// Decimal places kept for GPA and Satisfaction. Default: 2
    pub decimal_places: u32,

    /// Comment normalization texts.
    pub comments: CommentRules,

    /// Worksheet name in the spreadsheet output.
    /// Default: "Cleaned Student Data"
    pub sheet_name: String,

    /// strftime format for timestamps in the CSV output.
    pub timestamp_format: String,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            gender_mapping: default_gender_mapping(),
            gender_default: "Other".to_string(),
            department_mapping: default_department_mapping(),
            department_default: "Undeclared".to_string(),
            grade_scale: default_grade_scale(),
            age_min: 18.0,
            age_max: 60.0,
            gpa_min: 1.0,
            satisfaction_min: 1.0,
            decimal_places: 2,
            comments: CommentRules::default(),
            sheet_name: "Cleaned Student Data".to_string(),
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}

fn default_gender_mapping() -> ValueMapping {
    ValueMapping::new()
        .with_value("Femal", "Female")
        .with_value("Malee", "Male")
        .with_value("Othr", "Other")
        .with_missing("Other")
}

fn default_department_mapping() -> ValueMapping {
    [
        ("Marine Sci", "Marine Sciences"),
        ("Geo", "Geosciences"),
        ("Biochem", "Biochemistry"),
        ("Maths", "Mathematics"),
        ("Phys", "Physics"),
        ("Bio", "Biology"),
        ("Cell Bio", "Cell Biology and Genetics"),
        ("Chem", "Chemistry"),
        ("Geophy", "Geophysics"),
        ("Zoo", "Zoology"),
        ("Microbio", "Microbiology"),
        ("Comp Sci", "Computer Science"),
    ]
    .into_iter()
    .fold(ValueMapping::new().with_missing("Undeclared"), |m, (raw, full)| {
        m.with_value(raw, full)
    })
}

fn default_grade_scale() -> BTreeMap<String, f64> {
    [("A", 4.5), ("B", 3.5), ("C", 3.0), ("D", 2.5), ("F", 1.5)]
        .into_iter()
        .map(|(grade, points)| (grade.to_string(), points))
        .collect()
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Load a configuration from a JSON file.
    ///
    /// Fields absent from the document keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: CleaningConfig = serde_json::from_str(&content)?;
        config
            .validate()
            .map_err(|e| CleaningError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        for (field, value) in [
            ("age_min", self.age_min),
            ("age_max", self.age_max),
            ("gpa_min", self.gpa_min),
            ("satisfaction_min", self.satisfaction_min),
        ] {
            if !value.is_finite() {
                return Err(ConfigValidationError::NonFiniteBound {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if self.age_min > self.age_max {
            return Err(ConfigValidationError::InvalidRange {
                min: self.age_min,
                max: self.age_max,
            });
        }

        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(ConfigValidationError::TooManyDecimalPlaces {
                value: self.decimal_places,
                max: MAX_DECIMAL_PLACES,
            });
        }

        if self.grade_scale.values().any(|points| !points.is_finite()) {
            return Err(ConfigValidationError::InvalidGradeScale);
        }

        if self.sheet_name.trim().is_empty()
            || self.sheet_name.chars().count() > MAX_SHEET_NAME_LEN
            || self.sheet_name.contains(INVALID_SHEET_CHARS)
        {
            return Err(ConfigValidationError::InvalidSheetName(
                self.sheet_name.clone(),
            ));
        }

        if self.comments.spam_prefix.is_empty() || self.comments.comment_prefix.is_empty() {
            return Err(ConfigValidationError::EmptyCommentPrefix);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid bound for '{field}': {value} (must be finite)")]
    NonFiniteBound { field: String, value: f64 },

    #[error("Invalid age range: min {min} is greater than max {max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("Invalid decimal_places {value} (at most {max})")]
    TooManyDecimalPlaces { value: u32, max: u32 },

    #[error("Grade scale contains a non-finite value")]
    InvalidGradeScale,

    #[error("Invalid sheet name '{0}' (1-31 characters, none of []:*?/\\)")]
    InvalidSheetName(String),

    #[error("Comment prefixes must not be empty")]
    EmptyCommentPrefix,
}

impl From<ConfigValidationError> for CleaningError {
    fn from(e: ConfigValidationError) -> Self {
        CleaningError::InvalidConfig(e.to_string())
    }
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    gender_mapping: Option<ValueMapping>,
    gender_default: Option<String>,
    department_mapping: Option<ValueMapping>,
    department_default: Option<String>,
    grade_scale: Option<BTreeMap<String, f64>>,
    age_range: Option<(f64, f64)>,
    gpa_min: Option<f64>,
    satisfaction_min: Option<f64>,
    decimal_places: Option<u32>,
    comments: Option<CommentRules>,
    sheet_name: Option<String>,
    timestamp_format: Option<String>,
}

impl CleaningConfigBuilder {
    /// Replace the Gender mapping table.
    pub fn gender_mapping(mut self, mapping: ValueMapping) -> Self {
        self.gender_mapping = Some(mapping);
        self
    }

    /// Set the fill for Gender cells still missing after mapping.
    pub fn gender_default(mut self, value: impl Into<String>) -> Self {
        self.gender_default = Some(value.into());
        self
    }

    /// Replace the Department mapping table.
    pub fn department_mapping(mut self, mapping: ValueMapping) -> Self {
        self.department_mapping = Some(mapping);
        self
    }

    /// Set the fill for Department cells still missing after mapping.
    pub fn department_default(mut self, value: impl Into<String>) -> Self {
        self.department_default = Some(value.into());
        self
    }

    /// Replace the letter grade scale.
    pub fn grade_scale(mut self, scale: BTreeMap<String, f64>) -> Self {
        self.grade_scale = Some(scale);
        self
    }

    /// Set the inclusive Age range.
    pub fn age_range(mut self, min: f64, max: f64) -> Self {
        self.age_range = Some((min, max));
        self
    }

    /// Set the inclusive GPA lower bound.
    pub fn gpa_min(mut self, min: f64) -> Self {
        self.gpa_min = Some(min);
        self
    }

    /// Set the inclusive Satisfaction lower bound.
    pub fn satisfaction_min(mut self, min: f64) -> Self {
        self.satisfaction_min = Some(min);
        self
    }

    /// Set the number of decimals kept after imputation.
    pub fn decimal_places(mut self, places: u32) -> Self {
        self.decimal_places = Some(places);
        self
    }

    /// Replace the comment normalization texts.
    pub fn comments(mut self, rules: CommentRules) -> Self {
        self.comments = Some(rules);
        self
    }

    /// Set the spreadsheet worksheet name.
    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    /// Set the strftime format used for timestamps in the CSV output.
    pub fn timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = Some(format.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<CleaningConfig, ConfigValidationError> {
        let defaults = CleaningConfig::default();
        let (age_min, age_max) = self
            .age_range
            .unwrap_or((defaults.age_min, defaults.age_max));

        let config = CleaningConfig {
            gender_mapping: self.gender_mapping.unwrap_or(defaults.gender_mapping),
            gender_default: self.gender_default.unwrap_or(defaults.gender_default),
            department_mapping: self
                .department_mapping
                .unwrap_or(defaults.department_mapping),
            department_default: self
                .department_default
                .unwrap_or(defaults.department_default),
            grade_scale: self.grade_scale.unwrap_or(defaults.grade_scale),
            age_min,
            age_max,
            gpa_min: self.gpa_min.unwrap_or(defaults.gpa_min),
            satisfaction_min: self.satisfaction_min.unwrap_or(defaults.satisfaction_min),
            decimal_places: self.decimal_places.unwrap_or(defaults.decimal_places),
            comments: self.comments.unwrap_or(defaults.comments),
            sheet_name: self.sheet_name.unwrap_or(defaults.sheet_name),
            timestamp_format: self.timestamp_format.unwrap_or(defaults.timestamp_format),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CleaningConfig::default();
        assert_eq!(config.age_min, 18.0);
        assert_eq!(config.age_max, 60.0);
        assert_eq!(config.gpa_min, 1.0);
        assert_eq!(config.sheet_name, "Cleaned Student Data");
        assert_eq!(config.grade_scale.get("B"), Some(&3.5));
        assert_eq!(config.department_mapping.len(), 13);
    }

    #[test]
    fn test_missing_key_is_distinct_from_empty_string() {
        let config = CleaningConfig::default();
        let mapping = &config.gender_mapping;
        assert_eq!(mapping.lookup(MappingKey::Missing), Some("Other"));
        assert_eq!(mapping.lookup(MappingKey::Value("")), None);
    }

    #[test]
    fn test_mapping_lookup() {
        let config = CleaningConfig::default();
        let departments = &config.department_mapping;
        assert_eq!(
            departments.lookup(MappingKey::Value("Cell Bio")),
            Some("Cell Biology and Genetics")
        );
        assert_eq!(departments.lookup(MappingKey::Value("Physics")), None);
        assert_eq!(departments.lookup(MappingKey::Value("phys")), None);
    }

    #[test]
    fn test_from_numeric_mapping() {
        let mapping = ValueMapping::from_numeric(&default_grade_scale());
        assert_eq!(mapping.lookup(MappingKey::Value("A")), Some("4.5"));
        assert_eq!(mapping.lookup(MappingKey::Value("C")), Some("3"));
        assert_eq!(mapping.lookup(MappingKey::Missing), None);
    }

    #[test]
    fn test_builder_defaults() {
        let config = CleaningConfig::builder().build().unwrap();
        assert_eq!(config, CleaningConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = CleaningConfig::builder()
            .age_range(16.0, 70.0)
            .gpa_min(0.5)
            .gender_default("Unspecified")
            .sheet_name("Survey")
            .build()
            .unwrap();

        assert_eq!(config.age_min, 16.0);
        assert_eq!(config.age_max, 70.0);
        assert_eq!(config.gpa_min, 0.5);
        assert_eq!(config.gender_default, "Unspecified");
        assert_eq!(config.sheet_name, "Survey");
    }

    #[test]
    fn test_validation_inverted_age_range() {
        let result = CleaningConfig::builder().age_range(60.0, 18.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidRange { .. }
        ));
    }

    #[test]
    fn test_validation_non_finite_bound() {
        let result = CleaningConfig::builder().gpa_min(f64::NAN).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::NonFiniteBound { .. }
        ));
    }

    #[test]
    fn test_validation_decimal_places() {
        assert!(
            CleaningConfig::builder()
                .decimal_places(MAX_DECIMAL_PLACES)
                .build()
                .is_ok()
        );
        assert!(matches!(
            CleaningConfig::builder().decimal_places(400).build().unwrap_err(),
            ConfigValidationError::TooManyDecimalPlaces { value: 400, max: 15 }
        ));

        let config: CleaningConfig = serde_json::from_str(r#"{ "decimal_places": 16 }"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_sheet_name() {
        assert!(CleaningConfig::builder().sheet_name("a/b").build().is_err());
        assert!(CleaningConfig::builder().sheet_name("").build().is_err());
        assert!(
            CleaningConfig::builder()
                .sheet_name("x".repeat(32))
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_config_serialization() {
        let config = CleaningConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: CleaningConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "age_min": 17,
            "department_mapping": {
                "values": { "CS": "Computer Science" },
                "missing": "Unknown"
            }
        }"#;

        let config: CleaningConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.age_min, 17.0);
        assert_eq!(config.age_max, 60.0);
        assert_eq!(
            config.department_mapping.lookup(MappingKey::Value("CS")),
            Some("Computer Science")
        );
        assert_eq!(
            config.department_mapping.lookup(MappingKey::Missing),
            Some("Unknown")
        );
        assert_eq!(config.gender_mapping, default_gender_mapping());
    }
}
