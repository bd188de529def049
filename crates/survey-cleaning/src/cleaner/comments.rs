//! Free-text comment normalization.
//!
//! Every comment is rewritten to `Comment {index}: {content}`. Comments that
//! already carry that shape keep their content and get the new index, so
//! running the normalizer over its own output only renumbers.

use super::text_column;
use crate::config::CommentRules;
use crate::error::Result;
use polars::prelude::*;

/// Rewrites the Comments column using [`CommentRules`].
pub struct CommentNormalizer<'a> {
    rules: &'a CommentRules,
}

impl<'a> CommentNormalizer<'a> {
    pub fn new(rules: &'a CommentRules) -> Self {
        Self { rules }
    }

    /// Normalize a single comment at position `index`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let rules = CommentRules::default();
    /// let normalizer = CommentNormalizer::new(&rules);
    ///
    /// assert_eq!(normalizer.normalize(7, Some("Comment 2: great class")), "Comment 7: great class");
    /// assert_eq!(normalizer.normalize(5, Some("This is spam, buy now!")), "Comment 5: The course was great!");
    /// ```
    pub fn normalize(&self, index: usize, text: Option<&str>) -> String {
        let content = match text {
            Some(t) if t.starts_with(&self.rules.spam_prefix) => self.rules.canned_text.as_str(),
            Some(t) if t.starts_with(&self.rules.comment_prefix) => match t.split_once(':') {
                Some((_, rest)) => rest.trim(),
                None => self.rules.empty_text.as_str(),
            },
            Some(t) if !t.trim().is_empty() => t.trim(),
            _ => self.rules.empty_text.as_str(),
        };
        format!("Comment {}: {}", index, content)
    }

    /// Normalize every row of `column`, using the row position as index.
    ///
    /// The frame must already be in its final order.
    pub fn apply(&self, df: &mut DataFrame, column: &str) -> Result<()> {
        let series = text_column(df, column)?;
        let normalized: Vec<String> = series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(idx, text)| self.normalize(idx, text))
            .collect();

        df.replace(column, Series::new(column.into(), normalized))?;
        Ok(())
    }
}
