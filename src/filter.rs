//! Selecting changes by location.
//!
//! Every [`ChangeRecord`] carries a structured path: the section key followed
//! by channel, locale, field and currency where they apply. Patterns are
//! matched against that path, not against the human-readable label.
//!
//! # Pattern Syntax
//!
//! - `common.sku` - the `sku` common field
//! - `*` - any single path segment
//! - `**` - any number of path segments (including zero)
//! - `channel_specific.web.**` - every amount on the `web` channel
//! - `**.USD` - every USD amount in either channel section
//!
//! # Examples
//!
//! ```
//! use pvdiff::filter::PathPattern;
//!
//! let pattern = PathPattern::parse("channel_locale_specific.*.en.**");
//! let path: Vec<String> = ["channel_locale_specific", "web", "en", "name"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! assert!(pattern.matches(&path));
//! ```

use crate::diff::{ChangeRecord, ChangeSet};
use crate::error::PvdiffError;

/// A single segment in a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    Literal(String),
    /// `*`
    SingleWildcard,
    /// `**`
    DoubleWildcard,
}

/// A compiled pattern over [`ChangeRecord::path`].
#[derive(Debug, Clone)]
pub struct PathPattern {
    pub segments: Vec<PatternSegment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('.')
            .map(|s| match s {
                "**" => PatternSegment::DoubleWildcard,
                "*" => PatternSegment::SingleWildcard,
                _ => PatternSegment::Literal(s.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// Like [`PathPattern::parse`], but rejects blank patterns and empty
    /// segments such as `common..sku`.
    pub fn try_parse(pattern: &str) -> Result<Self, PvdiffError> {
        if pattern.trim().is_empty() {
            return Err(PvdiffError::config("filter pattern is empty"));
        }
        if pattern.split('.').any(str::is_empty) {
            return Err(PvdiffError::config(format!(
                "filter pattern '{}' has an empty segment",
                pattern
            )));
        }
        Ok(Self::parse(pattern))
    }

    pub fn matches(&self, path: &[String]) -> bool {
        matches_segments(&self.segments, path)
    }
}

fn matches_segments(pattern: &[PatternSegment], path: &[String]) -> bool {
    match (pattern.first(), path.first()) {
        (None, None) => true,
        (None, Some(_)) => false,
        (Some(_), None) => pattern
            .iter()
            .all(|s| matches!(s, PatternSegment::DoubleWildcard)),
        (Some(seg), Some(path_seg)) => match seg {
            PatternSegment::Literal(lit) => {
                lit == path_seg && matches_segments(&pattern[1..], &path[1..])
            }
            PatternSegment::SingleWildcard => matches_segments(&pattern[1..], &path[1..]),
            PatternSegment::DoubleWildcard => {
                matches_segments(&pattern[1..], path) || matches_segments(pattern, &path[1..])
            }
        },
    }
}

/// Which changes to keep.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Changes matching any of these are dropped.
    pub ignore_patterns: Vec<PathPattern>,
    /// If non-empty, only changes matching one of these are kept.
    pub only_patterns: Vec<PathPattern>,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a filter from raw CLI patterns, validating each one.
    pub fn from_patterns(ignore: &[String], only: &[String]) -> Result<Self, PvdiffError> {
        let ignore_patterns = ignore
            .iter()
            .map(|p| PathPattern::try_parse(p))
            .collect::<Result<Vec<_>, _>>()?;
        let only_patterns = only
            .iter()
            .map(|p| PathPattern::try_parse(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            ignore_patterns,
            only_patterns,
        })
    }

    pub fn ignore(mut self, pattern: &str) -> Self {
        self.ignore_patterns.push(PathPattern::parse(pattern));
        self
    }

    pub fn only(mut self, pattern: &str) -> Self {
        self.only_patterns.push(PathPattern::parse(pattern));
        self
    }

    pub fn has_filters(&self) -> bool {
        !self.ignore_patterns.is_empty() || !self.only_patterns.is_empty()
    }

    pub fn should_include(&self, record: &ChangeRecord) -> bool {
        if self.ignore_patterns.iter().any(|p| p.matches(&record.path)) {
            return false;
        }

        self.only_patterns.is_empty() || self.only_patterns.iter().any(|p| p.matches(&record.path))
    }
}

/// Returns the changes selected by `config`, in their original order.
pub fn filter_changes(changes: &ChangeSet, config: &FilterConfig) -> ChangeSet {
    if !config.has_filters() {
        return changes.clone();
    }

    let filtered: ChangeSet = changes
        .iter()
        .filter(|record| config.should_include(record))
        .cloned()
        .collect();

    tracing::debug!(
        before = changes.len(),
        after = filtered.len(),
        "filtered change set"
    );
    filtered
}
