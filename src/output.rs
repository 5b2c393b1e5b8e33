//! Rendering change sets for terminals, pipes and history storage.
//!
//! # Examples
//!
//! ```
//! use pvdiff::{diff, format_changes, OutputFormat, OutputOptions};
//!
//! let changes = diff(
//!     Some(r#"{"common": {"sku": "A1"}}"#),
//!     Some(r#"{"common": {"sku": "A2"}}"#),
//! );
//!
//! let output = format_changes(&changes, &OutputFormat::Plain, &OutputOptions::default()).unwrap();
//! assert!(output.contains(r#"sku: "A1" → "A2""#));
//! ```

use crate::diff::{ChangeRecord, ChangeSet, SectionStats};
use crate::document::Section;
use crate::error::OutputError;
use colored::*;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Colored terminal output with ANSI escape codes
    Terminal,
    /// History entry map `{label: {name, old, new}}`
    Json,
    /// Plain text, no colors (suitable for piping)
    Plain,
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Maximum length for displayed values (truncate if longer)
    pub max_value_length: usize,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            max_value_length: 80,
        }
    }
}

pub fn format_changes(
    changes: &ChangeSet,
    format: &OutputFormat,
    options: &OutputOptions,
) -> Result<String, OutputError> {
    match format {
        OutputFormat::Terminal => Ok(format_lines(changes, options, true)),
        OutputFormat::Json => format_json(changes),
        OutputFormat::Plain => Ok(format_lines(changes, options, false)),
    }
}

fn format_lines(changes: &ChangeSet, options: &OutputOptions, colored: bool) -> String {
    if changes.is_empty() {
        let message = "No changes detected.";
        return if colored {
            message.dimmed().to_string()
        } else {
            message.to_string()
        };
    }

    let mut output = String::new();
    for record in changes {
        let line = if colored {
            format_record_terminal(record, options)
        } else {
            format_record_plain(record, options)
        };
        output.push_str(&line);
        output.push('\n');
    }

    output.push('\n');
    output.push_str(&format_summary(&changes.stats()));
    output
}

fn format_record_terminal(record: &ChangeRecord, options: &OutputOptions) -> String {
    let old_value = record.old.preview(options.max_value_length);
    let new_value = record.new.preview(options.max_value_length);

    format!(
        "{} {}: {} {} {}",
        "•".bright_yellow(),
        record.label.yellow(),
        old_value.red(),
        "→".bright_yellow(),
        new_value.green()
    )
}

fn format_record_plain(record: &ChangeRecord, options: &OutputOptions) -> String {
    format!(
        "• {}: {} → {}",
        record.label,
        record.old.preview(options.max_value_length),
        record.new.preview(options.max_value_length)
    )
}

fn format_json(changes: &ChangeSet) -> Result<String, OutputError> {
    serde_json::to_string_pretty(changes)
        .map_err(|e| OutputError::JsonSerializationError { source: e })
}

/// `Summary: 3 changes (1 common, 2 channel-specific)`
fn format_summary(stats: &SectionStats) -> String {
    if stats.is_empty() {
        return "Summary: No changes".to_string();
    }

    let parts: Vec<String> = Section::ALL
        .iter()
        .filter(|section| stats.count(**section) > 0)
        .map(|section| format!("{} {}", stats.count(*section), section.display_name()))
        .collect();

    let total = stats.total();
    let noun = if total == 1 { "change" } else { "changes" };
    format!("Summary: {} {} ({})", total, noun, parts.join(", "))
}
