//! PVDIFF - field-level audit diff for product values documents.
//!
//! A product values document groups a product's editable attributes into
//! four sections: `common` fields, `categories`, `channel_specific` fields
//! and `channel_locale_specific` fields, where money fields hold one amount
//! per currency. This library compares two snapshots of such a document and
//! reports every changed field under a human-readable label such as
//! `"price (USD) - web/en"`, ready to be stored as an audit history entry.
//!
//! Diffing never fails: absent or undecodable snapshots are read as empty
//! documents.
//!
//! # Example
//!
//! ```
//! use pvdiff::diff;
//!
//! let old = r#"{"channel_locale_specific": {"web": {"en": {}}}}"#;
//! let new = r#"{"channel_locale_specific": {"web": {"en": {"name": "Shoe"}}}}"#;
//!
//! let changes = diff(Some(old), Some(new));
//! assert_eq!(changes.len(), 1);
//!
//! let record = changes.get("name - web/en").unwrap();
//! assert_eq!(record.old.as_text(), "");
//! assert_eq!(record.new.as_text(), "Shoe");
//! ```

pub mod diff;
pub mod document;
pub mod error;
pub mod filter;
pub mod output;
pub mod parser;

// Re-export commonly used types for convenience
pub use diff::{diff, diff_documents, diff_raw, ChangeRecord, ChangeSet, SectionStats};
pub use document::{FieldMap, FieldValue, ProductValues, Scalar, Section};
pub use error::{OutputError, ParseError, PvdiffError};
pub use filter::{filter_changes, FilterConfig, PathPattern};
pub use output::{format_changes, OutputFormat, OutputOptions};
pub use parser::{
    document_from_raw, document_from_value, parse_content, parse_document, parse_file,
    parse_json, parse_stdin, parse_toml, parse_yaml, FormatHint,
};
