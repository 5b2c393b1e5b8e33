//! Decoding product values snapshots into [`ProductValues`].
//!
//! Two entry styles are provided:
//!
//! - [`parse_document`] and [`document_from_raw`] are lenient. Anything that
//!   does not decode becomes an empty document. This is what the diff path
//!   uses, so a broken snapshot can never block an audit entry.
//! - [`parse_file`], [`parse_content`], [`parse_json`], [`parse_yaml`] and
//!   [`parse_toml`] are strict and report syntax errors. The CLI uses them
//!   unless `--lenient` is given.
//!
//! YAML and TOML snapshots are converted to the same JSON value tree before
//! normalization, so all formats share one set of shape rules.
//!
//! # Examples
//!
//! ```
//! use pvdiff::parser::parse_document;
//!
//! let doc = parse_document(Some(r#"{"common": {"sku": "A1"}}"#));
//! assert_eq!(doc.common["sku"].as_text(), "A1");
//!
//! assert!(parse_document(Some("not json")).is_empty());
//! assert!(parse_document(None).is_empty());
//! ```

use crate::document::{FieldMap, FieldValue, ProductValues, Scalar, Section};
use crate::error::ParseError;
use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Format of a snapshot being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    Json,
    Yaml,
    Toml,
    /// Try JSON, then YAML, then TOML.
    Auto,
}

impl FormatHint {
    /// Detects the format from a file extension.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase());

        match extension.as_deref() {
            Some("json") => FormatHint::Json,
            Some("yaml") | Some("yml") => FormatHint::Yaml,
            Some("toml") => FormatHint::Toml,
            _ => FormatHint::Auto,
        }
    }
}

/// Decodes an encoded document, falling back to an empty document.
///
/// `None`, blank input, invalid JSON and JSON whose top level is not an
/// object all yield [`ProductValues::default()`]. This never fails.
pub fn parse_document(raw: Option<&str>) -> ProductValues {
    let Some(raw) = raw else {
        return ProductValues::default();
    };
    if raw.trim().is_empty() {
        return ProductValues::default();
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(value) => document_from_value(value),
        Err(err) => {
            tracing::debug!(error = %err, "undecodable product values, treating as empty");
            ProductValues::default()
        }
    }
}

/// Decodes an untyped stored value. Only a JSON string holding encoded text
/// is decoded; any other value yields an empty document.
pub fn document_from_raw(raw: &Value) -> ProductValues {
    match raw {
        Value::String(text) => parse_document(Some(text.as_str())),
        Value::Null => ProductValues::default(),
        other => {
            tracing::debug!(kind = value_kind(other), "non-text product values, treating as empty");
            ProductValues::default()
        }
    }
}

/// Normalizes a decoded JSON value into a [`ProductValues`] document.
///
/// Containers are read the way the catalog writes them: objects in key
/// order, arrays with their indexes as keys. A scalar where a container is
/// expected reads as empty; a container where a scalar is expected reads as
/// its compact JSON text.
pub fn document_from_value(value: Value) -> ProductValues {
    let Value::Object(mut root) = value else {
        tracing::debug!("product values top level is not an object, treating as empty");
        return ProductValues::default();
    };

    let mut doc = ProductValues::default();

    if let Some(common) = root.remove(Section::Common.key()) {
        doc.common = entries(common)
            .into_iter()
            .map(|(field, v)| (field, to_scalar(v)))
            .collect();
    }

    if let Some(categories) = root.remove(Section::Categories.key()) {
        doc.categories = entries(categories)
            .into_iter()
            .map(|(_, v)| to_scalar(v))
            .collect();
    }

    if let Some(channels) = root.remove(Section::ChannelSpecific.key()) {
        doc.channel_specific = entries(channels)
            .into_iter()
            .map(|(channel, fields)| (channel, to_field_map(fields)))
            .collect();
    }

    if let Some(channels) = root.remove(Section::ChannelLocaleSpecific.key()) {
        doc.channel_locale_specific = entries(channels)
            .into_iter()
            .map(|(channel, locales)| {
                let locales: IndexMap<String, FieldMap> = entries(locales)
                    .into_iter()
                    .map(|(locale, fields)| (locale, to_field_map(fields)))
                    .collect();
                (channel, locales)
            })
            .collect();
    }

    doc
}

/// Parses a snapshot file, detecting the format by extension.
///
/// # Errors
///
/// - `ParseError::FileNotFound` if the file does not exist
/// - `ParseError::ReadError` if the file cannot be read
/// - `ParseError::JsonError` / `YamlError` / `TomlError` on invalid content
/// - `ParseError::UnknownFormat` if no format accepts the content
pub fn parse_file(path: &Path) -> Result<ProductValues, ParseError> {
    let label = path.to_string_lossy().to_string();

    if !path.exists() {
        return Err(ParseError::file_not_found(label));
    }

    let content = fs::read_to_string(path).map_err(|e| ParseError::read_error(&label, e))?;
    tracing::debug!(path = %label, bytes = content.len(), "read snapshot");

    parse_labeled(&content, FormatHint::from_path(path), &label)
}

/// Parses a snapshot read from stdin.
pub fn parse_stdin(hint: FormatHint) -> Result<ProductValues, ParseError> {
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .map_err(|e| ParseError::read_error("<stdin>", e))?;

    parse_labeled(&content, hint, "<stdin>")
}

/// Parses snapshot content of the given format.
pub fn parse_content(content: &str, hint: FormatHint) -> Result<ProductValues, ParseError> {
    parse_labeled(content, hint, "<input>")
}

/// Parses a JSON snapshot.
pub fn parse_json(content: &str) -> Result<ProductValues, serde_json::Error> {
    let value: Value = serde_json::from_str(content)?;
    Ok(document_from_value(value))
}

/// Parses a YAML snapshot.
pub fn parse_yaml(content: &str) -> Result<ProductValues, serde_yaml::Error> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)?;
    Ok(document_from_value(yaml_to_json(value)))
}

/// Parses a TOML snapshot.
pub fn parse_toml(content: &str) -> Result<ProductValues, toml::de::Error> {
    let value: toml::Value = toml::from_str(content)?;
    Ok(document_from_value(toml_to_json(value)))
}

fn parse_labeled(content: &str, hint: FormatHint, label: &str) -> Result<ProductValues, ParseError> {
    match hint {
        FormatHint::Json => parse_json(content).map_err(|e| ParseError::json_error(label, e)),
        FormatHint::Yaml => parse_yaml(content).map_err(|e| ParseError::yaml_error(label, e)),
        FormatHint::Toml => parse_toml(content).map_err(|e| ParseError::toml_error(label, e)),
        FormatHint::Auto => {
            parse_detected(content).ok_or_else(|| ParseError::unknown_format(label))
        }
    }
}

// Plain text is valid YAML (a bare string), so the YAML fallback only
// accepts content that decodes to a mapping.
fn parse_detected(content: &str) -> Option<ProductValues> {
    if let Ok(doc) = parse_json(content) {
        return Some(doc);
    }

    match serde_yaml::from_str::<serde_yaml::Value>(content) {
        Ok(value) if value.is_mapping() => {
            return Some(document_from_value(yaml_to_json(value)));
        }
        Ok(value) => {
            tracing::debug!(kind = yaml_kind(&value), "YAML fallback rejected non-mapping content")
        }
        Err(_) => {}
    }

    parse_toml(content).ok()
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "boolean",
        serde_yaml::Value::Number(_) => "number",
        serde_yaml::Value::String(_) => "string",
        serde_yaml::Value::Sequence(_) => "sequence",
        serde_yaml::Value::Mapping(_) => "mapping",
        serde_yaml::Value::Tagged(_) => "tagged",
    }
}

fn entries(value: Value) -> Vec<(String, Value)> {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}

fn to_scalar(value: Value) -> Scalar {
    match value {
        Value::Null => Scalar::empty(),
        Value::Bool(b) => Scalar::Bool(b),
        Value::Number(n) => Scalar::Number(n),
        Value::String(s) => Scalar::Text(s),
        nested => Scalar::Text(nested.to_string()),
    }
}

fn to_field_value(value: Value) -> FieldValue {
    match value {
        container @ (Value::Object(_) | Value::Array(_)) => FieldValue::CurrencyMap(
            entries(container)
                .into_iter()
                .map(|(currency, amount)| (currency, to_scalar(amount)))
                .collect(),
        ),
        scalar => FieldValue::Scalar(to_scalar(scalar)),
    }
}

fn to_field_map(value: Value) -> FieldMap {
    entries(value)
        .into_iter()
        .map(|(field, v)| (field, to_field_value(v)))
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Converts a YAML value into the equivalent JSON value. Non-string mapping
/// keys are stringified; tags are dropped.
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => Value::Array(seq.into_iter().map(yaml_to_json).collect()),
        serde_yaml::Value::Mapping(map) => {
            let object: serde_json::Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| {
                    let key = match k {
                        serde_yaml::Value::String(s) => s,
                        serde_yaml::Value::Number(n) => n.to_string(),
                        serde_yaml::Value::Bool(b) => b.to_string(),
                        serde_yaml::Value::Null => "null".to_string(),
                        other => format!("{:?}", other),
                    };
                    (key, yaml_to_json(v))
                })
                .collect();
            Value::Object(object)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

/// Converts a TOML value into the equivalent JSON value. Datetimes become
/// their RFC 3339 text.
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}
