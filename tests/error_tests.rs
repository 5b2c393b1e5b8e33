use pvdiff::{OutputError, ParseError, PvdiffError};
use std::error::Error;

#[test]
fn test_parse_error_display() {
    let err = ParseError::file_not_found("old.json");
    assert_eq!(err.to_string(), "File not found: old.json");
}

#[test]
fn test_json_error_keeps_source() {
    let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err = ParseError::json_error("new.json", source);
    assert!(err.to_string().starts_with("Invalid JSON in new.json"));
    assert!(err.source().is_some());
}

#[test]
fn test_output_error_display() {
    let source = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
    let err = OutputError::JsonSerializationError { source };
    assert!(err.to_string().contains("Failed to serialize change set"));
}

#[test]
fn test_pvdiff_error_from_parse_error() {
    let err: PvdiffError = ParseError::unknown_format("snapshot.txt").into();
    assert!(matches!(err, PvdiffError::Parse(_)));
    assert!(err.to_string().contains("snapshot.txt"));
}

#[test]
fn test_config_error() {
    let err = PvdiffError::config("filter pattern is empty");
    assert!(err.to_string().contains("Invalid configuration"));
}
