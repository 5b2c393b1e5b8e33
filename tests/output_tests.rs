use pvdiff::output::{format_changes, OutputFormat, OutputOptions};
use pvdiff::{diff, ChangeSet};

fn sample_changes() -> ChangeSet {
    diff(
        Some(r#"{"common": {"status": 1}, "channel_specific": {"web": {"price": {"USD": "100"}}}}"#),
        Some(r#"{"common": {"status": 0}, "channel_specific": {"web": {"price": {"USD": "150"}}}}"#),
    )
}

#[test]
fn test_format_plain_no_changes() {
    let output = format_changes(&ChangeSet::new(), &OutputFormat::Plain, &OutputOptions::default()).unwrap();
    assert_eq!(output, "No changes detected.");
}

#[test]
fn test_format_plain_with_changes() {
    let output = format_changes(&sample_changes(), &OutputFormat::Plain, &OutputOptions::default()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], "• status: 1 → 0");
    assert_eq!(lines[1], r#"• price (USD) - web: "100" → "150""#);
    assert_eq!(lines[2], "");
    assert_eq!(lines[3], "Summary: 2 changes (1 common, 1 channel-specific)");
}

#[test]
fn test_format_terminal_contains_labels() {
    let output = format_changes(&sample_changes(), &OutputFormat::Terminal, &OutputOptions::default()).unwrap();
    assert!(output.contains("status"));
    assert!(output.contains("price (USD) - web"));
    assert!(output.contains("Summary: 2 changes"));
}

#[test]
fn test_format_json_history_entry() {
    let output = format_changes(&sample_changes(), &OutputFormat::Json, &OutputOptions::default()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(
        value,
        serde_json::json!({
            "status": {"name": "status", "old": 1, "new": 0},
            "price (USD) - web": {"name": "price (USD) - web", "old": "100", "new": "150"}
        })
    );

    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["status", "price (USD) - web"]);
}

#[test]
fn test_format_json_empty() {
    let output = format_changes(&ChangeSet::new(), &OutputFormat::Json, &OutputOptions::default()).unwrap();
    assert_eq!(output, "{}");
}

#[test]
fn test_max_value_length_truncates() {
    let changes = diff(None, Some(r#"{"common": {"description": "abcdefghijklmnop"}}"#));
    let options = OutputOptions {
        max_value_length: 8,
    };
    let output = format_changes(&changes, &OutputFormat::Plain, &options).unwrap();
    assert!(output.contains(r#"• description: "" → "abcd..."#));
}
