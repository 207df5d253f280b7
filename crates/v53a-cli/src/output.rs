//! Output formatting for API responses.

use anyhow::Result;
use clap::ValueEnum;
use serde_json::{Map, Value};
use v53a_core::models::{LastElements, RecordPage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

/// Render a response in the requested format
pub fn render(value: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => Ok(render_table(value)),
    }
}

/// Render a JSON value for a `key: value` line. Strings are shown bare.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

fn push_fields(lines: &mut Vec<String>, fields: &Map<String, Value>) {
    for (key, value) in fields {
        lines.push(format!("{}: {}", key, display_value(value)));
    }
}

fn push_record_blocks<'a>(lines: &mut Vec<String>, records: impl Iterator<Item = &'a Value>) {
    for (i, record) in records.enumerate() {
        lines.push(String::new());
        lines.push(format!("--- Record {} ---", i + 1));
        match record {
            Value::Object(fields) => push_fields(lines, fields),
            other => lines.push(display_value(other)),
        }
    }
}

/// Plain-text rendering, shaped by the kind of response
pub fn render_table(value: &Value) -> String {
    let mut lines = Vec::new();

    if let Some(page) = RecordPage::from_value(value) {
        lines.push(format!("Total records: {}", page.count));
        lines.push(format!("Page: {} of {}", page.page, page.page_count()));
        let results = value["results"].as_array().map(|r| r.iter());
        push_record_blocks(&mut lines, results.into_iter().flatten());
    } else if let Some(last) = LastElements::from_value(value) {
        lines.push(format!(
            "Record ID: {}, DID: {}",
            display_value(&last.id),
            display_value(&last.did)
        ));
        lines.push(format!("Lookup method: {}", display_value(&last.lookup_method)));
        lines.push(format!("Creation time: {}", display_value(&last.ctime)));
        lines.push(String::new());
        lines.push("Last Elements:".to_string());
        push_fields(&mut lines, &last.last_elements);
    } else {
        match value {
            Value::Object(fields) => push_fields(&mut lines, fields),
            Value::Array(items) => push_record_blocks(&mut lines, items.iter()),
            other => lines.push(display_value(other)),
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_list_table() {
        let value = json!({
            "count": 12,
            "page": 2,
            "page_size": 5,
            "results": [{"id": 6, "did": 250520}, {"id": 7, "name": "probe"}]
        });

        let out = render_table(&value);
        let expected = "Total records: 12\nPage: 2 of 3\n\n--- Record 1 ---\nid: 6\ndid: 250520\n\n--- Record 2 ---\nid: 7\nname: probe";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_render_last_elements_table() {
        let value = json!({
            "ID": 7,
            "DID": 250520,
            "lookup_method": "did",
            "ctime": "2025-05-20T12:00:00Z",
            "last_elements": {"sp_array": 4.5, "c1_array": [1, 2]}
        });

        let out = render_table(&value);
        assert!(out.starts_with("Record ID: 7, DID: 250520\nLookup method: did\n"));
        assert!(out.contains("Creation time: 2025-05-20T12:00:00Z"));
        assert!(out.ends_with("Last Elements:\nsp_array: 4.5\nc1_array: [1,2]"));
    }

    #[test]
    fn test_render_generic_values() {
        assert_eq!(render_table(&json!({"id": 1, "note": null})), "id: 1\nnote: null");
        assert_eq!(
            render_table(&json!([{"id": 1}])),
            "\n--- Record 1 ---\nid: 1"
        );
        assert_eq!(render_table(&json!("plain")), "plain");
    }

    #[test]
    fn test_render_json_is_untouched() {
        let value = json!({"b": 1, "a": [1, 2]});
        let out = render(&value, OutputFormat::Json).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&out).unwrap(), value);
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Hello", 2), "He");
    }
}
