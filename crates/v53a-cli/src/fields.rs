//! Field dump for a single record, used to inspect what the server sends.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde_json::Value;
use tracing::info;
use v53a_core::models::{Record, RecordPage};
use v53a_core::{ApiClient, ListQuery};

use crate::output::{display_value, truncate_string};

/// Array fields the record is expected to carry
pub const EXPECTED_ARRAY_FIELDS: [&str; 16] = [
    "sp_array", "es_array", "p1_array", "c1_array", "p2_array", "c2_array", "p3_array",
    "c3_array", "p4_array", "c4_array", "p5_array", "c5_array", "p6_array", "c6_array",
    "p7_array", "c7_array",
];

/// Longest value preview printed per field
const PREVIEW_LEN: usize = 100;

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn describe_array(lines: &mut Vec<String>, name: &str, items: &[Value]) {
    lines.push(format!("- {}: List with {} elements", name, items.len()));
    match (items.first(), items.last()) {
        (Some(first), Some(last)) => {
            lines.push(format!("  First element: {}", display_value(first)));
            lines.push(format!("  Last element: {}", display_value(last)));
        }
        _ => lines.push("  Array is empty".to_string()),
    }
}

/// Human-readable report of a record's fields and array fields
pub fn describe_record(record: &Record) -> String {
    let mut lines = vec!["=== RECORD STRUCTURE ===".to_string(), String::new()];

    lines.push("Fields in the record:".to_string());
    for (key, value) in record.fields() {
        lines.push(format!(
            "- {} ({}): {}",
            key,
            json_type_name(value),
            truncate_string(&display_value(value), PREVIEW_LEN)
        ));
    }

    lines.push(String::new());
    lines.push("Looking for array fields:".to_string());
    for name in EXPECTED_ARRAY_FIELDS {
        match record.0.get(name) {
            Some(Value::Array(items)) => describe_array(&mut lines, name, items),
            Some(other) => lines.push(format!(
                "- {}: Not a list, but {}",
                name,
                json_type_name(other)
            )),
            None => lines.push(format!("- {}: Not found in record", name)),
        }
    }

    lines.push(String::new());
    lines.push("Searching for any list fields:".to_string());
    for (key, items) in record.array_fields() {
        describe_array(&mut lines, key, items);
    }

    lines.join("\n")
}

/// Default output file name, keyed by DID when there is one
pub fn default_filename(did: Option<i64>, now: DateTime<Local>) -> String {
    let timestamp = now.format("%Y%m%d_%H%M%S");
    match did {
        Some(did) => format!("record_did_{}_{}.json", did, timestamp),
        None => format!("records_{}.json", timestamp),
    }
}

/// Write pretty JSON, creating parent directories as needed
pub fn save_json(value: &Value, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let contents = serde_json::to_string_pretty(value)?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Saved JSON");
    Ok(path.to_path_buf())
}

/// `all_<name>` next to the given record output path
fn all_records_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| format!("all_{}", n.to_string_lossy()))
        .unwrap_or_else(|| "all_records.json".to_string());
    output.with_file_name(name)
}

/// Fetch the list, find the record with `did`, save both and print the report
pub async fn run(client: &ApiClient, did: i64, output: Option<&Path>, page_size: u32) -> Result<()> {
    info!(did, "Fetching records to locate DID");
    let listing = client
        .list(ListQuery::page(1, page_size).filter("did", did))
        .await?;

    let now = Local::now();
    let all_path = match output {
        Some(path) => all_records_path(path),
        None => PathBuf::from(default_filename(None, now)),
    };
    let all_saved = save_json(&listing, &all_path)?;

    let page = RecordPage::from_value(&listing)
        .context("List response is not a paginated record page")?;
    info!(records = page.results.len(), "Found records");

    let record = page
        .find_by_did(did)
        .with_context(|| format!("No record found with DID {}", did))?;

    let record_path = match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(default_filename(Some(did), now)),
    };
    let record_json = serde_json::to_value(record)?;
    let saved = save_json(&record_json, &record_path)?;

    println!("{}", describe_record(record));
    println!();
    println!("Raw record data (for debugging):");
    println!("{}", serde_json::to_string_pretty(&record_json)?);
    println!();
    println!("Record saved to file: {}", saved.display());
    println!("All records saved to file: {}", all_saved.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record() -> Record {
        serde_json::from_value(json!({
            "id": 6,
            "did": 250520,
            "ratio": 0.5,
            "sp_array": [1, 2, 3],
            "es_array": [],
            "p1_array": "n/a",
            "note": "x".repeat(150),
        }))
        .unwrap()
    }

    #[test]
    fn test_json_type_name() {
        assert_eq!(json_type_name(&json!(1)), "int");
        assert_eq!(json_type_name(&json!(1.5)), "float");
        assert_eq!(json_type_name(&json!([])), "array");
        assert_eq!(json_type_name(&json!(null)), "null");
    }

    #[test]
    fn test_describe_record() {
        let report = describe_record(&record());

        assert!(report.contains("- id (int): 6"));
        assert!(report.contains("- ratio (float): 0.5"));
        assert!(report.contains(&format!("- note (string): {}...", "x".repeat(97))));
        assert!(report.contains("- sp_array: List with 3 elements\n  First element: 1\n  Last element: 3"));
        assert!(report.contains("- es_array: List with 0 elements\n  Array is empty"));
        assert!(report.contains("- p1_array: Not a list, but string"));
        assert!(report.contains("- c7_array: Not found in record"));

        let any_lists = report.split("Searching for any list fields:").nth(1).unwrap();
        assert!(any_lists.contains("sp_array"));
        assert!(!any_lists.contains("p1_array"));
    }

    #[test]
    fn test_default_filename() {
        let now = Local.with_ymd_and_hms(2025, 5, 20, 13, 4, 5).unwrap();
        assert_eq!(
            default_filename(Some(250520), now),
            "record_did_250520_20250520_130405.json"
        );
        assert_eq!(default_filename(None, now), "records_20250520_130405.json");
    }

    #[test]
    fn test_save_json_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("record.json");

        let saved = save_json(&json!({"did": 1}), &path).unwrap();
        assert_eq!(saved, path);
        let back: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, json!({"did": 1}));

        assert_eq!(
            all_records_path(&path),
            dir.path().join("out").join("all_record.json")
        );
    }
}
