//! CSV export tool
//!
//! Takes a JSON array of records (typically a response body found via the
//! network tools), flattens nested objects into dotted column names and
//! writes a CSV file the user can open directly.

use rmcp::ErrorData as McpError;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value, json};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExportCsvArgs {
    /// JSON string holding an array of records (a single object is
    /// treated as one record)
    pub json_data: String,
    /// Output path; must end with .csv
    pub output_filename: String,
}

pub async fn export_csv(args: ExportCsvArgs) -> Result<Value, McpError> {
    if !args.output_filename.ends_with(".csv") {
        return Err(McpError::invalid_params(
            "Output filename must end with .csv",
            None,
        ));
    }

    let data: Value = serde_json::from_str(&args.json_data)
        .map_err(|e| McpError::invalid_params(format!("Invalid JSON data: {e}"), None))?;

    let records = match data {
        Value::Array(items) => items,
        single => vec![single],
    };

    let csv = records_to_csv(&records);
    let record_count = records.len();

    tokio::fs::write(&args.output_filename, csv)
        .await
        .map_err(|e| {
            McpError::internal_error(
                format!("Failed to write '{}': {e}", args.output_filename),
                None,
            )
        })?;

    Ok(json!({
        "status": "success",
        "file_path": args.output_filename,
        "records_saved": record_count,
    }))
}

/// Render records as CSV with a header row.
///
/// Columns are the union of all flattened keys in first-seen order, so
/// ragged records line up; missing cells stay empty.
fn records_to_csv(records: &[Value]) -> String {
    let flattened: Vec<Map<String, Value>> = records.iter().map(flatten_record).collect();

    let mut columns: Vec<String> = Vec::new();
    for record in &flattened {
        for key in record.keys() {
            if !columns.iter().any(|existing| existing == key) {
                columns.push(key.clone());
            }
        }
    }

    let mut output = String::new();
    let header: Vec<String> = columns.iter().map(|c| escape_field(c)).collect();
    output.push_str(&header.join(","));
    output.push('\n');

    for record in &flattened {
        let row: Vec<String> = columns
            .iter()
            .map(|column| {
                record
                    .get(column)
                    .map(|value| escape_field(&render_cell(value)))
                    .unwrap_or_default()
            })
            .collect();
        output.push_str(&row.join(","));
        output.push('\n');
    }

    output
}

/// Flatten one record: nested objects become dotted keys, everything else
/// is kept as-is. A non-object record becomes a single "value" column.
fn flatten_record(record: &Value) -> Map<String, Value> {
    let mut flat = Map::new();
    match record {
        Value::Object(map) => {
            for (key, value) in map {
                flatten_into(&mut flat, key, value);
            }
        }
        other => {
            flat.insert("value".to_string(), other.clone());
        }
    }
    flat
}

fn flatten_into(flat: &mut Map<String, Value>, prefix: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(flat, &format!("{prefix}.{key}"), nested);
            }
        }
        other => {
            flat.insert(prefix.to_string(), other.clone());
        }
    }
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Quote a field when it contains the delimiter, quotes or line breaks;
/// embedded quotes are doubled.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_objects_become_dotted_columns() {
        let records = vec![json!({"id": 1, "user": {"name": "ada", "address": {"city": "x"}}})];
        let csv = records_to_csv(&records);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("id,user.name,user.address.city"));
        assert_eq!(lines.next(), Some("1,ada,x"));
    }

    #[test]
    fn ragged_records_share_the_column_union() {
        let records = vec![json!({"a": 1}), json!({"b": 2, "a": 3})];
        let csv = records_to_csv(&records);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("a,b"));
        assert_eq!(lines.next(), Some("1,"));
        assert_eq!(lines.next(), Some("3,2"));
    }

    #[test]
    fn fields_with_delimiters_are_quoted() {
        let records = vec![json!({"note": "a,b", "quote": "she said \"hi\""})];
        let csv = records_to_csv(&records);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("note,quote"));
        assert_eq!(lines.next(), Some("\"a,b\",\"she said \"\"hi\"\"\""));
    }

    #[test]
    fn arrays_and_nulls_render_as_cells() {
        let records = vec![json!({"tags": ["x", "y"], "gone": null})];
        let csv = records_to_csv(&records);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("tags,gone"));
        assert_eq!(lines.next(), Some("\"[\"\"x\"\",\"\"y\"\"]\","));
    }

    #[test]
    fn scalar_records_get_a_value_column() {
        let records = vec![json!(1), json!("two")];
        let csv = records_to_csv(&records);
        assert_eq!(csv, "value\n1\ntwo\n");
    }

    #[tokio::test]
    async fn rejects_non_csv_extension() {
        let result = export_csv(ExportCsvArgs {
            json_data: "[]".to_string(),
            output_filename: "out.txt".to_string(),
        })
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn writes_file_and_reports_count() {
        let path = std::env::temp_dir().join(format!("pagescan_test_{}.csv", std::process::id()));
        let path_str = path.to_string_lossy().to_string();
        let result = export_csv(ExportCsvArgs {
            json_data: r#"[{"a": 1}, {"a": 2}]"#.to_string(),
            output_filename: path_str.clone(),
        })
        .await
        .unwrap();
        assert_eq!(result["records_saved"], 2);

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, "a\n1\n2\n");
        let _ = tokio::fs::remove_file(&path).await;
    }
}
