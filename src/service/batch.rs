//! Line-oriented batch stream
//!
//! Each input line holds a JSON array of items; every item carries its
//! request under `code` (an object, or a string containing the JSON). One
//! output line is written and flushed per item. A line starting with `---`
//! flushes the output without emitting anything.

use std::io::{self, BufRead, Write};

use serde_json::{Map, Value};

use crate::layout::LayoutConfig;
use crate::{resolve_json, resolve_value, LayoutResponse};

/// Marks a flush point in the input stream
pub const FLUSH_MARKER: &str = "---";

/// Counters for one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub lines: usize,
    /// Items answered with an output row
    pub items: usize,
    /// Answered items whose request failed
    pub failures: usize,
    /// Lines or items dropped without output
    pub skipped: usize,
    /// Lines that were not valid JSON
    pub framing_errors: usize,
}

impl BatchSummary {
    /// The process should exit non-zero
    pub fn has_framing_errors(&self) -> bool {
        self.framing_errors > 0
    }
}

/// Process every line of `input`, writing result rows to `output`.
///
/// Only I/O failures are returned as errors; everything else is counted in
/// the summary and logged.
pub fn run_batch<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    config: &LayoutConfig,
) -> io::Result<BatchSummary> {
    let mut summary = BatchSummary::default();

    for (number, line) in input.lines().enumerate() {
        let line = line?;
        let number = number + 1;
        summary.lines += 1;

        if line.starts_with(FLUSH_MARKER) {
            output.flush()?;
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        let items = match serde_json::from_str::<Value>(&line) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                tracing::warn!(line = number, "expected a JSON array; line skipped");
                summary.skipped += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!(line = number, error = %e, "invalid JSON line");
                summary.framing_errors += 1;
                continue;
            }
        };

        for item in items {
            let Value::Object(mut fields) = item else {
                tracing::warn!(line = number, "item is not an object; skipped");
                summary.skipped += 1;
                continue;
            };
            let Some(code) = fields.remove("code") else {
                tracing::warn!(line = number, "item has no 'code'; skipped");
                summary.skipped += 1;
                continue;
            };

            let response = solve_code(code, config);
            if !response.is_ok() {
                summary.failures += 1;
            }
            let row = result_row(response, fields)?;
            serde_json::to_writer(&mut *output, &row).map_err(io::Error::other)?;
            output.write_all(b"\n")?;
            output.flush()?;
            summary.items += 1;
        }
    }

    output.flush()?;
    tracing::info!(
        lines = summary.lines,
        items = summary.items,
        failures = summary.failures,
        "batch finished"
    );
    Ok(summary)
}

fn solve_code(code: Value, config: &LayoutConfig) -> LayoutResponse {
    match code {
        Value::String(source) => resolve_json(&source, config),
        value @ Value::Object(_) => resolve_value(value, config),
        _ => LayoutResponse {
            tree: None,
            error: Some("'code' must be an object or a JSON string".to_string()),
        },
    }
}

/// `{"tree": ..., <copied fields>, "parse_error": ...}`
fn result_row(response: LayoutResponse, fields: Map<String, Value>) -> io::Result<Value> {
    let tree = match response.tree {
        Some(tree) => serde_json::to_value(tree).map_err(io::Error::other)?,
        None => Value::Array(Vec::new()),
    };

    let mut row = Map::new();
    row.insert("tree".to_string(), tree);
    for (key, value) in fields {
        if key != "tree" && key != "parse_error" {
            row.insert(key, value);
        }
    }
    row.insert(
        "parse_error".to_string(),
        Value::String(response.error.unwrap_or_default()),
    );
    Ok(Value::Object(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(input: &str) -> (BatchSummary, Vec<Value>) {
        let mut output = Vec::new();
        let summary = run_batch(input.as_bytes(), &mut output, &LayoutConfig::default()).unwrap();
        let rows = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        (summary, rows)
    }

    fn request() -> Value {
        json!({"layout": [
            {"android:id": "parent", "android:layout_width": "100px",
             "android:layout_height": "100px"},
            {"android:id": "a", "android:layout_width": "10px",
             "android:layout_height": "10px"}
        ]})
    }

    #[test]
    fn test_rows_copy_item_fields() {
        let line = json!([{"code": request(), "name": "first"}]).to_string();
        let (summary, rows) = run(&line);

        assert_eq!(summary.items, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "first");
        assert_eq!(rows[0]["parse_error"], "");
        assert_eq!(rows[0]["tree"]["components"][0]["id"], "a");
    }

    #[test]
    fn test_string_code_and_failures() {
        let line = json!([
            {"code": request().to_string()},
            {"code": "{\"layout\": []}"},
            {"other": 1}
        ])
        .to_string();
        let (summary, rows) = run(&line);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["parse_error"], "");
        assert_eq!(rows[1]["tree"], json!([]));
        assert!(rows[1]["parse_error"]
            .as_str()
            .unwrap()
            .contains("no 'parent'"));
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_out_of_range_request_does_not_stop_stream() {
        let huge = json!({"layout": [
            {"android:id": "parent", "android:layout_width": "100px",
             "android:layout_height": "100px"},
            {"android:id": "a", "android:layout_width": "2147483647px",
             "android:layout_height": "10px",
             "android:layout_marginLeft": "10px",
             "app:layout_constraintLeft_toLeftOf": "parent"},
            {"android:id": "b", "android:layout_width": "10px",
             "android:layout_height": "10px",
             "app:layout_constraintLeft_toRightOf": "a"}
        ]});
        let input = format!(
            "{}\n{}\n",
            json!([{"code": huge}]),
            json!([{"code": request()}])
        );
        let (summary, rows) = run(&input);

        assert_eq!(rows.len(), 2);
        assert!(rows[0]["parse_error"]
            .as_str()
            .unwrap()
            .contains("supported range"));
        assert_eq!(rows[1]["parse_error"], "");
        assert_eq!(summary.failures, 1);
    }

    #[test]
    fn test_flush_markers_and_bad_lines() {
        let good = json!([{"code": request()}]).to_string();
        let input = format!("{good}\n---\n{{\"not\": \"array\"}}\nnot json\n{good}\n");
        let (summary, rows) = run(&input);

        assert_eq!(rows.len(), 2);
        assert_eq!(summary.lines, 5);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.framing_errors, 1);
        assert!(summary.has_framing_errors());
    }
}
