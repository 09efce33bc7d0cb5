use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::export::cell;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Placeholder shown while a view is loading; text mode only, on stderr
pub fn output_skeleton(output_format: &OutputFormat, what: &str) {
    if let OutputFormat::Text = output_format {
        eprintln!("Loading {}...", what);
    }
}

/// Output a collection as a table (text) or an array under `collection_name` (JSON)
pub fn output_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    columns: &[&str],
    rows: &[Value],
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: rows
            }))?);
        }
        OutputFormat::Text => {
            print!("{}", render_table(columns, rows));
        }
    }
    Ok(())
}

/// Output a single record
pub fn output_record(output_format: &OutputFormat, record: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        OutputFormat::Text => {
            if let Some(fields) = record.as_object() {
                let width = fields.keys().map(|k| k.len()).max().unwrap_or(0);
                for (key, value) in fields {
                    println!("{:<width$}  {}", key, cell(Some(value)), width = width);
                }
            }
        }
    }
    Ok(())
}

/// Fixed-width text table over the given columns
pub fn render_table(columns: &[&str], rows: &[Value]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|c| cell(row.get(*c))).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<w$}", c.to_uppercase(), w = *w))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');

    for row in cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<w$}", v, w = *w))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_pads_columns() {
        let rows = vec![
            json!({"id": 1, "name": "North gate"}),
            json!({"id": 22, "name": null}),
        ];
        let table = render_table(&["id", "name"], &rows);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0], "ID  NAME");
        assert_eq!(lines[1], "1   North gate");
        assert_eq!(lines[2], "22");
    }
}
