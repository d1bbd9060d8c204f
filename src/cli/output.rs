//! Output rendering
//!
//! Results are printed as a fixed-width table, JSON or YAML. Tables are
//! driven by column definitions that pick values out of the serialized
//! resource with a dot-notation path.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

/// How a column value is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFormat {
    Plain,
    /// Integer byte count shown as KB/MB/GB
    Bytes,
}

/// Column definition for table output
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub header: &'static str,
    pub json_path: &'static str,
    pub width: usize,
    pub format: CellFormat,
}

const fn col(header: &'static str, json_path: &'static str, width: usize) -> ColumnDef {
    ColumnDef {
        header,
        json_path,
        width,
        format: CellFormat::Plain,
    }
}

pub const REGISTRY_COLUMNS: &[ColumnDef] = &[
    col("ID", "id", 36),
    col("NAME", "name", 20),
    col("URN", "urn", 32),
    col("PUBLIC", "public", 6),
    ColumnDef {
        header: "USED",
        json_path: "storage.used.bytes",
        width: 10,
        format: CellFormat::Bytes,
    },
    ColumnDef {
        header: "ALLOWED",
        json_path: "storage.allowed.bytes",
        width: 10,
        format: CellFormat::Bytes,
    },
    col("CREATED", "date_created", 19),
];

pub const REPOSITORY_COLUMNS: &[ColumnDef] = &[
    col("NAME", "name", 24),
    col("IMAGE", "image", 40),
    col("PULLS", "pull_count", 6),
    col("ARTIFACTS", "artifact_count", 9),
    col("UPDATED", "updated_at", 19),
    col("DESCRIPTION", "description", 30),
];

pub const REGION_COLUMNS: &[ColumnDef] = &[
    col("ID", "id", 4),
    col("NAME", "name", 8),
    col("URN", "urn", 24),
    col("BASE URL", "base_url", 32),
    col("PUBLIC", "public", 6),
];

pub const PLAN_COLUMNS: &[ColumnDef] = &[
    col("PLAN", "key", 10),
    col("NAME", "vanity_name", 12),
    col("STORAGE MB", "max_storage_mb", 10),
    col("PRICE/MO", "monthly_price", 8),
];

/// Extract a value from JSON using a dot-notation path
pub fn extract_json_value(item: &Value, path: &str) -> String {
    let mut current = item;

    for part in path.split('.') {
        let next = match part.parse::<usize>() {
            Ok(idx) => current.get(idx),
            Err(_) => current.get(part),
        };
        current = match next {
            Some(v) => v,
            None => return "-".to_string(),
        };
    }

    match current {
        Value::String(s) if s.is_empty() => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(_) => "[object]".to_string(),
    }
}

/// Format bytes to human readable
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn cell(item: &Value, column: &ColumnDef) -> String {
    let raw = extract_json_value(item, column.json_path);
    match column.format {
        CellFormat::Plain => raw,
        CellFormat::Bytes => raw
            .parse::<f64>()
            .map(|b| format_bytes(b.max(0.0) as u64))
            .unwrap_or(raw),
    }
}

fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width && width > 1 {
        let head: String = text.chars().take(width - 1).collect();
        format!("{}…", head)
    } else {
        format!("{:<width$}", text, width = width)
    }
}

/// Render rows as a table with a header line
pub fn render_table(rows: &[Value], columns: &[ColumnDef]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);

    let header = columns
        .iter()
        .map(|c| fit(c.header, c.width))
        .collect::<Vec<_>>()
        .join("  ");
    lines.push(header.trim_end().to_string());

    for row in rows {
        let line = columns
            .iter()
            .map(|c| fit(&cell(row, c), c.width))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(line.trim_end().to_string());
    }

    lines.join("\n")
}

/// Print a list of resources
pub fn print_list<T: Serialize>(
    format: OutputFormat,
    items: &[T],
    columns: &[ColumnDef],
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let rows = items
                .iter()
                .map(serde_json::to_value)
                .collect::<std::result::Result<Vec<_>, _>>()
                .context("Failed to serialize output")?;
            println!("{}", render_table(&rows, columns));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).context("Failed to serialize output")?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(items).context("Failed to serialize output")?;
            print!("{}", yaml);
        }
    }
    Ok(())
}

/// Print a single resource
pub fn print_one<T: Serialize>(
    format: OutputFormat,
    item: &T,
    columns: &[ColumnDef],
) -> Result<()> {
    print_list(format, std::slice::from_ref(item), columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_nested_and_missing() {
        let item = json!({"storage": {"used": {"bytes": 2048}}, "name": "", "tags": [1, 2]});
        assert_eq!(extract_json_value(&item, "storage.used.bytes"), "2048");
        assert_eq!(extract_json_value(&item, "storage.missing"), "-");
        assert_eq!(extract_json_value(&item, "name"), "-");
        assert_eq!(extract_json_value(&item, "tags"), "[2 items]");
        assert_eq!(extract_json_value(&item, "tags.1"), "2");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(21474836480), "20.0 GB");
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let rows = vec![json!({"name": "app", "pull_count": 3})];
        let columns = [col("NAME", "name", 6), col("PULLS", "pull_count", 5)];
        let table = render_table(&rows, &columns);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "NAME    PULLS");
        assert_eq!(lines[1], "app     3");
    }

    #[test]
    fn test_long_cells_are_truncated() {
        assert_eq!(fit("abcdefgh", 4), "abc…");
        assert_eq!(fit("ab", 4), "ab  ");
    }

    #[test]
    fn test_bytes_column_formats_floats() {
        let row = json!({"storage": {"allowed": {"bytes": 21474836480.0}}});
        assert_eq!(cell(&row, &REGISTRY_COLUMNS[5]), "20.0 GB");
    }
}
