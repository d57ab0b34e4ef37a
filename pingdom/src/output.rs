//! Output formatting: plain text (tables and key-value) and JSON.

use serde_json::Value;
use std::fmt::Write;

const MAX_CELL: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned tables for listings, key-value for single resources
    #[default]
    Plain,
    /// JSON (pretty-printed)
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" | "p" => Ok(OutputFormat::Plain),
            "json" | "j" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

/// Render rows as a left-aligned table sized to the widest cell per column.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return "<empty>\n".to_string();
    }
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.iter().map(|c| truncate(c, MAX_CELL)).collect())
        .collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (i, c) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(c.chars().count());
        }
    }

    let mut out = String::new();
    let header = join_padded(headers.iter().copied(), &widths);
    let _ = writeln!(out, "{}", header);
    let _ = writeln!(out, "{}", "-".repeat(header.chars().count()));
    for row in &cells {
        let _ = writeln!(out, "{}", join_padded(row.iter().map(String::as_str), &widths));
    }
    out
}

fn join_padded<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(c, w)| format!("{:<width$}", c, width = *w))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Format a single resource as nested key-value lines.
pub fn format_detail(value: &Value) -> String {
    let mut out = String::new();
    format_detail_impl(value, &mut out, 0);
    out
}

fn format_detail_impl(v: &Value, out: &mut String, indent: usize) {
    let pad = "  ".repeat(indent);
    match v {
        Value::Object(map) => {
            for (k, val) in map {
                match val {
                    Value::Object(m) if m.is_empty() => {}
                    Value::Array(a) if a.is_empty() => {
                        let _ = writeln!(out, "{}{}: -", pad, k);
                    }
                    Value::Object(_) | Value::Array(_) => {
                        let _ = writeln!(out, "{}{}:", pad, k);
                        format_detail_impl(val, out, indent + 1);
                    }
                    _ => {
                        let _ = writeln!(out, "{}{}: {}", pad, k, scalar(val));
                    }
                }
            }
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                if item.is_object() || item.is_array() {
                    let _ = writeln!(out, "{}[{}]", pad, i + 1);
                    format_detail_impl(item, out, indent + 1);
                } else {
                    let _ = writeln!(out, "{}- {}", pad, scalar(item));
                }
            }
        }
        other => {
            let _ = writeln!(out, "{}{}", pad, scalar(other));
        }
    }
}

fn scalar(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max {
        s
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Format value as JSON (pretty).
pub fn format_json(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
