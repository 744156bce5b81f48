//! Output formatting for resolved configuration trees.

use crate::config::{NestedMap, Value};

/// Output format for printed configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Tree,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tree" | "text" => Some(OutputFormat::Tree),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Render a map in the requested format.
pub fn render_map(map: &NestedMap, format: OutputFormat) -> String {
    match format {
        OutputFormat::Tree => format_tree(map),
        OutputFormat::Json => format_json(&serde_json::Value::from(map)),
    }
}

/// Render a single value in the requested format.
pub fn render_value(value: &Value, format: OutputFormat) -> String {
    match (format, value) {
        (OutputFormat::Tree, Value::Map(map)) => format_tree(map),
        (OutputFormat::Tree, other) => format!("{}\n", other),
        (OutputFormat::Json, other) => format_json(&serde_json::Value::from(other)),
    }
}

fn format_json(value: &serde_json::Value) -> String {
    let mut out = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    out.push('\n');
    out
}

/// Format a map as an indented `key: value` tree, one leaf per line.
pub fn format_tree(map: &NestedMap) -> String {
    let mut out = String::new();
    write_tree(map, 0, &mut out);
    out
}

fn write_tree(map: &NestedMap, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (key, value) in map {
        match value {
            Value::Map(child) if child.is_empty() => {
                out.push_str(&format!("{}{}: {{}}\n", indent, key));
            }
            Value::Map(child) => {
                out.push_str(&format!("{}{}:\n", indent, key));
                write_tree(child, depth + 1, out);
            }
            Value::String(s) => out.push_str(&format!("{}{}: {:?}\n", indent, key, s)),
            other => out.push_str(&format!("{}{}: {}\n", indent, key, other)),
        }
    }
}
