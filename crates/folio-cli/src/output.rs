//! Table and JSON rendering for CLI commands.
//!
//! In JSON mode stdout carries only the JSON documents; status lines go to
//! stderr so the output stays pipeable into `jq`.

use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables and `key: value` lines
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Renders command results in the format chosen on the command line.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    format: OutputFormat,
}

impl Printer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn list<T: Serialize + Tabled>(&self, items: &[T]) {
        match self.format {
            OutputFormat::Table if items.is_empty() => println!("(none)"),
            OutputFormat::Table => println!("{}", Table::new(items)),
            OutputFormat::Json => println!("{}", to_json(items)),
        }
    }

    /// One record: dotted `key: value` lines for tables, a document for JSON.
    pub fn item<T: Serialize>(&self, item: &T) {
        let value = serde_json::to_value(item).unwrap_or(Value::Null);
        match self.format {
            OutputFormat::Table => {
                let mut fields = Vec::new();
                flatten("", &value, &mut fields);
                for (key, value) in fields {
                    self.field(&key, &value);
                }
            }
            OutputFormat::Json => println!("{}", to_json(&value)),
        }
    }

    pub fn field(&self, key: &str, value: &str) {
        self.status(format!("  {:<24} {value}", format!("{key}:")));
    }

    pub fn success(&self, msg: &str) {
        self.status(format!("✓ {msg}"));
    }

    pub fn warning(&self, msg: &str) {
        self.status(format!("⚠ {msg}"));
    }

    fn status(&self, line: String) {
        match self.format {
            OutputFormat::Table => println!("{line}"),
            OutputFormat::Json => eprintln!("{line}"),
        }
    }
}

pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    let key = |child: &str| {
        if prefix.is_empty() {
            child.to_string()
        } else {
            format!("{prefix}.{child}")
        }
    };
    match value {
        Value::Object(map) => {
            for (child, value) in map {
                flatten(&key(child), value, out);
            }
        }
        Value::Null => out.push((prefix.to_string(), "-".to_string())),
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_nested_sections() {
        let value = serde_json::json!({
            "server": { "port": 3000, "host": "0.0.0.0" },
            "hooks": { "timeout_seconds": null },
            "tags": ["a", "b"]
        });
        let mut fields = Vec::new();
        flatten("", &value, &mut fields);

        assert!(fields.contains(&("server.port".to_string(), "3000".to_string())));
        assert!(fields.contains(&("server.host".to_string(), "0.0.0.0".to_string())));
        assert!(fields.contains(&("hooks.timeout_seconds".to_string(), "-".to_string())));
        assert!(fields.contains(&("tags".to_string(), r#"["a","b"]"#.to_string())));
    }
}
