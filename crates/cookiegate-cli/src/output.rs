//! Table and JSON rendering for command output.

use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print rows as a table or a JSON array
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table if items.is_empty() => println!("(none)"),
        OutputFormat::Table => println!("{}", Table::new(items)),
        OutputFormat::Json => print_json(&items),
    }
}

/// Print one value as flattened `key: value` lines or as JSON
pub fn print_item<T: Serialize>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => match serde_json::to_value(item) {
            Ok(value) => print_flattened("", &value),
            Err(e) => print_error(&format!("cannot render output: {e}")),
        },
        OutputFormat::Json => print_json(item),
    }
}

fn print_json<T: Serialize + ?Sized>(item: &T) {
    match serde_json::to_string_pretty(item) {
        Ok(json) => println!("{json}"),
        Err(e) => print_error(&format!("cannot render output: {e}")),
    }
}

/// Walks nested objects and arrays, printing one line per leaf with a
/// dotted path such as `schemes.admin.login_path`.
fn print_flattened(path: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                print_flattened(&child_path, child);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                print_flattened(&format!("{path}[{index}]"), child);
            }
        }
        Value::Null => print_kv(path, "-"),
        Value::String(s) => print_kv(path, s),
        other => print_kv(path, &other.to_string()),
    }
}

/// Print a completion message
pub fn print_success(msg: &str) {
    println!("ok: {msg}");
}

/// Print a warning to stderr
pub fn print_warning(msg: &str) {
    eprintln!("warning: {msg}");
}

/// Print an error to stderr
pub fn print_error(msg: &str) {
    eprintln!("error: {msg}");
}

/// Print an aligned key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<28} {}", format!("{key}:"), value);
}
