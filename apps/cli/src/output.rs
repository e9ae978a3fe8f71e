//! Output formatting for the CLI.

use clap::ValueEnum;
use learnflow_forms::ValidationErrors;
use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print a serializable value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn render_success(message: &str, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Text => message.to_string(),
        OutputFormat::Json => {
            serde_json::json!({ "status": "success", "message": message }).to_string()
        }
    }
}

pub fn render_error(message: &str, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("Error: {}", message),
        OutputFormat::Json => {
            serde_json::json!({ "status": "error", "message": message }).to_string()
        }
    }
}

/// Print a success message.
pub fn print_success(message: &str, format: &OutputFormat) {
    println!("{}", render_success(message, format));
}

/// Print an error message.
pub fn print_error(message: &str, format: &OutputFormat) {
    eprintln!("{}", render_error(message, format));
}

/// Inline field messages shown under a rejected form.
pub fn render_field_errors(errors: &ValidationErrors, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Text => errors
            .iter()
            .map(|(field, message)| format!("  {}: {}", field.label(), message))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => {
            serde_json::json!({ "status": "invalid", "errors": errors }).to_string()
        }
    }
}

pub fn print_field_errors(errors: &ValidationErrors, format: &OutputFormat) {
    eprintln!("{}", render_field_errors(errors, format));
}

/// Print a table row.
pub fn print_row(label: &str, value: &str) {
    println!("  {:<18} {}", format!("{}:", label), value);
}

/// Print a divider line.
pub fn print_divider() {
    println!("{}", "-".repeat(50));
}

/// Print a heading.
pub fn print_heading(text: &str) {
    println!("\n{}", text);
    print_divider();
}
