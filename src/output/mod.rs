//! Output formatting for CLI results

use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::error::Result;

pub mod json;
pub mod table;

/// Render rows as a table or as JSON wrapped with metadata
pub fn render<T: Tabled + Serialize>(rows: &[T], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(table::format_table(rows)),
        OutputFormat::Json => Ok(json::format_json(rows)?),
    }
}

/// Format and print rows to stdout
pub fn print<T: Tabled + Serialize>(rows: &[T], format: OutputFormat) -> Result<()> {
    println!("{}", render(rows, format)?);
    Ok(())
}
