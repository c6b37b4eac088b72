//! Coverage report formats behind one trait.

pub mod csv;
pub mod markdown;

use crate::coverage::CoverageRow;
use anyhow::{anyhow, Result};

/// Column titles shared by every format.
pub const HEADER: [&str; 4] = ["ClassName", "FieldName", "DescriptionRating", "HasExample"];

/// Trait for rendering coverage rows into a specific output format.
pub trait ReportFormat {
    fn render(&self, rows: &[CoverageRow]) -> String;
    fn file_extension(&self) -> &str;
}

/// Create a report format for the given name.
pub fn create_format(format: &str) -> Result<Box<dyn ReportFormat>> {
    match format {
        "csv" => Ok(Box::new(csv::CsvReport)),
        "markdown" | "md" => Ok(Box::new(markdown::MarkdownReport)),
        _ => Err(anyhow!("unknown format: {}. Use csv or markdown", format)),
    }
}
