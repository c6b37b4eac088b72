//! Markdown table report.

use crate::coverage::CoverageRow;
use crate::report::{ReportFormat, HEADER};

pub struct MarkdownReport;

impl ReportFormat for MarkdownReport {
    fn render(&self, rows: &[CoverageRow]) -> String {
        let mut out = format!("| {} |\n", HEADER.join(" | "));
        out.push_str("|---|---|---|---|\n");
        for row in rows {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                cell(&row.class_name),
                cell(&row.field_name),
                row.rating,
                if row.has_example { "yes" } else { "no" }
            ));
        }
        out
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}

fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::DescriptionRating;

    #[test]
    fn renders_table() {
        let rows = vec![CoverageRow {
            class_name: "Excel.Range".to_string(),
            field_name: String::new(),
            rating: DescriptionRating::Fine,
            has_example: false,
        }];
        let out = MarkdownReport.render(&rows);
        assert!(out.starts_with("| ClassName | FieldName | DescriptionRating | HasExample |\n|---|---|---|---|\n"));
        assert!(out.contains("| Excel.Range |  | Fine | no |"));
    }

    #[test]
    fn escapes_pipes() {
        assert_eq!(cell("A | B"), "A \\| B");
    }
}
