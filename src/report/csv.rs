//! Comma-separated report, quoted per RFC 4180 where needed.

use crate::coverage::CoverageRow;
use crate::report::{ReportFormat, HEADER};

pub struct CsvReport;

impl ReportFormat for CsvReport {
    fn render(&self, rows: &[CoverageRow]) -> String {
        let mut out = HEADER.join(",");
        out.push('\n');
        for row in rows {
            out.push_str(&csv_field(&row.class_name));
            out.push(',');
            out.push_str(&csv_field(&row.field_name));
            out.push(',');
            out.push_str(row.rating.as_str());
            out.push(',');
            out.push_str(if row.has_example { "true" } else { "false" });
            out.push('\n');
        }
        out
    }

    fn file_extension(&self) -> &str {
        "csv"
    }
}

fn csv_field(s: &str) -> String {
    if s.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::DescriptionRating;

    #[test]
    fn header_and_rows() {
        let rows = vec![
            CoverageRow {
                class_name: "Excel.Range".to_string(),
                field_name: String::new(),
                rating: DescriptionRating::Good,
                has_example: true,
            },
            CoverageRow {
                class_name: String::new(),
                field_name: "getCell(row, column)".to_string(),
                rating: DescriptionRating::Missing,
                has_example: false,
            },
        ];
        assert_eq!(
            CsvReport.render(&rows),
            "ClassName,FieldName,DescriptionRating,HasExample\nExcel.Range,,Good,true\n,\"getCell(row, column)\",Missing,false\n"
        );
    }

    #[test]
    fn quotes_embedded_quotes() {
        assert_eq!(csv_field(r#"say "hi""#), r#""say ""hi""""#);
        assert_eq!(csv_field("plain"), "plain");
    }
}
