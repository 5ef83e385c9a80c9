//! # budgetexec-render
//!
//! Rendering backends for budgetexec reports.
//!
//! This crate provides:
//! - Excel workbooks (the export format of every report)
//! - Aligned plain-text tables (terminal output)
//!
//! ## Example
//!
//! ```rust,ignore
//! use budgetexec_core::{RecordStore, ReportBuilder, Renderer};
//! use budgetexec_render::{ExcelRenderer, TextRenderer};
//!
//! let store = RecordStore::sample();
//! let report = ReportBuilder::default().users(&store.users);
//!
//! // Excel workbook
//! let xlsx_bytes = ExcelRenderer::new().render(&report)?;
//! std::fs::write(report.file_name(today), xlsx_bytes)?;
//!
//! // Terminal table
//! println!("{}", TextRenderer::new().render(&report)?);
//! ```

pub mod excel;

pub use excel::ExcelRenderer;

use budgetexec_core::{Cell, RenderError, Renderer, Report, Sheet};

/// Plain-text table renderer
#[derive(Clone, Debug)]
pub struct TextRenderer {
    /// Spaces between columns
    pub gap: usize,
    /// Print the sheet name above each table
    pub titles: bool,
    /// Draw a rule under the header row
    pub header_rule: bool,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            gap: 2,
            titles: true,
            header_rule: true,
        }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Omit sheet titles
    pub fn no_titles(mut self) -> Self {
        self.titles = false;
        self
    }

    /// Configure column gap
    pub fn gap(mut self, gap: usize) -> Self {
        self.gap = gap;
        self
    }

    /// Render one sheet as an aligned table
    pub fn render_sheet(&self, sheet: &Sheet) -> String {
        let cells: Vec<Vec<String>> = sheet
            .rows
            .iter()
            .map(|row| row.iter().map(Cell::display).collect())
            .collect();

        let columns = sheet
            .headers
            .len()
            .max(cells.iter().map(Vec::len).max().unwrap_or(0));
        let mut widths = vec![0usize; columns];
        for (col, header) in sheet.headers.iter().enumerate() {
            widths[col] = widths[col].max(display_width(header));
        }
        for row in &cells {
            for (col, value) in row.iter().enumerate() {
                widths[col] = widths[col].max(display_width(value));
            }
        }
        // numeric columns are right-aligned
        let numeric: Vec<bool> = (0..columns)
            .map(|col| {
                !sheet.rows.is_empty()
                    && sheet
                        .rows
                        .iter()
                        .all(|row| matches!(row.get(col), Some(Cell::Number(_))))
            })
            .collect();

        let mut out = String::new();
        if self.titles {
            out.push_str(&sheet.name);
            out.push('\n');
        }

        let header: Vec<String> = sheet.headers.clone();
        out.push_str(&self.format_line(&header, &widths, &numeric));
        if self.header_rule {
            let total: usize = widths.iter().sum::<usize>() + self.gap * columns.saturating_sub(1);
            out.push_str(&"-".repeat(total));
            out.push('\n');
        }
        for row in &cells {
            out.push_str(&self.format_line(row, &widths, &numeric));
        }
        out
    }

    fn format_line(&self, values: &[String], widths: &[usize], numeric: &[bool]) -> String {
        let gap = " ".repeat(self.gap);
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(col, &width)| {
                let value = values.get(col).map_or("", String::as_str);
                let fill = " ".repeat(width.saturating_sub(display_width(value)));
                if numeric[col] {
                    format!("{fill}{value}")
                } else {
                    format!("{value}{fill}")
                }
            })
            .collect();
        let mut line = padded.join(&gap).trim_end().to_string();
        line.push('\n');
        line
    }
}

/// Width in terminal columns, counting each char as one cell
fn display_width(s: &str) -> usize {
    s.chars().count()
}

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&self, report: &Report) -> Result<String, RenderError> {
        if report.sheets.is_empty() {
            return Err(RenderError::InvalidData(format!(
                "report '{}' has no sheets",
                report.label
            )));
        }
        let tables: Vec<String> = report.sheets.iter().map(|s| self.render_sheet(s)).collect();
        Ok(tables.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn aligns_text_left_numbers_right() {
        let mut sheet = Sheet::new("Budget", ["Month", "Plan"]);
        sheet.push_row(vec![Cell::text("Янв"), Cell::Number(dec!(120))]);
        sheet.push_row(vec![Cell::text("Февраль"), Cell::Number(dec!(5))]);

        let text = TextRenderer::new().render_sheet(&sheet);
        assert_eq!(
            text,
            "Budget\nMonth    Plan\n-------------\nЯнв       120\nФевраль     5\n"
        );
    }

    #[test]
    fn no_titles() {
        let sheet = Sheet::new("Hidden", ["A"]);
        let text = TextRenderer::new().no_titles().render_sheet(&sheet);
        assert_eq!(text, "A\n-\n");
    }

    #[test]
    fn empty_report_fails() {
        let report = Report {
            kind: budgetexec_core::ReportKind::Users,
            label: "Users".into(),
            sheets: vec![],
        };
        assert!(TextRenderer::new().render(&report).is_err());
    }
}
