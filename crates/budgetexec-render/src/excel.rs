//! Excel workbook renderer
//!
//! Encodes a [`Report`] as an XLSX workbook:
//! - one worksheet per report sheet, in report order
//! - row 0 holds the column headers, then one row per record
//! - numeric cells stay numeric (grouped display format only), text stays text
//!
//! ## Example Output Structure
//!
//! ```text
//! Sheet: Финансовые показатели
//! | Наименование           | План (руб.) | Факт (руб.) | Исполнение (%) | Период  | ...
//! |------------------------|-------------|-------------|----------------|---------| ...
//! | Расходы на образование | 450000000   | 425000000   | 94.4           | Q1 2024 | ...
//! ```
//!
//! Failures (invalid sheet names, ragged rows, amounts that do not fit an
//! Excel number, I/O errors while saving) are returned as [`RenderError`].

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::{Path, PathBuf};

use budgetexec_core::{Cell, RenderError, Renderer, Report, Sheet};

/// Excel report renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Display format applied to numeric cells
    pub number_format: String,
    /// Bold, filled header row
    pub styled_header: bool,
    /// Keep the header row visible while scrolling
    pub freeze_header: bool,
    /// Size columns to their content
    pub autofit: bool,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            number_format: "#,##0".into(),
            styled_header: true,
            freeze_header: true,
            autofit: true,
        }
    }
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display format of numeric cells
    pub fn number_format(mut self, format: impl Into<String>) -> Self {
        self.number_format = format.into();
        self
    }

    /// Write headers and cells without styling
    pub fn plain(mut self) -> Self {
        self.styled_header = false;
        self.freeze_header = false;
        self.autofit = false;
        self
    }

    /// Generate Excel workbook bytes
    pub fn render_to_bytes(&self, report: &Report) -> Result<Vec<u8>, RenderError> {
        if report.sheets.is_empty() {
            return Err(RenderError::InvalidData(format!(
                "report '{}' has no sheets",
                report.label
            )));
        }

        let mut workbook = Workbook::new();
        let formats = self.create_formats();

        for sheet in &report.sheets {
            self.add_sheet(&mut workbook, sheet, &formats)?;
        }

        let buffer = workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))?;

        tracing::debug!(
            report = %report.label,
            sheets = report.sheets.len(),
            bytes = buffer.len(),
            "rendered workbook"
        );
        Ok(buffer)
    }

    /// Render `report` and save it into `dir` under its date-stamped name.
    ///
    /// Returns the path of the written file.
    pub fn export_to_dir(
        &self,
        report: &Report,
        dir: impl AsRef<Path>,
        date: NaiveDate,
    ) -> Result<PathBuf, RenderError> {
        let bytes = self.render_to_bytes(report)?;
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(report.file_name(date));
        std::fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), "saved report");
        Ok(path)
    }

    /// Create reusable formats
    fn create_formats(&self) -> ExcelFormats {
        let header = if self.styled_header {
            Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_background_color(0x4472C4)
                .set_font_color(0xFFFFFF)
                .set_border(FormatBorder::Thin)
        } else {
            Format::new()
        };

        let number = Format::new()
            .set_num_format(&self.number_format)
            .set_border(FormatBorder::Thin);

        let text = Format::new().set_border(FormatBorder::Thin);

        ExcelFormats {
            header,
            number,
            text,
        }
    }

    fn add_sheet(
        &self,
        workbook: &mut Workbook,
        sheet: &Sheet,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        if let Some(row) = sheet.ragged_row() {
            return Err(RenderError::InvalidData(format!(
                "sheet '{}': row {} has {} cells, expected {}",
                sheet.name,
                row + 1,
                sheet.rows[row].len(),
                sheet.headers.len()
            )));
        }

        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .map_err(|e| RenderError::Format(format!("sheet '{}': {e}", sheet.name)))?;

        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet
                .write_with_format(0, col as u16, header.as_str(), &formats.header)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        for (i, row) in sheet.rows.iter().enumerate() {
            let row_num = (i + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                write_cell(worksheet, row_num, col as u16, cell, formats)?;
            }
        }

        if self.freeze_header {
            worksheet
                .set_freeze_panes(1, 0)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }
        if self.autofit {
            worksheet.autofit();
        }
        Ok(())
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    formats: &ExcelFormats,
) -> Result<(), RenderError> {
    match cell {
        Cell::Text(value) => worksheet
            .write_with_format(row, col, value.as_str(), &formats.text)
            .map(|_| ())
            .map_err(|e| RenderError::Format(e.to_string())),
        Cell::Number(value) => {
            let number = value.to_f64().ok_or_else(|| {
                RenderError::InvalidData(format!("amount {value} does not fit an Excel number"))
            })?;
            worksheet
                .write_with_format(row, col, number, &formats.number)
                .map(|_| ())
                .map_err(|e| RenderError::Format(e.to_string()))
        }
    }
}

/// Reusable cell formats
struct ExcelFormats {
    header: Format,
    number: Format,
    text: Format,
}

impl Renderer for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(&self, report: &Report) -> Result<Vec<u8>, RenderError> {
        self.render_to_bytes(report)
    }
}
