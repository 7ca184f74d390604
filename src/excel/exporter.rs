//! Workbook exporter - in-memory workbook → Excel (.xlsx)

use crate::error::ReportResult;
use crate::excel::workbook::{CellValue, Sheet, Workbook};
use rust_xlsxwriter::{Format, Formula, Worksheet};
use std::path::Path;

/// Writes a workbook with `rust_xlsxwriter`
pub struct XlsxExporter<'a> {
    workbook: &'a Workbook,
}

impl<'a> XlsxExporter<'a> {
    pub fn new(workbook: &'a Workbook) -> Self {
        Self { workbook }
    }

    /// Save the workbook to an .xlsx file
    pub fn save(&self, output_path: &Path) -> ReportResult<()> {
        let mut xlsx = self.build()?;
        xlsx.save(output_path)?;
        Ok(())
    }

    /// Serialize the workbook to .xlsx bytes
    pub fn to_buffer(&self) -> ReportResult<Vec<u8>> {
        let mut xlsx = self.build()?;
        Ok(xlsx.save_to_buffer()?)
    }

    fn build(&self) -> ReportResult<rust_xlsxwriter::Workbook> {
        let mut xlsx = rust_xlsxwriter::Workbook::new();
        let active = self.workbook.active_sheet_index();

        for (idx, sheet) in self.workbook.sheets().iter().enumerate() {
            let worksheet = xlsx.add_worksheet();
            worksheet.set_name(&sheet.name)?;
            Self::write_layout(worksheet, sheet)?;
            Self::write_sheet(worksheet, sheet)?;
            if idx == active {
                worksheet.set_active(true);
            }
        }

        Ok(xlsx)
    }

    /// Must run before `write_sheet`: merging blanks the covered cells
    fn write_layout(worksheet: &mut Worksheet, sheet: &Sheet) -> ReportResult<()> {
        for column in &sheet.layout.columns {
            worksheet.set_column_range_width_pixels(
                column.first_col,
                column.last_col,
                column.pixels(),
            )?;
        }
        for (&row, &height) in &sheet.layout.row_heights {
            worksheet.set_row_height(row, height)?;
        }

        let format = Format::new();
        for range in &sheet.layout.merged {
            if range.first == range.last {
                continue;
            }
            worksheet.merge_range(
                range.first.row,
                range.first.col,
                range.last.row,
                range.last.col,
                "",
                &format,
            )?;
        }
        Ok(())
    }

    fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> ReportResult<()> {
        for (address, value) in sheet.cells() {
            let (row, col) = (address.row, address.col);
            match value {
                CellValue::Text(text) => {
                    worksheet.write_string(row, col, text)?;
                }
                CellValue::Number(n) => {
                    worksheet.write_number(row, col, *n)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(row, col, *b)?;
                }
                CellValue::Formula(formula) => {
                    worksheet.write_formula(row, col, Formula::new(format!("={}", formula)))?;
                }
            }
        }
        Ok(())
    }
}
