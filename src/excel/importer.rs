//! Template importer - Excel (.xlsx) → in-memory workbook

use crate::error::{ReportError, ReportResult};
use crate::excel::address::CellAddress;
use crate::excel::layout::{self, MergedRange};
use crate::excel::workbook::{CellValue, Sheet, Workbook};
use calamine::{open_workbook, Data, Dimensions, Range, Reader, Xlsx};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads every sheet of a template: values, formulas and layout
pub struct TemplateImporter {
    path: PathBuf,
}

impl TemplateImporter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Import the template, first sheet active
    pub fn import(&self) -> ReportResult<Workbook> {
        if !self.path.exists() {
            return Err(ReportError::NotFound(format!(
                "Template file '{}' does not exist",
                self.path.display()
            )));
        }

        let mut workbook: Xlsx<_> = open_workbook(&self.path).map_err(|e| {
            ReportError::Workbook(format!(
                "Failed to open template '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        let mut dimensions = layout::read_dimensions(&self.path)?;
        let mut sheets = Vec::new();
        for sheet_name in workbook.sheet_names().to_vec() {
            let mut sheet = self.import_sheet(&sheet_name, &mut workbook)?;
            if let Some(found) = dimensions.remove(&sheet_name) {
                sheet.layout.columns = found.columns;
                sheet.layout.row_heights = found.row_heights;
            }
            sheets.push(sheet);
        }
        debug!(path = %self.path.display(), sheets = sheets.len(), "template imported");

        Ok(Workbook::from_sheets(sheets))
    }

    fn import_sheet(
        &self,
        sheet_name: &str,
        workbook: &mut Xlsx<BufReader<File>>,
    ) -> ReportResult<Sheet> {
        let mut sheet = Sheet::new(sheet_name);

        let range = workbook.worksheet_range(sheet_name).map_err(|e| {
            ReportError::Workbook(format!("Failed to read sheet '{}': {}", sheet_name, e))
        })?;
        for (address, data) in offset_cells(&range) {
            if let Some(value) = convert_data(data) {
                sheet.set_cell(address, value);
            }
        }

        // Formulas take precedence over their cached values
        if let Ok(formulas) = workbook.worksheet_formula(sheet_name) {
            for (address, formula) in offset_cells(&formulas) {
                if !formula.is_empty() {
                    let formula = formula.strip_prefix('=').unwrap_or(formula);
                    sheet.set_cell(address, CellValue::Formula(formula.to_string()));
                }
            }
        }

        sheet.layout.merged = match workbook.worksheet_merge_cells(sheet_name) {
            Some(merges) => merges
                .map_err(|e| {
                    ReportError::Workbook(format!(
                        "Failed to read merged cells of '{}': {}",
                        sheet_name, e
                    ))
                })?
                .iter()
                .filter_map(merged_range)
                .collect(),
            None => Vec::new(),
        };

        Ok(sheet)
    }
}

fn merged_range(dimensions: &Dimensions) -> Option<MergedRange> {
    let corner = |(row, col): (u32, u32)| Some(CellAddress::new(row, u16::try_from(col).ok()?));
    Some(MergedRange {
        first: corner(dimensions.start)?,
        last: corner(dimensions.end)?,
    })
}

/// Cells of a range with absolute addresses
fn offset_cells<T>(range: &Range<T>) -> impl Iterator<Item = (CellAddress, &T)> + '_
where
    T: calamine::CellType,
{
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    range.cells().filter_map(move |(row, col, value)| {
        let row = start_row as usize + row;
        let col = start_col as usize + col;
        let row = u32::try_from(row).ok()?;
        let col = u16::try_from(col).ok()?;
        Some((CellAddress::new(row, col), value))
    })
}

fn convert_data(data: &Data) -> Option<CellValue> {
    match data {
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(_) | Data::Empty => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_template_is_not_found() {
        let err = TemplateImporter::new("/nonexistent/template.xlsx")
            .import()
            .unwrap_err();
        assert_eq!(err.kind(), "not-found");
    }

    #[test]
    fn test_convert_data() {
        assert_eq!(
            convert_data(&Data::String("x".into())),
            Some(CellValue::Text("x".into()))
        );
        assert_eq!(convert_data(&Data::Int(3)), Some(CellValue::Number(3.0)));
        assert_eq!(convert_data(&Data::Bool(true)), Some(CellValue::Bool(true)));
        assert_eq!(convert_data(&Data::Empty), None);
    }

    #[test]
    fn test_merged_range() {
        let range = merged_range(&Dimensions {
            start: (0, 0),
            end: (1, 3),
        })
        .unwrap();
        assert_eq!(range.first, CellAddress::new(0, 0));
        assert_eq!(range.last, CellAddress::new(1, 3));
    }
}
