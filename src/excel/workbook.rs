//! In-memory workbook under construction
//!
//! Holds the sheets loaded from a template, lets the command interpreter
//! rearrange them and the data binder fill cells, then hands the result to
//! the xlsx exporter.

use crate::error::{ReportError, ReportResult};
use crate::excel::address::CellAddress;
use crate::excel::layout::SheetLayout;
use std::collections::BTreeMap;
use std::path::Path;

/// Content of one cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    /// Formula text without the leading `=`
    Formula(String),
}

impl CellValue {
    /// Text content, if this is a text cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A named sheet with sparse cell storage
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    /// Merges, column widths and row heights copied with the sheet
    pub layout: SheetLayout,
    cells: BTreeMap<CellAddress, CellValue>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layout: SheetLayout::default(),
            cells: BTreeMap::new(),
        }
    }

    pub fn cell(&self, address: CellAddress) -> Option<&CellValue> {
        self.cells.get(&address)
    }

    /// Store a value, creating the cell if absent
    pub fn set_cell(&mut self, address: CellAddress, value: CellValue) {
        self.cells.insert(address, value);
    }

    /// Cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (&CellAddress, &CellValue)> {
        self.cells.iter()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

/// Ordered sheets plus the active sheet index
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    active: usize,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a workbook from sheets, first sheet active
    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets, active: 0 }
    }

    /// Load an xlsx template
    pub fn load(path: &Path) -> ReportResult<Self> {
        super::TemplateImporter::new(path).import()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheet_index(name).and_then(|idx| self.sheets.get(idx))
    }

    /// Append a new sheet, returning its index
    pub fn add_sheet(&mut self, sheet: Sheet) -> ReportResult<usize> {
        validate_sheet_name(&sheet.name)?;
        if self.sheet_index(&sheet.name).is_some() {
            return Err(ReportError::Format(format!(
                "Sheet '{}' already exists",
                sheet.name
            )));
        }
        self.sheets.push(sheet);
        Ok(self.sheets.len() - 1)
    }

    /// Index of the sheet with the given name (case-insensitive, as Excel)
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn active_sheet_index(&self) -> usize {
        self.active
    }

    pub fn active_sheet(&self) -> Option<&Sheet> {
        self.sheets.get(self.active)
    }

    pub fn set_active_sheet(&mut self, index: usize) -> ReportResult<()> {
        self.check_index(index)?;
        self.active = index;
        Ok(())
    }

    /// Copy a sheet under a new name, appended after the last sheet
    pub fn clone_sheet(&mut self, index: usize, new_name: &str) -> ReportResult<usize> {
        self.check_index(index)?;
        let mut copy = self.sheets[index].clone();
        copy.name = new_name.to_string();
        self.add_sheet(copy)
    }

    /// Delete a sheet, keeping the active index on a valid sheet
    pub fn remove_sheet(&mut self, index: usize) -> ReportResult<Sheet> {
        self.check_index(index)?;
        let removed = self.sheets.remove(index);
        if self.active > index || (self.active == self.sheets.len() && self.active > 0) {
            self.active -= 1;
        }
        Ok(removed)
    }

    /// Write text to a cell of the active sheet
    pub fn set_cell_text(&mut self, address: CellAddress, text: &str) -> ReportResult<()> {
        let active = self.active;
        let sheet = self
            .sheets
            .get_mut(active)
            .ok_or_else(|| ReportError::NotFound("Workbook has no active sheet".to_string()))?;
        sheet.set_cell(address, CellValue::Text(text.to_string()));
        Ok(())
    }

    /// Text of a cell on the active sheet
    pub fn active_cell_text(&self, address: CellAddress) -> Option<&str> {
        self.active_sheet()
            .and_then(|s| s.cell(address))
            .and_then(CellValue::as_text)
    }

    /// Serialize to xlsx bytes
    pub fn save_to_buffer(&self) -> ReportResult<Vec<u8>> {
        super::XlsxExporter::new(self).to_buffer()
    }

    /// Serialize to an xlsx file
    pub fn save(&self, path: &Path) -> ReportResult<()> {
        super::XlsxExporter::new(self).save(path)
    }

    fn check_index(&self, index: usize) -> ReportResult<()> {
        if index >= self.sheets.len() {
            return Err(ReportError::NotFound(format!(
                "Sheet index {} out of range ({} sheets)",
                index,
                self.sheets.len()
            )));
        }
        Ok(())
    }
}

/// Check a sheet name against Excel's naming rules
pub fn validate_sheet_name(name: &str) -> ReportResult<()> {
    rust_xlsxwriter::utility::check_sheet_name(name)
        .map_err(|e| ReportError::Format(e.to_string()))
}
