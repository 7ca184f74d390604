//! Row-to-cell binding
//!
//! Every column of a data row whose header names a registered field is run
//! through that field's formula and written to the field's cell on the
//! active sheet. Columns without a registered field are ignored.

use super::context::ProcessingContext;
use crate::error::{ReportError, ReportResult};
use crate::excel::Workbook;
use crate::registry::{FieldRegistry, FieldSource};
use crate::types::DataRow;
use std::io::BufRead;
use tracing::debug;

pub struct DataBinder<'a> {
    source: &'a dyn FieldSource,
}

impl<'a> DataBinder<'a> {
    pub fn new(source: &'a dyn FieldSource) -> Self {
        Self { source }
    }

    /// Bind the data section at the reader's cursor.
    ///
    /// Returns true if another function section follows.
    pub fn bind_data_section<R: BufRead>(
        &self,
        ctx: &mut ProcessingContext<R>,
    ) -> ReportResult<bool> {
        let form_file = ctx.form_file_name.as_deref().ok_or_else(|| {
            ReportError::Format("Data section before any VrSetForm command".to_string())
        })?;
        let registry = ctx.registries.get_or_load(form_file, self.source)?;
        let workbook = ctx
            .workbook
            .as_mut()
            .ok_or_else(|| ReportError::NotFound("No template loaded (missing XSFN)".to_string()))?;

        let mut section = ctx.reader.read_data_section()?;
        let mut rows = 0usize;
        for row in section.by_ref() {
            bind_row(workbook, registry, &row?)?;
            rows += 1;
        }
        debug!(form = form_file, rows, "data section bound");
        section.finish()
    }
}

/// Write one row into the active sheet, returning the number of cells written.
///
/// Columns are processed in header order, so when two fields share a cell
/// the later column wins.
pub fn bind_row(
    workbook: &mut Workbook,
    registry: &FieldRegistry,
    row: &DataRow,
) -> ReportResult<usize> {
    let mut written = 0;
    for (column, value) in row.iter() {
        let Some(field) = registry.get(column) else {
            continue;
        };
        let text = field.exec_formula(value)?;
        let address = field.cell_address()?;
        workbook.set_cell_text(address, &text)?;
        debug!(field = column, cell = %address, value = %text, "cell written");
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excel::{CellAddress, Sheet};
    use crate::parser::SectionReader;
    use crate::types::ReportFormatField;
    use std::io::Cursor;

    struct StaticSource(Vec<ReportFormatField>);

    impl FieldSource for StaticSource {
        fn load_fields(&self, _form_file: &str) -> ReportResult<Vec<ReportFormatField>> {
            Ok(self.0.clone())
        }
    }

    fn row(header: &[&str], values: &[&str]) -> DataRow {
        let header: Vec<String> = header.iter().map(|s| s.to_string()).collect();
        DataRow::from_record(&header, values.iter().map(|s| s.to_string()).collect())
    }

    fn cell(workbook: &Workbook, a1: &str) -> Option<String> {
        workbook
            .active_cell_text(CellAddress::parse(a1).unwrap())
            .map(str::to_string)
    }

    #[test]
    fn test_bind_row_ignores_unregistered_columns() {
        let registry = FieldRegistry::from_fields(vec![ReportFormatField::new("name", "B2", "")]);
        let mut workbook = Workbook::from_sheets(vec![Sheet::new("Sheet1")]);
        let written = bind_row(&mut workbook, &registry, &row(&["name", "extra"], &["Yamada", "x"]))
            .unwrap();
        assert_eq!(written, 1);
        assert_eq!(cell(&workbook, "B2").as_deref(), Some("Yamada"));
        assert_eq!(workbook.active_sheet().unwrap().cell_count(), 1);
    }

    #[test]
    fn test_bind_row_later_column_wins() {
        let registry = FieldRegistry::from_fields(vec![
            ReportFormatField::new("first", "A1", ""),
            ReportFormatField::new("second", "A1", ""),
        ]);
        let mut workbook = Workbook::from_sheets(vec![Sheet::new("Sheet1")]);
        bind_row(&mut workbook, &registry, &row(&["first", "second"], &["1", "2"])).unwrap();
        assert_eq!(cell(&workbook, "A1").as_deref(), Some("2"));
    }

    #[test]
    fn test_bind_row_applies_formula() {
        let registry = FieldRegistry::from_fields(vec![ReportFormatField::new(
            "作成日",
            "A1",
            "NENGO(CTOD(作成日))",
        )]);
        let mut workbook = Workbook::from_sheets(vec![Sheet::new("Sheet1")]);
        bind_row(&mut workbook, &registry, &row(&["作成日"], &["2025/04/07"])).unwrap();
        assert_eq!(cell(&workbook, "A1").as_deref(), Some("令和7年"));
    }

    #[test]
    fn test_bad_location_is_format_error() {
        let registry = FieldRegistry::from_fields(vec![ReportFormatField::new("a", "??", "")]);
        let mut workbook = Workbook::from_sheets(vec![Sheet::new("Sheet1")]);
        let err = bind_row(&mut workbook, &registry, &row(&["a"], &["1"])).unwrap_err();
        assert_eq!(err.kind(), "format");
    }

    #[test]
    fn test_bind_section_writes_to_active_sheet() {
        let source = StaticSource(vec![ReportFormatField::new("v", "C3", "")]);
        let input = "v\nfirst\nsecond\n<start>\n";
        let mut ctx = ProcessingContext::new(SectionReader::new(Cursor::new(input.as_bytes())));
        ctx.form_file_name = Some("form1.xml".to_string());
        let mut workbook = Workbook::from_sheets(vec![Sheet::new("A"), Sheet::new("B")]);
        workbook.set_active_sheet(1).unwrap();
        ctx.workbook = Some(workbook);

        let more = DataBinder::new(&source).bind_data_section(&mut ctx).unwrap();
        assert!(more);

        let workbook = ctx.workbook.as_ref().unwrap();
        assert_eq!(cell(workbook, "C3").as_deref(), Some("second"));
        assert_eq!(workbook.sheet(0).unwrap().cell_count(), 0);
    }

    #[test]
    fn test_bind_section_without_form_is_format_error() {
        let source = StaticSource(Vec::new());
        let mut ctx = ProcessingContext::new(SectionReader::new(Cursor::new("a\n1\n".as_bytes())));
        ctx.workbook = Some(Workbook::from_sheets(vec![Sheet::new("A")]));
        let err = DataBinder::new(&source).bind_data_section(&mut ctx).unwrap_err();
        assert_eq!(err.kind(), "format");
    }
}
