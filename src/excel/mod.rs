//! Spreadsheet engine adapter
//!
//! - Import: template (.xlsx) → in-memory [`Workbook`] via calamine
//! - Export: [`Workbook`] → .xlsx via rust_xlsxwriter
//!
//! Cell values, formulas, merged ranges, column widths and custom row
//! heights survive the trip. Styles do not.

mod address;
mod exporter;
mod importer;
mod layout;
mod workbook;

pub use address::CellAddress;
pub use exporter::XlsxExporter;
pub use importer::TemplateImporter;
pub use layout::{ColumnWidth, MergedRange, SheetLayout};
pub use workbook::{CellValue, Sheet, Workbook};
