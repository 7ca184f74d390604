//! Sheet layout carried from a template into the report
//!
//! Merged ranges come from calamine. Column widths and custom row heights
//! are not exposed by calamine, so they are read from the worksheet parts
//! of the package directly:
//!
//! ```xml
//! <cols><col min="1" max="1" width="40.7109375" customWidth="1"/></cols>
//! <sheetData><row r="1" ht="30" customHeight="1">...</row></sheetData>
//! ```

use crate::error::{ReportError, ReportResult};
use crate::excel::address::CellAddress;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";

/// Excel's last column, 1-based
const MAX_COL: u32 = 16_384;

/// A rectangular merged range, both corners inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedRange {
    pub first: CellAddress,
    pub last: CellAddress,
}

/// Width of a run of columns, in the character units stored by Excel
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnWidth {
    pub first_col: u16,
    pub last_col: u16,
    pub width: f64,
}

impl ColumnWidth {
    /// Width in pixels for the default Calibri 11 font
    pub fn pixels(&self) -> u16 {
        (self.width * 7.0).round().clamp(0.0, f64::from(u16::MAX)) as u16
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetLayout {
    pub merged: Vec<MergedRange>,
    pub columns: Vec<ColumnWidth>,
    /// Custom row heights in points, keyed by 0-based row
    pub row_heights: BTreeMap<u32, f64>,
}

/// Column widths and row heights of every worksheet, keyed by sheet name
pub(crate) fn read_dimensions(path: &Path) -> ReportResult<HashMap<String, SheetLayout>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| package_error(path, e))?;

    let (Some(workbook_xml), Some(rels_xml)) = (
        read_part(&mut archive, WORKBOOK_PART)?,
        read_part(&mut archive, WORKBOOK_RELS_PART)?,
    ) else {
        return Ok(HashMap::new());
    };

    let targets = relationship_targets(&rels_xml)?;
    let mut layouts = HashMap::new();
    for (sheet_name, rel_id) in sheet_relationships(&workbook_xml)? {
        let Some(target) = targets.get(&rel_id) else {
            continue;
        };
        if let Some(sheet_xml) = read_part(&mut archive, &part_path(target))? {
            layouts.insert(sheet_name, sheet_dimensions(&sheet_xml)?);
        }
    }
    Ok(layouts)
}

fn package_error(path: &Path, e: zip::result::ZipError) -> ReportError {
    ReportError::Workbook(format!(
        "Failed to read template package '{}': {}",
        path.display(),
        e
    ))
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> ReportResult<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => {
            return Err(ReportError::Workbook(format!(
                "Failed to read part '{}': {}",
                name, e
            )))
        }
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

/// Relationship targets are relative to `xl/` unless absolute
fn part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn xml_error(e: impl std::fmt::Display) -> ReportError {
    ReportError::Workbook(format!("Malformed template XML: {}", e))
}

fn attribute(element: &BytesStart<'_>, local_name: &[u8]) -> ReportResult<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.local_name().as_ref() == local_name {
            return Ok(Some(attr.unescape_value().map_err(xml_error)?.to_string()));
        }
    }
    Ok(None)
}

fn xml_bool(value: Option<String>) -> bool {
    matches!(value.as_deref(), Some("1") | Some("true"))
}

/// `(sheet name, relationship id)` in workbook order
fn sheet_relationships(xml: &str) -> ReportResult<Vec<(String, String)>> {
    let mut reader = Reader::from_str(xml);
    let mut sheets = Vec::new();
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                if let (Some(name), Some(id)) = (attribute(&e, b"name")?, attribute(&e, b"id")?) {
                    sheets.push((name, id));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(sheets)
}

fn relationship_targets(xml: &str) -> ReportResult<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut targets = HashMap::new();
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) =
                    (attribute(&e, b"Id")?, attribute(&e, b"Target")?)
                {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(targets)
}

/// Column widths and custom row heights of one worksheet part
fn sheet_dimensions(xml: &str) -> ReportResult<SheetLayout> {
    let mut reader = Reader::from_str(xml);
    let mut layout = SheetLayout::default();
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"col" => {
                if let Some(column) = column_width(&e)? {
                    layout.columns.push(column);
                }
            }
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"row" => {
                if !xml_bool(attribute(&e, b"customHeight")?) {
                    continue;
                }
                let row = attribute(&e, b"r")?.and_then(|r| r.parse::<u32>().ok());
                let height = attribute(&e, b"ht")?.and_then(|h| h.parse::<f64>().ok());
                if let (Some(row), Some(height)) = (row, height) {
                    if row > 0 {
                        layout.row_heights.insert(row - 1, height);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(layout)
}

fn column_width(element: &BytesStart<'_>) -> ReportResult<Option<ColumnWidth>> {
    let min = attribute(element, b"min")?.and_then(|v| v.parse::<u32>().ok());
    let max = attribute(element, b"max")?.and_then(|v| v.parse::<u32>().ok());
    let width = attribute(element, b"width")?.and_then(|v| v.parse::<f64>().ok());
    let (Some(min), Some(max), Some(width)) = (min, max, width) else {
        return Ok(None);
    };
    if min == 0 || min > max || max > MAX_COL {
        return Ok(None);
    }
    Ok(Some(ColumnWidth {
        first_col: (min - 1) as u16,
        last_col: (max - 1) as u16,
        width,
    }))
}
