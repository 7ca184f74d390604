//! Form definition XML reader
//!
//! Collects every `Field` element of a form definition, at any depth:
//!
//! ```xml
//! <Form>
//!   <Field name="作成日" strComment="A1" strEditFormula="NENGO(CTOD(作成日))"/>
//! </Form>
//! ```
//!
//! `strComment` holds the cell location and `strEditFormula` the formula.

use super::FieldSource;
use crate::error::{ReportError, ReportResult};
use crate::types::ReportFormatField;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::{Path, PathBuf};

const FIELD_ELEMENT: &[u8] = b"Field";
const NAME_ATTR: &[u8] = b"name";
const LOCATION_ATTR: &[u8] = b"strComment";
const FORMULA_ATTR: &[u8] = b"strEditFormula";

/// Loads form definitions from `<xml_dir>/<form file>`
#[derive(Debug, Clone)]
pub struct XmlFieldSource {
    xml_dir: PathBuf,
}

impl XmlFieldSource {
    pub fn new<P: AsRef<Path>>(xml_dir: P) -> Self {
        Self {
            xml_dir: xml_dir.as_ref().to_path_buf(),
        }
    }
}

impl FieldSource for XmlFieldSource {
    fn load_fields(&self, form_file: &str) -> ReportResult<Vec<ReportFormatField>> {
        let path = self.xml_dir.join(form_file);
        if !path.is_file() {
            return Err(ReportError::NotFound(format!(
                "Form definition '{}' does not exist",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(&path)?;
        parse_fields(&content)
    }
}

/// Parse the `Field` elements of a form definition document
pub fn parse_fields(xml: &str) -> ReportResult<Vec<ReportFormatField>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut fields = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == FIELD_ELEMENT => {
                fields.push(field_from_element(&e)?);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(fields)
}

fn field_from_element(element: &BytesStart<'_>) -> ReportResult<ReportFormatField> {
    let mut field = ReportFormatField::default();
    for attr in element.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?.to_string();
        match attr.key.as_ref() {
            NAME_ATTR => field.field_name = value,
            LOCATION_ATTR => field.location = value,
            FORMULA_ATTR => field.formula = value,
            _ => {}
        }
    }
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_fields() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<Form name="form1">
  <Page>
    <Field name="作成日" strComment="A1" strEditFormula="NENGO(CTOD(作成日))"/>
    <Field name="氏名" strComment="B2"></Field>
  </Page>
</Form>"#;
        let fields = parse_fields(xml).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(
            fields[0],
            ReportFormatField::new("作成日", "A1", "NENGO(CTOD(作成日))")
        );
        assert_eq!(fields[1], ReportFormatField::new("氏名", "B2", ""));
    }

    #[test]
    fn test_escaped_formula() {
        let xml = r#"<Form><Field name="n" strComment="C3" strEditFormula="FORMAT(n,&quot;Z9&quot;)"/></Form>"#;
        let fields = parse_fields(xml).unwrap();
        assert_eq!(fields[0].formula, "FORMAT(n,\"Z9\")");
    }

    #[test]
    fn test_malformed_xml_is_format_error() {
        let err = parse_fields("<Form><Field name=\"a\"></Form>").unwrap_err();
        assert_eq!(err.kind(), "format");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = XmlFieldSource::new(dir.path())
            .load_fields("missing.xml")
            .unwrap_err();
        assert_eq!(err.kind(), "not-found");
    }

    #[test]
    fn test_load_from_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("form1.xml"),
            r#"<Form><Field name="a" strComment="A1" strEditFormula=""/></Form>"#,
        )
        .unwrap();
        let fields = XmlFieldSource::new(dir.path()).load_fields("form1.xml").unwrap();
        assert_eq!(fields, vec![ReportFormatField::new("a", "A1", "")]);
    }
}
