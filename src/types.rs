use crate::error::ReportResult;
use crate::excel::CellAddress;
use crate::formula;

//==============================================================================
// Form Field Definitions
//==============================================================================

/// One field declared by a form definition: where its value lands on the
/// sheet and how the raw row value is transformed first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportFormatField {
    /// Column name in the data section header
    pub field_name: String,
    /// A1-style cell address (e.g. "B3")
    pub location: String,
    /// Formula applied to the row value; empty means identity
    pub formula: String,
}

impl ReportFormatField {
    pub fn new(
        field_name: impl Into<String>,
        location: impl Into<String>,
        formula: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            location: location.into(),
            formula: formula.into(),
        }
    }

    /// Apply this field's formula to a row value.
    ///
    /// An empty formula returns the value unchanged. Otherwise the formula is
    /// parsed and evaluated with `row_value` bound to the field's own name,
    /// and the result is converted to text.
    pub fn exec_formula(&self, row_value: &str) -> ReportResult<String> {
        if self.formula.is_empty() {
            return Ok(row_value.to_string());
        }
        let expr = formula::parse_formula(&self.formula)?;
        let value = formula::evaluate(&expr, &self.field_name, row_value)?;
        Ok(value.into_text())
    }

    /// Decode the declared location
    pub fn cell_address(&self) -> ReportResult<CellAddress> {
        CellAddress::parse(&self.location)
    }
}

//==============================================================================
// Data Section Rows
//==============================================================================

/// One CSV data line keyed by the data section header, in column order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataRow {
    columns: Vec<(String, String)>,
}

impl DataRow {
    /// Pair header names with values; surplus on either side is dropped
    pub fn from_record(header: &[String], values: Vec<String>) -> Self {
        let columns = header.iter().cloned().zip(values).collect();
        Self { columns }
    }

    /// Value of the first column with the given header name
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Columns in header order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
