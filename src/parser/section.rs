//! Section stream reader
//!
//! A report data file alternates function sections and data sections:
//!
//! ```text
//! <start>
//! VrSetForm=form1,1
//! VrComout=XSFN template.xlsx
//! <end>
//! 作成日,氏名
//! 2025/04/07,山田
//! <start>
//! ...
//! ```
//!
//! The reader is a line cursor with a single line of pushback, which is all
//! that is needed to hand a `<start>` line seen at the end of a data section
//! back to the next function section read.

use crate::error::{ReportError, ReportResult};
use crate::types::DataRow;
use std::io::BufRead;
use tracing::warn;

pub const START_MARKER: &str = "<start>";
pub const END_MARKER: &str = "<end>";

/// Line cursor over a report data file
pub struct SectionReader<R> {
    input: R,
    pushback: Option<String>,
    line_number: usize,
}

impl<R: BufRead> SectionReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            pushback: None,
            line_number: 0,
        }
    }

    /// Number of lines consumed from the underlying input
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Next line without its terminator, or `None` at end of input
    pub fn next_line(&mut self) -> ReportResult<Option<String>> {
        if let Some(line) = self.pushback.take() {
            return Ok(Some(line));
        }

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        if self.line_number == 1 {
            if let Some(stripped) = line.strip_prefix('\u{feff}') {
                line = stripped.to_string();
            }
        }
        Ok(Some(line))
    }

    /// Push one line back; the next `next_line` call returns it
    fn unread(&mut self, line: String) {
        self.pushback = Some(line);
    }

    /// Read the command lines between `<start>` and `<end>`.
    ///
    /// The current line must be `<start>`.
    pub fn read_function_section(&mut self) -> ReportResult<Vec<String>> {
        match self.next_line()? {
            Some(line) if line == START_MARKER => {}
            Some(line) => {
                return Err(ReportError::Format(format!(
                    "Line {}: expected '{}', found '{}'",
                    self.line_number, START_MARKER, line
                )))
            }
            None => {
                return Err(ReportError::Format(format!(
                    "Expected '{}', found end of input",
                    START_MARKER
                )))
            }
        }

        let mut lines = Vec::new();
        loop {
            match self.next_line()? {
                Some(line) if line == END_MARKER => return Ok(lines),
                Some(line) => lines.push(line),
                None => {
                    return Err(ReportError::Format(format!(
                        "Function section not closed with '{}' before end of input",
                        END_MARKER
                    )))
                }
            }
        }
    }

    /// Start reading a data section: CSV header, then CSV rows.
    ///
    /// Rows are produced lazily by the returned [`DataSection`]. A header
    /// line that cannot be tokenised is a format error.
    pub fn read_data_section(&mut self) -> ReportResult<DataSection<'_, R>> {
        let header = match self.next_line()? {
            None => return Ok(DataSection::ended(self, false)),
            Some(line) if line == START_MARKER => {
                self.unread(line);
                return Ok(DataSection::ended(self, true));
            }
            Some(line) => match tokenize_csv_line(&line) {
                Ok(Some(fields)) => fields,
                Ok(None) => Vec::new(),
                Err(e) => {
                    return Err(ReportError::Format(format!(
                        "Line {}: malformed CSV header: {}",
                        self.line_number, e
                    )))
                }
            },
        };

        Ok(DataSection {
            reader: self,
            header,
            next_section: None,
        })
    }
}

/// Lazy, single-pass sequence of data rows.
///
/// Ends at end of input or just before a `<start>` line, which stays
/// available to the next [`SectionReader::read_function_section`] call.
pub struct DataSection<'a, R> {
    reader: &'a mut SectionReader<R>,
    header: Vec<String>,
    /// Set once the section has ended: whether a function section follows
    next_section: Option<bool>,
}

impl<'a, R: BufRead> DataSection<'a, R> {
    fn ended(reader: &'a mut SectionReader<R>, next_section: bool) -> Self {
        Self {
            reader,
            header: Vec::new(),
            next_section: Some(next_section),
        }
    }

    /// Column names from the CSV header line
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Drain any remaining rows; true if another function section follows
    pub fn finish(mut self) -> ReportResult<bool> {
        for row in self.by_ref() {
            row?;
        }
        Ok(self.next_section.unwrap_or(false))
    }
}

impl<R: BufRead> Iterator for DataSection<'_, R> {
    type Item = ReportResult<DataRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_section.is_some() {
            return None;
        }

        loop {
            let line = match self.reader.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.next_section = Some(false);
                    return None;
                }
                Err(e) => {
                    self.next_section = Some(false);
                    return Some(Err(e));
                }
            };

            if line == START_MARKER {
                self.reader.unread(line);
                self.next_section = Some(true);
                return None;
            }

            match tokenize_csv_line(&line) {
                Ok(Some(values)) => return Some(Ok(DataRow::from_record(&self.header, values))),
                Ok(None) => continue,
                Err(e) => {
                    warn!(
                        line = self.reader.line_number(),
                        error = %e,
                        "skipping malformed CSV line"
                    );
                    continue;
                }
            }
        }
    }
}

/// Tokenise one CSV line; `None` for a line holding no record
fn tokenize_csv_line(line: &str) -> Result<Option<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    let mut record = csv::StringRecord::new();
    if !reader.read_record(&mut record)? {
        return Ok(None);
    }
    Ok(Some(record.iter().map(str::to_string).collect()))
}
