//! A1-style cell references

use crate::error::{ReportError, ReportResult};
use std::fmt;

/// Last row/column index accepted by the xlsx format (zero-based)
pub const MAX_ROW: u32 = 1_048_575;
pub const MAX_COL: u16 = 16_383;

/// Zero-based row/column pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    pub row: u32,
    pub col: u16,
}

impl CellAddress {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Decode an A1 reference such as `B12` or `$B$12`.
    ///
    /// Column letters are case-insensitive. Anything else, including a
    /// reference outside the sheet bounds, is a format error.
    pub fn parse(reference: &str) -> ReportResult<Self> {
        let invalid = || ReportError::Format(format!("Invalid cell address '{}'", reference));

        let text = reference.trim();
        let text = text.strip_prefix('$').unwrap_or(text);
        let letters_end = text
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(text.len());
        let (letters, rest) = text.split_at(letters_end);
        let digits = rest.strip_prefix('$').unwrap_or(rest);

        if letters.is_empty() || letters.len() > 3 {
            return Err(invalid());
        }
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let mut col: u32 = 0;
        for b in letters.bytes() {
            col = col * 26 + u32::from(b.to_ascii_uppercase() - b'A') + 1;
        }
        let row: u32 = digits.parse().map_err(|_| invalid())?;
        if row == 0 || row - 1 > MAX_ROW || col - 1 > u32::from(MAX_COL) {
            return Err(invalid());
        }

        Ok(Self {
            row: row - 1,
            col: (col - 1) as u16,
        })
    }

    /// Convert a zero-based column index to letters
    ///
    /// Examples:
    /// - 0 → A
    /// - 25 → Z
    /// - 26 → AA
    pub fn column_letters(index: u16) -> String {
        let mut result = String::new();
        let mut idx = usize::from(index);

        loop {
            let remainder = idx % 26;
            result.insert(0, (b'A' + remainder as u8) as char);
            if idx < 26 {
                break;
            }
            idx = idx / 26 - 1;
        }

        result
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::column_letters(self.col), self.row + 1)
    }
}
