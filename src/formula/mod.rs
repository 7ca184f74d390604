//! Field formula mini-language
//!
//! A field formula transforms the raw row value of its field before it is
//! written to the sheet, e.g. `NENGO(CTOD(作成日))` turns `2025/04/07`
//! into `令和7年`.
//!
//! # Module Structure
//!
//! - `parser` - Formula text → expression tree (depth-aware argument split)
//! - `evaluator` - Expression tree → [`Value`] for one row value
//! - `functions` - Function table: NENGO, CTOD, WYEAR, FORMAT
//! - `dates` - Date parsing and Japanese era conversion
//! - `format` - Numeric pattern rendering

pub mod dates;
pub mod evaluator;
pub mod format;
pub mod functions;
pub mod parser;

#[cfg(test)]
mod tests;

pub use dates::{convert_string_to_date, era_and_year, japanese_era, japanese_year};
pub use evaluator::{evaluate, FormulaContext, Value};
pub use format::{format_number, NumberPattern};
pub use functions::Function;
pub use parser::{parse_formula, Expr};
