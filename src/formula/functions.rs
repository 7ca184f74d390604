//! Formula function table
//!
//! Names map to a closed set of functions. A name outside the table is not
//! an error: the call evaluates to [`Value::Absent`].

use super::dates;
use super::evaluator::Value;
use super::format::format_number;
use crate::error::{ReportError, ReportResult};

/// Functions available to field formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    /// NENGO(date) → "<era><year>年"
    Nengo,
    /// CTOD(text) → date, or absent when the text is not YYYY/MM/DD.
    /// A YYYY/MM/DD text naming no real day is a format error.
    Ctod,
    /// WYEAR(date) → year within the era
    Wyear,
    /// FORMAT(number, pattern) → formatted text
    Format,
}

const FUNCTIONS: &[(&str, Function)] = &[
    ("NENGO", Function::Nengo),
    ("CTOD", Function::Ctod),
    ("WYEAR", Function::Wyear),
    ("FORMAT", Function::Format),
];

impl Function {
    /// Look up a function by its exact (case-sensitive) name
    pub fn from_name(name: &str) -> Option<Self> {
        FUNCTIONS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, f)| *f)
    }

    pub fn name(&self) -> &'static str {
        FUNCTIONS
            .iter()
            .find(|(_, f)| f == self)
            .map(|(n, _)| *n)
            .unwrap_or("?")
    }

    /// Apply the function to already evaluated arguments
    pub fn call(self, args: Vec<Value>) -> ReportResult<Value> {
        match self {
            Function::Nengo => {
                let date = self.date_argument(args)?;
                Ok(Value::Text(dates::japanese_era(date)?))
            }
            Function::Wyear => {
                let date = self.date_argument(args)?;
                Ok(Value::Number(f64::from(dates::japanese_year(date)?)))
            }
            Function::Ctod => {
                let [arg] = self.exact_arguments::<1>(args)?;
                let text = match arg {
                    Value::Text(s) => s,
                    Value::Number(n) => Value::Number(n).into_text(),
                    Value::Absent => return Ok(Value::Absent),
                    other => return Err(self.type_error("text", &[other])),
                };
                Ok(dates::convert_string_to_date(&text)?
                    .map(Value::Date)
                    .unwrap_or(Value::Absent))
            }
            Function::Format => {
                let [number, pattern] = self.exact_arguments::<2>(args)?;
                match (number, pattern) {
                    (Value::Number(n), Value::Text(p)) => Ok(Value::Text(format_number(n, &p)?)),
                    (number, pattern) => Err(self.type_error("number and text", &[number, pattern])),
                }
            }
        }
    }

    fn date_argument(self, args: Vec<Value>) -> ReportResult<chrono::NaiveDate> {
        match self.exact_arguments::<1>(args)? {
            [Value::Date(date)] => Ok(date),
            [other] => Err(self.type_error("date", &[other])),
        }
    }

    fn exact_arguments<const N: usize>(self, args: Vec<Value>) -> ReportResult<[Value; N]> {
        let count = args.len();
        args.try_into().map_err(|_| {
            ReportError::Type(format!(
                "{} expects {} argument(s), got {}",
                self.name(),
                N,
                count
            ))
        })
    }

    fn type_error(self, expected: &str, got: &[Value]) -> ReportError {
        let got: Vec<&str> = got.iter().map(Value::type_name).collect();
        ReportError::Type(format!(
            "{} expects {}, got {}",
            self.name(),
            expected,
            got.join(", ")
        ))
    }
}
