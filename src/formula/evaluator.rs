//! Field formula evaluator
//!
//! Evaluates an expression tree bottom-up against the current row value of
//! the owning field. Evaluation never touches shared state.

use super::functions::Function;
use super::parser::Expr;
use crate::error::ReportResult;
use chrono::NaiveDate;

/// Value type produced during evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A text value
    Text(String),
    /// A numeric value
    Number(f64),
    /// A calendar date, produced only by CTOD
    Date(NaiveDate),
    /// No value: unparseable date or unknown function
    Absent,
}

impl Value {
    /// Type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Number(_) => "number",
            Value::Date(_) => "date",
            Value::Absent => "absent",
        }
    }

    /// Convert the final result of a formula to cell text
    pub fn into_text(self) -> String {
        match self {
            Value::Text(s) => s,
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Absent => String::new(),
        }
    }
}

/// Evaluation context: the owning field and the row value bound to it
#[derive(Debug, Clone, Copy)]
pub struct FormulaContext<'a> {
    pub field_name: &'a str,
    pub row_value: &'a str,
}

impl<'a> FormulaContext<'a> {
    pub fn new(field_name: &'a str, row_value: &'a str) -> Self {
        Self {
            field_name,
            row_value,
        }
    }

    /// Evaluate an expression; arguments left to right, then the call
    pub fn evaluate(&self, expr: &Expr) -> ReportResult<Value> {
        match expr {
            Expr::Literal(text) => Ok(self.literal(text)),
            Expr::Call { name, args } => {
                let values = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<ReportResult<Vec<_>>>()?;
                match Function::from_name(name) {
                    Some(function) => function.call(values),
                    None => Ok(Value::Absent),
                }
            }
        }
    }

    fn literal(&self, text: &str) -> Value {
        if text == self.field_name {
            return Value::Text(self.row_value.to_string());
        }
        if let Some(inner) = text
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            return Value::Text(inner.to_string());
        }
        if is_number_literal(text) {
            if let Ok(n) = text.parse::<f64>() {
                return Value::Number(n);
            }
        }
        Value::Text(text.to_string())
    }
}

/// Evaluate an expression for one field and row value
pub fn evaluate(expr: &Expr, field_name: &str, row_value: &str) -> ReportResult<Value> {
    FormulaContext::new(field_name, row_value).evaluate(expr)
}

/// Plain decimal literal: optional sign, digits, optional fraction
fn is_number_literal(text: &str) -> bool {
    let body = text.strip_prefix(['-', '+']).unwrap_or(text);
    let (int, frac) = match body.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (body, None),
    };
    !int.is_empty()
        && int.bytes().all(|b| b.is_ascii_digit())
        && frac.map_or(true, |f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_text() {
        assert_eq!(Value::Number(7.0).into_text(), "7");
        assert_eq!(Value::Number(-2.5).into_text(), "-2.5");
        assert_eq!(Value::Text("x".into()).into_text(), "x");
        assert_eq!(Value::Absent.into_text(), "");
        let date = NaiveDate::from_ymd_opt(2025, 4, 7).unwrap();
        assert_eq!(Value::Date(date).into_text(), "2025-04-07");
    }

    #[test]
    fn test_number_literal_shape() {
        assert!(is_number_literal("1234.56"));
        assert!(is_number_literal("-3"));
        assert!(is_number_literal("+0.5"));
        assert!(!is_number_literal("1e5"));
        assert!(!is_number_literal("1."));
        assert!(!is_number_literal(".5"));
        assert!(!is_number_literal("2025/04/07"));
        assert!(!is_number_literal("abc"));
    }

    #[test]
    fn test_literal_resolution() {
        let ctx = FormulaContext::new("金額", "1000");
        assert_eq!(ctx.literal("金額"), Value::Text("1000".into()));
        assert_eq!(ctx.literal("\"a,b\""), Value::Text("a,b".into()));
        assert_eq!(ctx.literal("42"), Value::Number(42.0));
        assert_eq!(ctx.literal("other"), Value::Text("other".into()));
    }
}
