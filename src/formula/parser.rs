//! Field formula parser
//!
//! Grammar:
//!
//! ```text
//! expr := literal | name '(' [arg (',' arg)*] ')'
//! ```
//!
//! Arguments are split only at parenthesis depth 0. Commas and parentheses
//! inside a double-quoted literal are part of the literal.

use crate::error::{ReportError, ReportResult};

/// Abstract Syntax Tree node for field formulas
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Bare token: the field's own name, a quoted string, a number or plain text
    Literal(String),
    /// Function call: NAME(arg1, arg2, ...)
    Call { name: String, args: Vec<Expr> },
}

/// Parse a formula string into an expression tree
pub fn parse_formula(formula: &str) -> ReportResult<Expr> {
    parse_expr(formula.trim())
}

fn parse_expr(text: &str) -> ReportResult<Expr> {
    let Some(open) = find_unquoted(text, '(')? else {
        if find_unquoted(text, ')')?.is_some() {
            return Err(parse_error(text, "closing parenthesis without opening"));
        }
        return Ok(Expr::Literal(text.to_string()));
    };

    let name = text[..open].trim();
    if name.is_empty() {
        return Err(parse_error(text, "missing function name"));
    }
    let Some(inner) = text[open + 1..].strip_suffix(')') else {
        return Err(parse_error(text, "call must end with ')'"));
    };

    let args = split_arguments(inner)
        .map_err(|msg| parse_error(text, msg))?
        .into_iter()
        .map(|arg| parse_expr(arg.trim()))
        .collect::<ReportResult<Vec<_>>>()?;

    Ok(Expr::Call {
        name: name.to_string(),
        args,
    })
}

/// Split an argument list at top-level commas.
///
/// The running depth must never go negative and must end at zero.
fn split_arguments(inner: &str) -> Result<Vec<&str>, &'static str> {
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut args = Vec::new();
    let mut depth: usize = 0;
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in inner.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => {}
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or("unbalanced parentheses")?;
            }
            ',' if depth == 0 => {
                args.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if in_quotes {
        return Err("unterminated string literal");
    }
    if depth != 0 {
        return Err("unbalanced parentheses");
    }
    args.push(&inner[start..]);
    Ok(args)
}

/// Byte offset of the first `target` outside double quotes
fn find_unquoted(text: &str, target: char) -> ReportResult<Option<usize>> {
    let mut in_quotes = false;
    for (i, c) in text.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == target && !in_quotes {
            return Ok(Some(i));
        }
    }
    if in_quotes {
        return Err(parse_error(text, "unterminated string literal"));
    }
    Ok(None)
}

fn parse_error(text: &str, message: &str) -> ReportError {
    ReportError::Parse(format!("{} in '{}'", message, text))
}
