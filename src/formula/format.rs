//! Numeric pattern formatting (FORMAT)
//!
//! Field patterns use `Z` for an optional digit and `9` for a required,
//! zero-padded digit. They are mapped onto the familiar decimal pattern
//! language (`#`, `0`, `,`, `.`) and rendered with half-even rounding:
//!
//! - `Z,ZZ9.99` → `#,##0.00`
//! - literal prefix/suffix text is kept; `'...'` quotes special characters
//! - `%` in an affix multiplies by 100
//! - an optional `;` subpattern supplies the negative prefix/suffix

use crate::error::{ReportError, ReportResult};

/// Format a number with a field pattern
pub fn format_number(number: f64, pattern: &str) -> ReportResult<String> {
    if pattern.is_empty() {
        return Err(ReportError::Format("Empty number pattern".to_string()));
    }
    let sanitized: String = pattern
        .chars()
        .filter(|&c| c != '"')
        .map(|c| match c {
            'Z' => '#',
            '9' => '0',
            other => other,
        })
        .collect();

    let parsed = NumberPattern::parse(&sanitized)?;
    Ok(parsed.render(number))
}

/// A compiled decimal pattern
#[derive(Debug, Clone, PartialEq)]
pub struct NumberPattern {
    positive_prefix: String,
    positive_suffix: String,
    negative: Option<(String, String)>,
    min_int: usize,
    min_frac: usize,
    max_frac: usize,
    grouping: usize,
    always_show_point: bool,
    multiplier: f64,
}

impl NumberPattern {
    /// Compile a decimal pattern (`#`, `0`, `,`, `.` plus affixes)
    pub fn parse(pattern: &str) -> ReportResult<Self> {
        if pattern.is_empty() {
            return Err(invalid(pattern, "empty pattern"));
        }
        let (positive, negative) = match pattern.split_once(';') {
            Some((pos, neg)) => (pos, Some(neg)),
            None => (pattern, None),
        };

        let (prefix, number, suffix) = split_affixes(positive).map_err(|m| invalid(pattern, m))?;
        let mut compiled = Self::parse_number(&number).map_err(|m| invalid(pattern, m))?;

        if prefix.contains('%') || suffix.contains('%') {
            compiled.multiplier = 100.0;
        } else if prefix.contains('‰') || suffix.contains('‰') {
            compiled.multiplier = 1000.0;
        }
        compiled.positive_prefix = prefix;
        compiled.positive_suffix = suffix;

        if let Some(neg) = negative {
            let (neg_prefix, _, neg_suffix) = split_affixes(neg).map_err(|m| invalid(pattern, m))?;
            compiled.negative = Some((neg_prefix, neg_suffix));
        }

        Ok(compiled)
    }

    fn parse_number(number: &str) -> Result<Self, &'static str> {
        let (int_part, frac_part) = match number.split_once('.') {
            Some((int, frac)) => (int, Some(frac)),
            None => (number, None),
        };
        if frac_part.is_some_and(|f| f.contains('.')) {
            return Err("multiple decimal separators");
        }

        let mut min_int = 0;
        for c in int_part.chars() {
            match c {
                '0' => min_int += 1,
                '#' if min_int > 0 => return Err("unexpected '#' after '0'"),
                _ => {}
            }
        }

        let grouping = match int_part.rfind(',') {
            Some(pos) => {
                let size = int_part.len() - pos - 1;
                if size == 0 {
                    return Err("grouping separator at end of integer part");
                }
                size
            }
            None => 0,
        };

        let (mut min_frac, mut max_frac) = (0, 0);
        if let Some(frac) = frac_part {
            for c in frac.chars() {
                match c {
                    '0' if max_frac > min_frac => return Err("unexpected '0' after '#'"),
                    '0' => {
                        min_frac += 1;
                        max_frac += 1;
                    }
                    '#' => max_frac += 1,
                    _ => return Err("grouping separator in fraction"),
                }
            }
        }

        Ok(Self {
            positive_prefix: String::new(),
            positive_suffix: String::new(),
            negative: None,
            min_int,
            min_frac,
            max_frac,
            grouping,
            always_show_point: frac_part.is_some_and(str::is_empty),
            multiplier: 1.0,
        })
    }

    /// Render a number against this pattern
    pub fn render(&self, number: f64) -> String {
        let negative = number < 0.0;
        let (prefix, suffix) = match (&self.negative, negative) {
            (Some((p, s)), true) => (p.clone(), s.clone()),
            (None, true) => (format!("-{}", self.positive_prefix), self.positive_suffix.clone()),
            (_, false) => (self.positive_prefix.clone(), self.positive_suffix.clone()),
        };

        if number.is_nan() {
            return "NaN".to_string();
        }
        if number.is_infinite() {
            return format!("{}∞{}", prefix, suffix);
        }

        let value = number.abs() * self.multiplier;
        let fixed = format!("{:.*}", self.max_frac, value);
        let (int_digits, frac_digits) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

        let mut int_digits = int_digits.trim_start_matches('0').to_string();
        while int_digits.len() < self.min_int {
            int_digits.insert(0, '0');
        }

        let mut frac_digits = frac_digits.to_string();
        while frac_digits.len() > self.min_frac && frac_digits.ends_with('0') {
            frac_digits.pop();
        }

        if int_digits.is_empty() && frac_digits.is_empty() {
            int_digits.push('0');
        }

        let mut out = prefix;
        out.push_str(&group_digits(&int_digits, self.grouping));
        if !frac_digits.is_empty() || self.always_show_point {
            out.push('.');
            out.push_str(&frac_digits);
        }
        out.push_str(&suffix);
        out
    }
}

/// Split a subpattern into prefix, number part and suffix.
///
/// `'` quotes literal text in affixes; `''` is a literal apostrophe.
fn split_affixes(sub: &str) -> Result<(String, String, String), &'static str> {
    #[derive(PartialEq)]
    enum Phase {
        Prefix,
        Number,
        Suffix,
    }

    let mut phase = Phase::Prefix;
    let (mut prefix, mut number, mut suffix) = (String::new(), String::new(), String::new());
    let mut chars = sub.chars().peekable();
    let mut in_quote = false;

    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
                let target = if phase == Phase::Prefix { &mut prefix } else { &mut suffix };
                target.push('\'');
                if phase == Phase::Number {
                    phase = Phase::Suffix;
                }
            } else {
                in_quote = !in_quote;
                if phase == Phase::Number {
                    phase = Phase::Suffix;
                }
            }
            continue;
        }

        let special = matches!(c, '#' | '0' | ',' | '.');
        if in_quote || !special {
            match phase {
                Phase::Prefix => prefix.push(c),
                Phase::Number | Phase::Suffix => {
                    phase = Phase::Suffix;
                    suffix.push(c);
                }
            }
            continue;
        }

        match phase {
            Phase::Prefix | Phase::Number => {
                phase = Phase::Number;
                number.push(c);
            }
            Phase::Suffix => return Err("digit placeholder in suffix"),
        }
    }

    if in_quote {
        return Err("unterminated quote");
    }
    Ok((prefix, number, suffix))
}

fn group_digits(digits: &str, size: usize) -> String {
    if size == 0 || digits.len() <= size {
        return digits.to_string();
    }
    let mut out = String::with_capacity(digits.len() + digits.len() / size);
    let lead = digits.len() % size;
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (i + size - lead) % size == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn invalid(pattern: &str, reason: &str) -> ReportError {
    ReportError::Format(format!("Invalid number pattern '{}': {}", pattern, reason))
}
