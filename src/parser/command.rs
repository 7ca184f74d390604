//! Function section command grammar
//!
//! Each line is `verb=parameter`. The first `=` separates the two; any later
//! `=` belongs to the parameter.
//!
//! ```text
//! VrSetForm=<form>[.xml],<mode>
//! VrComout=XSFN <template>
//! VrComout=XSSA NAME=<sheet> | NO=<index>
//! VrComout=XSSC NAME=<sheet>|NO=<index> CHANGE=<new sheet>
//! VrComout=XSSD NAME=<sheet>|NO=<index>
//! ```

use crate::error::{ReportError, ReportResult};
use std::fmt;

const FORM_EXTENSION: &str = ".xml";

/// Function section verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    SetForm,
    Comout,
}

const VERBS: &[(&str, Verb)] = &[("VrSetForm", Verb::SetForm), ("VrComout", Verb::Comout)];

impl Verb {
    pub fn from_name(name: &str) -> Option<Self> {
        VERBS.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }
}

/// `VrComout` sub-commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetOp {
    /// XSFN: load template
    LoadTemplate,
    /// XSSA: activate sheet
    Activate,
    /// XSSC: clone sheet
    Clone,
    /// XSSD: delete sheet
    Delete,
}

const SHEET_OPS: &[(&str, SheetOp)] = &[
    ("XSFN", SheetOp::LoadTemplate),
    ("XSSA", SheetOp::Activate),
    ("XSSC", SheetOp::Clone),
    ("XSSD", SheetOp::Delete),
];

impl SheetOp {
    pub fn from_token(token: &str) -> Option<Self> {
        SHEET_OPS.iter().find(|(t, _)| *t == token).map(|(_, op)| *op)
    }
}

/// Reference to an existing sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetRef {
    /// `NAME=<sheet>`
    Name(String),
    /// `NO=<index>`, zero-based; may be out of range
    Index(i64),
}

impl SheetRef {
    pub fn parse(token: &str) -> ReportResult<Self> {
        if let Some(name) = token.strip_prefix("NAME=") {
            return Ok(SheetRef::Name(name.to_string()));
        }
        if let Some(index) = token.strip_prefix("NO=") {
            return index.parse().map(SheetRef::Index).map_err(|_| {
                ReportError::Format(format!("Sheet number '{}' is not an integer", index))
            });
        }
        Err(ReportError::Format(format!(
            "Sheet reference '{}' must start with NAME= or NO=",
            token
        )))
    }
}

impl fmt::Display for SheetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetRef::Name(name) => write!(f, "NAME={}", name),
            SheetRef::Index(idx) => write!(f, "NO={}", idx),
        }
    }
}

/// Spreadsheet setup command from a `VrComout` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetCommand {
    LoadTemplate(String),
    Activate(SheetRef),
    Clone { source: SheetRef, new_name: String },
    Delete(SheetRef),
}

/// Form definition file for a form name: `.xml` appended when missing
pub fn form_file_name(form: &str) -> String {
    if form.ends_with(FORM_EXTENSION) {
        form.to_string()
    } else {
        format!("{form}{FORM_EXTENSION}")
    }
}

/// One parsed function section line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetForm { form_file: String, mode: i32 },
    Comout(SheetCommand),
}

impl Command {
    /// Parse a `verb=parameter` line
    pub fn parse(line: &str) -> ReportResult<Self> {
        let (verb, param) = line.split_once('=').ok_or_else(|| {
            ReportError::Format(format!("Expected 'verb=parameter', found '{}'", line))
        })?;

        match Verb::from_name(verb) {
            Some(Verb::SetForm) => Self::parse_set_form(param),
            Some(Verb::Comout) => Self::parse_comout(param).map(Command::Comout),
            None => Err(ReportError::UnsupportedCommand(format!(
                "Unknown function '{}'",
                verb
            ))),
        }
    }

    fn parse_set_form(param: &str) -> ReportResult<Self> {
        let parts: Vec<&str> = param.split(',').collect();
        let [name, mode] = parts[..] else {
            return Err(ReportError::Format(format!(
                "VrSetForm expects '<form>,<mode>', found '{}'",
                param
            )));
        };
        if name.is_empty() {
            return Err(ReportError::Format("VrSetForm form name is empty".to_string()));
        }
        let mode = mode.trim().parse::<i32>().map_err(|_| {
            ReportError::Format(format!("VrSetForm mode '{}' is not an integer", mode))
        })?;

        Ok(Command::SetForm {
            form_file: form_file_name(name),
            mode,
        })
    }

    fn parse_comout(param: &str) -> ReportResult<SheetCommand> {
        let mut tokens = param.split_whitespace();
        let command = tokens.next().unwrap_or_default();
        let params: Vec<&str> = tokens.collect();
        if params.is_empty() {
            return Err(ReportError::Format(format!(
                "VrComout expects '<command> <parameters>', found '{}'",
                param
            )));
        }

        let op = SheetOp::from_token(command).ok_or_else(|| {
            ReportError::UnsupportedCommand(format!("Unknown VrComout command '{}'", command))
        })?;

        match op {
            SheetOp::LoadTemplate => Ok(SheetCommand::LoadTemplate(params[0].to_string())),
            SheetOp::Activate => Ok(SheetCommand::Activate(SheetRef::parse(params[0])?)),
            SheetOp::Clone => {
                let source = SheetRef::parse(params[0])?;
                let new_name = params
                    .get(1)
                    .and_then(|token| token.strip_prefix("CHANGE="))
                    .ok_or_else(|| {
                        ReportError::Format(format!(
                            "XSSC expects 'CHANGE=<sheet>' after {}",
                            source
                        ))
                    })?;
                Ok(SheetCommand::Clone {
                    source,
                    new_name: new_name.to_string(),
                })
            }
            SheetOp::Delete => Ok(SheetCommand::Delete(SheetRef::parse(params[0])?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_file_name() {
        assert_eq!(form_file_name("form1"), "form1.xml");
        assert_eq!(form_file_name("form1.xml"), "form1.xml");
    }

    #[test]
    fn test_extra_whitespace_is_tolerated() {
        assert_eq!(
            Command::parse("VrSetForm=a, 1").unwrap(),
            Command::SetForm {
                form_file: "a.xml".to_string(),
                mode: 1
            }
        );
        assert_eq!(
            Command::parse("VrComout=XSSA  NAME=x").unwrap(),
            Command::parse("VrComout=XSSA NAME=x").unwrap()
        );
    }

    #[test]
    fn test_set_form_appends_extension() {
        assert_eq!(
            Command::parse("VrSetForm=form1,1").unwrap(),
            Command::SetForm {
                form_file: "form1.xml".to_string(),
                mode: 1
            }
        );
        assert_eq!(
            Command::parse("VrSetForm=form1.xml,2").unwrap(),
            Command::SetForm {
                form_file: "form1.xml".to_string(),
                mode: 2
            }
        );
    }

    #[test]
    fn test_set_form_arity_and_mode() {
        for line in ["VrSetForm=form1", "VrSetForm=a,1,2", "VrSetForm=form1,x", "VrSetForm=,1"] {
            assert_eq!(Command::parse(line).unwrap_err().kind(), "format", "{line}");
        }
    }

    #[test]
    fn test_missing_separator() {
        assert_eq!(Command::parse("VrSetForm").unwrap_err().kind(), "format");
        assert_eq!(Command::parse("").unwrap_err().kind(), "format");
    }

    #[test]
    fn test_unknown_verb() {
        let err = Command::parse("VrPrint=1").unwrap_err();
        assert_eq!(err.kind(), "unsupported-command");
    }

    #[test]
    fn test_load_template() {
        assert_eq!(
            Command::parse("VrComout=XSFN template.xlsx").unwrap(),
            Command::Comout(SheetCommand::LoadTemplate("template.xlsx".to_string()))
        );
    }

    #[test]
    fn test_parameter_keeps_embedded_equals() {
        assert_eq!(
            Command::parse("VrComout=XSSA NAME=売上=明細").unwrap(),
            Command::Comout(SheetCommand::Activate(SheetRef::Name("売上=明細".to_string())))
        );
    }

    #[test]
    fn test_activate_by_number() {
        assert_eq!(
            Command::parse("VrComout=XSSA NO=2").unwrap(),
            Command::Comout(SheetCommand::Activate(SheetRef::Index(2)))
        );
    }

    #[test]
    fn test_clone() {
        assert_eq!(
            Command::parse("VrComout=XSSC NAME=Base CHANGE=Copy").unwrap(),
            Command::Comout(SheetCommand::Clone {
                source: SheetRef::Name("Base".to_string()),
                new_name: "Copy".to_string()
            })
        );
    }

    #[test]
    fn test_clone_requires_change() {
        for line in ["VrComout=XSSC NO=0", "VrComout=XSSC NO=0 NAME=Copy"] {
            assert_eq!(Command::parse(line).unwrap_err().kind(), "format", "{line}");
        }
    }

    #[test]
    fn test_sheet_ref_prefix_required() {
        for line in ["VrComout=XSSA Sheet1", "VrComout=XSSD 0", "VrComout=XSSA NO=abc"] {
            assert_eq!(Command::parse(line).unwrap_err().kind(), "format", "{line}");
        }
    }

    #[test]
    fn test_comout_needs_parameter() {
        assert_eq!(Command::parse("VrComout=XSFN").unwrap_err().kind(), "format");
        assert_eq!(Command::parse("VrComout=").unwrap_err().kind(), "format");
    }

    #[test]
    fn test_unknown_comout_command() {
        let err = Command::parse("VrComout=XSPR NAME=a").unwrap_err();
        assert_eq!(err.kind(), "unsupported-command");
    }
}
