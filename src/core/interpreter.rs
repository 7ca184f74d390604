//! Function section command execution

use super::context::ProcessingContext;
use crate::config::ReportConfig;
use crate::error::{ReportError, ReportResult};
use crate::excel::Workbook;
use crate::parser::{Command, SheetCommand, SheetRef};
use tracing::debug;

/// Applies function section commands to a [`ProcessingContext`]
pub struct CommandInterpreter<'a> {
    config: &'a ReportConfig,
}

impl<'a> CommandInterpreter<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    /// Parse and execute one function section line
    pub fn execute_line<R>(&self, ctx: &mut ProcessingContext<R>, line: &str) -> ReportResult<()> {
        let command = Command::parse(line)?;
        debug!(line, "executing command");
        self.execute(ctx, command)
    }

    pub fn execute<R>(&self, ctx: &mut ProcessingContext<R>, command: Command) -> ReportResult<()> {
        match command {
            Command::SetForm { form_file, mode } => {
                ctx.form_file_name = Some(form_file);
                ctx.mode = mode;
                Ok(())
            }
            Command::Comout(SheetCommand::LoadTemplate(file_name)) => {
                let path = self.config.template_path(&file_name);
                if !path.is_file() {
                    return Err(ReportError::NotFound(format!(
                        "Template '{}' does not exist",
                        path.display()
                    )));
                }
                let mut workbook = Workbook::load(&path)?;
                if workbook.sheet_count() > 0 {
                    workbook.set_active_sheet(0)?;
                }
                debug!(
                    template = %path.display(),
                    sheets = workbook.sheet_count(),
                    "template loaded"
                );
                ctx.workbook = Some(workbook);
                Ok(())
            }
            Command::Comout(SheetCommand::Activate(sheet)) => {
                let workbook = loaded_workbook(ctx)?;
                let index = resolve_sheet(workbook, &sheet)?;
                workbook.set_active_sheet(index)
            }
            Command::Comout(SheetCommand::Clone { source, new_name }) => {
                let workbook = loaded_workbook(ctx)?;
                let index = resolve_sheet(workbook, &source)?;
                let copy = workbook.clone_sheet(index, &new_name)?;
                workbook.set_active_sheet(copy)
            }
            Command::Comout(SheetCommand::Delete(sheet)) => {
                let workbook = loaded_workbook(ctx)?;
                let index = resolve_sheet(workbook, &sheet)?;
                workbook.remove_sheet(index)?;
                Ok(())
            }
        }
    }
}

fn loaded_workbook<R>(ctx: &mut ProcessingContext<R>) -> ReportResult<&mut Workbook> {
    ctx.workbook
        .as_mut()
        .ok_or_else(|| ReportError::NotFound("No template loaded (missing XSFN)".to_string()))
}

/// Sheet index for a `NAME=`/`NO=` reference
pub fn resolve_sheet(workbook: &Workbook, sheet: &SheetRef) -> ReportResult<usize> {
    let index = match sheet {
        SheetRef::Name(name) => workbook.sheet_index(name),
        SheetRef::Index(idx) => usize::try_from(*idx)
            .ok()
            .filter(|&i| i < workbook.sheet_count()),
    };
    index.ok_or_else(|| ReportError::NotFound(format!("Sheet {} does not exist", sheet)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excel::Sheet;
    use crate::parser::SectionReader;
    use std::io::Cursor;

    fn context_with(sheets: &[&str]) -> ProcessingContext<Cursor<Vec<u8>>> {
        let mut ctx = ProcessingContext::new(SectionReader::new(Cursor::new(Vec::new())));
        ctx.workbook = Some(Workbook::from_sheets(
            sheets.iter().map(|name| Sheet::new(*name)).collect(),
        ));
        ctx
    }

    fn sheet_names<R>(ctx: &ProcessingContext<R>) -> Vec<String> {
        ctx.workbook
            .as_ref()
            .unwrap()
            .sheets()
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }

    #[test]
    fn test_set_form_records_name_and_mode() {
        let config = ReportConfig::default();
        let interpreter = CommandInterpreter::new(&config);
        let mut ctx = context_with(&[]);
        interpreter.execute_line(&mut ctx, "VrSetForm=form1,3").unwrap();
        assert_eq!(ctx.form_file_name.as_deref(), Some("form1.xml"));
        assert_eq!(ctx.mode, 3);
    }

    #[test]
    fn test_activate_by_name_and_number() {
        let config = ReportConfig::default();
        let interpreter = CommandInterpreter::new(&config);
        let mut ctx = context_with(&["A", "B", "C"]);
        interpreter.execute_line(&mut ctx, "VrComout=XSSA NAME=C").unwrap();
        assert_eq!(ctx.workbook.as_ref().unwrap().active_sheet_index(), 2);
        interpreter.execute_line(&mut ctx, "VrComout=XSSA NO=1").unwrap();
        assert_eq!(ctx.workbook.as_ref().unwrap().active_sheet_index(), 1);
    }

    #[test]
    fn test_missing_sheet_is_not_found() {
        let config = ReportConfig::default();
        let interpreter = CommandInterpreter::new(&config);
        let mut ctx = context_with(&["A"]);
        for line in [
            "VrComout=XSSA NAME=Z",
            "VrComout=XSSA NO=1",
            "VrComout=XSSA NO=-1",
            "VrComout=XSSD NO=5",
            "VrComout=XSSC NAME=Z CHANGE=Y",
        ] {
            let err = interpreter.execute_line(&mut ctx, line).unwrap_err();
            assert_eq!(err.kind(), "not-found", "{line}");
        }
    }

    #[test]
    fn test_clone_and_delete() {
        let config = ReportConfig::default();
        let interpreter = CommandInterpreter::new(&config);
        let mut ctx = context_with(&["Base", "Other"]);
        interpreter
            .execute_line(&mut ctx, "VrComout=XSSC NAME=Base CHANGE=Copy")
            .unwrap();
        assert_eq!(ctx.workbook.as_ref().unwrap().active_sheet_index(), 2);
        interpreter.execute_line(&mut ctx, "VrComout=XSSD NAME=Other").unwrap();
        assert_eq!(sheet_names(&ctx), vec!["Base", "Copy"]);
        let workbook = ctx.workbook.as_ref().unwrap();
        assert_eq!(workbook.active_sheet().unwrap().name, "Copy");
    }

    #[test]
    fn test_clone_to_name_excel_refuses_is_format_error() {
        let config = ReportConfig::default();
        let interpreter = CommandInterpreter::new(&config);
        let mut ctx = context_with(&["Cover"]);
        let long_name = format!("VrComout=XSSC NO=0 CHANGE={}", "x".repeat(32));
        for line in [
            "VrComout=XSSC NAME=Cover CHANGE=a/b",
            "VrComout=XSSC NAME=Cover CHANGE=[draft]",
            long_name.as_str(),
        ] {
            let err = interpreter.execute_line(&mut ctx, line).unwrap_err();
            assert_eq!(err.kind(), "format", "{line}");
        }
        assert_eq!(sheet_names(&ctx), vec!["Cover"]);
        assert_eq!(ctx.workbook.as_ref().unwrap().active_sheet_index(), 0);
    }

    #[test]
    fn test_sheet_command_without_template() {
        let config = ReportConfig::default();
        let interpreter = CommandInterpreter::new(&config);
        let mut ctx = ProcessingContext::new(SectionReader::new(Cursor::new(Vec::new())));
        let err = interpreter
            .execute_line(&mut ctx, "VrComout=XSSA NO=0")
            .unwrap_err();
        assert_eq!(err.kind(), "not-found");
    }

    #[test]
    fn test_missing_template_is_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ReportConfig {
            template_dir: dir.path().to_path_buf(),
            ..ReportConfig::default()
        };
        let interpreter = CommandInterpreter::new(&config);
        let mut ctx = context_with(&[]);
        let err = interpreter
            .execute_line(&mut ctx, "VrComout=XSFN nothing.xlsx")
            .unwrap_err();
        assert_eq!(err.kind(), "not-found");
    }
}
