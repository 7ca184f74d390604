//! Report generation pipeline
//!
//! Alternates function sections and data sections over a whole report data
//! file, then persists the populated workbook into the output directory.

use super::binder::DataBinder;
use super::context::ProcessingContext;
use super::interpreter::CommandInterpreter;
use crate::config::ReportConfig;
use crate::error::{ReportError, ReportResult};
use crate::excel::Workbook;
use crate::parser::SectionReader;
use crate::registry::{FieldSource, XmlFieldSource};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

const REPORT_PREFIX: &str = "report_";
const REPORT_SUFFIX: &str = ".xlsx";

/// Requested output format of a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    /// Templated Excel report
    Excel,
    /// Anything else; handled by the caller's non-templated path
    Other(String),
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s {
            "EXCEL" => OutputFormat::Excel,
            other => OutputFormat::Other(other.to_string()),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(OutputFormat::from(s))
    }
}

/// Result of [`ReportGenerator::create_excel_report`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Report written to this absolute path
    Created(PathBuf),
    /// The data file never loaded a template (no `XSFN` before data)
    NoTemplate,
}

/// Turns report data files into populated workbooks
pub struct ReportGenerator<S = XmlFieldSource> {
    config: ReportConfig,
    source: S,
}

impl ReportGenerator<XmlFieldSource> {
    /// Generator reading form definitions from `config.xml_dir`
    pub fn new(config: ReportConfig) -> Self {
        let source = XmlFieldSource::new(&config.xml_dir);
        Self { config, source }
    }
}

impl<S: FieldSource> ReportGenerator<S> {
    pub fn with_source(config: ReportConfig, source: S) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Produce a report for `data_file` in the requested format.
    ///
    /// `None` means the caller should fall back to its non-templated output:
    /// the format is not `EXCEL`, or the file never loaded a template.
    pub fn output_report(
        &self,
        data_file: &Path,
        format: &OutputFormat,
    ) -> ReportResult<Option<PathBuf>> {
        if *format != OutputFormat::Excel {
            debug!(?format, "not a templated format");
            return Ok(None);
        }
        match self.create_excel_report(data_file)? {
            ReportOutcome::Created(path) => Ok(Some(path)),
            ReportOutcome::NoTemplate => Ok(None),
        }
    }

    /// Build the workbook for `data_file` and write it to a new
    /// `report_*.xlsx` file in the output directory
    pub fn create_excel_report(&self, data_file: &Path) -> ReportResult<ReportOutcome> {
        if !data_file.is_file() {
            return Err(ReportError::NotFound(format!(
                "Report data file '{}' does not exist",
                data_file.display()
            )));
        }
        let input = BufReader::new(File::open(data_file)?);
        let Some(workbook) = self.generate(input)? else {
            info!(data_file = %data_file.display(), "no template requested");
            return Ok(ReportOutcome::NoTemplate);
        };

        let path = self.persist(&workbook)?;
        info!(
            data_file = %data_file.display(),
            report = %path.display(),
            sheets = workbook.sheet_count(),
            "report created"
        );
        Ok(ReportOutcome::Created(path))
    }

    /// Run the pipeline over `input`.
    ///
    /// Returns `None` when a function section ends without a template loaded.
    pub fn generate<R: BufRead>(&self, input: R) -> ReportResult<Option<Workbook>> {
        let mut ctx = ProcessingContext::new(SectionReader::new(input));
        let interpreter = CommandInterpreter::new(&self.config);
        let binder = DataBinder::new(&self.source);

        loop {
            for line in ctx.reader.read_function_section()? {
                interpreter.execute_line(&mut ctx, &line)?;
            }
            if ctx.workbook.is_none() {
                return Ok(None);
            }
            if !binder.bind_data_section(&mut ctx)? {
                break;
            }
        }

        Ok(ctx.workbook)
    }

    fn persist(&self, workbook: &Workbook) -> ReportResult<PathBuf> {
        let bytes = workbook.save_to_buffer()?;

        std::fs::create_dir_all(&self.config.output_dir)?;
        let mut file = tempfile::Builder::new()
            .prefix(REPORT_PREFIX)
            .suffix(REPORT_SUFFIX)
            .tempfile_in(&self.config.output_dir)?;
        file.write_all(&bytes)?;
        file.flush()?;
        let (_, path) = file.keep().map_err(|e| ReportError::Io(e.error))?;

        set_shared_permissions(&path);
        Ok(std::fs::canonicalize(&path).unwrap_or(path))
    }
}

/// Make the report readable and writable by every user; failures are ignored
#[cfg(unix)]
fn set_shared_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o666)) {
        debug!(path = %path.display(), error = %e, "could not set report permissions");
    }
}

#[cfg(not(unix))]
fn set_shared_permissions(_path: &Path) {}
