use thiserror::Error;

pub type ReportResult<T> = Result<T, ReportError>;

/// Every failure is fatal to the report being generated.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Format error: {0}")]
    Format(String),

    #[error("Unsupported command: {0}")]
    UnsupportedCommand(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Type error: {0}")]
    Type(String),

    #[error("Formula parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl ReportError {
    /// Short name of the error category, shown in the CLI's error output
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::Format(_) => "format",
            ReportError::UnsupportedCommand(_) => "unsupported-command",
            ReportError::NotFound(_) => "not-found",
            ReportError::Type(_) => "type",
            ReportError::Parse(_) => "parse",
            ReportError::Io(_) => "io",
            ReportError::Workbook(_) => "workbook",
            ReportError::Config(_) => "config",
        }
    }
}

// Malformed form definitions are format errors
impl From<quick_xml::Error> for ReportError {
    fn from(e: quick_xml::Error) -> Self {
        ReportError::Format(format!("Malformed XML: {}", e))
    }
}

impl From<quick_xml::events::attributes::AttrError> for ReportError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        ReportError::Format(format!("Malformed XML attribute: {}", e))
    }
}

impl From<rust_xlsxwriter::XlsxError> for ReportError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        ReportError::Workbook(e.to_string())
    }
}
