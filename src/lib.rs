//! Report Forge - template-based Excel reports from legacy report data files
//!
//! A report data file alternates function sections, which pick a form
//! definition and prepare the sheets of an Excel template, with CSV data
//! sections whose columns are written to the cells declared by the form.
//!
//! # Features
//!
//! - `VrSetForm` / `VrComout` (XSFN, XSSA, XSSC, XSSD) command interpreter
//! - Field formulas: NENGO, CTOD, WYEAR, FORMAT
//! - Form definitions loaded from XML, cached per form
//! - Excel template import and report export
//!
//! # Example
//!
//! ```no_run
//! use report_forge::config::ReportConfig;
//! use report_forge::core::{OutputFormat, ReportGenerator};
//! use std::path::Path;
//!
//! let generator = ReportGenerator::new(ReportConfig::default());
//! match generator.output_report(Path::new("report.dat"), &OutputFormat::Excel)? {
//!     Some(path) => println!("Report: {}", path.display()),
//!     None => println!("No template requested"),
//! }
//! # Ok::<(), report_forge::error::ReportError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod formula;
pub mod parser;
pub mod registry;
pub mod types;

// Re-export commonly used types
pub use config::ReportConfig;
pub use crate::core::{OutputFormat, ReportGenerator, ReportOutcome};
pub use error::{ReportError, ReportResult};
pub use excel::Workbook;
pub use types::{DataRow, ReportFormatField};
