//! Report data file parsing
//!
//! - `section` - Line cursor splitting the file into function and data sections
//! - `command` - Grammar of function section lines (`VrSetForm`, `VrComout`)

pub mod command;
pub mod section;

pub use command::{form_file_name, Command, SheetCommand, SheetOp, SheetRef, Verb};
pub use section::{DataSection, SectionReader, END_MARKER, START_MARKER};
