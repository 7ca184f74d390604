//! Report pipeline: command interpretation, data binding and orchestration

pub mod binder;
pub mod context;
pub mod generator;
pub mod interpreter;

pub use binder::{bind_row, DataBinder};
pub use context::ProcessingContext;
pub use generator::{OutputFormat, ReportGenerator, ReportOutcome};
pub use interpreter::{resolve_sheet, CommandInterpreter};
