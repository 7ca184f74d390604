use crate::excel::Workbook;
use crate::parser::SectionReader;
use crate::registry::RegistryCache;

/// Mutable state of one report run.
///
/// Created per run and owned by the caller, so concurrent runs never share
/// state. Fields are public so the interpreter and binder can borrow the
/// reader, workbook and registries independently.
pub struct ProcessingContext<R> {
    pub reader: SectionReader<R>,
    /// Form definition file selected by the last `VrSetForm`
    pub form_file_name: Option<String>,
    /// Mode from the last `VrSetForm`; recorded only
    pub mode: i32,
    /// Workbook loaded by `XSFN`, if any
    pub workbook: Option<Workbook>,
    pub registries: RegistryCache,
}

impl<R> ProcessingContext<R> {
    pub fn new(reader: SectionReader<R>) -> Self {
        Self {
            reader,
            form_file_name: None,
            mode: 0,
            workbook: None,
            registries: RegistryCache::new(),
        }
    }
}
