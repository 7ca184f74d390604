//! Field registries
//!
//! A form definition declares which data section columns are written to the
//! sheet, where, and through which formula. Registries are loaded once per
//! form file and kept for the rest of the run.

pub mod xml;

pub use xml::{parse_fields, XmlFieldSource};

use crate::error::ReportResult;
use crate::types::ReportFormatField;
use std::collections::HashMap;
use tracing::info;

/// Supplies the field declarations of a form file
pub trait FieldSource {
    fn load_fields(&self, form_file: &str) -> ReportResult<Vec<ReportFormatField>>;
}

/// Field declarations of one form, keyed by field name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRegistry {
    fields: HashMap<String, ReportFormatField>,
}

impl FieldRegistry {
    /// Build a registry; a later declaration of the same name replaces an
    /// earlier one
    pub fn from_fields(fields: impl IntoIterator<Item = ReportFormatField>) -> Self {
        let fields = fields
            .into_iter()
            .map(|field| (field.field_name.clone(), field))
            .collect();
        Self { fields }
    }

    pub fn get(&self, field_name: &str) -> Option<&ReportFormatField> {
        self.fields.get(field_name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReportFormatField> {
        self.fields.values()
    }
}

/// Registries already loaded during this run, keyed by form file name
#[derive(Debug, Default)]
pub struct RegistryCache {
    registries: HashMap<String, FieldRegistry>,
}

impl RegistryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry for `form_file`, loading it from `source` on first use
    pub fn get_or_load(
        &mut self,
        form_file: &str,
        source: &dyn FieldSource,
    ) -> ReportResult<&FieldRegistry> {
        if !self.registries.contains_key(form_file) {
            let registry = FieldRegistry::from_fields(source.load_fields(form_file)?);
            info!(
                form = form_file,
                fields = registry.len(),
                "loaded form definition"
            );
            self.registries.insert(form_file.to_string(), registry);
        }
        // Inserted above when missing
        Ok(&self.registries[form_file])
    }

    pub fn contains(&self, form_file: &str) -> bool {
        self.registries.contains_key(form_file)
    }

    pub fn len(&self) -> usize {
        self.registries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use std::cell::Cell;

    struct CountingSource {
        loads: Cell<usize>,
    }

    impl FieldSource for CountingSource {
        fn load_fields(&self, form_file: &str) -> ReportResult<Vec<ReportFormatField>> {
            self.loads.set(self.loads.get() + 1);
            if form_file == "missing.xml" {
                return Err(ReportError::NotFound(form_file.to_string()));
            }
            Ok(vec![ReportFormatField::new("a", "A1", "")])
        }
    }

    #[test]
    fn test_later_duplicate_wins() {
        let registry = FieldRegistry::from_fields(vec![
            ReportFormatField::new("a", "A1", ""),
            ReportFormatField::new("a", "B2", ""),
        ]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a").unwrap().location, "B2");
    }

    #[test]
    fn test_cache_loads_once() {
        let source = CountingSource { loads: Cell::new(0) };
        let mut cache = RegistryCache::new();
        cache.get_or_load("form1.xml", &source).unwrap();
        let registry = cache.get_or_load("form1.xml", &source).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(source.loads.get(), 1);
        assert!(cache.contains("form1.xml"));
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let source = CountingSource { loads: Cell::new(0) };
        let mut cache = RegistryCache::new();
        assert!(cache.get_or_load("missing.xml", &source).is_err());
        assert!(cache.is_empty());
    }
}
