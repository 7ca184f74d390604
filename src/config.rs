//! Report directories configuration
//!
//! Directories default to the `./testdata` layout and can be loaded from a
//! YAML file. Every key in the file is optional:
//!
//! ```yaml
//! output_dir: /var/reports/out
//! xml_dir: /var/reports/xml
//! template_dir: /var/reports/template
//! ```

use crate::error::ReportResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_DIR: &str = "./testdata/report";
pub const DEFAULT_XML_DIR: &str = "./testdata/xml";
pub const DEFAULT_TEMPLATE_DIR: &str = "./testdata/template";

/// Where reports are written and where form definitions and templates live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub xml_dir: PathBuf,
    pub template_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            xml_dir: PathBuf::from(DEFAULT_XML_DIR),
            template_dir: PathBuf::from(DEFAULT_TEMPLATE_DIR),
        }
    }
}

impl ReportConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> ReportResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> ReportResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Override individual directories, keeping the current value for `None`
    pub fn with_overrides(
        mut self,
        output_dir: Option<PathBuf>,
        xml_dir: Option<PathBuf>,
        template_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(dir) = output_dir {
            self.output_dir = dir;
        }
        if let Some(dir) = xml_dir {
            self.xml_dir = dir;
        }
        if let Some(dir) = template_dir {
            self.template_dir = dir;
        }
        self
    }

    /// Resolve a template file name against the template directory
    pub fn template_path(&self, file_name: &str) -> PathBuf {
        self.template_dir.join(file_name)
    }
}
