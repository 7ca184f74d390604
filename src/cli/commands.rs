use crate::config::ReportConfig;
use crate::core::{OutputFormat, ReportGenerator};
use crate::error::ReportResult;
use crate::formula;
use crate::parser::form_file_name;
use crate::registry::{FieldRegistry, FieldSource, XmlFieldSource};
use crate::types::ReportFormatField;
use colored::Colorize;
use std::path::PathBuf;

/// Display text for an empty field attribute
fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

/// Execute the generate command
pub fn generate(
    data_file: PathBuf,
    format: String,
    config: ReportConfig,
    verbose: bool,
) -> ReportResult<Option<PathBuf>> {
    println!("{}", "📄 Report Forge - Generating report".bold().green());
    println!("   Data file: {}", data_file.display());
    println!("   Format:    {}", format.bright_yellow());
    if verbose {
        println!("   Forms:     {}", config.xml_dir.display());
        println!("   Templates: {}", config.template_dir.display());
        println!("   Output:    {}", config.output_dir.display());
    }
    println!();

    let format = OutputFormat::from(format.as_str());
    let generator = ReportGenerator::new(config);
    let report = generator.output_report(&data_file, &format)?;

    match &report {
        Some(path) => {
            println!("{}", "✅ Report created".bold().green());
            println!("   {}\n", path.display().to_string().bright_blue());
        }
        None if format != OutputFormat::Excel => {
            println!(
                "{}",
                "⚠️  Not an EXCEL report - use the non-templated output".yellow()
            );
        }
        None => {
            println!(
                "{}",
                "⚠️  No template requested - use the non-templated output".yellow()
            );
        }
    }

    Ok(report)
}

/// Execute the fields command
pub fn fields(forms: Vec<String>, config: ReportConfig) -> ReportResult<()> {
    let source = XmlFieldSource::new(&config.xml_dir);

    for form in forms {
        let form_file = form_file_name(&form);
        let registry = FieldRegistry::from_fields(source.load_fields(&form_file)?);

        println!("{}", format!("📋 Form: {form_file}").bold().cyan());
        if registry.is_empty() {
            println!("   {}\n", "No fields declared".yellow());
            continue;
        }

        let mut fields: Vec<&ReportFormatField> = registry.iter().collect();
        fields.sort_by(|a, b| a.field_name.cmp(&b.field_name));
        for field in fields {
            println!(
                "   {} → {}  {}",
                field.field_name.bright_blue().bold(),
                or_dash(&field.location).green(),
                or_dash(&field.formula).bright_yellow()
            );
        }
        println!("   {} field(s)\n", registry.len());
    }

    Ok(())
}

/// Execute the eval command
pub fn eval(formula_text: String, field: String, value: String, verbose: bool) -> ReportResult<String> {
    if verbose {
        let expr = formula::parse_formula(&formula_text)?;
        println!("   Expression: {}", format!("{expr:?}").cyan());
    }

    let result = ReportFormatField::new(field, "", formula_text).exec_formula(&value)?;
    println!("{}", result.bold().green());
    Ok(result)
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
