use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use report_forge::cli;
use report_forge::config::ReportConfig;
use report_forge::ReportError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "report-forge")]
#[command(about = "Populate Excel report templates from report data files")]
#[command(long_about = "Report Forge - Excel reports from legacy report data files

A report data file alternates function sections and CSV data sections:

  <start>
  VrSetForm=form1,1
  VrComout=XSFN template.xlsx
  <end>
  作成日,氏名
  2025/04/07,山田

Function sections select a form definition (XML) and prepare the sheets of
an Excel template. Data section columns are written to the cells declared
by the form, after applying the field's formula (NENGO, CTOD, WYEAR, FORMAT).

COMMANDS:
  generate  - Build a report from a data file
  fields    - List the fields declared by a form definition
  eval      - Evaluate a field formula for one value

EXAMPLES:
  report-forge generate report.dat
  report-forge fields form1 --xml-dir ./forms
  report-forge eval 'NENGO(CTOD(作成日))' --field 作成日 --value 2025/04/07")]
#[command(version)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Directory settings shared by the commands that read forms or templates
#[derive(Args)]
struct DirArgs {
    /// YAML configuration file with output_dir, xml_dir and template_dir
    #[arg(short, long, env = "REPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Directory where reports are written
    #[arg(long, env = "REPORT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Directory holding form definitions (<form>.xml)
    #[arg(long, env = "REPORT_XML_DIR")]
    xml_dir: Option<PathBuf>,

    /// Directory holding Excel templates
    #[arg(long, env = "REPORT_TEMPLATE_DIR")]
    template_dir: Option<PathBuf>,
}

impl DirArgs {
    fn load(self) -> anyhow::Result<ReportConfig> {
        let config = match &self.config {
            Some(path) => ReportConfig::from_file(path)
                .with_context(|| format!("Failed to load config '{}'", path.display()))?,
            None => ReportConfig::default(),
        };
        Ok(config.with_overrides(self.output_dir, self.xml_dir, self.template_dir))
    }
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Build a report from a report data file.

Only the EXCEL format produces a templated report. For any other format, or
when the data file never loads a template with XSFN, nothing is written and
the caller should use the non-templated output.

The report is written to a new report_<random>.xlsx file in the output
directory and its path is printed.")]
    /// Build a report from a report data file
    Generate {
        /// Path to the report data file
        data_file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "EXCEL")]
        format: String,

        #[command(flatten)]
        dirs: DirArgs,
    },

    /// List the fields declared by form definitions
    Fields {
        /// Form names, with or without the .xml extension
        #[arg(required = true)]
        forms: Vec<String>,

        #[command(flatten)]
        dirs: DirArgs,
    },

    /// Evaluate a field formula for one row value
    Eval {
        /// Formula, e.g. 'FORMAT(WYEAR(CTOD(作成日)),"Z9")'
        formula: String,

        /// Name of the field owning the formula
        #[arg(long)]
        field: String,

        /// Raw row value of the field
        #[arg(long, default_value = "")]
        value: String,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "report_forge=debug"
    } else {
        "report_forge=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Prefix a failure with its category, e.g. `[not-found]`
fn categorized(err: ReportError) -> anyhow::Error {
    let kind = err.kind();
    anyhow::Error::new(err).context(format!("[{kind}]"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            data_file,
            format,
            dirs,
        } => {
            let config = dirs.load()?;
            cli::generate(data_file.clone(), format, config, cli.verbose)
                .map_err(categorized)
                .with_context(|| format!("Report generation failed for '{}'", data_file.display()))?;
        }

        Commands::Fields { forms, dirs } => {
            let config = dirs.load()?;
            cli::fields(forms, config).map_err(categorized)?;
        }

        Commands::Eval {
            formula,
            field,
            value,
        } => {
            cli::eval(formula, field, value, cli.verbose).map_err(categorized)?;
        }
    }

    Ok(())
}
