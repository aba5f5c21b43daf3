use anyhow::Result;
use clap::ValueEnum;
use detector_config::{to_json, to_yaml};

use super::helpers;
use crate::output::OutputMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Yaml,
    Json,
}

#[derive(clap::Args)]
pub struct ExportArgs {
    #[arg(long, value_enum, help = "Output format (defaults to json with --json, yaml otherwise)")]
    pub(crate) format: Option<ExportFormat>,
}

impl ExportArgs {
    pub fn format(&self, mode: OutputMode) -> ExportFormat {
        self.format.unwrap_or(match mode {
            OutputMode::Json => ExportFormat::Json,
            OutputMode::Human => ExportFormat::Yaml,
        })
    }
}

pub fn execute(args: ExportArgs, mode: OutputMode, config_path: Option<&str>) -> Result<()> {
    let doc = helpers::load_document(config_path)?;
    let rendered = match args.format(mode) {
        ExportFormat::Yaml => to_yaml(&doc)?,
        ExportFormat::Json => to_json(&doc)?,
    };
    print!("{rendered}");
    if !rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}
