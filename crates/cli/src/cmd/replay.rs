use anyhow::{Context, Result};
use comfy_table::{Cell, Color};
use detector_config::{replay, EventStatus, LabeledSample, Sample};
use std::path::PathBuf;
use std::sync::Arc;

use super::helpers;
use crate::output::{build_table, print_json, print_success, print_warning, OutputMode};

#[derive(clap::Args)]
pub struct ReplayArgs {
    #[arg(long, help = "JSON file holding an array of labeled samples")]
    samples: PathBuf,
}

pub fn execute(args: ReplayArgs, mode: OutputMode, config_path: Option<&str>) -> Result<()> {
    let doc = Arc::new(helpers::load_document(config_path)?);
    let raw = std::fs::read_to_string(&args.samples)
        .with_context(|| format!("reading {}", args.samples.display()))?;
    let labeled: Vec<LabeledSample> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", args.samples.display()))?;

    let mut samples: Vec<Sample> = Vec::with_capacity(labeled.len());
    let mut skipped = 0usize;
    for (i, s) in labeled.iter().enumerate() {
        match s.resolve(&doc) {
            Ok(sample) => samples.push(sample),
            Err(e) => {
                skipped += 1;
                tracing::warn!(index = i, error = %e, "sample skipped");
            }
        }
    }

    let result = replay(doc, &samples);

    match mode {
        OutputMode::Json => print_json(&result)?,
        OutputMode::Human => {
            if result.events.is_empty() {
                print_success(&format!("{} samples replayed, no threshold events", samples.len()));
            } else {
                let mut table =
                    build_table(&["At (ms)", "Status", "Detector", "Key", "Metric", "Value", "Limit"]);
                for e in &result.events {
                    let color = match e.status {
                        EventStatus::Breached => Color::Red,
                        EventStatus::Recovered => Color::Green,
                    };
                    table.add_row(vec![
                        Cell::new(e.at_ms),
                        Cell::new(e.status_str()).fg(color),
                        Cell::new(&e.detector),
                        Cell::new(e.key.join(":")),
                        Cell::new(&e.metric),
                        Cell::new(e.value),
                        Cell::new(e.limit),
                    ]);
                }
                println!("{table}");
                print_success(&format!(
                    "{} samples replayed: {} breached, {} recovered",
                    samples.len(),
                    result.breached_count,
                    result.recovered_count
                ));
            }
            if skipped > 0 {
                print_warning(&format!("{skipped} samples could not be keyed and were skipped"));
            }
        }
    }
    Ok(())
}
