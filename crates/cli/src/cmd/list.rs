use anyhow::Result;
use comfy_table::Cell;
use detector_config::DetectorConfig;
use serde::Serialize;

use super::helpers;
use crate::output::{build_table, print_json, print_success, OutputMode};

#[derive(Serialize)]
struct Row<'a> {
    name: &'a str,
    source: &'static str,
    composite_keys: &'a [String],
    metrics: usize,
    thresholds: usize,
}

impl<'a> From<&'a DetectorConfig> for Row<'a> {
    fn from(cfg: &'a DetectorConfig) -> Self {
        Self {
            name: &cfg.name,
            source: cfg.effective_source().as_str(),
            composite_keys: &cfg.composite_keys,
            metrics: cfg.metrics.len(),
            thresholds: cfg
                .metric_configs()
                .iter()
                .filter(|mc| mc.static_threshold.is_some())
                .count(),
        }
    }
}

pub fn execute(mode: OutputMode, config_path: Option<&str>) -> Result<()> {
    let doc = helpers::load_document(config_path)?;
    let rows: Vec<Row> = doc.configs.iter().map(Row::from).collect();

    match mode {
        OutputMode::Json => print_json(&rows)?,
        OutputMode::Human => {
            if rows.is_empty() {
                print_success("No detectors configured");
                return Ok(());
            }
            let mut table = build_table(&["Name", "Source", "Composite keys", "Metrics", "Thresholds"]);
            for r in &rows {
                table.add_row(vec![
                    Cell::new(r.name),
                    Cell::new(r.source),
                    Cell::new(r.composite_keys.join(" | ")),
                    Cell::new(r.metrics),
                    Cell::new(r.thresholds),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}
