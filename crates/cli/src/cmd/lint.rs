use anyhow::Result;
use comfy_table::Cell;
use detector_config::lint;

use super::helpers;
use crate::output::{build_table, print_json, print_success, OutputMode};

pub fn execute(mode: OutputMode, config_path: Option<&str>) -> Result<()> {
    let doc = helpers::load_document(config_path)?;
    let findings = lint(&doc);

    match mode {
        OutputMode::Json => print_json(&findings)?,
        OutputMode::Human => {
            if findings.is_empty() {
                print_success("No lint findings");
                return Ok(());
            }
            let mut table = build_table(&["Detector", "Code", "Finding"]);
            for f in &findings {
                table.add_row(vec![
                    Cell::new(&f.detector),
                    Cell::new(f.kind.code()),
                    Cell::new(f.kind.to_string()),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}
