use anyhow::{bail, Result};
use detector_config::{lint, violations};
use serde_json::json;

use super::helpers;
use crate::output::{print_json, print_success, print_warning, OutputMode};

pub fn execute(mode: OutputMode, config_path: Option<&str>) -> Result<()> {
    let path = helpers::resolve_config_path(config_path);
    let doc = helpers::parse_document(&path)?;
    let errors = violations(&doc);
    let lints = lint(&doc);

    match mode {
        OutputMode::Json => {
            let messages: Vec<_> = errors
                .iter()
                .map(|e| json!({ "detector": e.detector(), "message": e.to_string() }))
                .collect();
            print_json(&json!({
                "path": path.display().to_string(),
                "valid": errors.is_empty(),
                "detectors": doc.len(),
                "errors": messages,
                "lints": lints,
            }))?;
        }
        OutputMode::Human => {
            for e in &errors {
                crate::output::print_error(&e.to_string());
            }
            for l in &lints {
                print_warning(&l.to_string());
            }
            if errors.is_empty() {
                print_success(&format!(
                    "{} is valid ({} detectors)",
                    path.display(),
                    doc.len()
                ));
            }
        }
    }

    if !errors.is_empty() {
        bail!("{} validation error(s) in {}", errors.len(), path.display());
    }
    Ok(())
}
