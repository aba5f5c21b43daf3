use anyhow::Result;

use super::helpers;
use crate::output::{print_json, OutputMode};

pub fn execute(mode: OutputMode, config_path: Option<&str>) -> Result<()> {
    let p = helpers::resolve_config_path(config_path);
    match mode {
        OutputMode::Json => print_json(&serde_json::json!({
            "path": p.display().to_string(),
            "exists": p.exists(),
        }))?,
        OutputMode::Human => println!("{}", p.display()),
    }
    Ok(())
}
