use anyhow::Result;
use serde::Serialize;

use super::helpers;
use crate::output::{print_json, theme, OutputMode};

#[derive(Serialize)]
struct BuildInfo {
    binary: &'static str,
    version: &'static str,
    target: String,
    default_config: String,
}

pub fn execute(mode: OutputMode) -> Result<()> {
    let info = BuildInfo {
        binary: "detectorctl",
        version: env!("CARGO_PKG_VERSION"),
        target: format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS),
        default_config: helpers::default_config_path().display().to_string(),
    };

    if mode == OutputMode::Json {
        return print_json(&info);
    }
    theme::print_header(&format!("{} {}", info.binary, info.version));
    theme::print_kv("Target", &info.target);
    theme::print_kv("Default config", &info.default_config);
    println!();
    Ok(())
}
