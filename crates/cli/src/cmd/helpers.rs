use anyhow::{anyhow, Context, Result};
use detector_config::{load_from_file, parse_str, DetectorConfig, DetectorDocument};
use std::path::{Path, PathBuf};

pub fn default_config_path() -> PathBuf {
    if let Some(dir) = dirs::config_dir() {
        return dir.join("detectors").join("config.yaml");
    }
    PathBuf::from("/etc/detectors/config.yaml")
}

pub fn resolve_config_path(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Loads and validates, failing on the first violation.
pub fn load_document(config_path: Option<&str>) -> Result<DetectorDocument> {
    let path = resolve_config_path(config_path);
    load_from_file(&path).with_context(|| format!("loading detectors from {}", path.display()))
}

/// Parses without validating so every violation can be reported.
pub fn parse_document(path: &Path) -> Result<DetectorDocument> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

pub fn find_detector<'a>(doc: &'a DetectorDocument, name: &str) -> Result<&'a DetectorConfig> {
    doc.detector(name).ok_or_else(|| {
        let known: Vec<_> = doc.names().collect();
        anyhow!("unknown detector '{name}' (known: {})", known.join(", "))
    })
}

pub fn format_limit(limit: Option<f64>) -> String {
    limit.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}
