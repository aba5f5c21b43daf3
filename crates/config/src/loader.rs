use serde::Deserialize;
use serde_yaml::Value;
use std::path::Path;

use crate::lint::lint;
use crate::schema::{DetectorConfig, DetectorDocument, DruidSettings, PrometheusSettings};
use crate::validate::{validate, ValidationError};

#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
    Shape(String),
    Entry {
        index: usize,
        name: Option<String>,
        source: serde_yaml::Error,
    },
    Validation(ValidationError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Shape(msg) => write!(f, "document: {msg}"),
            Self::Entry {
                index,
                name: Some(name),
                source,
            } => write!(f, "entry #{index} ('{name}'): {source}"),
            Self::Entry {
                index,
                name: None,
                source,
            } => write!(f, "entry #{index}: {source}"),
            Self::Validation(e) => write!(f, "validation: {e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) | Self::Entry { source: e, .. } => Some(e),
            Self::Validation(e) => Some(e),
            Self::Shape(_) => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_yaml::Error> for LoadError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<ValidationError> for LoadError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    #[serde(default)]
    prometheus: Option<PrometheusSettings>,
    #[serde(default)]
    druid: Option<DruidSettings>,
}

pub fn load_from_file(path: &Path) -> Result<DetectorDocument, LoadError> {
    let contents = std::fs::read_to_string(path)?;
    let doc = load_from_str(&contents)?;
    tracing::debug!(path = %path.display(), detectors = doc.len(), "detector document loaded");
    Ok(doc)
}

/// Parses and validates a document, failing on the first problem found.
pub fn load_from_str(yaml: &str) -> Result<DetectorDocument, LoadError> {
    let doc = parse_str(yaml)?;
    validate(&doc)?;
    for l in lint(&doc) {
        tracing::warn!(detector = %l.detector, code = l.kind.code(), "{}", l.kind);
    }
    Ok(doc)
}

/// Parses a document without running validation, so callers can collect
/// every violation themselves.
pub fn parse_str(yaml: &str) -> Result<DetectorDocument, LoadError> {
    let value: Value = serde_yaml::from_str(yaml)?;
    let (entries, envelope) = split_envelope(value)?;

    let mut configs = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let name = entry.get("name").and_then(Value::as_str).map(str::to_string);
        let cfg = serde_yaml::from_value::<DetectorConfig>(entry)
            .map_err(|source| LoadError::Entry {
                index,
                name,
                source,
            })?;
        configs.push(cfg);
    }

    Ok(DetectorDocument {
        configs,
        prometheus: envelope.prometheus,
        druid: envelope.druid,
    })
}

fn split_envelope(value: Value) -> Result<(Vec<Value>, Envelope), LoadError> {
    match value {
        Value::Sequence(entries) => Ok((entries, Envelope::default())),
        Value::Mapping(mut map) => {
            let entries = match map.remove("configs") {
                Some(Value::Sequence(entries)) => entries,
                Some(Value::Null) => Vec::new(),
                Some(_) => return Err(LoadError::Shape("'configs' must be a sequence".into())),
                None => return Err(LoadError::Shape("missing 'configs' sequence".into())),
            };
            let envelope = serde_yaml::from_value(Value::Mapping(map))?;
            Ok((entries, envelope))
        }
        Value::Null => Err(LoadError::Shape("document is empty".into())),
        _ => Err(LoadError::Shape(
            "expected a sequence of detectors or a mapping with 'configs'".into(),
        )),
    }
}

pub fn to_yaml(doc: &DetectorDocument) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(doc)
}

/// JSON only has string keys. A free-form section (aggregations, model
/// conf, trainer args) holding any other key is refused rather than having
/// its keys rewritten.
pub fn to_json(doc: &DetectorDocument) -> Result<String, serde_json::Error> {
    for cfg in &doc.configs {
        if let Some(key) = free_form_values(cfg).find_map(non_string_key) {
            return Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                "detector '{}': key {key} cannot be represented in JSON",
                cfg.name
            )));
        }
    }
    serde_json::to_string_pretty(doc)
}

fn free_form_values(cfg: &DetectorConfig) -> impl Iterator<Item = &Value> {
    let aggregations = cfg
        .druid_fetcher
        .iter()
        .filter_map(|f| f.aggregations.as_ref())
        .flat_map(|m| m.values());
    let numalogic = cfg
        .metric_configs()
        .iter()
        .filter_map(|mc| mc.numalogic_conf.as_ref())
        .flat_map(|nl| {
            nl.model
                .iter()
                .chain(nl.preprocess.iter().flatten())
                .chain(nl.threshold.iter())
                .filter_map(|m| m.conf.as_ref())
                .chain(nl.trainer.iter())
                .flat_map(|m| m.values())
        });
    aggregations.chain(numalogic)
}

fn non_string_key(value: &Value) -> Option<String> {
    match value {
        Value::Mapping(map) => map.iter().find_map(|(k, v)| {
            if k.is_string() {
                non_string_key(v)
            } else {
                Some(
                    serde_yaml::to_string(k)
                        .map(|s| s.trim_end().to_string())
                        .unwrap_or_else(|_| "?".into()),
                )
            }
        }),
        Value::Sequence(items) => items.iter().find_map(non_string_key),
        Value::Tagged(tagged) => non_string_key(&tagged.value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_sequence_accepted() {
        let yaml = r#"
- name: argo-cd
  composite_keys: [namespace, name]
  metrics: [cpu]
"#;
        let doc = load_from_str(yaml).unwrap();
        assert_eq!(doc.len(), 1);
        assert!(doc.prometheus.is_none());
    }

    #[test]
    fn envelope_with_settings() {
        let yaml = r#"
configs:
  - name: argo-cd
    composite_keys: [namespace, name]
    metrics: [cpu]
prometheus:
  server: http://prometheus:9090
druid:
  url: http://druid:8888
  endpoint: druid/v2/
"#;
        let doc = load_from_str(yaml).unwrap();
        assert_eq!(doc.prometheus.unwrap().server, "http://prometheus:9090");
        assert_eq!(doc.druid.unwrap().endpoint, "druid/v2/");
    }

    #[test]
    fn type_mismatch_names_entry() {
        let yaml = r#"
configs:
  - name: ok
    composite_keys: [ns]
    metrics: [cpu]
  - name: argo-cd
    composite_keys: [ns]
    metrics: [cpu]
    metric_configs:
      - metric: cpu
        static_threshold:
          upper_limit: eighty
"#;
        let err = load_from_str(yaml).unwrap_err();
        match &err {
            LoadError::Entry { index, name, .. } => {
                assert_eq!(*index, 1);
                assert_eq!(name.as_deref(), Some("argo-cd"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("eighty"));
    }

    #[test]
    fn missing_required_field() {
        let yaml = "configs:\n  - name: a\n    composite_keys: [ns]\n";
        let err = load_from_str(yaml).unwrap_err();
        assert!(matches!(err, LoadError::Entry { index: 0, .. }));
        assert!(err.to_string().contains("metrics"));
    }

    #[test]
    fn missing_name_has_no_entry_name() {
        let yaml = "- composite_keys: [ns]\n  metrics: [cpu]\n";
        let err = load_from_str(yaml).unwrap_err();
        assert!(matches!(err, LoadError::Entry { name: None, .. }));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn validation_runs_after_parse() {
        let yaml = r#"
- name: a
  composite_keys: [ns]
  metrics: [cpu]
- name: a
  composite_keys: [ns]
  metrics: [cpu]
"#;
        let err = load_from_str(yaml).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Validation(ValidationError::DuplicateName { .. })
        ));
        assert!(parse_str(yaml).is_ok());
    }

    #[test]
    fn shape_errors() {
        assert!(matches!(load_from_str("~"), Err(LoadError::Shape(_))));
        assert!(matches!(load_from_str("42"), Err(LoadError::Shape(_))));
        assert!(matches!(
            load_from_str("configs: {}"),
            Err(LoadError::Shape(_))
        ));
        assert!(matches!(
            load_from_str("detectors: []"),
            Err(LoadError::Shape(_))
        ));
    }

    #[test]
    fn unknown_envelope_key_rejected() {
        let err = load_from_str("configs: []\nredis: {}\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
        assert!(err.to_string().contains("redis"));
    }

    #[test]
    fn invalid_yaml_is_parse_error() {
        let err = load_from_str("configs: [\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn load_from_file_works() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detectors.yaml");
        std::fs::write(
            &path,
            "configs:\n  - name: a\n    composite_keys: [ns]\n    metrics: [cpu]\n",
        )
        .unwrap();
        let doc = load_from_file(&path).unwrap();
        assert_eq!(doc.configs[0].name, "a");
    }

    #[test]
    fn load_from_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from_file(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn json_refuses_non_string_nested_keys() {
        let yaml = r#"
- name: f
  source: druid
  composite_keys: [assetId]
  metrics: [failed]
  druid_fetcher:
    datasource: ds
    aggregations:
      count:
        buckets: {1: low, 2: high}
"#;
        let doc = load_from_str(yaml).unwrap();
        let err = to_json(&doc).unwrap_err();
        assert!(err.to_string().contains("'f'"));
        assert!(to_yaml(&doc).unwrap().contains("1: low"));

        let nested_ok = yaml.replace("{1: low, 2: high}", "{low: 1, high: 2}");
        assert!(to_json(&load_from_str(&nested_ok).unwrap()).is_ok());
    }

    #[test]
    fn sparse_entry_round_trips_without_new_fields() {
        let yaml = r#"configs:
- name: f
  source: druid
  composite_keys:
  - assetId
  metrics:
  - failed
  metric_configs:
  - metric: failed
    static_threshold:
      upper_limit: 3.0
    numalogic_conf:
      model:
        name: VanillaAE
        conf:
          seq_len: 12
      preprocess:
      - name: StandardScaler
  druid_fetcher:
    datasource: ds
    group_by: []
"#;
        let doc = load_from_str(yaml).unwrap();
        let out = to_yaml(&doc).unwrap();
        assert_eq!(out, yaml);
        let absent = [
            "dimensions",
            "retrain_conf",
            "aggregations",
            "granularity",
            "hours",
            "druid:",
        ];
        for absent in absent {
            assert!(!out.contains(absent), "{absent} appeared in output");
        }
        assert_eq!(load_from_str(&out).unwrap(), doc);

        let json = to_json(&doc).unwrap();
        assert!(!json.contains("dimensions"));
        let again: DetectorDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(again, doc);
    }

    #[test]
    fn yaml_output_always_enveloped() {
        let doc = load_from_str("- name: a\n  composite_keys: [ns]\n  metrics: [cpu]\n").unwrap();
        let out = to_yaml(&doc).unwrap();
        assert!(out.starts_with("configs:"));
        assert_eq!(load_from_str(&out).unwrap(), doc);
    }
}
