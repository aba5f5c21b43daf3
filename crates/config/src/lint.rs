use serde::Serialize;
use std::fmt;

use crate::schema::{DataSource, DetectorDocument};

/// A suspicious but loadable detail of the document. Lints never block a
/// load; the loader logs them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lint {
    pub detector: String,
    pub kind: LintKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LintKind {
    /// A single composite key element that looks like several joined by a comma.
    CommaInCompositeKey { key: String },
    ThresholdWithoutLimits { metric: String },
    FetcherSourceMismatch { source: DataSource },
    PivotColumnNotGrouped { column: String },
    MissingSourceSettings { source: DataSource },
}

impl LintKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::CommaInCompositeKey { .. } => "comma-in-composite-key",
            Self::ThresholdWithoutLimits { .. } => "threshold-without-limits",
            Self::FetcherSourceMismatch { .. } => "fetcher-source-mismatch",
            Self::PivotColumnNotGrouped { .. } => "pivot-column-not-grouped",
            Self::MissingSourceSettings { .. } => "missing-source-settings",
        }
    }
}

impl fmt::Display for LintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommaInCompositeKey { key } => write!(
                f,
                "composite key '{key}' contains a comma; it is kept as one dimension name"
            ),
            Self::ThresholdWithoutLimits { metric } => write!(
                f,
                "static_threshold for '{metric}' sets neither upper_limit nor lower_limit"
            ),
            Self::FetcherSourceMismatch { source } => {
                write!(f, "druid_fetcher is ignored for source '{source}'")
            }
            Self::PivotColumnNotGrouped { column } => write!(
                f,
                "pivot column '{column}' is in neither dimensions nor group_by"
            ),
            Self::MissingSourceSettings { source } => {
                write!(f, "document has no '{source}' connection settings")
            }
        }
    }
}

impl fmt::Display for Lint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.detector, self.kind)
    }
}

pub fn lint(doc: &DetectorDocument) -> Vec<Lint> {
    let mut lints = Vec::new();
    let declares_settings = doc.prometheus.is_some() || doc.druid.is_some();

    for cfg in &doc.configs {
        let mut push = |kind| {
            lints.push(Lint {
                detector: cfg.name.clone(),
                kind,
            })
        };

        for key in cfg.composite_keys.iter().filter(|k| k.contains(',')) {
            push(LintKind::CommaInCompositeKey { key: key.clone() });
        }

        for mc in cfg.metric_configs() {
            if let Some(st) = &mc.static_threshold {
                if st.upper_limit.is_none() && st.lower_limit.is_none() {
                    push(LintKind::ThresholdWithoutLimits {
                        metric: mc.metric.clone(),
                    });
                }
            }
        }

        let source = cfg.effective_source();
        if let Some(fetcher) = &cfg.druid_fetcher {
            if source != DataSource::Druid {
                push(LintKind::FetcherSourceMismatch { source });
            }
            for column in cfg.pivot_columns() {
                if !fetcher.dimensions().contains(column) && !fetcher.group_by().contains(column) {
                    push(LintKind::PivotColumnNotGrouped {
                        column: column.clone(),
                    });
                }
            }
        }

        if declares_settings && !doc.has_source_settings(source) {
            push(LintKind::MissingSourceSettings { source });
        }
    }

    lints
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> DetectorDocument {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn comma_joined_key_flagged_not_split() {
        let d = doc(r#"
configs:
  - name: service-mesh-s2s
    composite_keys: [ "source_asset_id, destination_asset_id" ]
    metrics: [error_rate]
"#);
        let lints = lint(&d);
        assert_eq!(lints.len(), 1);
        assert_eq!(lints[0].detector, "service-mesh-s2s");
        assert_eq!(
            lints[0].kind,
            LintKind::CommaInCompositeKey {
                key: "source_asset_id, destination_asset_id".into()
            }
        );
        assert_eq!(d.configs[0].composite_keys.len(), 1);
    }

    #[test]
    fn clean_document_has_no_lints() {
        let d = doc(r#"
configs:
  - name: fci
    source: druid
    composite_keys: [assetId]
    metrics: [failed]
    druid_fetcher:
      datasource: ds
      dimensions: [ciStatus]
      pivot:
        columns: [ciStatus]
"#);
        assert!(lint(&d).is_empty());
    }

    #[test]
    fn threshold_without_limits() {
        let d = doc(r#"
configs:
  - name: a
    composite_keys: [ns]
    metrics: [cpu]
    metric_configs:
      - metric: cpu
        static_threshold:
          weight: 0.3
"#);
        let lints = lint(&d);
        assert_eq!(lints.len(), 1);
        assert_eq!(lints[0].kind.code(), "threshold-without-limits");
    }

    #[test]
    fn fetcher_on_prometheus_detector_and_ungrouped_pivot() {
        let d = doc(r#"
configs:
  - name: a
    composite_keys: [ns]
    metrics: [cpu]
    druid_fetcher:
      datasource: ds
      pivot:
        columns: [status]
"#);
        let codes: Vec<_> = lint(&d).iter().map(|l| l.kind.code()).collect();
        assert_eq!(codes, ["fetcher-source-mismatch", "pivot-column-not-grouped"]);
    }

    #[test]
    fn missing_source_settings_only_when_some_declared() {
        let yaml = r#"
configs:
  - name: fci
    source: druid
    composite_keys: [assetId]
    metrics: [failed]
    druid_fetcher:
      datasource: ds
"#;
        assert!(lint(&doc(yaml)).is_empty());

        let with_prom = format!("{yaml}prometheus:\n  server: http://prom:9090\n");
        let lints = lint(&doc(&with_prom));
        assert_eq!(
            lints,
            vec![Lint {
                detector: "fci".into(),
                kind: LintKind::MissingSourceSettings {
                    source: DataSource::Druid
                },
            }]
        );
    }

    #[test]
    fn display_names_detector() {
        let l = Lint {
            detector: "x".into(),
            kind: LintKind::FetcherSourceMismatch {
                source: DataSource::Prometheus,
            },
        };
        assert_eq!(
            l.to_string(),
            "'x': druid_fetcher is ignored for source 'prometheus'"
        );
    }
}
