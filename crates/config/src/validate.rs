use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::schema::{DataSource, DetectorConfig, DetectorDocument, StaticThreshold};

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyName {
        index: usize,
    },
    DuplicateName {
        name: String,
        first: usize,
        index: usize,
    },
    EmptyCompositeKeys {
        detector: String,
    },
    BlankCompositeKey {
        detector: String,
        position: usize,
    },
    EmptyMetrics {
        detector: String,
    },
    DuplicateMetric {
        detector: String,
        metric: String,
    },
    UnknownMetricConfig {
        detector: String,
        metric: String,
    },
    DuplicateMetricConfig {
        detector: String,
        metric: String,
    },
    NonFiniteLimit {
        detector: String,
        metric: String,
        field: &'static str,
    },
    InvertedLimits {
        detector: String,
        metric: String,
        lower: f64,
        upper: f64,
    },
    WeightOutOfRange {
        detector: String,
        metric: String,
        weight: f64,
    },
    MissingDruidFetcher {
        detector: String,
    },
    EmptyDatasource {
        detector: String,
    },
}

impl ValidationError {
    /// Name of the offending entry, when the entry has one.
    pub fn detector(&self) -> Option<&str> {
        match self {
            Self::EmptyName { .. } => None,
            Self::DuplicateName { name, .. } => Some(name),
            Self::EmptyCompositeKeys { detector }
            | Self::BlankCompositeKey { detector, .. }
            | Self::EmptyMetrics { detector }
            | Self::DuplicateMetric { detector, .. }
            | Self::UnknownMetricConfig { detector, .. }
            | Self::DuplicateMetricConfig { detector, .. }
            | Self::NonFiniteLimit { detector, .. }
            | Self::InvertedLimits { detector, .. }
            | Self::WeightOutOfRange { detector, .. }
            | Self::MissingDruidFetcher { detector }
            | Self::EmptyDatasource { detector } => Some(detector),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName { index } => write!(f, "entry #{index}: name must not be empty"),
            Self::DuplicateName { name, first, index } => write!(
                f,
                "entry #{index}: name '{name}' already used by entry #{first}"
            ),
            Self::EmptyCompositeKeys { detector } => {
                write!(f, "'{detector}': composite_keys must not be empty")
            }
            Self::BlankCompositeKey { detector, position } => write!(
                f,
                "'{detector}': composite_keys[{position}] must not be blank"
            ),
            Self::EmptyMetrics { detector } => write!(f, "'{detector}': metrics must not be empty"),
            Self::DuplicateMetric { detector, metric } => {
                write!(f, "'{detector}': metric '{metric}' listed more than once")
            }
            Self::UnknownMetricConfig { detector, metric } => write!(
                f,
                "'{detector}': metric_configs references '{metric}' which is not in metrics"
            ),
            Self::DuplicateMetricConfig { detector, metric } => write!(
                f,
                "'{detector}': metric_configs has more than one entry for '{metric}'"
            ),
            Self::NonFiniteLimit {
                detector,
                metric,
                field,
            } => write!(
                f,
                "'{detector}': static_threshold.{field} for '{metric}' must be a finite number"
            ),
            Self::InvertedLimits {
                detector,
                metric,
                lower,
                upper,
            } => write!(
                f,
                "'{detector}': lower_limit {lower} exceeds upper_limit {upper} for '{metric}'"
            ),
            Self::WeightOutOfRange {
                detector,
                metric,
                weight,
            } => write!(
                f,
                "'{detector}': static_threshold.weight {weight} for '{metric}' must be within [0, 1]"
            ),
            Self::MissingDruidFetcher { detector } => {
                write!(f, "'{detector}': source is druid but druid_fetcher is missing")
            }
            Self::EmptyDatasource { detector } => {
                write!(f, "'{detector}': druid_fetcher.datasource must not be empty")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Checks the document and stops at the first violation.
pub fn validate(doc: &DetectorDocument) -> Result<(), ValidationError> {
    match violations(doc).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Every violation in the document, in document order.
pub fn violations(doc: &DetectorDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for (index, cfg) in doc.configs.iter().enumerate() {
        if cfg.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName { index });
        } else if let Some(&first) = seen.get(cfg.name.as_str()) {
            errors.push(ValidationError::DuplicateName {
                name: cfg.name.clone(),
                first,
                index,
            });
        } else {
            seen.insert(cfg.name.as_str(), index);
        }

        check_entry(cfg, &mut errors);
    }

    errors
}

fn check_entry(cfg: &DetectorConfig, errors: &mut Vec<ValidationError>) {
    let detector = || cfg.name.clone();

    if cfg.composite_keys.is_empty() {
        errors.push(ValidationError::EmptyCompositeKeys {
            detector: detector(),
        });
    }
    for (position, key) in cfg.composite_keys.iter().enumerate() {
        if key.trim().is_empty() {
            errors.push(ValidationError::BlankCompositeKey {
                detector: detector(),
                position,
            });
        }
    }

    if cfg.metrics.is_empty() {
        errors.push(ValidationError::EmptyMetrics {
            detector: detector(),
        });
    }
    let mut metrics = HashSet::new();
    for metric in &cfg.metrics {
        if !metrics.insert(metric.as_str()) {
            errors.push(ValidationError::DuplicateMetric {
                detector: detector(),
                metric: metric.clone(),
            });
        }
    }

    let mut configured = HashSet::new();
    for mc in cfg.metric_configs() {
        if !metrics.contains(mc.metric.as_str()) {
            errors.push(ValidationError::UnknownMetricConfig {
                detector: detector(),
                metric: mc.metric.clone(),
            });
        }
        if !configured.insert(mc.metric.as_str()) {
            errors.push(ValidationError::DuplicateMetricConfig {
                detector: detector(),
                metric: mc.metric.clone(),
            });
        }
        if let Some(st) = &mc.static_threshold {
            check_threshold(&cfg.name, &mc.metric, st, errors);
        }
    }

    match &cfg.druid_fetcher {
        None if cfg.effective_source() == DataSource::Druid => {
            errors.push(ValidationError::MissingDruidFetcher {
                detector: detector(),
            });
        }
        Some(fetcher) if fetcher.datasource.trim().is_empty() => {
            errors.push(ValidationError::EmptyDatasource {
                detector: detector(),
            });
        }
        _ => {}
    }
}

fn check_threshold(
    detector: &str,
    metric: &str,
    st: &StaticThreshold,
    errors: &mut Vec<ValidationError>,
) {
    let fields = [
        ("upper_limit", st.upper_limit),
        ("lower_limit", st.lower_limit),
        ("weight", st.weight),
    ];
    let mut finite = true;
    for (field, value) in fields {
        if value.is_some_and(|v| !v.is_finite()) {
            finite = false;
            errors.push(ValidationError::NonFiniteLimit {
                detector: detector.to_string(),
                metric: metric.to_string(),
                field,
            });
        }
    }
    if !finite {
        return;
    }

    if let (Some(lower), Some(upper)) = (st.lower_limit, st.upper_limit) {
        if lower > upper {
            errors.push(ValidationError::InvertedLimits {
                detector: detector.to_string(),
                metric: metric.to_string(),
                lower,
                upper,
            });
        }
    }
    if let Some(weight) = st.weight {
        if !(0.0..=1.0).contains(&weight) {
            errors.push(ValidationError::WeightOutOfRange {
                detector: detector.to_string(),
                metric: metric.to_string(),
                weight,
            });
        }
    }
}
