use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const DEFAULT_TRAIN_HOURS: u64 = 36;
const DEFAULT_MIN_TRAIN_SIZE: u64 = 2000;
const DEFAULT_RETRAIN_FREQ_HR: u64 = 8;
const DEFAULT_SCRAPE_INTERVAL: u64 = 30;

/// A full detector document: the detector entries plus optional connection
/// settings for the sources they read from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectorDocument {
    pub configs: Vec<DetectorConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prometheus: Option<PrometheusSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub druid: Option<DruidSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectorConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<DataSource>,
    pub composite_keys: Vec<String>,
    pub metrics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_configs: Option<Vec<MetricConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub druid_fetcher: Option<DruidFetcherConfig>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Prometheus,
    Druid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricConfig {
    pub metric: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_threshold: Option<StaticThreshold>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrain_conf: Option<RetrainConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numalogic_conf: Option<NumalogicConf>,
}

/// Model pipeline used when training a metric: preprocessing steps, the
/// anomaly model, its threshold and trainer arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NumalogicConf {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preprocess: Option<Vec<ModelInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<ModelInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer: Option<BTreeMap<String, serde_yaml::Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conf: Option<BTreeMap<String, serde_yaml::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stateful: Option<bool>,
}

/// Fixed limits for one metric. Any subset of the fields may be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticThreshold {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_limit: Option<f64>,
    /// Share of the static score in a blended anomaly score, in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrainConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_hours: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_train_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrain_freq_hr: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrape_interval: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedRetrain {
    pub train_hours: u64,
    pub min_train_size: u64,
    pub retrain_freq_hr: u64,
    pub scrape_interval: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DruidFetcherConfig {
    pub datasource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot: Option<PivotConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granularity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<BTreeMap<String, serde_yaml::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PivotConfig {
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrometheusSettings {
    pub server: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DruidSettings {
    pub url: String,
    pub endpoint: String,
}

impl DetectorDocument {
    pub fn detector(&self, name: &str) -> Option<&DetectorConfig> {
        self.configs.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configs.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn has_source_settings(&self, source: DataSource) -> bool {
        match source {
            DataSource::Prometheus => self.prometheus.is_some(),
            DataSource::Druid => self.druid.is_some(),
        }
    }
}

impl DetectorConfig {
    pub fn effective_source(&self) -> DataSource {
        self.source.unwrap_or_default()
    }

    pub fn has_metric(&self, metric: &str) -> bool {
        self.metrics.iter().any(|m| m == metric)
    }

    pub fn metric_configs(&self) -> &[MetricConfig] {
        self.metric_configs.as_deref().unwrap_or(&[])
    }

    pub fn metric_config(&self, metric: &str) -> Option<&MetricConfig> {
        self.metric_configs().iter().find(|mc| mc.metric == metric)
    }

    pub fn static_threshold(&self, metric: &str) -> Option<&StaticThreshold> {
        self.metric_config(metric)
            .and_then(|mc| mc.static_threshold.as_ref())
    }

    pub fn pivot_columns(&self) -> &[String] {
        self.druid_fetcher
            .as_ref()
            .and_then(|f| f.pivot.as_ref())
            .map(|p| p.columns.as_slice())
            .unwrap_or(&[])
    }
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prometheus => "prometheus",
            Self::Druid => "druid",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DruidFetcherConfig {
    pub fn dimensions(&self) -> &[String] {
        self.dimensions.as_deref().unwrap_or(&[])
    }

    pub fn group_by(&self) -> &[String] {
        self.group_by.as_deref().unwrap_or(&[])
    }
}

impl NumalogicConf {
    /// Registry keys of the preprocessing steps, in pipeline order.
    pub fn preprocess_names(&self) -> Vec<&str> {
        self.preprocess
            .iter()
            .flatten()
            .map(|m| m.name.as_str())
            .collect()
    }
}

impl RetrainConfig {
    pub fn resolved(&self) -> ResolvedRetrain {
        ResolvedRetrain {
            train_hours: self.train_hours.unwrap_or(DEFAULT_TRAIN_HOURS),
            min_train_size: self.min_train_size.unwrap_or(DEFAULT_MIN_TRAIN_SIZE),
            retrain_freq_hr: self.retrain_freq_hr.unwrap_or(DEFAULT_RETRAIN_FREQ_HR),
            scrape_interval: self.scrape_interval.unwrap_or(DEFAULT_SCRAPE_INTERVAL),
        }
    }
}

impl Default for ResolvedRetrain {
    fn default() -> Self {
        RetrainConfig::default().resolved()
    }
}
