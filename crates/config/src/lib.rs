pub mod evaluator;
pub mod key;
pub mod lint;
pub mod loader;
pub mod manager;
pub mod schema;
pub mod threshold;
pub mod validate;

pub use evaluator::{
    replay, Evaluator, EventStatus, LabeledSample, ReplayResult, Sample, SeriesState,
    ThresholdEvent,
};
pub use key::{CompositeKey, KeyError};
pub use lint::{lint, Lint, LintKind};
pub use loader::{load_from_file, load_from_str, parse_str, to_json, to_yaml, LoadError};
pub use manager::{resolve_metric, ConfigManager, ReloadOutcome, ResolvedMetric};
pub use schema::{
    DataSource, DetectorConfig, DetectorDocument, DruidFetcherConfig, DruidSettings, MetricConfig,
    ModelInfo, NumalogicConf, PivotConfig, PrometheusSettings, ResolvedRetrain, RetrainConfig,
    StaticThreshold,
};
pub use threshold::{Outcome, INLIER_SCORE, OUTLIER_SCORE};
pub use validate::{validate, violations, ValidationError};
