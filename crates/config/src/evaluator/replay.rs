use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::event::{EventStatus, ThresholdEvent};
use super::{Evaluator, Sample};
use crate::key::{CompositeKey, KeyError};
use crate::schema::DetectorDocument;

/// A sample as a fetcher would produce it: raw series labels rather than a
/// resolved key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledSample {
    pub detector: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    pub metric: String,
    pub value: f64,
    pub timestamp_ms: i64,
}

impl LabeledSample {
    pub fn resolve(&self, doc: &DetectorDocument) -> Result<Sample, KeyError> {
        let cfg = doc
            .detector(&self.detector)
            .ok_or_else(|| KeyError::UnknownDetector(self.detector.clone()))?;
        Ok(Sample {
            key: CompositeKey::from_labels(cfg, &self.labels)?,
            metric: self.metric.clone(),
            value: self.value,
            timestamp_ms: self.timestamp_ms,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ReplayResult {
    pub events: Vec<ThresholdEvent>,
    pub breached_count: usize,
    pub recovered_count: usize,
}

/// Runs samples through a fresh evaluator in the order given.
pub fn replay(document: Arc<DetectorDocument>, samples: &[Sample]) -> ReplayResult {
    let evaluator = Evaluator::new(document);
    let events: Vec<_> = samples.iter().filter_map(|s| evaluator.evaluate(s)).collect();

    let breached_count = events
        .iter()
        .filter(|e| e.status == EventStatus::Breached)
        .count();
    let recovered_count = events
        .iter()
        .filter(|e| e.status == EventStatus::Recovered)
        .count();

    ReplayResult {
        events,
        breached_count,
        recovered_count,
    }
}
