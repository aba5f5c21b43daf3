mod event;
mod replay;
mod state;

pub use event::{EventStatus, ThresholdEvent};
pub use replay::{replay, LabeledSample, ReplayResult};
pub use state::SeriesState;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::key::CompositeKey;
use crate::schema::DetectorDocument;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub key: CompositeKey,
    pub metric: String,
    pub value: f64,
    pub timestamp_ms: i64,
}

/// Applies each detector's static thresholds to incoming samples and reports
/// when a series starts or stops breaching.
pub struct Evaluator {
    document: Arc<DetectorDocument>,
    states: DashMap<String, SeriesState>,
}

impl Evaluator {
    pub fn new(document: Arc<DetectorDocument>) -> Self {
        Self {
            document,
            states: DashMap::new(),
        }
    }

    pub fn document(&self) -> &Arc<DetectorDocument> {
        &self.document
    }

    pub fn set_document(&mut self, document: Arc<DetectorDocument>) {
        self.document = document;
        self.states.clear();
    }

    pub fn tracked_series(&self) -> usize {
        self.states.len()
    }

    pub fn evaluate(&self, sample: &Sample) -> Option<ThresholdEvent> {
        let Some(cfg) = self.document.detector(&sample.key.detector) else {
            tracing::debug!(detector = %sample.key.detector, "sample for unknown detector skipped");
            return None;
        };
        if !cfg.has_metric(&sample.metric) {
            tracing::debug!(detector = %cfg.name, metric = %sample.metric, "metric not evaluated by detector");
            return None;
        }
        if let Err(e) = sample.key.check_arity(cfg) {
            tracing::debug!(error = %e, "sample key does not fit detector");
            return None;
        }
        let threshold = cfg.static_threshold(&sample.metric)?;

        let outcome = threshold.check(sample.value);
        let fp = sample.key.fingerprint(&sample.metric);

        let (current, next) = match self.states.entry(fp.clone()) {
            Entry::Occupied(mut entry) => {
                let current = *entry.get();
                let next = current.transition(&outcome, sample.timestamp_ms);
                if next == SeriesState::Ok {
                    entry.remove();
                } else {
                    entry.insert(next);
                }
                (current, next)
            }
            Entry::Vacant(entry) => {
                let next = SeriesState::Ok.transition(&outcome, sample.timestamp_ms);
                if next != SeriesState::Ok {
                    entry.insert(next);
                }
                (SeriesState::Ok, next)
            }
        };

        let (status, breached_since_ms, limit) = match (current, next) {
            (SeriesState::Breached { .. }, SeriesState::Breached { .. }) => return None,
            (_, SeriesState::Breached { since_ms, limit }) => {
                (EventStatus::Breached, since_ms, limit)
            }
            (SeriesState::Breached { since_ms, limit }, SeriesState::Recovered { .. }) => {
                (EventStatus::Recovered, since_ms, limit)
            }
            _ => return None,
        };

        tracing::info!(
            detector = %cfg.name,
            key = %sample.key,
            metric = %sample.metric,
            value = sample.value,
            limit,
            status = ?status,
            "static threshold state changed"
        );

        Some(ThresholdEvent {
            id: uuid::Uuid::new_v4().to_string(),
            fingerprint: fp,
            detector: cfg.name.clone(),
            key: sample.key.values.clone(),
            metric: sample.metric.clone(),
            status,
            value: sample.value,
            limit,
            outcome,
            breached_since_ms,
            at_ms: sample.timestamp_ms,
        })
    }
}
