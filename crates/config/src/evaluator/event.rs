use serde::{Deserialize, Serialize};

use crate::threshold::Outcome;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdEvent {
    pub id: String,
    pub fingerprint: String,
    pub detector: String,
    pub key: Vec<String>,
    pub metric: String,
    pub status: EventStatus,
    pub value: f64,
    /// The limit that was crossed. Recovery events carry the limit the
    /// series had breached.
    pub limit: f64,
    pub outcome: Outcome,
    pub breached_since_ms: i64,
    pub at_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Breached,
    Recovered,
}

impl ThresholdEvent {
    pub fn status_str(&self) -> &'static str {
        match self.status {
            EventStatus::Breached => "breached",
            EventStatus::Recovered => "recovered",
        }
    }
}
