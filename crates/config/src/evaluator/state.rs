use serde::{Deserialize, Serialize};

use crate::threshold::Outcome;

/// Per-series breach state. A breach remembers when it started and which
/// limit was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SeriesState {
    Ok,
    Breached { since_ms: i64, limit: f64 },
    Recovered { at_ms: i64 },
}

impl SeriesState {
    pub fn transition(self, outcome: &Outcome, now_ms: i64) -> Self {
        match (self, outcome.limit()) {
            (Self::Ok, Some(limit)) | (Self::Recovered { .. }, Some(limit)) => Self::Breached {
                since_ms: now_ms,
                limit,
            },
            (Self::Ok, None) | (Self::Recovered { .. }, None) => Self::Ok,

            (breached @ Self::Breached { .. }, Some(_)) => breached,
            (Self::Breached { .. }, None) => Self::Recovered { at_ms: now_ms },
        }
    }

    pub fn is_breached(&self) -> bool {
        matches!(self, Self::Breached { .. })
    }

    pub fn just_recovered(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }
}
