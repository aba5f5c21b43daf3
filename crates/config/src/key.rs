use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::schema::DetectorConfig;

const KEY_SEPARATOR: &str = ":";
const TRAIN_PREFIX: &str = "train::";

/// The partition a series belongs to: the detector name plus one value per
/// composite key dimension, in the detector's declared order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompositeKey {
    pub detector: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyError {
    UnknownDetector(String),
    MissingDimension { detector: String, dimension: String },
    ArityMismatch {
        detector: String,
        expected: usize,
        got: usize,
    },
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDetector(name) => write!(f, "unknown detector '{name}'"),
            Self::MissingDimension {
                detector,
                dimension,
            } => write!(f, "'{detector}': no value for dimension '{dimension}'"),
            Self::ArityMismatch {
                detector,
                expected,
                got,
            } => write!(
                f,
                "'{detector}': expected {expected} key values, got {got}"
            ),
        }
    }
}

impl std::error::Error for KeyError {}

impl CompositeKey {
    pub fn new(detector: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            detector: detector.into(),
            values,
        }
    }

    /// Picks the detector's dimensions out of a series' labels. Dimension
    /// names are matched literally, including any that contain commas.
    pub fn from_labels(
        config: &DetectorConfig,
        labels: &HashMap<String, String>,
    ) -> Result<Self, KeyError> {
        let values = config
            .composite_keys
            .iter()
            .map(|dim| {
                labels
                    .get(dim)
                    .cloned()
                    .ok_or_else(|| KeyError::MissingDimension {
                        detector: config.name.clone(),
                        dimension: dim.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(config.name.clone(), values))
    }

    pub fn check_arity(&self, config: &DetectorConfig) -> Result<(), KeyError> {
        let expected = config.composite_keys.len();
        if self.values.len() != expected {
            return Err(KeyError::ArityMismatch {
                detector: self.detector.clone(),
                expected,
                got: self.values.len(),
            });
        }
        Ok(())
    }

    /// Registry key parts for one metric: `[detector, values..., metric]`.
    pub fn skeys(&self, metric: &str) -> Vec<String> {
        let mut parts = Vec::with_capacity(self.values.len() + 2);
        parts.push(self.detector.clone());
        parts.extend(self.values.iter().cloned());
        parts.push(metric.to_string());
        parts
    }

    /// Dedup key for a training request on one metric.
    pub fn train_key(&self, metric: &str) -> String {
        format!("{TRAIN_PREFIX}{}", self.skeys(metric).join(KEY_SEPARATOR))
    }

    pub fn fingerprint(&self, metric: &str) -> String {
        let mut hasher = std::hash::DefaultHasher::new();
        self.skeys(metric).hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detector)?;
        for v in &self.values {
            write!(f, "{KEY_SEPARATOR}{v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argo_cd() -> DetectorConfig {
        serde_yaml::from_str(
            "name: argo-cd\ncomposite_keys: [namespace, name]\nmetrics: [cpu]\n",
        )
        .unwrap()
    }

    fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn from_labels_follows_declared_order() {
        let l = labels(&[("name", "server"), ("namespace", "argocd"), ("pod", "x")]);
        let key = CompositeKey::from_labels(&argo_cd(), &l).unwrap();
        assert_eq!(key.values, vec!["argocd", "server"]);
        assert_eq!(key.to_string(), "argo-cd:argocd:server");
    }

    #[test]
    fn missing_dimension() {
        let l = labels(&[("namespace", "argocd")]);
        let err = CompositeKey::from_labels(&argo_cd(), &l).unwrap_err();
        assert_eq!(
            err,
            KeyError::MissingDimension {
                detector: "argo-cd".into(),
                dimension: "name".into(),
            }
        );
    }

    #[test]
    fn comma_dimension_matched_literally() {
        let cfg: DetectorConfig = serde_yaml::from_str(
            "name: s2s\ncomposite_keys: [\"source_asset_id, destination_asset_id\"]\nmetrics: [error_rate]\n",
        )
        .unwrap();
        let split = labels(&[("source_asset_id", "1"), ("destination_asset_id", "2")]);
        assert!(CompositeKey::from_labels(&cfg, &split).is_err());

        let literal = labels(&[("source_asset_id, destination_asset_id", "1-2")]);
        let key = CompositeKey::from_labels(&cfg, &literal).unwrap();
        assert_eq!(key.values, vec!["1-2"]);
    }

    #[test]
    fn skeys_and_train_key() {
        let key = CompositeKey::new("fciAsset", vec!["5984175597303660107".into()]);
        assert_eq!(key.skeys("failed"), vec!["fciAsset", "5984175597303660107", "failed"]);
        assert_eq!(key.train_key("failed"), "train::fciAsset:5984175597303660107:failed");
    }

    #[test]
    fn arity_checked_against_detector() {
        let key = CompositeKey::new("argo-cd", vec!["argocd".into()]);
        assert!(matches!(
            key.check_arity(&argo_cd()),
            Err(KeyError::ArityMismatch { expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn fingerprint_is_stable_and_distinct() {
        let a = CompositeKey::new("argo-cd", vec!["ns".into(), "app".into()]);
        let b = CompositeKey::new("argo-cd", vec!["ns".into(), "other".into()]);
        assert_eq!(a.fingerprint("cpu"), a.fingerprint("cpu"));
        assert_ne!(a.fingerprint("cpu"), b.fingerprint("cpu"));
        assert_ne!(a.fingerprint("cpu"), a.fingerprint("memory"));

        let fp = a.fingerprint("cpu");
        assert_eq!(fp.len(), 16);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
