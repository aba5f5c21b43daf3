use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::loader::{load_from_file, LoadError};
use crate::schema::{
    DataSource, DetectorConfig, DetectorDocument, DruidSettings, NumalogicConf,
    PrometheusSettings, ResolvedRetrain, StaticThreshold,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Unchanged,
    Reloaded { detectors: usize },
}

/// Everything a consumer needs to act on one metric of one detector, with
/// defaults filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMetric {
    pub detector: String,
    pub metric: String,
    pub source: DataSource,
    pub composite_keys: Vec<String>,
    pub static_threshold: Option<StaticThreshold>,
    pub retrain: ResolvedRetrain,
    pub numalogic_conf: Option<NumalogicConf>,
}

pub fn resolve_metric(cfg: &DetectorConfig, metric: &str) -> Option<ResolvedMetric> {
    if !cfg.has_metric(metric) {
        return None;
    }
    let mc = cfg.metric_config(metric);
    Some(ResolvedMetric {
        detector: cfg.name.clone(),
        metric: metric.to_string(),
        source: cfg.effective_source(),
        composite_keys: cfg.composite_keys.clone(),
        static_threshold: mc.and_then(|m| m.static_threshold),
        retrain: mc
            .and_then(|m| m.retrain_conf)
            .unwrap_or_default()
            .resolved(),
        numalogic_conf: mc.and_then(|m| m.numalogic_conf.clone()),
    })
}

/// Holds the live detector document for a file and swaps it on reload.
/// Readers take cheap snapshots and never observe a partial reload.
pub struct ConfigManager {
    path: PathBuf,
    current: watch::Sender<Arc<DetectorDocument>>,
    modified: Mutex<Option<SystemTime>>,
}

impl ConfigManager {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let path = path.into();
        let modified = modified_at(&path);
        let doc = load_from_file(&path)?;
        tracing::info!(path = %path.display(), detectors = doc.len(), "detector configuration loaded");
        let (current, _) = watch::channel(Arc::new(doc));
        Ok(Self {
            path,
            current,
            modified: Mutex::new(modified),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> Arc<DetectorDocument> {
        self.current.borrow().clone()
    }

    /// Receiver that is notified after every successful reload.
    pub fn subscribe(&self) -> watch::Receiver<Arc<DetectorDocument>> {
        self.current.subscribe()
    }

    pub fn detector(&self, name: &str) -> Option<DetectorConfig> {
        self.current.borrow().detector(name).cloned()
    }

    pub fn metric_config(&self, detector: &str, metric: &str) -> Option<ResolvedMetric> {
        self.current
            .borrow()
            .detector(detector)
            .and_then(|cfg| resolve_metric(cfg, metric))
    }

    pub fn prometheus(&self) -> Option<PrometheusSettings> {
        self.current.borrow().prometheus.clone()
    }

    pub fn druid(&self) -> Option<DruidSettings> {
        self.current.borrow().druid.clone()
    }

    /// Re-reads the file. A document that fails to load leaves the previous
    /// one in place.
    pub fn reload(&self) -> Result<ReloadOutcome, LoadError> {
        *self.modified.lock().unwrap_or_else(PoisonError::into_inner) = modified_at(&self.path);

        match load_from_file(&self.path) {
            Ok(doc) => {
                let detectors = doc.len();
                self.current.send_replace(Arc::new(doc));
                tracing::info!(path = %self.path.display(), detectors, "detector configuration reloaded");
                Ok(ReloadOutcome::Reloaded { detectors })
            }
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "reload failed, keeping previous configuration"
                );
                Err(e)
            }
        }
    }

    pub fn reload_if_changed(&self) -> Result<ReloadOutcome, LoadError> {
        let now = modified_at(&self.path);
        let last = *self.modified.lock().unwrap_or_else(PoisonError::into_inner);
        if now == last {
            return Ok(ReloadOutcome::Unchanged);
        }
        self.reload()
    }

    /// Polls the file until `shutdown` resolves.
    pub fn spawn_watcher<F>(self: Arc<Self>, interval: Duration, shutdown: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tokio::pin!(shutdown);

            tracing::info!(path = %self.path.display(), interval_ms = interval.as_millis() as u64, "watching detector configuration");
            loop {
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = ticker.tick() => {
                        // failures are logged by reload()
                        let _ = self.reload_if_changed();
                    }
                }
            }
            tracing::info!("configuration watcher stopped");
        })
    }
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
