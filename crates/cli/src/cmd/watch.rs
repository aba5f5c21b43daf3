use anyhow::{Context, Result};
use detector_config::ConfigManager;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use super::helpers;
use crate::output::{print_json_line, print_success, theme, OutputMode};
use crate::shutdown;

#[derive(clap::Args)]
pub struct WatchArgs {
    #[arg(long, default_value_t = 5, help = "Polling interval in seconds")]
    pub(crate) interval: u64,
}

pub async fn execute(args: WatchArgs, mode: OutputMode, config_path: Option<&str>) -> Result<()> {
    let path = helpers::resolve_config_path(config_path);
    let manager = Arc::new(
        ConfigManager::open(&path)
            .with_context(|| format!("loading detectors from {}", path.display()))?,
    );
    let mut updates = manager.subscribe();

    report(mode, manager.snapshot().len(), &path.display().to_string(), false)?;
    if mode == OutputMode::Human {
        theme::print_dim("Watching for changes, press Ctrl+C to stop");
    }

    let interval = Duration::from_secs(args.interval.max(1));
    let watcher = manager.clone().spawn_watcher(interval, shutdown::wait_for_shutdown());

    // `updates` never closes while `manager` is alive, so stop on the watcher
    let mut watcher = watcher;
    loop {
        tokio::select! {
            res = &mut watcher => {
                res.context("configuration watcher panicked")?;
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let detectors = updates.borrow_and_update().len();
                report(mode, detectors, &path.display().to_string(), true)?;
            }
        }
    }
    Ok(())
}

fn report(mode: OutputMode, detectors: usize, path: &str, reloaded: bool) -> Result<()> {
    match mode {
        OutputMode::Json => {
            let event = if reloaded { "reloaded" } else { "loaded" };
            print_json_line(&json!({
                "event": event,
                "path": path,
                "detectors": detectors,
            }))
        }
        OutputMode::Human => {
            let verb = if reloaded { "Reloaded" } else { "Loaded" };
            print_success(&format!("{verb} {path} ({detectors} detectors)"));
            Ok(())
        }
    }
}
