use anyhow::{anyhow, Result};
use detector_config::{resolve_metric, Outcome};
use serde::Serialize;

use super::helpers;
use crate::output::{print_json, theme, OutputMode};

#[derive(clap::Args)]
pub struct CheckArgs {
    #[arg(help = "Detector name")]
    pub(crate) detector: String,
    #[arg(help = "Metric name")]
    pub(crate) metric: String,
    #[arg(help = "Observed value", allow_negative_numbers = true)]
    pub(crate) value: f64,
    #[arg(long, help = "Model anomaly score to blend with the static score")]
    pub(crate) model_score: Option<f64>,
}

#[derive(Serialize)]
struct CheckReport {
    detector: String,
    metric: String,
    value: f64,
    #[serde(flatten)]
    outcome: Outcome,
    static_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    blended_score: Option<f64>,
}

pub fn execute(args: CheckArgs, mode: OutputMode, config_path: Option<&str>) -> Result<()> {
    let doc = helpers::load_document(config_path)?;
    let cfg = helpers::find_detector(&doc, &args.detector)?;
    let resolved = resolve_metric(cfg, &args.metric).ok_or_else(|| {
        anyhow!(
            "detector '{}' does not evaluate metric '{}'",
            cfg.name,
            args.metric
        )
    })?;
    let threshold = resolved.static_threshold.ok_or_else(|| {
        anyhow!(
            "metric '{}' of '{}' has no static threshold",
            args.metric,
            cfg.name
        )
    })?;

    let report = CheckReport {
        outcome: threshold.check(args.value),
        static_score: threshold.score(args.value),
        blended_score: args.model_score.map(|m| threshold.blend(m, args.value)),
        detector: resolved.detector,
        metric: resolved.metric,
        value: args.value,
    };

    match mode {
        OutputMode::Json => print_json(&report)?,
        OutputMode::Human => {
            theme::print_header(&format!("{} / {}", report.detector, report.metric));
            theme::print_kv("Value", &report.value.to_string());
            theme::print_kv("Upper limit", &helpers::format_limit(threshold.upper_limit));
            theme::print_kv("Lower limit", &helpers::format_limit(threshold.lower_limit));
            theme::print_kv_colored(
                "Outcome",
                report.outcome.as_str(),
                !report.outcome.is_breach(),
            );
            theme::print_kv("Static score", &report.static_score.to_string());
            if let Some(b) = report.blended_score {
                theme::print_kv("Blended score", &b.to_string());
            }
            println!();
        }
    }
    Ok(())
}
