use anyhow::Result;
use detector_config::ModelInfo;

use super::helpers;
use crate::output::{print_json, theme, OutputMode};

#[derive(clap::Args)]
pub struct ShowArgs {
    #[arg(help = "Detector name")]
    pub(crate) name: String,
}

pub fn execute(args: ShowArgs, mode: OutputMode, config_path: Option<&str>) -> Result<()> {
    let doc = helpers::load_document(config_path)?;
    let cfg = helpers::find_detector(&doc, &args.name)?;

    if mode == OutputMode::Json {
        return print_json(cfg);
    }

    theme::print_header(&cfg.name);
    theme::print_kv("Source", cfg.effective_source().as_str());
    theme::print_list("Composite keys", &cfg.composite_keys);
    theme::print_list("Metrics", &cfg.metrics);

    if !cfg.metric_configs().is_empty() {
        theme::print_section("Metric configs");
        for mc in cfg.metric_configs() {
            theme::print_kv("Metric", &mc.metric);
            if let Some(st) = &mc.static_threshold {
                theme::print_kv("  Upper limit", &helpers::format_limit(st.upper_limit));
                theme::print_kv("  Lower limit", &helpers::format_limit(st.lower_limit));
                theme::print_kv("  Weight", &helpers::format_limit(st.weight));
            }
            if let Some(rc) = &mc.retrain_conf {
                let r = rc.resolved();
                theme::print_kv(
                    "  Retrain",
                    &format!(
                        "{}h window, min {} points, every {}h",
                        r.train_hours, r.min_train_size, r.retrain_freq_hr
                    ),
                );
            }
            if let Some(nl) = &mc.numalogic_conf {
                let steps = nl.preprocess_names();
                theme::print_kv("  Model", model_name(nl.model.as_ref()));
                if !steps.is_empty() {
                    theme::print_kv("  Preprocess", &steps.join(" -> "));
                }
                theme::print_kv("  Threshold", model_name(nl.threshold.as_ref()));
            }
        }
    }

    if let Some(fetcher) = &cfg.druid_fetcher {
        theme::print_section("Druid fetcher");
        theme::print_kv("Datasource", &fetcher.datasource);
        theme::print_list("Dimensions", fetcher.dimensions());
        theme::print_list("Group by", fetcher.group_by());
        theme::print_list("Pivot", cfg.pivot_columns());
        if let Some(g) = &fetcher.granularity {
            theme::print_kv("Granularity", g);
        }
        if let Some(h) = fetcher.hours {
            theme::print_kv("Hours", &h.to_string());
        }
    }
    println!();
    Ok(())
}

fn model_name(info: Option<&ModelInfo>) -> &str {
    info.map_or("-", |m| m.name.as_str())
}
