mod cmd;
mod output;
mod shutdown;
#[cfg(test)]
mod tests;

use clap::Parser;
use cmd::Commands;
use output::{print_error, OutputMode};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "detectorctl", version, about = "Detector configuration admin CLI")]
pub struct Opts {
    #[clap(subcommand)]
    cmd: Commands,

    #[arg(long, global = true, help = "Output as JSON")]
    json: bool,

    #[arg(
        long,
        global = true,
        env = "DETECTOR_CONFIG",
        help = "Path to the detector configuration document"
    )]
    config: Option<String>,
}

impl Opts {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }

    fn default_log_level(&self) -> &'static str {
        match self.cmd {
            Commands::Watch(_) => "info",
            _ => "warn",
        }
    }
}

fn init_tracing(opts: &Opts) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(opts.default_log_level()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match opts.output_mode() {
        OutputMode::Json => builder.json().init(),
        OutputMode::Human => builder.compact().init(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let opts = Opts::parse();
    init_tracing(&opts);

    match cmd::run(opts).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
