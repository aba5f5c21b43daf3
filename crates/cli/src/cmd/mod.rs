pub(crate) mod check;
pub(crate) mod export;
pub(crate) mod helpers;
mod lint;
mod list;
mod path;
mod replay;
pub(crate) mod show;
mod validate;
mod version;
pub(crate) mod watch;

use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Check the document and report every violation and lint
    Validate,
    /// List suspicious but loadable entries
    Lint,
    /// List configured detectors
    List,
    /// Show one detector in detail
    Show(show::ShowArgs),
    /// Evaluate a value against a metric's static threshold
    Check(check::CheckArgs),
    /// Run recorded samples through the threshold evaluator
    Replay(replay::ReplayArgs),
    /// Print the normalized document
    Export(export::ExportArgs),
    /// Reload the document whenever it changes
    Watch(watch::WatchArgs),
    /// Print the resolved configuration path
    Path,
    /// Print build information
    Version,
}

pub async fn run(opts: crate::Opts) -> Result<()> {
    let mode = opts.output_mode();
    let config = opts.config;
    match opts.cmd {
        Commands::Validate => validate::execute(mode, config.as_deref()),
        Commands::Lint => lint::execute(mode, config.as_deref()),
        Commands::List => list::execute(mode, config.as_deref()),
        Commands::Show(args) => show::execute(args, mode, config.as_deref()),
        Commands::Check(args) => check::execute(args, mode, config.as_deref()),
        Commands::Replay(args) => replay::execute(args, mode, config.as_deref()),
        Commands::Export(args) => export::execute(args, mode, config.as_deref()),
        Commands::Watch(args) => watch::execute(args, mode, config.as_deref()).await,
        Commands::Path => path::execute(mode, config.as_deref()),
        Commands::Version => version::execute(mode),
    }
}
