use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gte_cli::{Cli, Config, gitlog};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref())
        .context("failed to load configuration")?
        .with_overrides(&cli);
    tracing::debug!(?config, "resolved configuration");

    let root = gitlog::repo_root(&cli.repo)?;
    tracing::debug!(root = %root.display(), "git repository found");

    let commits = gitlog::read_log(&cli.repo)?;
    let estimator = config.estimator();

    let output = if cli.json {
        gte_core::generate_stats_json(commits, &estimator, config.attribution)
            .context("failed to serialize report")?
    } else {
        gte_core::generate_stats(commits, &estimator, config.attribution)
    };

    match &cli.output_file {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("failed to write stats to {}", path.display()))?;
            tracing::info!(path = %path.display(), "stats written");
        }
        None => {
            // No trailing newline beyond what the report contains.
            print!("{output}");
        }
    }

    Ok(())
}
