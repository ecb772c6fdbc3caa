//! Command-line argument definitions.

use std::path::PathBuf;

use clap::Parser;
use gte_core::AttributionPolicy;

/// Estimate time spent on a git repository from its commit history.
///
/// Commits are grouped into coding sessions by time proximity; each
/// session's duration is estimated with padding and a cap, then summed
/// into a report, optionally attributed per author.
#[derive(Debug, Parser)]
#[command(name = "gte", version, about, long_about = None)]
pub struct Cli {
    /// Repository to analyze. Defaults to the current directory.
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Minutes of inactivity that separate two sessions.
    #[arg(long)]
    pub session_gap: Option<u32>,

    /// Minimum session duration in minutes.
    #[arg(long)]
    pub min_session: Option<u32>,

    /// Maximum session duration in hours.
    #[arg(long)]
    pub max_session: Option<u32>,

    /// How a session's time is split among its authors
    /// (even-split or commit-weighted).
    #[arg(long)]
    pub attribution: Option<AttributionPolicy>,

    /// Write the stats to a file instead of stdout.
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Emit the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}
