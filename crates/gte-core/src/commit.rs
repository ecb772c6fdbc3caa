//! Commit log model and parsing.

use chrono::{DateTime, Local};
use thiserror::Error;

/// Suffix that marks automation accounts in author names.
const BOT_SUFFIX: &str = "[bot]";

#[derive(Debug, Error)]
pub enum ParseLineError {
    #[error("empty line")]
    Empty,
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(#[from] std::num::ParseIntError),
    #[error("missing commit hash")]
    MissingHash,
}

/// A single commit from the log, as produced by `git log --format=%at %H %an`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Author timestamp, unix seconds.
    pub timestamp: i64,
    /// Commit hash. Opaque to the pipeline.
    pub id: String,
    /// Author name. May be empty.
    pub author: String,
}

impl Commit {
    /// The commit instant in the local timezone.
    ///
    /// Timestamps outside chrono's representable range clamp to the epoch.
    #[must_use]
    pub fn datetime(&self) -> DateTime<Local> {
        DateTime::from_timestamp(self.timestamp, 0)
            .unwrap_or_default()
            .with_timezone(&Local)
    }

    /// Whether the author is an automation account.
    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.author.ends_with(BOT_SUFFIX)
    }
}

/// Parse one `%at %H %an` log line.
///
/// The author field may contain spaces and may be absent entirely
/// (commits with an empty author name).
pub fn parse_log_line(line: &str) -> Result<Commit, ParseLineError> {
    let mut parts = line.splitn(3, ' ');
    let timestamp = parts.next().ok_or(ParseLineError::Empty)?;
    if timestamp.is_empty() {
        return Err(ParseLineError::Empty);
    }
    let timestamp = timestamp.parse::<i64>()?;
    let id = parts.next().ok_or(ParseLineError::MissingHash)?.to_string();
    let author = parts.next().unwrap_or("").to_string();

    Ok(Commit {
        timestamp,
        id,
        author,
    })
}

/// Parse a full log, skipping blank and malformed lines.
#[must_use]
pub fn parse_log(text: &str) -> Vec<Commit> {
    let mut commits = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_log_line(line) {
            Ok(commit) => commits.push(commit),
            Err(e) => {
                tracing::debug!(error = %e, line, "skipping malformed log line");
            }
        }
    }
    commits
}

/// Drop bot commits and sort ascending by timestamp.
///
/// The sort is stable, so commits sharing a timestamp keep their log order.
#[must_use]
pub fn filter_and_sort(mut commits: Vec<Commit>) -> Vec<Commit> {
    let total = commits.len();
    commits.retain(|c| !c.is_bot());
    if commits.len() < total {
        tracing::debug!(total, kept = commits.len(), "filtered bot commits");
    }
    commits.sort_by_key(|c| c.timestamp);
    commits
}
