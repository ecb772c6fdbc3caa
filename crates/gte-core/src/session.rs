//! Session grouping and duration estimation.
//!
//! Commits are a lagging, incomplete proxy for work done: a commit marks
//! the end of a unit of work. Durations therefore carry a fixed padding
//! on top of the observed span, and are clamped to a configurable cap.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};

use crate::commit::Commit;

/// Knobs for grouping and estimation. All deliberately simple, tunable
/// bias corrections rather than probabilistic estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimatorConfig {
    /// Maximum minutes between consecutive commits in one session.
    pub session_threshold_minutes: u32,

    /// Minimum session duration in minutes. A session's padding is twice
    /// this value, modeling work before the first and after the last commit.
    pub min_session_minutes: u32,

    /// Cap on a single session's duration, in hours.
    pub max_session_hours: u32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            session_threshold_minutes: 30,
            min_session_minutes: 5,
            max_session_hours: 8,
        }
    }
}

/// A maximal run of commits with no internal gap above the threshold.
pub type Session = Vec<Commit>;

/// Estimated active-work duration for one session. Never mutated after
/// creation.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDuration {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub commit_count: usize,
    pub duration_minutes: f64,
    /// Distinct authors mapped to their commit count within the session.
    pub authors: BTreeMap<String, usize>,
}

/// Partition a chronologically ascending commit sequence into sessions.
///
/// The gap is measured against the *last* commit of the open session, so
/// gaps compound only against the most recent activity. Sessions partition
/// the input: concatenating them in order reproduces it exactly.
#[must_use]
pub fn group_sessions(commits: &[Commit], threshold_minutes: u32) -> Vec<Session> {
    let threshold_secs = i64::from(threshold_minutes) * 60;
    let mut sessions = Vec::new();
    let mut current: Session = Vec::new();

    for commit in commits {
        if let Some(last) = current.last() {
            if commit.timestamp - last.timestamp > threshold_secs {
                sessions.push(std::mem::take(&mut current));
            }
        }
        current.push(commit.clone());
    }
    if !current.is_empty() {
        sessions.push(current);
    }

    sessions
}

/// Estimate a duration for each session, order preserved.
///
/// Single-commit sessions get `2 x min_session_minutes`; longer sessions
/// get their observed span plus the same padding. Everything is clamped
/// at `max_session_hours`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimate_durations(
    sessions: &[Session],
    min_session_minutes: u32,
    max_session_hours: u32,
) -> Vec<SessionDuration> {
    let padding_minutes = f64::from(min_session_minutes) * 2.0;
    let cap_minutes = f64::from(max_session_hours) * 60.0;

    let mut durations = Vec::with_capacity(sessions.len());
    for session in sessions {
        let (Some(first), Some(last)) = (session.first(), session.last()) else {
            continue;
        };

        let estimated = if session.len() == 1 {
            padding_minutes
        } else {
            let span_minutes = (last.timestamp - first.timestamp) as f64 / 60.0;
            span_minutes + padding_minutes
        };

        let mut authors: BTreeMap<String, usize> = BTreeMap::new();
        for commit in session {
            *authors.entry(commit.author.clone()).or_insert(0) += 1;
        }

        durations.push(SessionDuration {
            start: first.datetime(),
            end: last.datetime(),
            commit_count: session.len(),
            duration_minutes: estimated.min(cap_minutes),
            authors,
        });
    }

    durations
}
