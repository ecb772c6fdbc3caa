//! Aggregation, attribution, and report rendering.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::commit::{Commit, filter_and_sort};
use crate::session::{EstimatorConfig, SessionDuration, estimate_durations, group_sessions};

/// Output for a repository with no usable commit history.
pub const NO_HISTORY_MESSAGE: &str = "- No commit history found to generate statistics.\n- Please ensure the repository has commits and history is fetched.";

/// How a session's duration is split among its distinct authors.
///
/// The even split is a simplifying policy, not an inference of effort
/// share; the commit-weighted variant is an equally defensible alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AttributionPolicy {
    /// Each of the session's k distinct authors gets `duration / k`.
    #[default]
    EvenSplit,
    /// Each author gets `duration x (own commits / session commits)`.
    CommitWeighted,
}

impl AttributionPolicy {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EvenSplit => "even-split",
            Self::CommitWeighted => "commit-weighted",
        }
    }
}

impl std::fmt::Display for AttributionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AttributionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "even-split" => Ok(Self::EvenSplit),
            "commit-weighted" => Ok(Self::CommitWeighted),
            _ => Err(format!("invalid attribution policy: {s}")),
        }
    }
}

/// Totals derived from all session durations. Computed once per run.
#[derive(Debug, Clone)]
pub struct AggregateReport {
    pub total_minutes: f64,
    pub total_commits: usize,
    pub session_count: usize,
    /// None when there are no sessions.
    pub average_session_minutes: Option<f64>,
    /// None when there are no commits.
    pub average_minutes_per_commit: Option<f64>,
    pub per_author_minutes: BTreeMap<String, f64>,
}

/// Reduce session durations into totals and per-author credit.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(durations: &[SessionDuration], policy: AttributionPolicy) -> AggregateReport {
    let total_minutes: f64 = durations.iter().map(|d| d.duration_minutes).sum();
    let total_commits: usize = durations.iter().map(|d| d.commit_count).sum();
    let session_count = durations.len();

    let mut per_author_minutes: BTreeMap<String, f64> = BTreeMap::new();
    for duration in durations {
        if duration.authors.is_empty() {
            continue;
        }
        match policy {
            AttributionPolicy::EvenSplit => {
                let share = duration.duration_minutes / duration.authors.len() as f64;
                for author in duration.authors.keys() {
                    *per_author_minutes.entry(author.clone()).or_insert(0.0) += share;
                }
            }
            AttributionPolicy::CommitWeighted => {
                for (author, commits) in &duration.authors {
                    let weight = *commits as f64 / duration.commit_count as f64;
                    *per_author_minutes.entry(author.clone()).or_insert(0.0) +=
                        duration.duration_minutes * weight;
                }
            }
        }
    }

    AggregateReport {
        total_minutes,
        total_commits,
        session_count,
        average_session_minutes: (session_count > 0)
            .then(|| total_minutes / session_count as f64),
        average_minutes_per_commit: (total_commits > 0)
            .then(|| total_minutes / total_commits as f64),
        per_author_minutes,
    }
}

/// Format minutes as `"{h}h {m}m"` when hours > 0, else `"{m}m"`.
/// Minutes are truncated, not rounded.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_time(minutes: f64) -> String {
    let total = minutes as i64;
    let hours = total / 60;
    let mins = total % 60;
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

/// Authors ordered by attributed minutes descending, name ascending on ties.
fn authors_by_minutes(report: &AggregateReport) -> Vec<(&str, f64)> {
    let mut ranked: Vec<(&str, f64)> = report
        .per_author_minutes
        .iter()
        .map(|(author, minutes)| (author.as_str(), *minutes))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    ranked
}

/// Render the report as `\n`-joined text, no trailing newline.
///
/// The author breakdown appears only when more than one distinct author
/// contributed across the whole report.
#[must_use]
pub fn render(report: &AggregateReport) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "- Total time spent: {} ({:.1} minutes)",
        format_time(report.total_minutes),
        report.total_minutes
    ));
    lines.push(format!("- Number of sessions: {}", report.session_count));
    lines.push(format!("- Total commits: {}", report.total_commits));

    if let Some(avg) = report.average_session_minutes {
        lines.push(format!("- Average session length: {}", format_time(avg)));
    }
    if let Some(avg) = report.average_minutes_per_commit {
        lines.push(format!("- Average time per commit: {}", format_time(avg)));
    }

    if report.per_author_minutes.len() > 1 {
        lines.push("\n#### Time by Author:".to_string());
        for (author, minutes) in authors_by_minutes(report) {
            let percentage = if report.total_minutes > 0.0 {
                minutes / report.total_minutes * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "- {author}: {} ({percentage:.1}%)",
                format_time(minutes)
            ));
        }
    }

    lines.join("\n")
}

/// Run the full pipeline and render the text report.
///
/// An empty (or fully bot-filtered) commit list produces the fixed
/// no-history message rather than a zero-filled report.
#[must_use]
pub fn generate_stats(
    commits: Vec<Commit>,
    config: &EstimatorConfig,
    policy: AttributionPolicy,
) -> String {
    let commits = filter_and_sort(commits);
    if commits.is_empty() {
        return NO_HISTORY_MESSAGE.to_string();
    }

    let sessions = group_sessions(&commits, config.session_threshold_minutes);
    let durations = estimate_durations(
        &sessions,
        config.min_session_minutes,
        config.max_session_hours,
    );
    tracing::debug!(
        commits = commits.len(),
        sessions = sessions.len(),
        "computed sessions"
    );

    render(&aggregate(&durations, policy))
}

#[derive(Debug, Serialize)]
struct JsonSession {
    start: String,
    end: String,
    commit_count: usize,
    duration_minutes: f64,
    authors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct JsonAuthor {
    author: String,
    minutes: f64,
    percent: f64,
}

/// Machine-readable report shape.
#[derive(Debug, Serialize)]
struct JsonReport {
    total_minutes: f64,
    total_commits: usize,
    session_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    average_session_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    average_minutes_per_commit: Option<f64>,
    sessions: Vec<JsonSession>,
    authors: Vec<JsonAuthor>,
}

/// Run the full pipeline and serialize the report as pretty JSON.
///
/// Unlike the text rendering, an empty history yields a zero-filled
/// report so the output stays parseable.
pub fn generate_stats_json(
    commits: Vec<Commit>,
    config: &EstimatorConfig,
    policy: AttributionPolicy,
) -> serde_json::Result<String> {
    let commits = filter_and_sort(commits);
    let sessions = group_sessions(&commits, config.session_threshold_minutes);
    let durations = estimate_durations(
        &sessions,
        config.min_session_minutes,
        config.max_session_hours,
    );
    let report = aggregate(&durations, policy);

    let sessions = durations
        .iter()
        .map(|d| JsonSession {
            start: d.start.to_rfc3339(),
            end: d.end.to_rfc3339(),
            commit_count: d.commit_count,
            duration_minutes: d.duration_minutes,
            authors: d.authors.keys().cloned().collect(),
        })
        .collect();

    let authors = authors_by_minutes(&report)
        .into_iter()
        .map(|(author, minutes)| JsonAuthor {
            author: author.to_string(),
            minutes,
            percent: if report.total_minutes > 0.0 {
                minutes / report.total_minutes * 100.0
            } else {
                0.0
            },
        })
        .collect();

    serde_json::to_string_pretty(&JsonReport {
        total_minutes: report.total_minutes,
        total_commits: report.total_commits,
        session_count: report.session_count,
        average_session_minutes: report.average_session_minutes,
        average_minutes_per_commit: report.average_minutes_per_commit,
        sessions,
        authors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn commit(timestamp: i64, author: &str) -> Commit {
        Commit {
            timestamp,
            id: format!("c{timestamp}"),
            author: author.to_string(),
        }
    }

    fn minutes(m: i64) -> i64 {
        1_700_000_000 + m * 60
    }

    fn durations_for(commits: &[Commit], config: &EstimatorConfig) -> Vec<SessionDuration> {
        let sessions = group_sessions(commits, config.session_threshold_minutes);
        estimate_durations(
            &sessions,
            config.min_session_minutes,
            config.max_session_hours,
        )
    }

    // ========== format_time ==========

    #[test]
    fn format_time_minutes_only() {
        assert_eq!(format_time(0.0), "0m");
        assert_eq!(format_time(10.0), "10m");
        assert_eq!(format_time(59.9), "59m");
    }

    #[test]
    fn format_time_hours_and_minutes() {
        assert_eq!(format_time(60.0), "1h 0m");
        assert_eq!(format_time(480.0), "8h 0m");
        assert_eq!(format_time(95.5), "1h 35m");
    }

    #[test]
    fn format_time_truncates_not_rounds() {
        assert_eq!(format_time(16.9), "16m");
    }

    // ========== aggregation ==========

    #[test]
    fn aggregate_empty_durations() {
        let report = aggregate(&[], AttributionPolicy::EvenSplit);
        assert!(report.total_minutes.abs() < f64::EPSILON);
        assert_eq!(report.total_commits, 0);
        assert_eq!(report.session_count, 0);
        assert!(report.average_session_minutes.is_none());
        assert!(report.average_minutes_per_commit.is_none());
        assert!(report.per_author_minutes.is_empty());
    }

    #[test]
    fn aggregate_totals_and_averages() {
        let commits = vec![
            commit(minutes(0), "jane"),
            commit(minutes(10), "jane"),
            commit(minutes(100), "jane"),
        ];
        let durations = durations_for(&commits, &EstimatorConfig::default());
        let report = aggregate(&durations, AttributionPolicy::EvenSplit);

        // Session 1: 10 + 10 padding = 20. Session 2: lone commit = 10.
        assert!((report.total_minutes - 30.0).abs() < f64::EPSILON);
        assert_eq!(report.total_commits, 3);
        assert_eq!(report.session_count, 2);
        assert!((report.average_session_minutes.unwrap() - 15.0).abs() < f64::EPSILON);
        assert!((report.average_minutes_per_commit.unwrap() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn even_split_divides_among_distinct_authors() {
        // One session worth 30 minutes, two authors (jane twice, joe once).
        let commits = vec![
            commit(minutes(0), "jane"),
            commit(minutes(10), "jane"),
            commit(minutes(20), "joe"),
        ];
        let durations = durations_for(&commits, &EstimatorConfig::default());
        let report = aggregate(&durations, AttributionPolicy::EvenSplit);

        assert!((report.total_minutes - 30.0).abs() < f64::EPSILON);
        assert!((report.per_author_minutes["jane"] - 15.0).abs() < f64::EPSILON);
        assert!((report.per_author_minutes["joe"] - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn commit_weighted_split_follows_commit_counts() {
        let commits = vec![
            commit(minutes(0), "jane"),
            commit(minutes(10), "jane"),
            commit(minutes(20), "joe"),
        ];
        let durations = durations_for(&commits, &EstimatorConfig::default());
        let report = aggregate(&durations, AttributionPolicy::CommitWeighted);

        assert!((report.per_author_minutes["jane"] - 20.0).abs() < 1e-9);
        assert!((report.per_author_minutes["joe"] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn attribution_conserves_total_minutes() {
        let commits = vec![
            commit(minutes(0), "jane"),
            commit(minutes(5), "joe"),
            commit(minutes(12), "amira"),
            commit(minutes(90), "joe"),
            commit(minutes(95), "joe"),
            commit(minutes(300), "jane"),
        ];
        let durations = durations_for(&commits, &EstimatorConfig::default());
        for policy in [AttributionPolicy::EvenSplit, AttributionPolicy::CommitWeighted] {
            let report = aggregate(&durations, policy);
            let attributed: f64 = report.per_author_minutes.values().sum();
            assert!(
                (attributed - report.total_minutes).abs() < 1e-9,
                "policy {policy}: {attributed} != {}",
                report.total_minutes
            );
        }
    }

    // ========== rendering ==========

    #[test]
    fn empty_history_message_is_exact() {
        let output = generate_stats(
            Vec::new(),
            &EstimatorConfig::default(),
            AttributionPolicy::EvenSplit,
        );
        assert_eq!(
            output,
            "- No commit history found to generate statistics.\n- Please ensure the repository has commits and history is fetched."
        );
    }

    #[test]
    fn all_bot_history_degenerates_to_no_history() {
        let commits = vec![commit(minutes(0), "dependabot[bot]")];
        let output = generate_stats(
            commits,
            &EstimatorConfig::default(),
            AttributionPolicy::EvenSplit,
        );
        assert_eq!(output, NO_HISTORY_MESSAGE);
    }

    #[test]
    fn single_commit_report() {
        let output = generate_stats(
            vec![commit(minutes(0), "jane")],
            &EstimatorConfig::default(),
            AttributionPolicy::EvenSplit,
        );
        assert_snapshot!(output, @r"
        - Total time spent: 10m (10.0 minutes)
        - Number of sessions: 1
        - Total commits: 1
        - Average session length: 10m
        - Average time per commit: 10m
        ");
    }

    #[test]
    fn two_commits_ten_minutes_apart() {
        let output = generate_stats(
            vec![commit(minutes(0), "jane"), commit(minutes(10), "jane")],
            &EstimatorConfig::default(),
            AttributionPolicy::EvenSplit,
        );
        assert!(output.contains("- Total time spent: 20m (20.0 minutes)"));
        assert!(output.contains("- Number of sessions: 1"));
    }

    #[test]
    fn two_commits_past_threshold_become_two_sessions() {
        let output = generate_stats(
            vec![commit(minutes(0), "jane"), commit(minutes(45), "jane")],
            &EstimatorConfig::default(),
            AttributionPolicy::EvenSplit,
        );
        assert!(output.contains("- Total time spent: 20m (20.0 minutes)"));
        assert!(output.contains("- Number of sessions: 2"));
    }

    #[test]
    fn clamped_session_renders_as_eight_hours() {
        let output = generate_stats(
            vec![commit(minutes(0), "jane"), commit(minutes(590), "jane")],
            &EstimatorConfig {
                session_threshold_minutes: 600,
                ..EstimatorConfig::default()
            },
            AttributionPolicy::EvenSplit,
        );
        assert!(output.contains("- Total time spent: 8h 0m (480.0 minutes)"));
    }

    #[test]
    fn single_author_report_omits_breakdown() {
        let output = generate_stats(
            vec![commit(minutes(0), "jane"), commit(minutes(10), "jane")],
            &EstimatorConfig::default(),
            AttributionPolicy::EvenSplit,
        );
        assert!(!output.contains("Time by Author"));
    }

    #[test]
    fn multi_author_report_with_breakdown() {
        let commits = vec![
            commit(minutes(0), "jane"),
            commit(minutes(10), "jane"),
            commit(minutes(20), "joe"),
        ];
        let output = generate_stats(
            commits,
            &EstimatorConfig::default(),
            AttributionPolicy::EvenSplit,
        );
        assert_snapshot!(output, @r"
        - Total time spent: 30m (30.0 minutes)
        - Number of sessions: 1
        - Total commits: 3
        - Average session length: 30m
        - Average time per commit: 10m

        #### Time by Author:
        - jane: 15m (50.0%)
        - joe: 15m (50.0%)
        ");
    }

    #[test]
    fn authors_ranked_descending_by_minutes() {
        let commits = vec![
            commit(minutes(0), "joe"),
            commit(minutes(100), "jane"),
            commit(minutes(105), "jane"),
        ];
        let output = generate_stats(
            commits,
            &EstimatorConfig::default(),
            AttributionPolicy::EvenSplit,
        );
        let jane = output.find("- jane:").expect("jane listed");
        let joe = output.find("- joe:").expect("joe listed");
        assert!(jane < joe, "jane (15m) should rank above joe (10m)");
    }

    #[test]
    fn pipeline_is_idempotent() {
        let commits = vec![
            commit(minutes(0), "jane"),
            commit(minutes(7), "joe"),
            commit(minutes(120), "jane"),
        ];
        let config = EstimatorConfig::default();
        let first = generate_stats(commits.clone(), &config, AttributionPolicy::EvenSplit);
        let second = generate_stats(commits, &config, AttributionPolicy::EvenSplit);
        assert_eq!(first, second);
    }

    // ========== JSON ==========

    #[test]
    fn json_report_roundtrips_totals() {
        let commits = vec![
            commit(minutes(0), "jane"),
            commit(minutes(10), "jane"),
            commit(minutes(20), "joe"),
        ];
        let output = generate_stats_json(
            commits,
            &EstimatorConfig::default(),
            AttributionPolicy::EvenSplit,
        )
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["total_commits"], 3);
        assert_eq!(value["session_count"], 1);
        assert!((value["total_minutes"].as_f64().unwrap() - 30.0).abs() < f64::EPSILON);
        assert_eq!(value["sessions"].as_array().unwrap().len(), 1);
        assert_eq!(value["authors"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn json_report_empty_history_is_zero_filled() {
        let output = generate_stats_json(
            Vec::new(),
            &EstimatorConfig::default(),
            AttributionPolicy::EvenSplit,
        )
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["session_count"], 0);
        assert_eq!(value["total_commits"], 0);
        assert!(value.get("average_session_minutes").is_none());
        assert_eq!(value["sessions"].as_array().unwrap().len(), 0);
    }

    // ========== policy parsing ==========

    #[test]
    fn attribution_policy_roundtrip() {
        for policy in [AttributionPolicy::EvenSplit, AttributionPolicy::CommitWeighted] {
            let parsed: AttributionPolicy = policy.as_str().parse().unwrap();
            assert_eq!(parsed, policy);
            assert_eq!(policy.to_string(), policy.as_str());
        }
    }

    #[test]
    fn attribution_policy_rejects_unknown() {
        assert!("fair-share".parse::<AttributionPolicy>().is_err());
    }

    #[test]
    fn attribution_policy_serde_matches_as_str() {
        for policy in [AttributionPolicy::EvenSplit, AttributionPolicy::CommitWeighted] {
            let value = serde_json::to_value(policy).unwrap();
            assert_eq!(value.as_str().unwrap(), policy.as_str());
        }
    }
}
