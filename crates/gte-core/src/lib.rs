//! Core pipeline for estimating development time from commit history.
//!
//! Three pure stages consume a chronologically sorted commit list:
//! - Grouping: partition commits into sessions by a time-gap threshold
//! - Estimation: map each session to a bounded, padded duration
//! - Aggregation: reduce durations into totals and per-author credit
//!
//! Nothing here touches the filesystem or spawns processes; callers
//! supply the commit log and receive rendered text or JSON back.

pub mod commit;
pub mod report;
pub mod session;

pub use commit::{Commit, ParseLineError, filter_and_sort, parse_log};
pub use report::{
    AggregateReport, AttributionPolicy, NO_HISTORY_MESSAGE, aggregate, format_time,
    generate_stats, generate_stats_json, render,
};
pub use session::{
    EstimatorConfig, Session, SessionDuration, estimate_durations, group_sessions,
};
