//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use gte_core::{AttributionPolicy, EstimatorConfig};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Application configuration.
///
/// Resolution order, later wins: built-in defaults, the platform config
/// file, an explicit `--config` file, `GTE_*` environment variables,
/// CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Minutes of inactivity that separate two sessions.
    pub session_threshold_minutes: u32,
    /// Minimum session duration in minutes.
    pub min_session_minutes: u32,
    /// Maximum session duration in hours.
    pub max_session_hours: u32,
    /// How a session's time is split among its authors.
    pub attribution: AttributionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_threshold_minutes: 30,
            min_session_minutes: 5,
            max_session_hours: 8,
            attribution: AttributionPolicy::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("GTE_"));

        figment.extract()
    }

    /// Applies CLI flag overrides on top of the loaded configuration.
    #[must_use]
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(gap) = cli.session_gap {
            self.session_threshold_minutes = gap;
        }
        if let Some(min) = cli.min_session {
            self.min_session_minutes = min;
        }
        if let Some(max) = cli.max_session {
            self.max_session_hours = max;
        }
        if let Some(policy) = cli.attribution {
            self.attribution = policy;
        }
        self
    }

    /// The estimator knobs consumed by the core pipeline.
    #[must_use]
    pub const fn estimator(&self) -> EstimatorConfig {
        EstimatorConfig {
            session_threshold_minutes: self.session_threshold_minutes,
            min_session_minutes: self.min_session_minutes,
            max_session_hours: self.max_session_hours,
        }
    }
}

/// Returns the platform-specific config directory for gte.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("gte"))
}
