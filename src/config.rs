//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.taskify.toml` files.

use crate::analysis::AnalyticsWindows;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = ".taskify.toml";

/// Largest accepted analytics window, in days.
pub const MAX_WINDOW_DAYS: i64 = 3650;

/// Largest accepted completion-rate window, in weeks.
pub const MAX_COMPLETION_WEEKS: usize = 520;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// REST backend settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Analytics window settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Local state settings.
    #[serde(default)]
    pub state: StateConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory reports and exports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    ".".to_string()
}

/// Which backend serves projects and tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Seeded in-memory data.
    #[default]
    Mock,
    /// The REST backend.
    Api,
}

/// Data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    /// JSON workspace snapshot served by the mock store instead of the
    /// built-in sample data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<String>,

    /// Artificial delay added to every mock answer, in milliseconds.
    #[serde(default = "default_mock_delay")]
    pub mock_delay_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            data_file: None,
            mock_delay_ms: default_mock_delay(),
        }
    }
}

fn default_mock_delay() -> u64 {
    300
}

/// REST backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL all endpoint paths are appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Analytics window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Days of comments/updates that make a member active.
    #[serde(default = "default_activity_days")]
    pub activity_days: i64,

    /// Days ahead counted as an upcoming deadline.
    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: i64,

    /// Upcoming deadlines listed before "+N more".
    #[serde(default = "default_upcoming_limit")]
    pub upcoming_display_limit: usize,

    /// Days in the burndown chart.
    #[serde(default = "default_burndown_days")]
    pub burndown_days: usize,

    /// Weeks in the completion-rate chart.
    #[serde(default = "default_completion_weeks")]
    pub completion_weeks: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            activity_days: default_activity_days(),
            upcoming_days: default_upcoming_days(),
            upcoming_display_limit: default_upcoming_limit(),
            burndown_days: default_burndown_days(),
            completion_weeks: default_completion_weeks(),
        }
    }
}

fn default_activity_days() -> i64 {
    14
}

fn default_upcoming_days() -> i64 {
    7
}

fn default_upcoming_limit() -> usize {
    3
}

fn default_burndown_days() -> usize {
    14
}

fn default_completion_weeks() -> usize {
    8
}

impl From<&AnalyticsConfig> for AnalyticsWindows {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            activity_days: config.activity_days,
            upcoming_days: config.upcoming_days,
            upcoming_display_limit: config.upcoming_display_limit,
            burndown_days: config.burndown_days,
            completion_weeks: config.completion_weeks,
        }
    }
}

/// Local state settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// File holding the auth token, cached user and preferences.
    #[serde(default = "default_state_path")]
    pub path: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

fn default_state_path() -> String {
    ".taskify/state.json".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Reject values no view can work with.
    pub fn validate(&self) -> Result<()> {
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            anyhow::bail!("api.base_url must start with 'http://' or 'https://'");
        }
        if self.api.timeout_seconds == 0 {
            anyhow::bail!("api.timeout_seconds must be at least 1");
        }
        if self.analytics.burndown_days == 0 || self.analytics.completion_weeks == 0 {
            anyhow::bail!("analytics.burndown_days and analytics.completion_weeks must be at least 1");
        }
        if self.analytics.activity_days < 0 || self.analytics.upcoming_days < 0 {
            anyhow::bail!("analytics windows cannot be negative");
        }
        if self.analytics.activity_days > MAX_WINDOW_DAYS
            || self.analytics.upcoming_days > MAX_WINDOW_DAYS
            || self.analytics.burndown_days > MAX_WINDOW_DAYS as usize
        {
            anyhow::bail!("analytics day windows cannot exceed {} days", MAX_WINDOW_DAYS);
        }
        if self.analytics.completion_weeks > MAX_COMPLETION_WEEKS {
            anyhow::bail!(
                "analytics.completion_weeks cannot exceed {}",
                MAX_COMPLETION_WEEKS
            );
        }
        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // An explicit API URL selects the REST backend; --mock wins over it
        if let Some(ref url) = args.api_url {
            self.api.base_url = url.clone();
            self.source.kind = SourceKind::Api;
        }
        if args.mock {
            self.source.kind = SourceKind::Mock;
        }

        if let Some(ref data_file) = args.data_file {
            self.source.data_file = Some(data_file.display().to_string());
        }

        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }

        if let Some(ref state_file) = args.state_file {
            self.state.path = state_file.display().to_string();
        }
    }

    /// Where a generated file named `file_name` should be written.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        Path::new(&self.general.output_dir).join(file_name)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
