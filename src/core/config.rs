//! Tracker configuration loaded from `reqtrack.toml`.
//!
//! A missing file is not an error: every field has a default so the tracker
//! runs out of the box against the embedded sample seed.

use crate::core::error::ReqtrackError;
use crate::core::request::Actor;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "reqtrack.toml";

pub const DEFAULT_OPERATOR: &str = "portal-ops";
pub const DEFAULT_AT_RISK_DAYS: i64 = 2;
pub const DEFAULT_FEED_LIMIT: usize = 7;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SlaConfig {
    /// Remaining days at or below which an open request counts as at-risk.
    #[serde(default = "default_at_risk_days")]
    pub at_risk_days: i64,
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            at_risk_days: DEFAULT_AT_RISK_DAYS,
        }
    }
}

impl SlaConfig {
    /// Saturates at `Duration::MAX`; loaded configs reject such day counts.
    pub fn at_risk_window(&self) -> Duration {
        Duration::try_days(self.at_risk_days).unwrap_or(Duration::MAX)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FeedConfig {
    #[serde(default = "default_feed_limit")]
    pub limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_FEED_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Identity written into activity entries for store mutations.
    #[serde(default = "default_operator")]
    pub operator: String,
    #[serde(default)]
    pub sla: SlaConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub actors: Vec<Actor>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            operator: default_operator(),
            sla: SlaConfig::default(),
            feed: FeedConfig::default(),
            actors: Vec::new(),
        }
    }
}

fn default_operator() -> String {
    DEFAULT_OPERATOR.to_string()
}

fn default_at_risk_days() -> i64 {
    DEFAULT_AT_RISK_DAYS
}

fn default_feed_limit() -> usize {
    DEFAULT_FEED_LIMIT
}

impl TrackerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ReqtrackError> {
        let config: TrackerConfig =
            toml::from_str(content).map_err(|e| ReqtrackError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ReqtrackError> {
        if self.operator.trim().is_empty() {
            return Err(ReqtrackError::ConfigError(
                "operator cannot be empty".to_string(),
            ));
        }
        if self.sla.at_risk_days < 0 {
            return Err(ReqtrackError::ConfigError(format!(
                "sla.at_risk_days must be >= 0, got {}",
                self.sla.at_risk_days
            )));
        }
        if Duration::try_days(self.sla.at_risk_days).is_none() {
            return Err(ReqtrackError::ConfigError(format!(
                "sla.at_risk_days is out of range, got {}",
                self.sla.at_risk_days
            )));
        }
        let mut seen = std::collections::HashSet::new();
        for actor in &self.actors {
            if actor.id.trim().is_empty() {
                return Err(ReqtrackError::ConfigError(
                    "actor id cannot be empty".to_string(),
                ));
            }
            if !seen.insert(actor.id.as_str()) {
                return Err(ReqtrackError::ConfigError(format!(
                    "duplicate actor id '{}'",
                    actor.id
                )));
            }
        }
        Ok(())
    }
}

/// Load config from an explicit file, or from `reqtrack.toml` under `dir`.
/// Accepts either a directory or a direct path to the TOML file.
pub fn load_config(path: &Path) -> Result<TrackerConfig, ReqtrackError> {
    let config_path = if path.is_dir() {
        path.join(CONFIG_FILE_NAME)
    } else {
        path.to_path_buf()
    };

    if config_path.exists() {
        let content = fs::read_to_string(&config_path).map_err(ReqtrackError::IoError)?;
        tracing::debug!(path = %config_path.display(), "loaded tracker config");
        return TrackerConfig::from_toml_str(&content);
    }

    // No config = defaults (not an error)
    Ok(TrackerConfig::default())
}
