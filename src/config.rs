//! Review workflow configuration, loaded from a JSON file.
//!
//! Every field has a default, so an empty object `{}` is a valid file.

use crate::core::user::Role;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid utc offset: {0} minutes")]
    InvalidOffset(i32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Name of the settlement network, used in log lines and receipts.
    #[serde(default = "default_network")]
    pub settlement_network: String,
    /// Role a user must hold to open the review workflow.
    #[serde(default = "default_role")]
    pub required_role: Role,
    /// Pending transactions listed on the dashboard.
    #[serde(default = "default_preview_limit")]
    pub pending_preview_limit: usize,
    /// Refetch the whole list after a settled batch.
    #[serde(default = "default_true")]
    pub refresh_after_batch: bool,
    /// Offset used for the date filter. Unset means the host's local zone.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

fn default_network() -> String {
    "SWIFT".to_string()
}

fn default_role() -> Role {
    Role::Employee
}

fn default_preview_limit() -> usize {
    5
}

fn default_true() -> bool {
    true
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            settlement_network: default_network(),
            required_role: default_role(),
            pending_preview_limit: default_preview_limit(),
            refresh_after_batch: true,
            utc_offset_minutes: None,
        }
    }
}

impl ReviewConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.zone()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// The fixed zone for the date filter, if one is configured.
    pub fn zone(&self) -> Result<Option<FixedOffset>, ConfigError> {
        match self.utc_offset_minutes {
            None => Ok(None),
            Some(minutes) => FixedOffset::east_opt(minutes * 60)
                .map(Some)
                .ok_or(ConfigError::InvalidOffset(minutes)),
        }
    }
}
