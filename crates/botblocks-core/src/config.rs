use crate::error::{BotError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://192.168.4.1";
pub const DEFAULT_GAP_MS: u64 = 150;
pub const DEFAULT_SETTLE_MS: u64 = 300;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// RobotConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Pause after every action dispatch.
    #[serde(default = "default_gap_ms")]
    pub gap_ms: u64,
    /// How long a successful run stays `running` before returning to idle.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Per-request timeout; unset leaves the HTTP client default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_gap_ms() -> u64 {
    DEFAULT_GAP_MS
}

fn default_settle_ms() -> u64 {
    DEFAULT_SETTLE_MS
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            gap_ms: default_gap_ms(),
            settle_ms: default_settle_ms(),
            timeout_ms: None,
        }
    }
}

impl RobotConfig {
    pub fn load(root: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(paths::config_path(root))?;
        let cfg: RobotConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Load the project config, falling back to defaults when none exists.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        if paths::config_path(root).exists() {
            Self::load(root)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::config_path(root), data.as_bytes())
    }

    pub fn gap(&self) -> Duration {
        Duration::from_millis(self.gap_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// `base_url` with trailing slashes removed.
    pub fn trimmed_base_url(&self) -> &str {
        trim_base_url(&self.base_url)
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Err(e) = parse_base_url(&self.base_url) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: e.to_string(),
            });
        }

        if self.gap_ms == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "gap_ms is 0: the robot may drop commands sent back to back".into(),
            });
        }

        if self.timeout_ms == Some(0) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "timeout_ms is 0: every request will time out".into(),
            });
        }

        warnings
    }
}

pub fn trim_base_url(base: &str) -> &str {
    base.trim().trim_end_matches('/')
}

/// Parse a robot base URL; only http and https are accepted.
pub fn parse_base_url(base: &str) -> Result<url::Url> {
    let trimmed = trim_base_url(base);
    let parsed = url::Url::parse(trimmed).map_err(|e| BotError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(BotError::InvalidUrl {
            url: base.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
