//! Nudge configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{NudgeError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NudgeConfig {
    #[serde(default)]
    pub telegram: TelegramSection,
    #[serde(default)]
    pub scheduler: SchedulerSection,
    #[serde(default)]
    pub gateway: GatewaySection,
    #[serde(default)]
    pub storage: StorageSection,
}

impl NudgeConfig {
    /// Load config from the default path (~/.nudge/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NudgeError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| NudgeError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| NudgeError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the nudge home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".nudge")
    }
}

/// Telegram channel section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramSection {
    #[serde(default)]
    pub bot_token: String,
    /// Delivery mode: "polling" or "webhook".
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Public base URL the platform pushes webhook updates to.
    #[serde(default)]
    pub webhook_url: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

fn default_mode() -> String {
    "polling".into()
}
fn default_poll_interval() -> u64 {
    1
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            mode: default_mode(),
            webhook_url: String::new(),
            poll_interval: default_poll_interval(),
        }
    }
}

impl TelegramSection {
    /// The bot token, with the NUDGE_BOT_TOKEN env var taking precedence.
    pub fn token(&self) -> String {
        std::env::var("NUDGE_BOT_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.bot_token.clone())
    }
}

/// Notification loop section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSection {
    /// IANA time zone the schedule is interpreted in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,
    /// "HH:MM" daily boundary at which sent-notification state resets.
    #[serde(default = "default_reset_time")]
    pub reset_time: String,
    /// Minutes of advance warning before a task; 0 disables pre-notifications.
    #[serde(default)]
    pub lead_minutes: u32,
}

fn default_timezone() -> String {
    "Asia/Tbilisi".into()
}
fn default_tick_interval() -> u64 {
    60
}
fn default_reset_time() -> String {
    "00:00".into()
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            tick_interval_secs: default_tick_interval(),
            reset_time: default_reset_time(),
            lead_minutes: 0,
        }
    }
}

/// Gateway section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    3000
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Flat-file storage section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    "~/.nudge".into()
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageSection {
    /// The data directory with the tilde expanded.
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir).to_string())
    }
}
