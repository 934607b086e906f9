//! # Tagwriter Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     TAGWRITER_DB_PATH=/data/tagwriter.db                                │
//! │     TAGWRITER_FREE_TAG_CAP=10                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     ~/.config/tagwriter/tagwriter.toml (Linux)                          │
//! │     ~/Library/Application Support/com.tagwriter.app/tagwriter.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [tier]
//! free_tag_cap = 10
//!
//! [storage]
//! database_path = "/var/lib/tagwriter/tagwriter.db"
//!
//! [session]
//! write_prompt = "Hold your device near the NFC tag"
//! notice_capacity = 16
//! command_buffer = 32
//!
//! [inventory]
//! recent_window_days = 7
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use tagwriter_core::{DEFAULT_FREE_TAG_CAP, DEFAULT_RECENT_WINDOW_DAYS};

use crate::error::{SessionError, SessionResult};

const CONFIG_FILE: &str = "tagwriter.toml";
const DATABASE_FILE: &str = "tagwriter.db";

/// Longest "Recent" window accepted from configuration, about a century.
pub const MAX_RECENT_WINDOW_DAYS: i64 = 36_500;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSettings {
    /// Tags a free account may hold.
    #[serde(default = "default_free_tag_cap")]
    pub free_tag_cap: u32,
}

fn default_free_tag_cap() -> u32 {
    DEFAULT_FREE_TAG_CAP
}

impl Default for TierSettings {
    fn default() -> Self {
        TierSettings {
            free_tag_cap: default_free_tag_cap(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file. `None` resolves to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

/// Session controller settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Shown by the NFC reader sheet while waiting for a tag.
    #[serde(default = "default_write_prompt")]
    pub write_prompt: String,

    /// Notices kept for slow subscribers before the oldest is dropped.
    #[serde(default = "default_notice_capacity")]
    pub notice_capacity: usize,

    /// Pending commands before callers wait.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
}

fn default_write_prompt() -> String {
    "Hold your device near the NFC tag".to_string()
}

fn default_notice_capacity() -> usize {
    16
}

fn default_command_buffer() -> usize {
    32
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            write_prompt: default_write_prompt(),
            notice_capacity: default_notice_capacity(),
            command_buffer: default_command_buffer(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySettings {
    /// Age limit for the "Recent" filter.
    #[serde(default = "default_recent_window_days")]
    pub recent_window_days: i64,
}

fn default_recent_window_days() -> i64 {
    DEFAULT_RECENT_WINDOW_DAYS
}

impl Default for InventorySettings {
    fn default() -> Self {
        InventorySettings {
            recent_window_days: default_recent_window_days(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagwriterConfig {
    #[serde(default)]
    pub tier: TierSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub inventory: InventorySettings,
}

impl TagwriterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (tagwriter.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SessionResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> SessionResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SessionError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    pub fn validate(&self) -> SessionResult<()> {
        if self.session.write_prompt.trim().is_empty() {
            return Err(SessionError::InvalidConfig(
                "write_prompt must not be empty".into(),
            ));
        }

        if self.session.notice_capacity == 0 || self.session.command_buffer == 0 {
            return Err(SessionError::InvalidConfig(
                "notice_capacity and command_buffer must be greater than 0".into(),
            ));
        }

        if !(1..=MAX_RECENT_WINDOW_DAYS).contains(&self.inventory.recent_window_days) {
            return Err(SessionError::InvalidConfig(format!(
                "recent_window_days must be between 1 and {}, got {}",
                MAX_RECENT_WINDOW_DAYS, self.inventory.recent_window_days
            )));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("TAGWRITER_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Ok(cap) = std::env::var("TAGWRITER_FREE_TAG_CAP") {
            match cap.parse::<u32>() {
                Ok(cap) => self.tier.free_tag_cap = cap,
                Err(_) => warn!(value = %cap, "Ignoring non-numeric TAGWRITER_FREE_TAG_CAP"),
            }
        }

        if let Ok(days) = std::env::var("TAGWRITER_RECENT_DAYS") {
            match days.parse::<i64>() {
                Ok(days) => self.inventory.recent_window_days = days,
                Err(_) => warn!(value = %days, "Ignoring non-numeric TAGWRITER_RECENT_DAYS"),
            }
        }

        if let Ok(prompt) = std::env::var("TAGWRITER_WRITE_PROMPT") {
            self.session.write_prompt = prompt;
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "tagwriter", "app")
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The SQLite file to open: the configured path, else the data directory.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.storage
            .database_path
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().join(DATABASE_FILE)))
    }

    /// The "Recent" filter window. Out of range values mean no cutoff.
    pub fn recent_window(&self) -> chrono::Duration {
        chrono::Duration::try_days(self.inventory.recent_window_days.max(0))
            .unwrap_or(chrono::Duration::MAX)
    }
}
