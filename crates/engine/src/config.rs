//! `playkit.toml` configuration with environment overrides.
//!
//! Every section and field is optional; a missing file yields the defaults.
//!
//! ```toml
//! [gestures]
//! tap_max_movement = 12.0
//! swipe_min_distance = 50.0
//!
//! [session]
//! countdown_secs = 3.0
//!
//! [transitions]
//! style = "slide"
//! duration = 0.25
//!
//! [scoring]
//! host = "127.0.0.1"
//! port = 7780
//! timeout_ms = 5000
//!
//! [store]
//! path = "playkit-store.json"
//! version = "1"
//! ```
//!
//! Environment variables applied after the file:
//!
//! - `PLAYKIT_CONFIG`: config file path (default: `playkit.toml`)
//! - `PLAYKIT_SCORE_HOST`, `PLAYKIT_SCORE_PORT`, `PLAYKIT_SCORE_TIMEOUT_MS`
//! - `PLAYKIT_SCORE_DISABLED`: `1` or `true` disables score posting
//! - `PLAYKIT_STORE_PATH`: key/value store file

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::input::GestureConfig;
use crate::types::DEFAULT_COUNTDOWN_SECS;
use crate::view::TransitionConfig;

pub const DEFAULT_CONFIG_PATH: &str = "playkit.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub countdown_secs: f32,
    pub results_view: String,
    pub pause_view: String,
    pub menu_view: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            results_view: "results".to_string(),
            pause_view: "pause".to_string(),
            menu_view: "main_menu".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
    pub enabled: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7780,
            timeout_ms: 5000,
            enabled: true,
        }
    }
}

impl ScoringConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub version: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("playkit-store.json"),
            version: "1".to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct PlaykitConfig {
    pub gestures: GestureConfig,
    pub session: SessionConfig,
    pub transitions: TransitionConfig,
    pub scoring: ScoringConfig,
    pub store: StoreConfig,
}

impl PlaykitConfig {
    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Load `path`. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file; using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config = Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file named by `PLAYKIT_CONFIG` (or the default path), then
    /// apply environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var("PLAYKIT_CONFIG")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load(Path::new(&path))?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `PLAYKIT_*` overrides looked up through `lookup`. Unparseable
    /// values are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("PLAYKIT_SCORE_HOST").filter(|s| !s.trim().is_empty()) {
            self.scoring.host = host.trim().to_string();
        }
        if let Some(raw) = lookup("PLAYKIT_SCORE_PORT") {
            match raw.trim().parse() {
                Ok(port) => self.scoring.port = port,
                Err(_) => warn!(value = %raw, "ignoring invalid PLAYKIT_SCORE_PORT"),
            }
        }
        if let Some(raw) = lookup("PLAYKIT_SCORE_TIMEOUT_MS") {
            match raw.trim().parse() {
                Ok(ms) => self.scoring.timeout_ms = ms,
                Err(_) => warn!(value = %raw, "ignoring invalid PLAYKIT_SCORE_TIMEOUT_MS"),
            }
        }
        if let Some(raw) = lookup("PLAYKIT_SCORE_DISABLED") {
            match raw.trim().to_lowercase().as_str() {
                "1" | "true" => self.scoring.enabled = false,
                "0" | "false" | "" => {}
                _ => warn!(value = %raw, "ignoring invalid PLAYKIT_SCORE_DISABLED"),
            }
        }
        if let Some(path) = lookup("PLAYKIT_STORE_PATH").filter(|s| !s.trim().is_empty()) {
            self.store.path = PathBuf::from(path.trim());
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.gestures;
        let thresholds = [
            ("gestures.tap_max_movement", g.tap_max_movement),
            ("gestures.tap_max_duration", g.tap_max_duration),
            ("gestures.swipe_min_distance", g.swipe_min_distance),
            ("gestures.hold_start_time", g.hold_start_time),
            ("gestures.hold_max_wobble", g.hold_max_wobble),
            ("session.countdown_secs", self.session.countdown_secs),
            ("transitions.duration", self.transitions.duration),
        ];
        for (field, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is not a non-negative number"),
                });
            }
        }
        if self.store.version.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "store.version",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
