use std::env;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config/chat.json";
pub const DEFAULT_VIEWER_ID: &str = "current-user";

const ENV_VIEWER: &str = "MARKET_CHAT_VIEWER";
const ENV_SEED: &str = "MARKET_CHAT_SEED";
const ENV_RNG_SEED: &str = "MARKET_CHAT_RNG_SEED";

/// Delays driving the simulated counterpart, calls and typing indicators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatTimings {
    pub reply_delay_min_ms: u64,
    pub reply_delay_max_ms: u64,
    pub call_connect_delay_ms: u64,
    pub call_end_grace_ms: u64,
    pub typing_timeout_ms: u64,
}

impl Default for ChatTimings {
    fn default() -> Self {
        Self {
            reply_delay_min_ms: 2_000,
            reply_delay_max_ms: 5_000,
            call_connect_delay_ms: 3_000,
            call_end_grace_ms: 1_000,
            typing_timeout_ms: 3_000,
        }
    }
}

impl ChatTimings {
    pub fn reply_delay_ms(&self) -> RangeInclusive<u64> {
        self.reply_delay_min_ms..=self.reply_delay_max_ms
    }

    pub fn call_connect_delay(&self) -> Duration {
        Duration::from_millis(self.call_connect_delay_ms)
    }

    pub fn call_end_grace(&self) -> Duration {
        Duration::from_millis(self.call_end_grace_ms)
    }

    pub fn typing_timeout(&self) -> Duration {
        Duration::from_millis(self.typing_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_viewer_id")]
    pub viewer_id: String,
    /// JSON seed file; the built-in mock data is used when absent.
    #[serde(default)]
    pub seed_path: Option<String>,
    /// Fixed RNG seed for reproducible reply delays and contents.
    #[serde(default)]
    pub rng_seed: Option<u64>,
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    #[serde(default)]
    pub timings: ChatTimings,
}

fn default_viewer_id() -> String {
    DEFAULT_VIEWER_ID.to_string()
}

fn default_event_buffer() -> usize {
    100
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            viewer_id: default_viewer_id(),
            seed_path: None,
            rng_seed: None,
            event_buffer: default_event_buffer(),
            timings: ChatTimings::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.viewer_id.trim().is_empty() {
            return Err(ChatError::Config("viewer_id must not be empty".to_string()));
        }
        if self.event_buffer == 0 {
            return Err(ChatError::Config("event_buffer must be positive".to_string()));
        }
        if self.timings.reply_delay_min_ms > self.timings.reply_delay_max_ms {
            return Err(ChatError::Config(format!(
                "reply_delay_min_ms ({}) exceeds reply_delay_max_ms ({})",
                self.timings.reply_delay_min_ms, self.timings.reply_delay_max_ms
            )));
        }
        Ok(())
    }

    /// Applies `MARKET_CHAT_*` variables on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(viewer) = lookup(ENV_VIEWER).filter(|v| !v.trim().is_empty()) {
            self.viewer_id = viewer;
        }
        if let Some(seed_path) = lookup(ENV_SEED).filter(|v| !v.trim().is_empty()) {
            self.seed_path = Some(seed_path);
        }
        if let Some(raw) = lookup(ENV_RNG_SEED) {
            match raw.trim().parse::<u64>() {
                Ok(seed) => self.rng_seed = Some(seed),
                Err(err) => log::warn!("Ignoring {ENV_RNG_SEED}={raw}: {err}"),
            }
        }
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

pub fn save_config(path: &str, config: &AppConfig) -> std::io::Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)
}
