//! # lp-config
//!
//! Layered settings: built-in defaults, then `LOOP__*` environment
//! variables (a `.env` file is loaded first when present). Nested keys use a
//! double underscore, e.g. `LOOP__MATCHER__WINDOW_MINUTES=45`.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const ENV_PREFIX: &str = "LOOP";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Directory holding one JSON file per key
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatcherSettings {
    pub window_minutes: i64,
    /// Distinct words two place names must share to count as the same place
    pub min_shared_tokens: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadSettings {
    pub expiry_hours: i64,
    /// 0 disables the background sweep
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub storage: StorageSettings,
    pub matcher: MatcherSettings,
    pub threads: ThreadSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Reads `.env` (if any) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::build(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
    }

    /// Applies `source` on top of the defaults, then validates.
    pub fn build<S>(source: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings: Settings = config::Config::builder()
            .set_default("storage.dir", "./data/storage")?
            .set_default("matcher.window_minutes", 30_i64)?
            .set_default("matcher.min_shared_tokens", 1_i64)?
            .set_default("threads.expiry_hours", 24_i64)?
            .set_default("threads.sweep_interval_secs", 3600_i64)?
            .set_default("log.filter", "loop_plus=info,lp_core=info,lp_storage_local=info")?
            .add_source(source)
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.matcher.window_minutes < 0 {
            return Err(ConfigError::Invalid {
                key: "matcher.window_minutes",
                reason: "must not be negative".to_string(),
            });
        }
        if chrono::Duration::try_minutes(self.matcher.window_minutes).is_none() {
            return Err(ConfigError::Invalid {
                key: "matcher.window_minutes",
                reason: "out of range".to_string(),
            });
        }
        if self.matcher.min_shared_tokens == 0 {
            return Err(ConfigError::Invalid {
                key: "matcher.min_shared_tokens",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.threads.expiry_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "threads.expiry_hours",
                reason: "must be positive".to_string(),
            });
        }
        if chrono::Duration::try_hours(self.threads.expiry_hours).is_none() {
            return Err(ConfigError::Invalid {
                key: "threads.expiry_hours",
                reason: "out of range".to_string(),
            });
        }
        Ok(())
    }

    /// Matching window, either side of the draft's departure.
    pub fn match_window(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.matcher.window_minutes)
            .unwrap_or(chrono::Duration::MAX)
    }

    /// How long a chat thread outlives its ride's departure.
    pub fn thread_expiry(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.threads.expiry_hours).unwrap_or(chrono::Duration::MAX)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        match self.threads.sweep_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
