use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use config; // Explicitly import the config crate

use crate::client::{ClientSettings, ReadinessPolicy};

pub const URL_PLACEHOLDER: &str = "YOUR_SUPABASE_URL_HERE";
pub const ANON_KEY_PLACEHOLDER: &str = "YOUR_SUPABASE_ANON_KEY_HERE";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub storage_bucket: String,
    pub log_level: String,
    pub ready_poll_interval_ms: u64,
    pub ready_max_attempts: u32,
    /// Set when the requested .env file did not exist and only the process environment was used.
    #[serde(skip)]
    pub missing_env_file: Option<PathBuf>,
}

impl Config {
    /// Loads the given .env file into the process environment, then builds the config.
    ///
    /// A missing file is not fatal: the process environment alone is used and the
    /// path is kept in `missing_env_file` for a later warning. An unreadable or
    /// malformed file is still an error.
    pub fn from_env(env_path: &Path) -> Result<Self, config::ConfigError> {
        let missing_env_file = match dotenvy::from_path(env_path) {
            Ok(()) => None,
            Err(e) if e.not_found() => Some(env_path.to_path_buf()),
            Err(e) => {
                return Err(config::ConfigError::Message(format!(
                    "FATAL: Failed to load .env file from '{}'. Error: {}", env_path.display(), e
                )))
            }
        };

        let mut config = Self::from_lookup(|key| env::var(key).ok())?;
        config.missing_env_file = missing_env_file;
        Ok(config)
    }

    /// Builds the config from an arbitrary variable source.
    ///
    /// Missing credentials are not an error here; they surface through
    /// [`Config::credential_problems`] so callers can warn instead of aborting.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let supabase_url = lookup("SUPABASE_URL").unwrap_or_default();
        let supabase_anon_key = lookup("SUPABASE_ANON_KEY").unwrap_or_default();

        let mut builder = config::Config::builder()
            .add_source(config::File::new("config/default.toml", config::FileFormat::Toml).required(false))
            .set_default("storage_bucket", "media")?
            .set_default("log_level", "info")?
            .set_default("ready_poll_interval_ms", 100_i64)?
            .set_default("ready_max_attempts", 50_i64)?
            .set_override("supabase_url", supabase_url.trim().to_string())?
            .set_override("supabase_anon_key", supabase_anon_key.trim().to_string())?;

        if let Some(bucket) = lookup("STORAGE_BUCKET").filter(|b| !b.trim().is_empty()) {
            builder = builder.set_override("storage_bucket", bucket.trim().to_string())?;
        }
        if let Some(level) = lookup("LOG_LEVEL").filter(|l| !l.trim().is_empty()) {
            builder = builder.set_override("log_level", level.trim().to_string())?;
        }
        if let Some(raw) = lookup("READY_POLL_INTERVAL_MS") {
            builder = builder.set_override("ready_poll_interval_ms", parse_number("READY_POLL_INTERVAL_MS", &raw)?)?;
        }
        if let Some(raw) = lookup("READY_MAX_ATTEMPTS") {
            builder = builder.set_override("ready_max_attempts", parse_number("READY_MAX_ATTEMPTS", &raw)?)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Lists every credential that is missing or still set to its placeholder.
    pub fn credential_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.supabase_url.is_empty() {
            problems.push("SUPABASE_URL is not set".to_string());
        } else if self.supabase_url == URL_PLACEHOLDER {
            problems.push("SUPABASE_URL still holds the placeholder value".to_string());
        }
        if self.supabase_anon_key.is_empty() {
            problems.push("SUPABASE_ANON_KEY is not set".to_string());
        } else if self.supabase_anon_key == ANON_KEY_PLACEHOLDER {
            problems.push("SUPABASE_ANON_KEY still holds the placeholder value".to_string());
        }
        problems
    }

    /// Logs a warning for every credential problem and for a missing .env file.
    /// Returns `true` when no credential problems were found.
    pub fn warn_on_credential_problems(&self) -> bool {
        if let Some(path) = &self.missing_env_file {
            log::warn!("No .env file at '{}'; using the process environment only.", path.display());
        }
        let problems = self.credential_problems();
        for problem in &problems {
            log::warn!("Backend is not configured properly: {}. Create a .env file based on .env.example.", problem);
        }
        problems.is_empty()
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            endpoint: self.supabase_url.clone(),
            access_key: self.supabase_anon_key.clone(),
            bucket: self.storage_bucket.clone(),
        }
    }

    pub fn readiness_policy(&self) -> ReadinessPolicy {
        ReadinessPolicy::new(
            Duration::from_millis(self.ready_poll_interval_ms),
            self.ready_max_attempts,
        )
    }
}

fn parse_number(key: &str, raw: &str) -> Result<i64, config::ConfigError> {
    raw.trim().parse::<i64>()
        .ok()
        .filter(|n| *n >= 0)
        .ok_or_else(|| config::ConfigError::Message(format!(
            "FATAL: '{}' must be a non-negative integer, got '{}'.", key, raw
        )))
}
