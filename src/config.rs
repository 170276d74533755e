//! Process configuration read from the environment

use crate::lyrics::DEFAULT_LYRICS_API_URL;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_LYRICS_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// How updates reach the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Telegram pushes updates to `{base_url}/{token}`
    Webhook { base_url: String },
    /// The bot long-polls `getUpdates`
    Polling,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub mode: RunMode,
    pub port: u16,
    pub db_path: PathBuf,
    pub lyrics_api_url: String,
    pub lyrics_timeout: Duration,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let token = var("TOKEN").ok_or(ConfigError::Missing("TOKEN"))?;

        let mode = match var("ENVIRONMENT").as_deref() {
            Some("production") => RunMode::Webhook {
                base_url: var("WEBHOOK_URL")
                    .ok_or(ConfigError::Missing("WEBHOOK_URL"))?
                    .trim_end_matches('/')
                    .to_string(),
            },
            Some("local") => RunMode::Polling,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "ENVIRONMENT",
                    value: other.to_string(),
                })
            }
            None => return Err(ConfigError::Missing("ENVIRONMENT")),
        };

        let port = match var("PORT") {
            Some(p) => p.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: p,
            })?,
            None => DEFAULT_PORT,
        };

        let db_path = var("LYRICS_DB_PATH").map_or_else(
            || {
                let home = var("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".lyrics-bot").join("lyrics.db")
            },
            PathBuf::from,
        );

        let lyrics_timeout = match var("LYRICS_TIMEOUT_SECS") {
            Some(s) => match s.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "LYRICS_TIMEOUT_SECS",
                        value: s,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_LYRICS_TIMEOUT_SECS),
        };

        Ok(Self {
            token,
            mode,
            port,
            db_path,
            lyrics_api_url: var("LYRICS_API_URL")
                .unwrap_or_else(|| DEFAULT_LYRICS_API_URL.to_string()),
            lyrics_timeout,
        })
    }
}
