//! Telegram API error types

use thiserror::Error;

#[derive(Debug, Error)]
#[error("Telegram API error ({kind:?}): {message}")]
pub struct TelegramError {
    pub kind: TelegramErrorKind,
    pub message: String,
}

impl TelegramError {
    pub fn new(kind: TelegramErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify an `ok: false` API answer
    pub fn from_api(error_code: Option<i64>, description: Option<String>) -> Self {
        let message = description.unwrap_or_else(|| "no description".to_string());
        let kind = match error_code {
            Some(401 | 403) => TelegramErrorKind::Unauthorized,
            Some(400) if message.to_lowercase().contains("message is too long") => {
                TelegramErrorKind::MessageTooLong
            }
            Some(400) => TelegramErrorKind::BadRequest,
            _ => TelegramErrorKind::Network,
        };
        Self::new(kind, message)
    }
}

impl From<reqwest::Error> for TelegramError {
    fn from(e: reqwest::Error) -> Self {
        // The request URL embeds the bot token
        let e = e.without_url();
        if e.is_decode() {
            Self::new(TelegramErrorKind::InvalidResponse, e.to_string())
        } else {
            Self::new(TelegramErrorKind::Network, e.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelegramErrorKind {
    /// Text above the 4096 character limit
    MessageTooLong,
    /// Bad or revoked token
    Unauthorized,
    /// Any other 400
    BadRequest,
    /// Connection failures, 5xx, rate limits
    Network,
    /// Response body could not be decoded
    InvalidResponse,
}
