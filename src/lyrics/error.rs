//! Lyrics error types

use thiserror::Error;

/// Lyrics error with classification
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct LyricsError {
    pub kind: LyricsErrorKind,
    pub message: String,
}

impl LyricsError {
    pub fn new(kind: LyricsErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn too_long(chars: usize) -> Self {
        Self::new(
            LyricsErrorKind::TooLong,
            format!("Lyrics have {chars} characters, above the message limit"),
        )
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(LyricsErrorKind::Timeout, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(LyricsErrorKind::NotFound, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LyricsErrorKind::Network, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(LyricsErrorKind::InvalidResponse, message)
    }

    /// The song exists but cannot be delivered: the user gets the apology
    pub fn is_unavailable(&self) -> bool {
        self.kind.is_unavailable()
    }
}

impl From<reqwest::Error> for LyricsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(e.to_string())
        } else if e.is_decode() {
            Self::invalid_response(e.to_string())
        } else {
            Self::network(e.to_string())
        }
    }
}

/// Error classification for the reply fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LyricsErrorKind {
    /// Lyrics longer than a single message allows
    TooLong,
    /// Provider did not answer in time
    Timeout,
    /// Provider has no lyrics for this author/title
    NotFound,
    /// Connection or HTTP failure
    Network,
    /// Response could not be understood
    InvalidResponse,
}

impl LyricsErrorKind {
    pub fn is_unavailable(self) -> bool {
        matches!(self, Self::TooLong | Self::Timeout)
    }
}
