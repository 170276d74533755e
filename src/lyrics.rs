//! Lyrics provider abstraction
//!
//! Provides a common interface for fetching song lyrics by author and title.

mod error;
mod lyrics_ovh;

pub use error::{LyricsError, LyricsErrorKind};
pub use lyrics_ovh::LyricsOvhClient;

use async_trait::async_trait;
use std::sync::Arc;

/// Public lyrics.ovh endpoint
pub const DEFAULT_LYRICS_API_URL: &str = "https://api.lyrics.ovh";

/// Telegram rejects messages longer than this many characters
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Common interface for lyrics providers
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// Fetch the lyrics of `title` by `author`
    async fn fetch_lyrics(&self, author: &str, title: &str) -> Result<String, LyricsError>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: LyricsProvider + ?Sized> LyricsProvider for Arc<T> {
    async fn fetch_lyrics(&self, author: &str, title: &str) -> Result<String, LyricsError> {
        (**self).fetch_lyrics(author, title).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Rejects lyrics that could not be delivered in a single message.
///
/// Telegram measures message length in UTF-16 code units, so characters
/// outside the basic plane count twice.
pub fn ensure_deliverable(lyrics: String) -> Result<String, LyricsError> {
    let chars = lyrics.encode_utf16().count();
    if chars > MAX_MESSAGE_CHARS {
        return Err(LyricsError::too_long(chars));
    }
    Ok(lyrics)
}

/// Logging wrapper for lyrics providers
pub struct LoggingProvider {
    inner: Arc<dyn LyricsProvider>,
}

impl LoggingProvider {
    pub fn new(inner: Arc<dyn LyricsProvider>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl LyricsProvider for LoggingProvider {
    async fn fetch_lyrics(&self, author: &str, title: &str) -> Result<String, LyricsError> {
        let start = std::time::Instant::now();
        let result = self.inner.fetch_lyrics(author, title).await;
        let duration = start.elapsed();

        match &result {
            Ok(lyrics) => {
                tracing::info!(
                    provider = %self.inner.name(),
                    duration_ms = %duration.as_millis(),
                    author = %author,
                    title = %title,
                    chars = lyrics.chars().count(),
                    "Lyrics fetched"
                );
            }
            Err(e) => {
                tracing::warn!(
                    provider = %self.inner.name(),
                    duration_ms = %duration.as_millis(),
                    author = %author,
                    title = %title,
                    kind = ?e.kind,
                    error = %e.message,
                    "Lyrics fetch failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
