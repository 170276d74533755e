//! lyrics.ovh provider implementation

use super::{ensure_deliverable, LyricsError, LyricsProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

/// Client for `GET {base}/v1/{author}/{title}`
pub struct LyricsOvhClient {
    client: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct LyricsResponse {
    #[serde(default)]
    lyrics: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl LyricsOvhClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn lyrics_url(&self, author: &str, title: &str) -> Result<Url, LyricsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| LyricsError::invalid_response("Lyrics API URL cannot be a base"))?
            .pop_if_empty()
            .extend(["v1", author, title]);
        Ok(url)
    }
}

#[async_trait]
impl LyricsProvider for LyricsOvhClient {
    async fn fetch_lyrics(&self, author: &str, title: &str) -> Result<String, LyricsError> {
        let (author, title) = (author.trim(), title.trim());
        if author.is_empty() || title.is_empty() {
            return Err(LyricsError::not_found("Both author and title are required"));
        }

        let url = self.lyrics_url(author, title)?;
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(LyricsError::not_found(format!(
                "No lyrics for {author} - {title}"
            )));
        }
        if !status.is_success() {
            return Err(LyricsError::network(format!(
                "Lyrics API returned {status}"
            )));
        }

        let body: LyricsResponse = response.json().await?;
        if let Some(error) = body.error {
            return Err(LyricsError::not_found(error));
        }

        let lyrics = body
            .lyrics
            .map(|l| l.replace("\r\n", "\n").trim().to_string())
            .unwrap_or_default();
        if lyrics.is_empty() {
            return Err(LyricsError::not_found(format!(
                "Empty lyrics for {author} - {title}"
            )));
        }

        ensure_deliverable(lyrics)
    }

    fn name(&self) -> &str {
        "lyrics.ovh"
    }
}
