//! HTTP API for the webhook transport
//!
//! Telegram delivers updates to `POST /{token}`; `GET /` (re)registers the
//! webhook.

mod handlers;

pub use handlers::create_router;

use crate::runtime::UpdateDispatcher;
use crate::telegram::TelegramClient;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<dyn UpdateDispatcher>,
    pub telegram: TelegramClient,
    pub token: Arc<str>,
    /// Public base URL; the webhook is registered at `{webhook_base}/{token}`
    pub webhook_base: Arc<str>,
}

impl AppState {
    pub fn new(
        dispatcher: Arc<dyn UpdateDispatcher>,
        telegram: TelegramClient,
        token: &str,
        webhook_base: &str,
    ) -> Self {
        Self {
            dispatcher,
            telegram,
            token: Arc::from(token),
            webhook_base: Arc::from(webhook_base.trim_end_matches('/')),
        }
    }

    pub fn webhook_url(&self) -> String {
        format!("{}/{}", self.webhook_base, self.token)
    }
}
