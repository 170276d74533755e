//! Bot API HTTP client

use super::types::{
    AnswerCallbackQueryRequest, ApiResponse, EditMessageTextRequest, GetUpdatesRequest,
    InlineKeyboardMarkup, SendMessageRequest, SetWebhookRequest, Update,
};
use super::{TelegramError, TelegramErrorKind};
use crate::state_machine::{Button, ChatId};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Requests may block for the long-poll timeout plus this much
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Telegram Bot API client
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    /// `{api}/bot{token}`; never logged
    endpoint: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Result<Self, TelegramError> {
        Self::with_api_url(DEFAULT_API_URL, token)
    }

    pub fn with_api_url(api_url: &str, token: &str) -> Result<Self, TelegramError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/bot{token}", api_url.trim_end_matches('/')),
        })
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> Result<R, TelegramError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}/{method}", self.endpoint))
            .json(params)
            .send()
            .await?;

        // Error answers carry the same JSON envelope as successes
        let body: ApiResponse<R> = response.json().await?;
        if !body.ok {
            return Err(TelegramError::from_api(body.error_code, body.description));
        }
        body.result.ok_or_else(|| {
            TelegramError::new(
                TelegramErrorKind::InvalidResponse,
                format!("{method} answered ok without a result"),
            )
        })
    }

    pub async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        buttons: Option<&[Button]>,
    ) -> Result<(), TelegramError> {
        let request = SendMessageRequest {
            chat_id: chat_id.0,
            text,
            reply_markup: buttons.map(InlineKeyboardMarkup::single_row),
        };
        self.call::<_, Value>("sendMessage", &request).await?;
        Ok(())
    }

    pub async fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: i64,
        text: &str,
    ) -> Result<(), TelegramError> {
        let request = EditMessageTextRequest {
            chat_id: chat_id.0,
            message_id,
            text,
        };
        self.call::<_, Value>("editMessageText", &request).await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), TelegramError> {
        let request = AnswerCallbackQueryRequest { callback_query_id };
        self.call::<_, bool>("answerCallbackQuery", &request).await?;
        Ok(())
    }

    /// Long-poll for updates newer than `offset`
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: vec!["message", "callback_query"],
        };
        self.call("getUpdates", &request).await
    }

    pub async fn set_webhook(&self, url: &str) -> Result<(), TelegramError> {
        self.call::<_, bool>("setWebhook", &SetWebhookRequest { url })
            .await?;
        Ok(())
    }

    pub async fn delete_webhook(&self) -> Result<(), TelegramError> {
        self.call::<_, bool>("deleteWebhook", &serde_json::json!({}))
            .await?;
        Ok(())
    }
}
