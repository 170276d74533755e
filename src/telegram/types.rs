//! Bot API wire types

use crate::state_machine::{Button, ChatId, Event, InboundUpdate};
use serde::{Deserialize, Serialize};

// ============================================================================
// Inbound
// ============================================================================

/// One incoming update. Only the fields the bot reads are modelled.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    /// Absent for buttons on inline-mode messages
    #[serde(default)]
    pub message: Option<Message>,
}

impl Update {
    /// Parse into a conversation event, or `None` for updates the bot ignores
    pub fn into_inbound(self) -> Option<InboundUpdate> {
        if let Some(query) = self.callback_query {
            let message = query.message?;
            let event = Event::ButtonTap {
                data: query.data.unwrap_or_default(),
                message_id: message.message_id,
            };
            return Some(
                InboundUpdate::new(ChatId(message.chat.id), event).with_callback_query(query.id),
            );
        }

        let message = self.message?;
        let text = message.text?;
        let event = if is_start_command(&text) {
            Event::Start
        } else {
            Event::TextMessage { text }
        };
        Some(InboundUpdate::new(ChatId(message.chat.id), event))
    }
}

/// `/start`, `/start@SomeBot` and `/start <payload>` all count
fn is_start_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or_default();
    let command = command.split('@').next().unwrap_or_default();
    command == "/start"
}

// ============================================================================
// Outbound
// ============================================================================

/// Envelope of every Bot API answer
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    /// All buttons on a single row
    pub fn single_row(buttons: &[Button]) -> Self {
        let row = buttons
            .iter()
            .map(|b| InlineKeyboardButton {
                text: b.label.clone(),
                callback_data: b.data.clone(),
            })
            .collect();
        Self {
            inline_keyboard: vec![row],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
pub struct EditMessageTextRequest<'a> {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct AnswerCallbackQueryRequest<'a> {
    pub callback_query_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct SetWebhookRequest<'a> {
    pub url: &'a str,
}
