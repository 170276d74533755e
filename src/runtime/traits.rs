//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::db::Database;
use crate::state_machine::{Button, ChatId, ConversationState};
use crate::telegram::{TelegramClient, TelegramError, TelegramErrorKind};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Storage for conversation state
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the chat's state, creating a default record on first contact
    async fn load_state(&self, chat_id: ChatId) -> Result<ConversationState, String>;

    /// Persist the chat's full state atomically
    async fn save_state(&self, chat_id: ChatId, state: &ConversationState) -> Result<(), String>;
}

/// Why an outbound message was not delivered
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The platform refused the text as too long
    #[error("Message too long: {0}")]
    TooLong(String),
    #[error("{0}")]
    Failed(String),
}

impl From<TelegramError> for DeliveryError {
    fn from(e: TelegramError) -> Self {
        match e.kind {
            TelegramErrorKind::MessageTooLong => DeliveryError::TooLong(e.message),
            _ => DeliveryError::Failed(e.to_string()),
        }
    }
}

/// Outbound messaging transport
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), DeliveryError>;

    async fn send_text_with_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), DeliveryError>;

    async fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: i64,
        text: &str,
    ) -> Result<(), DeliveryError>;

    /// Stop the client's progress indicator on a pressed button
    async fn answer_callback(&self, callback_query_id: &str) -> Result<(), DeliveryError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    async fn load_state(&self, chat_id: ChatId) -> Result<ConversationState, String> {
        (**self).load_state(chat_id).await
    }

    async fn save_state(&self, chat_id: ChatId, state: &ConversationState) -> Result<(), String> {
        (**self).save_state(chat_id, state).await
    }
}

#[async_trait]
impl<T: Messenger + ?Sized> Messenger for Arc<T> {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), DeliveryError> {
        (**self).send_text(chat_id, text).await
    }

    async fn send_text_with_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), DeliveryError> {
        (**self).send_text_with_keyboard(chat_id, text, buttons).await
    }

    async fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: i64,
        text: &str,
    ) -> Result<(), DeliveryError> {
        (**self).edit_message_text(chat_id, message_id, text).await
    }

    async fn answer_callback(&self, callback_query_id: &str) -> Result<(), DeliveryError> {
        (**self).answer_callback(callback_query_id).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use Database as `StateStore`
#[derive(Clone)]
pub struct DatabaseStorage {
    db: Database,
}

impl DatabaseStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    #[allow(dead_code)] // Useful for tests
    pub fn inner(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl StateStore for DatabaseStorage {
    async fn load_state(&self, chat_id: ChatId) -> Result<ConversationState, String> {
        self.db.load_state(chat_id).map_err(|e| e.to_string())
    }

    async fn save_state(&self, chat_id: ChatId, state: &ConversationState) -> Result<(), String> {
        self.db
            .save_state(chat_id, state)
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), DeliveryError> {
        self.send_message(chat_id, text, None)
            .await
            .map_err(DeliveryError::from)
    }

    async fn send_text_with_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), DeliveryError> {
        self.send_message(chat_id, text, Some(buttons))
            .await
            .map_err(DeliveryError::from)
    }

    async fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: i64,
        text: &str,
    ) -> Result<(), DeliveryError> {
        TelegramClient::edit_message_text(self, chat_id, message_id, text)
            .await
            .map_err(DeliveryError::from)
    }

    async fn answer_callback(&self, callback_query_id: &str) -> Result<(), DeliveryError> {
        self.answer_callback_query(callback_query_id)
            .await
            .map_err(DeliveryError::from)
    }
}
