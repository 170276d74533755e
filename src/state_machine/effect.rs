//! Effects produced by state transitions

use serde::{Deserialize, Serialize};

/// Callback data carried by the only button the bot renders
pub const AUTHOR_BUTTON_DATA: &str = "author";
pub const AUTHOR_BUTTON_LABEL: &str = "Letra!";

pub const PROMPT_TEXT: &str = "Se pretender receber letras, prima o botão e siga as instruções: ";
pub const ASK_AUTHOR_TEXT: &str = "Escreva a música do autor!";
pub const ASK_TITLE_TEXT: &str = "Escreva o nome da música!";
pub const UNAVAILABLE_TEXT: &str = "A música não está disponível, desculpe.";
pub const NOT_FOUND_TEXT: &str = "Não encontrei essa música, desculpe.";

/// Inline keyboard button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// Message the dispatch loop sends to the chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundAction {
    SendText { text: String },
    SendTextWithKeyboard { text: String, buttons: Vec<Button> },
    EditMessageText { message_id: i64, text: String },
}

impl OutboundAction {
    pub fn text(&self) -> &str {
        match self {
            OutboundAction::SendText { text }
            | OutboundAction::SendTextWithKeyboard { text, .. }
            | OutboundAction::EditMessageText { text, .. } => text,
        }
    }
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Persist the new state (always ahead of any send in the same turn)
    PersistState,

    /// Deliver a message to the chat
    Send(OutboundAction),

    /// Ask the lyrics provider; the outcome comes back as `Event::LyricsFetched`
    FetchLyrics { author: String, title: String },
}

impl Effect {
    pub fn send_text(text: impl Into<String>) -> Self {
        Effect::Send(OutboundAction::SendText { text: text.into() })
    }

    /// The prompt with the single "author" button that opens a cycle
    pub fn initial_keyboard() -> Self {
        Effect::Send(OutboundAction::SendTextWithKeyboard {
            text: PROMPT_TEXT.to_string(),
            buttons: vec![Button::new(AUTHOR_BUTTON_LABEL, AUTHOR_BUTTON_DATA)],
        })
    }

    pub fn edit_message(message_id: i64, text: impl Into<String>) -> Self {
        Effect::Send(OutboundAction::EditMessageText {
            message_id,
            text: text.into(),
        })
    }
}
