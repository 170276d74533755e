//! Events that can occur in a conversation

use crate::lyrics::LyricsError;
use crate::state_machine::state::ChatId;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    /// The `/start` command
    Start,
    /// Inline keyboard button pressed on one of our messages
    ButtonTap { data: String, message_id: i64 },
    /// Any other text message
    TextMessage { text: String },

    // Provider events
    /// Outcome of an `Effect::FetchLyrics`
    LyricsFetched { result: Result<String, LyricsError> },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::ButtonTap { .. } => "button_tap",
            Event::TextMessage { .. } => "text_message",
            Event::LyricsFetched { .. } => "lyrics_fetched",
        }
    }
}

/// An inbound event together with the chat it came from
#[derive(Debug, Clone)]
pub struct InboundUpdate {
    pub chat_id: ChatId,
    pub event: Event,
    /// Set for button taps; the transport acknowledges it separately
    pub callback_query_id: Option<String>,
}

impl InboundUpdate {
    pub fn new(chat_id: ChatId, event: Event) -> Self {
        Self {
            chat_id,
            event,
            callback_query_id: None,
        }
    }

    pub fn with_callback_query(mut self, id: impl Into<String>) -> Self {
        self.callback_query_id = Some(id.into());
        self
    }
}
