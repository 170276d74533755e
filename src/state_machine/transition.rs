//! Pure state transition function
//!
//! The cycle is idle -> awaiting author -> awaiting title -> idle. The button
//! opens a cycle, the first text after it is the author, the next one is the
//! title. Any text outside of `AwaitingAuthor` is taken as a title.

use super::effect::{
    AUTHOR_BUTTON_DATA, ASK_AUTHOR_TEXT, ASK_TITLE_TEXT, NOT_FOUND_TEXT, UNAVAILABLE_TEXT,
};
use super::{ConversationState, Effect, Event, Step};

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConversationState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConversationState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    /// Whether the transition changed anything that needs persisting
    pub fn persists(&self) -> bool {
        self.effects.contains(&Effect::PersistState)
    }
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(state: &ConversationState, event: Event) -> TransitionResult {
    match (state.step, event) {
        // ============================================================
        // Start command: show the keyboard, step untouched
        // ============================================================
        (_, Event::Start) => {
            TransitionResult::new(state.clone()).with_effect(Effect::initial_keyboard())
        }

        // ============================================================
        // Button taps
        // ============================================================
        (_, Event::ButtonTap { data, message_id }) if data == AUTHOR_BUTTON_DATA => {
            TransitionResult::new(state.clone().with_step(Step::AwaitingAuthor))
                .with_effect(Effect::PersistState)
                .with_effect(Effect::edit_message(message_id, ASK_AUTHOR_TEXT))
        }

        // Unrecognised payloads are ignored
        (_, Event::ButtonTap { .. }) => TransitionResult::new(state.clone()),

        // ============================================================
        // Free text
        // ============================================================
        (Step::AwaitingAuthor, Event::TextMessage { text }) => {
            let new_state = ConversationState {
                step: Step::AwaitingTitle,
                author: Some(text),
                title: state.title.clone(),
            };
            TransitionResult::new(new_state)
                .with_effect(Effect::PersistState)
                .with_effect(Effect::send_text(ASK_TITLE_TEXT))
        }

        (Step::Idle | Step::AwaitingTitle, Event::TextMessage { text }) => {
            let author = state.author_or_empty().to_string();
            let new_state = ConversationState {
                step: Step::Idle,
                author: state.author.clone(),
                title: Some(text.clone()),
            };
            TransitionResult::new(new_state)
                .with_effect(Effect::PersistState)
                .with_effect(Effect::FetchLyrics {
                    author,
                    title: text,
                })
        }

        // ============================================================
        // Lyrics outcome: reply, then re-arm the keyboard
        // ============================================================
        (_, Event::LyricsFetched { result }) => {
            let reply = match result {
                Ok(lyrics) => Effect::send_text(lyrics),
                Err(e) if e.is_unavailable() => Effect::send_text(UNAVAILABLE_TEXT),
                Err(_) => Effect::send_text(NOT_FOUND_TEXT),
            };
            TransitionResult::new(state.clone())
                .with_effects([reply, Effect::initial_keyboard()])
        }
    }
}
