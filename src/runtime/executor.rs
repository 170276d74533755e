//! Per-chat runtime executor

use super::traits::{DeliveryError, Messenger, StateStore};
use crate::lyrics::{LyricsError, LyricsErrorKind, LyricsProvider};
use crate::state_machine::{
    transition, ChatId, ConversationState, Effect, Event, OutboundAction,
};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// What running one effect produced
enum EffectOutcome {
    Done,
    /// Feed this event back into the transition function
    Generated(Event),
    /// Drop the rest of the current effects and process this event instead
    Replaced(Event),
}

/// Runs one chat's events strictly in arrival order
pub struct ChatRuntime<S, L, M>
where
    S: StateStore + 'static,
    L: LyricsProvider + 'static,
    M: Messenger + 'static,
{
    chat_id: ChatId,
    storage: Arc<S>,
    lyrics: Arc<L>,
    messenger: Arc<M>,
    event_rx: mpsc::Receiver<Event>,
}

impl<S, L, M> ChatRuntime<S, L, M>
where
    S: StateStore + 'static,
    L: LyricsProvider + 'static,
    M: Messenger + 'static,
{
    pub fn new(
        chat_id: ChatId,
        storage: Arc<S>,
        lyrics: Arc<L>,
        messenger: Arc<M>,
        event_rx: mpsc::Receiver<Event>,
    ) -> Self {
        Self {
            chat_id,
            storage,
            lyrics,
            messenger,
            event_rx,
        }
    }

    /// Process events until the queue has been quiet for `idle_timeout`.
    ///
    /// On idle the queue is closed first, so late senders see an error
    /// instead of losing their event, and whatever is already queued still
    /// gets processed.
    pub async fn run(mut self, idle_timeout: Duration) {
        tracing::debug!(chat_id = %self.chat_id, "Starting chat runtime");

        loop {
            match tokio::time::timeout(idle_timeout, self.event_rx.recv()).await {
                Ok(Some(event)) => self.handle(event).await,
                Ok(None) => break,
                Err(_) => {
                    self.event_rx.close();
                    while let Some(event) = self.event_rx.recv().await {
                        self.handle(event).await;
                    }
                    tracing::debug!(chat_id = %self.chat_id, "Chat runtime idle");
                    break;
                }
            }
        }

        tracing::debug!(chat_id = %self.chat_id, "Chat runtime stopped");
    }

    async fn handle(&mut self, event: Event) {
        if let Err(e) = self.process_event(event).await {
            tracing::error!(chat_id = %self.chat_id, error = %e, "Error handling event");
        }
    }

    /// Handle one inbound event, including any events its effects generate.
    ///
    /// State is reloaded from the store for every inbound event so the store
    /// stays the single owner. A failed load aborts before anything changes.
    pub async fn process_event(&mut self, event: Event) -> Result<(), String> {
        let mut state = self
            .storage
            .load_state(self.chat_id)
            .await
            .map_err(|e| format!("Failed to load state: {e}"))?;

        let mut events = VecDeque::from([event]);
        let mut replaced = false;
        while let Some(current) = events.pop_front() {
            let kind = current.kind();
            let result = transition(&state, current);

            tracing::debug!(
                chat_id = %self.chat_id,
                event = kind,
                from = %state.step,
                to = %result.new_state.step,
                effects = result.effects.len(),
                persists = result.persists(),
                "Transition"
            );

            state = result.new_state;
            for effect in result.effects {
                match self.execute_effect(effect, &state).await? {
                    EffectOutcome::Done => {}
                    EffectOutcome::Generated(generated) => events.push_back(generated),
                    EffectOutcome::Replaced(replacement) => {
                        if replaced {
                            return Err("Fallback reply was rejected too".to_string());
                        }
                        replaced = true;
                        events.push_back(replacement);
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    async fn execute_effect(
        &self,
        effect: Effect,
        state: &ConversationState,
    ) -> Result<EffectOutcome, String> {
        match effect {
            Effect::PersistState => {
                self.storage
                    .save_state(self.chat_id, state)
                    .await
                    .map_err(|e| format!("Failed to persist state: {e}"))?;
                Ok(EffectOutcome::Done)
            }

            Effect::Send(action) => {
                let is_plain_text = matches!(action, OutboundAction::SendText { .. });
                match self.send(action).await {
                    Ok(()) => Ok(EffectOutcome::Done),
                    // Lyrics that passed the provider's length check can still be
                    // refused by the platform; answer with the apology instead
                    Err(DeliveryError::TooLong(message)) if is_plain_text => {
                        tracing::warn!(
                            chat_id = %self.chat_id,
                            error = %message,
                            "Reply rejected as too long"
                        );
                        Ok(EffectOutcome::Replaced(Event::LyricsFetched {
                            result: Err(LyricsError::new(LyricsErrorKind::TooLong, message)),
                        }))
                    }
                    Err(e) => Err(format!("Failed to deliver message: {e}")),
                }
            }

            Effect::FetchLyrics { author, title } => {
                let result = self.lyrics.fetch_lyrics(&author, &title).await;
                if let Err(e) = &result {
                    if !e.is_unavailable() {
                        tracing::warn!(
                            chat_id = %self.chat_id,
                            error = %e,
                            "Lyrics provider failed, sending fallback"
                        );
                    }
                }
                Ok(EffectOutcome::Generated(Event::LyricsFetched { result }))
            }
        }
    }

    async fn send(&self, action: OutboundAction) -> Result<(), DeliveryError> {
        tracing::debug!(chat_id = %self.chat_id, chars = action.text().chars().count(), "Sending message");
        match &action {
            OutboundAction::SendText { text } => {
                self.messenger.send_text(self.chat_id, text).await
            }
            OutboundAction::SendTextWithKeyboard { text, buttons } => {
                self.messenger
                    .send_text_with_keyboard(self.chat_id, text, buttons)
                    .await
            }
            OutboundAction::EditMessageText { message_id, text } => {
                self.messenger
                    .edit_message_text(self.chat_id, *message_id, text)
                    .await
            }
        }
    }
}
