//! Runtime for dispatching chat events
//!
//! Every chat gets its own `ChatRuntime` task fed through a queue, so events
//! for one chat never interleave while different chats run in parallel.

mod executor;
pub mod traits;


pub use executor::ChatRuntime;
pub use traits::*;

use crate::lyrics::{LoggingProvider, LyricsProvider};
use crate::state_machine::{ChatId, Event, InboundUpdate};
use crate::telegram::TelegramClient;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;

/// Type alias for the production service with concrete implementations
pub type ProductionService = ConversationService<DatabaseStorage, LoggingProvider, TelegramClient>;

const CHAT_QUEUE_CAPACITY: usize = 32;

/// A chat's runtime exits after this long without events; its state lives in the store
pub const CHAT_IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

type ChatRegistry = Arc<RwLock<HashMap<ChatId, ChatHandle>>>;

/// Handle to a running chat runtime
#[derive(Clone)]
pub struct ChatHandle {
    pub event_tx: mpsc::Sender<Event>,
    /// Distinguishes successive runtimes of the same chat
    runtime_id: u64,
    /// Cancelled once the runtime has drained its queue and left the registry
    stopped: CancellationToken,
}

/// Entry point for inbound transports (webhook and polling)
#[async_trait]
pub trait UpdateDispatcher: Send + Sync {
    async fn dispatch(&self, update: InboundUpdate) -> Result<(), String>;
}

/// Owns the collaborators and routes inbound updates to per-chat runtimes.
///
/// Constructed once at start-up; the only process-wide mutable state is the
/// registry of chat handles.
pub struct ConversationService<S, L, M>
where
    S: StateStore + 'static,
    L: LyricsProvider + 'static,
    M: Messenger + 'static,
{
    storage: Arc<S>,
    lyrics: Arc<L>,
    messenger: Arc<M>,
    chats: ChatRegistry,
    next_runtime_id: AtomicU64,
    idle_timeout: Duration,
}

impl<S, L, M> ConversationService<S, L, M>
where
    S: StateStore + 'static,
    L: LyricsProvider + 'static,
    M: Messenger + 'static,
{
    pub fn new(storage: S, lyrics: L, messenger: M) -> Self {
        Self {
            storage: Arc::new(storage),
            lyrics: Arc::new(lyrics),
            messenger: Arc::new(messenger),
            chats: ChatRegistry::default(),
            next_runtime_id: AtomicU64::new(0),
            idle_timeout: CHAT_IDLE_TIMEOUT,
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Route one inbound update to its chat
    pub async fn dispatch(&self, update: InboundUpdate) -> Result<(), String> {
        let InboundUpdate {
            chat_id,
            event,
            callback_query_id,
        } = update;

        if let Some(id) = callback_query_id {
            if let Err(e) = self.messenger.answer_callback(&id).await {
                tracing::warn!(chat_id = %chat_id, error = %e, "Failed to answer callback query");
            }
        }

        tracing::info!(chat_id = %chat_id, event = event.kind(), "Dispatching event");

        let handle = self.get_or_create(chat_id).await;
        match handle.event_tx.send(event).await {
            Ok(()) => Ok(()),
            Err(mpsc::error::SendError(event)) => {
                // The runtime went idle; once it has drained, start a fresh one
                tracing::debug!(chat_id = %chat_id, "Chat runtime closed, restarting");
                handle.stopped.cancelled().await;
                let handle = self.get_or_create(chat_id).await;
                handle
                    .event_tx
                    .send(event)
                    .await
                    .map_err(|e| format!("Failed to send event: {e}"))
            }
        }
    }

    /// Get or create the runtime for a chat
    pub async fn get_or_create(&self, chat_id: ChatId) -> ChatHandle {
        if let Some(handle) = self.chats.read().await.get(&chat_id) {
            return handle.clone();
        }

        let mut chats = self.chats.write().await;
        // Another dispatch may have created it while we waited for the lock
        if let Some(handle) = chats.get(&chat_id) {
            return handle.clone();
        }

        let (event_tx, event_rx) = mpsc::channel(CHAT_QUEUE_CAPACITY);
        let runtime = ChatRuntime::new(
            chat_id,
            self.storage.clone(),
            self.lyrics.clone(),
            self.messenger.clone(),
            event_rx,
        );
        let handle = ChatHandle {
            event_tx,
            runtime_id: self.next_runtime_id.fetch_add(1, Ordering::Relaxed),
            stopped: CancellationToken::new(),
        };

        let registry = Arc::clone(&self.chats);
        let runtime_id = handle.runtime_id;
        let stopped = handle.stopped.clone();
        let idle_timeout = self.idle_timeout;
        tokio::spawn(async move {
            runtime.run(idle_timeout).await;

            let mut chats = registry.write().await;
            if chats
                .get(&chat_id)
                .is_some_and(|h| h.runtime_id == runtime_id)
            {
                chats.remove(&chat_id);
            }
            drop(chats);
            stopped.cancel();
        });

        chats.insert(chat_id, handle.clone());
        handle
    }

    /// Number of chats with a live runtime
    #[allow(dead_code)] // Used in tests
    pub async fn active_chats(&self) -> usize {
        self.chats.read().await.len()
    }
}

#[async_trait]
impl<S, L, M> UpdateDispatcher for ConversationService<S, L, M>
where
    S: StateStore + 'static,
    L: LyricsProvider + 'static,
    M: Messenger + 'static,
{
    async fn dispatch(&self, update: InboundUpdate) -> Result<(), String> {
        ConversationService::dispatch(self, update).await
    }
}
