//! Long-polling transport for local runs

use crate::runtime::UpdateDispatcher;
use crate::telegram::TelegramClient;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Server-side wait for each `getUpdates` call
pub const LONG_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause before retrying after a failed poll
const RETRY_DELAY: Duration = Duration::from_secs(3);

pub struct Poller {
    telegram: TelegramClient,
    dispatcher: Arc<dyn UpdateDispatcher>,
    timeout: Duration,
    retry_delay: Duration,
}

impl Poller {
    pub fn new(telegram: TelegramClient, dispatcher: Arc<dyn UpdateDispatcher>) -> Self {
        Self {
            telegram,
            dispatcher,
            timeout: LONG_POLL_TIMEOUT,
            retry_delay: RETRY_DELAY,
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn with_timings(mut self, timeout: Duration, retry_delay: Duration) -> Self {
        self.timeout = timeout;
        self.retry_delay = retry_delay;
        self
    }

    /// Poll until cancelled. Errors are logged and retried.
    pub async fn run(self, cancel: CancellationToken) {
        // getUpdates is refused while a webhook is set
        if let Err(e) = self.telegram.delete_webhook().await {
            tracing::warn!(error = %e, "Failed to delete webhook before polling");
        }

        tracing::info!("Polling for updates");
        let mut offset: Option<i64> = None;

        loop {
            let polled = tokio::select! {
                () = cancel.cancelled() => break,
                polled = self.telegram.get_updates(offset, self.timeout) => polled,
            };

            match polled {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        let update_id = update.update_id;
                        let Some(inbound) = update.into_inbound() else {
                            tracing::debug!(update_id, "Ignoring unsupported update");
                            continue;
                        };
                        if let Err(e) = self.dispatcher.dispatch(inbound).await {
                            tracing::error!(update_id, error = %e, "Failed to dispatch update");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Polling failed, retrying");
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
            }
        }

        tracing::info!("Polling stopped");
    }
}
