use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::gateway::messaging_gateway::MessagingGateway;
use crate::types::types::MessageRef;

/// History entries requested per poll. Enough to tell "tracked message plus
/// one follow-up" from "buried" without paging.
pub const HISTORY_LIMIT: usize = 3;

/// More history entries than this since the tracked message means it is buried.
pub const BURIED_THRESHOLD: usize = 2;

pub fn is_buried(history_len: usize) -> bool {
    history_len > BURIED_THRESHOLD
}

/// Why a monitor stopped watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorExit {
    /// Burial detected; a reset was requested.
    Buried,
    /// The generation ended or stop was requested.
    Cancelled,
    /// A history fetch failed; the session keeps running unwatched.
    HistoryFailed,
}

/// Watches channel history around one generation's message and asks the
/// session to relocate when newer activity buries it.
pub struct InterferenceMonitor {
    gateway: Arc<dyn MessagingGateway>,
    message: MessageRef,
    poll_interval: Duration,
    cancel: CancellationToken,
}

impl InterferenceMonitor {
    pub fn new(
        gateway: Arc<dyn MessagingGateway>,
        message: MessageRef,
        poll_interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            gateway,
            message,
            poll_interval,
            cancel,
        }
    }

    /// Poll until buried, cancelled, or a history fetch fails. The reset
    /// sender is consumed on burial, so at most one reset is ever sent.
    pub async fn run(self, reset_tx: oneshot::Sender<()>) -> MonitorExit {
        let start = Instant::now() + self.poll_interval;
        let mut ticker = time::interval_at(start, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return MonitorExit::Cancelled,
                _ = ticker.tick() => {}
            }

            let history = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return MonitorExit::Cancelled,
                result = self.gateway.fetch_history(&self.message, HISTORY_LIMIT) => result,
            };

            match history {
                Ok(messages) if is_buried(messages.len()) => {
                    log::info!(
                        "[interference_monitor] ts={}: {} messages since tracked message, requesting relocation",
                        self.message.ts,
                        messages.len()
                    );
                    // The session may already be gone; nothing to do then.
                    let _ = reset_tx.send(());
                    return MonitorExit::Buried;
                }
                Ok(messages) => {
                    log::debug!(
                        "[interference_monitor] ts={}: {} messages since tracked message",
                        self.message.ts,
                        messages.len()
                    );
                }
                Err(e) => {
                    log::warn!(
                        "[interference_monitor] ts={}: history poll failed, no longer watching: {}",
                        self.message.ts,
                        e
                    );
                    return MonitorExit::HistoryFailed;
                }
            }
        }
    }
}
