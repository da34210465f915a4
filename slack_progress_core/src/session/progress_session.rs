use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::animation::{next_frame, render_initial, render_update, Frames};
use crate::config::ProgressConfig;
use crate::gateway::messaging_gateway::MessagingGateway;
use crate::monitor::InterferenceMonitor;
use crate::observer::ObserverSet;
use crate::status::StatusText;
use crate::types::types::{MessageRef, RemoteError, SessionState};

/// Settings shared, read-only, by every generation of one controller.
pub struct SessionContext {
    pub(crate) gateway: Arc<dyn MessagingGateway>,
    pub(crate) channel: String,
    pub(crate) prefix: String,
    pub(crate) frames: Frames,
    pub(crate) tick_interval: Duration,
    pub(crate) poll_interval: Duration,
    pub(crate) observers: ObserverSet,
}

impl SessionContext {
    pub fn new(config: &ProgressConfig, gateway: Arc<dyn MessagingGateway>) -> Self {
        Self {
            gateway,
            channel: config.channel.clone(),
            prefix: config.prefix.clone(),
            frames: Frames::new(config.resolved_frames()),
            tick_interval: config.tick_interval,
            poll_interval: config.poll_interval,
            observers: ObserverSet::default(),
        }
    }

    pub(crate) fn with_observers(mut self, observers: ObserverSet) -> Self {
        self.observers = observers;
        self
    }
}

/// How a generation ended.
#[derive(Debug)]
pub enum SessionOutcome {
    /// Stop was requested; the message has been cleaned up.
    Stopped,
    /// The message was buried; it has been cleaned up and a new generation
    /// should take over.
    Reset,
    /// A create or update call failed.
    Failed(RemoteError),
}

impl SessionOutcome {
    /// Terminal state the generation finished in.
    pub fn state(&self) -> SessionState {
        match self {
            SessionOutcome::Stopped => SessionState::Stopping,
            SessionOutcome::Reset => SessionState::Resetting,
            SessionOutcome::Failed(_) => SessionState::Failed,
        }
    }
}

/// One generation: create the status message, rewrite it on every tick
/// until stopped, reset or failed, then delete it.
///
/// The session task is the only writer of its message. The interference
/// monitor it spawns gets its own copy of the `MessageRef` and talks back
/// only through a one-shot reset channel.
pub struct ProgressSession {
    generation: u64,
    ctx: Arc<SessionContext>,
    status: watch::Receiver<String>,
    stop: CancellationToken,
    state: SessionState,
    text: String,
    animation_index: usize,
}

impl ProgressSession {
    pub fn new(
        generation: u64,
        ctx: Arc<SessionContext>,
        status: &StatusText,
        stop: CancellationToken,
    ) -> Self {
        Self {
            generation,
            ctx,
            status: status.subscribe(),
            stop,
            state: SessionState::Creating,
            text: String::new(),
            animation_index: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Run the generation to completion. Returns only after the monitor has
    /// been joined and deletion of the message attempted, so the caller may
    /// start the next generation immediately.
    pub async fn run(mut self) -> SessionOutcome {
        if self.stop.is_cancelled() {
            self.transition(SessionState::Stopping);
            return SessionOutcome::Stopped;
        }

        // Frame 0 is shown as-is; the first tick advances to frame 1.
        self.text = render_initial(&self.ctx.prefix, &self.ctx.frames);
        let message = match self
            .ctx
            .gateway
            .create_message(&self.ctx.channel, &self.text)
            .await
        {
            Ok(message) => message,
            Err(e) => {
                log::error!(
                    "[progress_session] gen={}: could not create status message: {}",
                    self.generation,
                    e
                );
                self.transition(SessionState::Failed);
                return SessionOutcome::Failed(e);
            }
        };

        log::info!(
            "[progress_session] gen={}: status message created channel={} ts={}",
            self.generation,
            message.channel,
            message.ts
        );
        self.transition(SessionState::Live);
        self.ctx.observers.live(self.generation, &message).await;

        let monitor_cancel = self.stop.child_token();
        let (reset_tx, reset_rx) = oneshot::channel();
        let monitor = InterferenceMonitor::new(
            Arc::clone(&self.ctx.gateway),
            message.clone(),
            self.ctx.poll_interval,
            monitor_cancel.clone(),
        );
        let monitor_handle = tokio::spawn(monitor.run(reset_tx));

        let outcome = self.update_loop(&message, reset_rx).await;

        monitor_cancel.cancel();
        match monitor_handle.await {
            Ok(exit) => log::debug!(
                "[progress_session] gen={}: monitor finished: {:?}",
                self.generation,
                exit
            ),
            Err(e) => log::error!("[progress_session] gen={}: monitor task failed: {}", self.generation, e),
        }

        self.cleanup(&message).await;
        outcome
    }

    async fn update_loop(
        &mut self,
        message: &MessageRef,
        mut reset_rx: oneshot::Receiver<()>,
    ) -> SessionOutcome {
        let period = self.ctx.tick_interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut monitor_alive = true;

        loop {
            // Stop is checked first so it wins over a simultaneous reset.
            tokio::select! {
                biased;
                _ = self.stop.cancelled() => {
                    self.transition(SessionState::Stopping);
                    return SessionOutcome::Stopped;
                }
                signal = &mut reset_rx, if monitor_alive => match signal {
                    Ok(()) => {
                        self.transition(SessionState::Resetting);
                        return SessionOutcome::Reset;
                    }
                    // Monitor quit without asking for a reset; keep updating.
                    Err(_) => monitor_alive = false,
                },
                _ = ticker.tick() => {
                    if let Err(e) = self.tick(message).await {
                        log::error!(
                            "[progress_session] gen={}: could not update ts={}: {}",
                            self.generation,
                            message.ts,
                            e
                        );
                        self.transition(SessionState::Failed);
                        return SessionOutcome::Failed(e);
                    }
                }
            }
        }
    }

    async fn tick(&mut self, message: &MessageRef) -> Result<(), RemoteError> {
        let (frame, next) = next_frame(&self.ctx.frames, self.animation_index);
        self.animation_index = next;
        let status = self.status.borrow().clone();
        self.text = render_update(&self.ctx.prefix, frame, &status);

        self.ctx.gateway.update_message(message, &self.text).await?;
        self.ctx.observers.update(message, &self.text).await;
        Ok(())
    }

    /// Best-effort delete; the message may already be gone.
    async fn cleanup(&self, message: &MessageRef) {
        match self.ctx.gateway.delete_message(message).await {
            Ok(()) => log::debug!(
                "[progress_session] gen={}: deleted ts={}",
                self.generation,
                message.ts
            ),
            Err(e) => log::debug!(
                "[progress_session] gen={}: ignoring delete failure for ts={}: {}",
                self.generation,
                message.ts,
                e
            ),
        }
    }

    fn transition(&mut self, next: SessionState) {
        log::debug!(
            "[progress_session] gen={}: {:?} -> {:?}",
            self.generation,
            self.state,
            next
        );
        self.state = next;
    }
}
