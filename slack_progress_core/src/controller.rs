use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::ProgressConfig;
use crate::gateway::messaging_gateway::MessagingGateway;
use crate::gateway::slack_gateway::SlackGateway;
use crate::observer::{ObserverSet, SessionObserver};
use crate::session::progress_session::SessionContext;
use crate::session::supervisor::Supervisor;
use crate::status::StatusText;
use crate::types::types::{ProgressError, RemoteError};

/// Cloneable stop signal for a controller, for tasks that do not own it.
#[derive(Debug, Clone)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    /// Same semantics as `ProgressController::stop`.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Pieces handed to the supervisor on `start()`.
struct Pending {
    observers: ObserverSet,
    error_tx: mpsc::Sender<RemoteError>,
    generation_tx: watch::Sender<u64>,
}

/// Caller-facing handle for one self-relocating status message.
///
/// ```no_run
/// # async fn demo() -> Result<(), slack_progress_core::ProgressError> {
/// use slack_progress_core::{ProgressConfig, ProgressController};
///
/// let config = ProgressConfig::builder("xoxb-token", "#builds")
///     .with_prefix("Building")
///     .build();
/// let mut progress = ProgressController::new(config)?;
/// progress.start()?;
/// progress.set_status("step 2");
/// progress.stop();
/// progress.wait().await;
/// # Ok(())
/// # }
/// ```
///
/// Dropping the controller requests stop; call `wait()` first if the final
/// cleanup must have happened before moving on.
pub struct ProgressController {
    id: Uuid,
    config: ProgressConfig,
    gateway: Arc<dyn MessagingGateway>,
    status: StatusText,
    stop: CancellationToken,
    error_rx: mpsc::Receiver<RemoteError>,
    generation_rx: watch::Receiver<u64>,
    pending: Option<Pending>,
    supervisor: Option<JoinHandle<()>>,
}

impl ProgressController {
    /// Controller talking to Slack with the configured token.
    pub fn new(config: ProgressConfig) -> Result<Self, ProgressError> {
        let gateway = Arc::new(SlackGateway::from_config(&config)?);
        Ok(Self::with_gateway(config, gateway))
    }

    /// Controller talking through any gateway implementation.
    pub fn with_gateway(config: ProgressConfig, gateway: Arc<dyn MessagingGateway>) -> Self {
        let (error_tx, error_rx) = mpsc::channel(1);
        let (generation_tx, generation_rx) = watch::channel(0);
        let status = StatusText::new(config.status.clone());

        Self {
            id: Uuid::new_v4(),
            config,
            gateway,
            status,
            stop: CancellationToken::new(),
            error_rx,
            generation_rx,
            pending: Some(Pending {
                observers: ObserverSet::default(),
                error_tx,
                generation_tx,
            }),
            supervisor: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Register an observer. Must be called before `start()`; later
    /// registrations are ignored.
    pub fn add_observer(&mut self, observer: Box<dyn SessionObserver>) {
        match self.pending.as_mut() {
            Some(pending) => pending.observers.push(observer),
            None => log::warn!(
                "[progress_controller] {}: observer added after start, ignoring",
                self.id
            ),
        }
    }

    /// Launch the first generation. Must be called from within a tokio
    /// runtime. Fails if the configuration is invalid or the controller was
    /// already started.
    pub fn start(&mut self) -> Result<(), ProgressError> {
        self.config.validate()?;
        let pending = self.pending.take().ok_or(ProgressError::AlreadyStarted)?;

        let ctx = SessionContext::new(&self.config, Arc::clone(&self.gateway))
            .with_observers(pending.observers);

        log::info!(
            "[progress_controller] {}: starting in channel {}",
            self.id,
            self.config.channel
        );

        let supervisor = Supervisor {
            controller_id: self.id,
            ctx: Arc::new(ctx),
            status: self.status.clone(),
            stop: self.stop.clone(),
            error_tx: pending.error_tx,
            generation_tx: pending.generation_tx,
        };
        self.supervisor = Some(tokio::spawn(supervisor.run()));
        Ok(())
    }

    /// Request that all activity ends. Idempotent and non-blocking; the
    /// current message is deleted in the background. Use `wait()` to block
    /// until that has happened.
    pub fn stop(&self) {
        if !self.stop.is_cancelled() {
            log::info!("[progress_controller] {}: stop requested", self.id);
        }
        self.stop.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            token: self.stop.clone(),
        }
    }

    /// Wait until the supervisor finished: after `stop()` once cleanup is
    /// done, or after a fatal error. Returns immediately if never started.
    pub async fn wait(&mut self) {
        if let Some(handle) = self.supervisor.take() {
            if let Err(e) = handle.await {
                log::error!("[progress_controller] {}: supervisor task failed: {}", self.id, e);
            }
        }
    }

    /// Shared handle to the status text; clones may be moved to other tasks.
    pub fn status_text(&self) -> StatusText {
        self.status.clone()
    }

    pub fn set_status(&self, status: impl Into<String>) {
        self.status.set(status);
    }

    pub fn status(&self) -> String {
        self.status.get()
    }

    /// Current generation number; 0 before the first one started.
    pub fn generation(&self) -> u64 {
        *self.generation_rx.borrow()
    }

    /// Wait for the fatal error, if any. Returns `None` once the controller
    /// has finished without one.
    pub async fn recv_error(&mut self) -> Option<RemoteError> {
        if self.pending.is_some() {
            // Never started: the sender is still ours and no error can come.
            return None;
        }
        self.error_rx.recv().await
    }

    /// Non-blocking check for the fatal error.
    pub fn try_recv_error(&mut self) -> Option<RemoteError> {
        self.error_rx.try_recv().ok()
    }
}

impl Drop for ProgressController {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}
