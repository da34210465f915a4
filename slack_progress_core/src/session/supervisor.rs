use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::session::progress_session::{ProgressSession, SessionContext, SessionOutcome};
use crate::status::StatusText;
use crate::types::types::RemoteError;

/// Runs generations one after another for a single controller.
///
/// A new generation is only started after the previous one's task has been
/// joined, i.e. after its monitor stopped and its message was deleted, and
/// only if stop has not been requested in the meantime.
pub(crate) struct Supervisor {
    pub(crate) controller_id: Uuid,
    pub(crate) ctx: Arc<SessionContext>,
    pub(crate) status: StatusText,
    pub(crate) stop: CancellationToken,
    pub(crate) error_tx: mpsc::Sender<RemoteError>,
    pub(crate) generation_tx: watch::Sender<u64>,
}

impl Supervisor {
    pub(crate) async fn run(self) {
        let mut generation = 0u64;

        loop {
            if self.stop.is_cancelled() {
                log::debug!(
                    "[progress_controller] {}: stop requested, not starting generation {}",
                    self.controller_id,
                    generation + 1
                );
                break;
            }

            generation += 1;
            self.generation_tx.send_replace(generation);
            let session = ProgressSession::new(
                generation,
                Arc::clone(&self.ctx),
                &self.status,
                self.stop.clone(),
            );

            let outcome = match tokio::spawn(session.run()).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!(
                        "[progress_controller] {}: generation {} task failed: {}",
                        self.controller_id,
                        generation,
                        e
                    );
                    break;
                }
            };

            match outcome {
                SessionOutcome::Stopped => {
                    log::info!(
                        "[progress_controller] {}: stopped after {} generation(s)",
                        self.controller_id,
                        generation
                    );
                    break;
                }
                SessionOutcome::Reset => {
                    log::info!(
                        "[progress_controller] {}: status message buried, relocating (generation {})",
                        self.controller_id,
                        generation + 1
                    );
                }
                SessionOutcome::Failed(error) => {
                    self.ctx.observers.error(&error).await;
                    // Capacity 1 and a single send per lifetime: never full.
                    if self.error_tx.try_send(error).is_err() {
                        log::debug!(
                            "[progress_controller] {}: error receiver gone, dropping error",
                            self.controller_id
                        );
                    }
                    break;
                }
            }
        }

        self.ctx.observers.finished().await;
    }
}
