use async_trait::async_trait;

use crate::types::types::{MessageRef, RemoteError};

/// Trait for anything that wants to follow a controller's activity.
///
/// Observers are informational: they are awaited inline by the session and
/// supervisor tasks but cannot influence the state machine.
///
/// Lifecycle:
/// - `on_live` once per generation, after its message was created.
/// - `on_update` after every successful rewrite of the message.
/// - `on_error` at most once, when a fatal error is delivered.
/// - `on_finished` exactly once, after the last generation cleaned up.
#[async_trait]
pub trait SessionObserver: Send + Sync + 'static {
    /// Called when a generation's status message has been posted.
    async fn on_live(&self, generation: u64, message: &MessageRef);

    /// Called after the message was rewritten with `text`.
    async fn on_update(&self, message: &MessageRef, text: &str);

    /// Called when a create or update failure ends the controller.
    async fn on_error(&self, error: &RemoteError);

    /// Called when the controller is done and the last message cleaned up.
    async fn on_finished(&self);
}

/// Fan-out over the observers registered on a controller.
#[derive(Default)]
pub(crate) struct ObserverSet {
    observers: Vec<Box<dyn SessionObserver>>,
}

impl ObserverSet {
    pub(crate) fn push(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub(crate) async fn live(&self, generation: u64, message: &MessageRef) {
        for observer in &self.observers {
            observer.on_live(generation, message).await;
        }
    }

    pub(crate) async fn update(&self, message: &MessageRef, text: &str) {
        for observer in &self.observers {
            observer.on_update(message, text).await;
        }
    }

    pub(crate) async fn error(&self, error: &RemoteError) {
        for observer in &self.observers {
            observer.on_error(error).await;
        }
    }

    pub(crate) async fn finished(&self) {
        for observer in &self.observers {
            observer.on_finished().await;
        }
    }
}
