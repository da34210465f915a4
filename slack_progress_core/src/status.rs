use std::sync::Arc;

use tokio::sync::watch;

/// Caller-owned status string shown in the body of the progress message.
///
/// Clones share the same value. Writers never block and never fail; running
/// sessions read the latest value on their next tick.
#[derive(Debug, Clone)]
pub struct StatusText {
    tx: Arc<watch::Sender<String>>,
}

impl StatusText {
    pub fn new(initial: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(initial.into());
        Self { tx: Arc::new(tx) }
    }

    pub fn set(&self, status: impl Into<String>) {
        // send_replace succeeds even while no session is subscribed.
        self.tx.send_replace(status.into());
    }

    pub fn get(&self) -> String {
        self.tx.borrow().clone()
    }

    /// Read-only view handed to sessions.
    pub(crate) fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for StatusText {
    fn default() -> Self {
        Self::new(String::new())
    }
}
