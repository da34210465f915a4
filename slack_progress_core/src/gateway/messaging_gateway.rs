use async_trait::async_trait;

use crate::types::types::{HistoryMessage, MessageRef, RemoteError, UpdatedMessage};

/// Boundary over the chat service's message operations.
///
/// Every method is exactly one remote call: no retries, no caching. Sessions
/// and the interference monitor only ever talk to the service through this
/// trait, so tests can substitute an in-memory implementation.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Post a new message. The returned `MessageRef` carries the channel id
    /// as resolved by the service.
    async fn create_message(&self, channel: &str, text: &str) -> Result<MessageRef, RemoteError>;

    /// Replace the text of an existing message. Does not check that the
    /// message still exists.
    async fn update_message(
        &self,
        message: &MessageRef,
        text: &str,
    ) -> Result<UpdatedMessage, RemoteError>;

    /// Delete a message. Callers treat this as best-effort cleanup.
    async fn delete_message(&self, message: &MessageRef) -> Result<(), RemoteError>;

    /// Fetch up to `limit` messages posted in the message's channel at or
    /// after the message itself.
    async fn fetch_history(
        &self,
        message: &MessageRef,
        limit: usize,
    ) -> Result<Vec<HistoryMessage>, RemoteError>;
}
