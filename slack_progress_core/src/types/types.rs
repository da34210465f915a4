use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of a message held by the chat service.
///
/// `channel` is the id the service reported when the message was created,
/// which may differ from the configured channel (e.g. `#builds` resolves to
/// `C0123ABCD`). All later calls for the message must use this id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel: String,
    pub ts: String,
}

impl MessageRef {
    pub fn new(channel: impl Into<String>, ts: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            ts: ts.into(),
        }
    }
}

/// Result of a successful `chat.update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedMessage {
    pub channel: String,
    pub ts: String,
    pub text: String,
}

/// One entry from channel history. Only the count and order matter to the
/// interference monitor; the remaining fields are kept for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
}

/// Lifecycle state of one session generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Creating,
    Live,
    Resetting,
    Stopping,
    Failed,
}

/// Any failure of a single gateway call. This is the only error that is
/// delivered on a controller's error channel.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("{method}: request failed: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method}: rejected by chat service: {error}")]
    Api { method: &'static str, error: String },

    #[error("{method}: could not decode response: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl RemoteError {
    /// The remote method that failed (e.g. `chat.update`).
    pub fn method(&self) -> &'static str {
        match self {
            RemoteError::Transport { method, .. }
            | RemoteError::Api { method, .. }
            | RemoteError::Decode { method, .. } => method,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("progress controller already started")]
    AlreadyStarted,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
