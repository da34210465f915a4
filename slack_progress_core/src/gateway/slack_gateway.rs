use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ProgressConfig;
use crate::gateway::messaging_gateway::MessagingGateway;
use crate::types::types::{HistoryMessage, MessageRef, ProgressError, RemoteError, UpdatedMessage};

/// Slack Web API base URL.
pub const SLACK_API_BASE: &str = "https://slack.com/api";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Every Slack Web API reply has this shape; method-specific fields are
/// flattened into `data`.
#[derive(Debug, Deserialize)]
struct SlackEnvelope<T> {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    data: T,
}

#[derive(Debug, Deserialize)]
struct PostMessageData {
    #[serde(default)]
    channel: String,
    #[serde(default)]
    ts: String,
}

#[derive(Debug, Deserialize)]
struct UpdateData {
    #[serde(default)]
    channel: String,
    #[serde(default)]
    ts: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Ack {}

#[derive(Debug, Deserialize)]
struct HistoryData {
    #[serde(default)]
    messages: Vec<HistoryMessage>,
}

/// `MessagingGateway` backed by the Slack Web API.
///
/// Arguments travel in the query string of a `POST`, the token in an
/// `Authorization: Bearer` header.
pub struct SlackGateway {
    http: Client,
    token: String,
    base: Url,
}

impl SlackGateway {
    pub fn new(
        token: impl Into<String>,
        api_base: &str,
        request_timeout: Option<Duration>,
    ) -> Result<Self, ProgressError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ProgressError::InvalidConfig("token must not be empty".into()));
        }

        let base = Url::parse(api_base)
            .map_err(|e| ProgressError::InvalidConfig(format!("api base {api_base:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ProgressError::InvalidConfig(format!(
                "api base {api_base:?} cannot carry a path"
            )));
        }

        let mut builder = Client::builder().connect_timeout(CONNECT_TIMEOUT);
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ProgressError::HttpClient)?;

        Ok(Self { http, token, base })
    }

    pub fn from_config(config: &ProgressConfig) -> Result<Self, ProgressError> {
        Self::new(config.token.clone(), &config.api_base, config.request_timeout)
    }

    fn method_url(&self, method: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(method);
        }
        url.query_pairs_mut().extend_pairs(params);
        url
    }

    /// Issue one Web API call and unwrap the `ok`/`error` envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: &[(&str, &str)],
    ) -> Result<T, RemoteError> {
        let url = self.method_url(method, params);
        log::debug!("[slack_gateway] calling {}", method);

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| RemoteError::Transport { method, source })?;

        let body = response
            .text()
            .await
            .map_err(|source| RemoteError::Transport { method, source })?;

        let envelope: SlackEnvelope<T> = serde_json::from_str(&body)
            .map_err(|source| RemoteError::Decode { method, source })?;

        if !envelope.ok {
            let error = envelope.error.unwrap_or_else(|| "unknown_error".to_string());
            log::debug!("[slack_gateway] {} returned ok=false: {}", method, error);
            return Err(RemoteError::Api { method, error });
        }

        Ok(envelope.data)
    }
}

#[async_trait]
impl MessagingGateway for SlackGateway {
    async fn create_message(&self, channel: &str, text: &str) -> Result<MessageRef, RemoteError> {
        let method = "chat.postMessage";
        let data: PostMessageData = self
            .call(method, &[("channel", channel), ("text", text)])
            .await?;

        if data.ts.is_empty() {
            return Err(RemoteError::Api {
                method,
                error: "missing_ts".to_string(),
            });
        }

        // Older responses may omit the resolved channel; fall back to what we sent.
        let channel = if data.channel.is_empty() {
            channel.to_string()
        } else {
            data.channel
        };

        Ok(MessageRef::new(channel, data.ts))
    }

    async fn update_message(
        &self,
        message: &MessageRef,
        text: &str,
    ) -> Result<UpdatedMessage, RemoteError> {
        let data: UpdateData = self
            .call(
                "chat.update",
                &[
                    ("channel", message.channel.as_str()),
                    ("ts", message.ts.as_str()),
                    ("text", text),
                ],
            )
            .await?;

        Ok(UpdatedMessage {
            channel: if data.channel.is_empty() { message.channel.clone() } else { data.channel },
            ts: if data.ts.is_empty() { message.ts.clone() } else { data.ts },
            text: if data.text.is_empty() { text.to_string() } else { data.text },
        })
    }

    async fn delete_message(&self, message: &MessageRef) -> Result<(), RemoteError> {
        let _: Ack = self
            .call(
                "chat.delete",
                &[("channel", message.channel.as_str()), ("ts", message.ts.as_str())],
            )
            .await?;
        Ok(())
    }

    async fn fetch_history(
        &self,
        message: &MessageRef,
        limit: usize,
    ) -> Result<Vec<HistoryMessage>, RemoteError> {
        let limit = limit.to_string();
        // inclusive=true: the tracked message itself is part of the result.
        let data: HistoryData = self
            .call(
                "conversations.history",
                &[
                    ("channel", message.channel.as_str()),
                    ("oldest", message.ts.as_str()),
                    ("inclusive", "true"),
                    ("limit", limit.as_str()),
                ],
            )
            .await?;
        Ok(data.messages)
    }
}
