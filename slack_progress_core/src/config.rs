use std::time::Duration;

use crate::gateway::slack_gateway::SLACK_API_BASE;
use crate::types::types::ProgressError;

/// Interval between status message rewrites.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Interval between channel history polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Overall timeout for a single gateway HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Spinner used when the caller does not supply frames.
pub const DEFAULT_FRAMES: [&str; 8] = ["|", "/", "--", "\\", "|", "/", "--", "\\"];

/// Everything a `ProgressController` needs to run.
///
/// `frames: None` selects `DEFAULT_FRAMES`; `Some(vec![])` is an explicit
/// empty sequence and yields a static status without a spinner.
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    pub token: String,
    pub channel: String,
    pub prefix: String,
    pub frames: Option<Vec<String>>,
    pub status: String,
    pub tick_interval: Duration,
    pub poll_interval: Duration,
    pub api_base: String,
    pub request_timeout: Option<Duration>,
}

impl ProgressConfig {
    pub fn builder(token: impl Into<String>, channel: impl Into<String>) -> ProgressConfigBuilder {
        ProgressConfigBuilder::new(token, channel)
    }

    /// Frames the session will animate with, after applying the default.
    pub fn resolved_frames(&self) -> Vec<String> {
        match &self.frames {
            Some(frames) => frames.clone(),
            None => DEFAULT_FRAMES.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn validate(&self) -> Result<(), ProgressError> {
        if self.channel.trim().is_empty() {
            return Err(ProgressError::InvalidConfig("channel must not be empty".into()));
        }
        if self.tick_interval.is_zero() {
            return Err(ProgressError::InvalidConfig("tick interval must be non-zero".into()));
        }
        if self.poll_interval.is_zero() {
            return Err(ProgressError::InvalidConfig("poll interval must be non-zero".into()));
        }
        Ok(())
    }
}

pub struct ProgressConfigBuilder {
    config: ProgressConfig,
}

impl ProgressConfigBuilder {
    pub fn new(token: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            config: ProgressConfig {
                token: token.into(),
                channel: channel.into(),
                prefix: String::new(),
                frames: None,
                status: String::new(),
                tick_interval: DEFAULT_TICK_INTERVAL,
                poll_interval: DEFAULT_POLL_INTERVAL,
                api_base: SLACK_API_BASE.to_string(),
                request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            },
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    pub fn with_frames<I, S>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.frames = Some(frames.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.config.status = status.into();
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval = interval;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.config.api_base = api_base.into();
        self
    }

    /// `None` disables the overall request timeout (the connect timeout stays).
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn build(self) -> ProgressConfig {
        self.config
    }
}
