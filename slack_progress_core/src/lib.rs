//! Keeps one continuously updated status message alive in a Slack channel
//! and moves it back to the bottom when other activity buries it.

pub mod animation;
pub mod config;
pub mod controller;
pub mod gateway;
pub mod monitor;
pub mod observer;
pub mod session;
pub mod status;
pub mod types;

pub use animation::{next_frame, render_initial, render_update, Frames};
pub use config::{ProgressConfig, ProgressConfigBuilder};
pub use controller::{ProgressController, StopHandle};
pub use gateway::messaging_gateway::MessagingGateway;
pub use gateway::slack_gateway::SlackGateway;
pub use observer::SessionObserver;
pub use status::StatusText;
pub use types::types::{
    HistoryMessage, MessageRef, ProgressError, RemoteError, SessionState, UpdatedMessage,
};
