use std::time::Duration;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};

use slack_progress_core::{MessageRef, RemoteError, SessionObserver};

/// Mirrors the Slack status message as a local indicatif spinner so the
/// person running the command sees what the channel sees.
pub struct TerminalSessionObserver {
    spinner: ProgressBar,
}

impl TerminalSessionObserver {
    pub fn new(prefix: &str) -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_prefix(prefix.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));
        Self { spinner }
    }
}

#[async_trait]
impl SessionObserver for TerminalSessionObserver {
    async fn on_live(&self, generation: u64, message: &MessageRef) {
        if generation > 1 {
            self.spinner.println(format!(
                "status message relocated to ts={} (generation {})",
                message.ts, generation
            ));
        }
    }

    async fn on_update(&self, _message: &MessageRef, text: &str) {
        // Show just the literal block body.
        let body = text
            .split_once("```")
            .map(|(_, rest)| rest.trim_end_matches("```"))
            .unwrap_or(text);
        self.spinner.set_message(body.to_string());
    }

    async fn on_error(&self, error: &RemoteError) {
        self.spinner.abandon_with_message(format!("Failed: {}", error));
    }

    async fn on_finished(&self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
