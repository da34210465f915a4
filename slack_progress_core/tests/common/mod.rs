#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use slack_progress_core::{
    HistoryMessage, MessageRef, MessagingGateway, RemoteError, SessionObserver, StopHandle,
    UpdatedMessage,
};

/// Channel id the fake "resolves" every configured channel to.
pub const RESOLVED_CHANNEL: &str = "C0FAKE";

/// Timestamp assigned to the n-th created message (1-based).
pub fn ts(n: u64) -> String {
    format!("1700000000.{:06}", n)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create { channel: String, text: String },
    Update { channel: String, ts: String, text: String },
    Delete { channel: String, ts: String },
    History { ts: String, limit: usize },
}

#[derive(Debug, Clone, Copy)]
pub enum HistoryReply {
    Messages(usize),
    Fail,
}

/// In-memory gateway that records every call in order.
#[derive(Default)]
pub struct FakeGateway {
    calls: Mutex<Vec<Call>>,
    created: AtomicU64,
    updates: AtomicU64,
    fail_create: AtomicBool,
    fail_update_at: Mutex<Option<u64>>,
    history: Mutex<VecDeque<HistoryReply>>,
    stop_on_history: Mutex<Option<StopHandle>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    /// Fail the n-th update call (1-based).
    pub fn fail_update_at(&self, n: u64) {
        *self.fail_update_at.lock().unwrap() = Some(n);
    }

    /// Queue replies for successive history polls; once drained every poll
    /// sees just the tracked message.
    pub fn push_history(&self, reply: HistoryReply) {
        self.history.lock().unwrap().push_back(reply);
    }

    /// Fire `stop` from inside the next history poll.
    pub fn stop_on_history(&self, stop: StopHandle) {
        *self.stop_on_history.lock().unwrap() = Some(stop);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn creates(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// `(ts, text)` of every update attempt.
    pub fn updates(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update { ts, text, .. } => Some((ts, text)),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete { ts, .. } => Some(ts),
                _ => None,
            })
            .collect()
    }

    pub fn history_polls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::History { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MessagingGateway for FakeGateway {
    async fn create_message(&self, channel: &str, text: &str) -> Result<MessageRef, RemoteError> {
        self.record(Call::Create {
            channel: channel.to_string(),
            text: text.to_string(),
        });
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(RemoteError::Api {
                method: "chat.postMessage",
                error: "channel_not_found".to_string(),
            });
        }
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MessageRef::new(RESOLVED_CHANNEL, ts(n)))
    }

    async fn update_message(
        &self,
        message: &MessageRef,
        text: &str,
    ) -> Result<UpdatedMessage, RemoteError> {
        self.record(Call::Update {
            channel: message.channel.clone(),
            ts: message.ts.clone(),
            text: text.to_string(),
        });
        let n = self.updates.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_update_at.lock().unwrap() == Some(n) {
            return Err(RemoteError::Api {
                method: "chat.update",
                error: "message_not_found".to_string(),
            });
        }
        Ok(UpdatedMessage {
            channel: message.channel.clone(),
            ts: message.ts.clone(),
            text: text.to_string(),
        })
    }

    async fn delete_message(&self, message: &MessageRef) -> Result<(), RemoteError> {
        self.record(Call::Delete {
            channel: message.channel.clone(),
            ts: message.ts.clone(),
        });
        Ok(())
    }

    async fn fetch_history(
        &self,
        message: &MessageRef,
        limit: usize,
    ) -> Result<Vec<HistoryMessage>, RemoteError> {
        self.record(Call::History {
            ts: message.ts.clone(),
            limit,
        });
        if let Some(stop) = self.stop_on_history.lock().unwrap().take() {
            stop.stop();
        }
        let reply = self
            .history
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(HistoryReply::Messages(1));
        match reply {
            HistoryReply::Messages(count) => Ok((0..count)
                .map(|i| HistoryMessage {
                    ts: format!("{}{}", message.ts, i),
                    ..Default::default()
                })
                .collect()),
            HistoryReply::Fail => Err(RemoteError::Api {
                method: "conversations.history",
                error: "ratelimited".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Live(u64, String),
    Update(String),
    Error(String),
    Finished,
}

/// Observer that appends every notification to a shared log.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionObserver for RecordingObserver {
    async fn on_live(&self, generation: u64, message: &MessageRef) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Live(generation, message.ts.clone()));
    }

    async fn on_update(&self, _message: &MessageRef, text: &str) {
        self.events.lock().unwrap().push(Event::Update(text.to_string()));
    }

    async fn on_error(&self, error: &RemoteError) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Error(error.method().to_string()));
    }

    async fn on_finished(&self) {
        self.events.lock().unwrap().push(Event::Finished);
    }
}
