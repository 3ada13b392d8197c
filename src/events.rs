//! Outbound notification stream
//!
//! Data-layer code publishes events here; presentation layers (the CLI, an
//! embedding UI) subscribe and decide how to render them.

use serde::Serialize;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// Toast-style message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "level", rename_all = "lowercase")]
pub enum Notification {
    Success { title: String, message: String },
    Error { title: String, message: String },
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Notification::Success {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Notification::Error {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Notification::Success { message, .. } | Notification::Error { message, .. } => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "PascalCase")]
pub enum Event {
    Notify(Notification),
    /// Tokens were replaced by a silent refresh
    SessionRefreshed,
    /// Refresh failed and the session was cleared
    RedirectToLogin { path: String },
}

/// Broadcast hub for events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Publish to current subscribers; nobody listening is not an error
    pub fn publish(&self, event: Event) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Event dropped, no subscribers");
        }
    }

    pub fn notify(&self, notification: Notification) {
        self.publish(Event::Notify(notification));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
