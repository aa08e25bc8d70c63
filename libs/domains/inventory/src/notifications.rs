//! In-process notification bus for toast-style messages.
//!
//! One [`NotificationCenter`] is built at startup and handed to whatever needs
//! to publish; subscribers get a broadcast receiver and late readers can fetch
//! the bounded history.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;
const DEFAULT_HISTORY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Shared publish/subscribe hub; clones publish to the same subscribers
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    sender: broadcast::Sender<Notification>,
    history: Arc<Mutex<VecDeque<Notification>>>,
    history_limit: usize,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY)
    }
}

impl NotificationCenter {
    pub fn new(history_limit: usize) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            history: Arc::new(Mutex::new(VecDeque::with_capacity(history_limit))),
            history_limit,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Publish a notification; having no live subscribers is fine
    pub fn publish(
        &self,
        level: NotificationLevel,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Notification {
        let notification = Notification {
            id: Uuid::now_v7(),
            level,
            title: title.into(),
            message: message.into(),
            created_at: Utc::now(),
        };

        if let Ok(mut history) = self.history.lock() {
            if self.history_limit > 0 {
                while history.len() >= self.history_limit {
                    history.pop_front();
                }
                history.push_back(notification.clone());
            }
        }

        let delivered = self.sender.send(notification.clone()).unwrap_or(0);
        tracing::debug!(level = %level, title = %notification.title, delivered, "Notification published");
        notification
    }

    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) -> Notification {
        self.publish(NotificationLevel::Success, title, message)
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) -> Notification {
        self.publish(NotificationLevel::Error, title, message)
    }

    pub fn warning(&self, title: impl Into<String>, message: impl Into<String>) -> Notification {
        self.publish(NotificationLevel::Warning, title, message)
    }

    pub fn info(&self, title: impl Into<String>, message: impl Into<String>) -> Notification {
        self.publish(NotificationLevel::Info, title, message)
    }

    /// Most recent notifications, newest last
    pub fn recent(&self) -> Vec<Notification> {
        self.history
            .lock()
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop a notification from the history (toast dismissed)
    pub fn dismiss(&self, id: Uuid) -> bool {
        match self.history.lock() {
            Ok(mut history) => {
                let before = history.len();
                history.retain(|n| n.id != id);
                history.len() != before
            }
            Err(_) => false,
        }
    }

    pub fn clear(&self) {
        if let Ok(mut history) = self.history.lock() {
            history.clear();
        }
    }
}
