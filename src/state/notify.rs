// Activity log.
// Outcome messages shown in the status bar and the Console tab.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use ratatui::widgets::ListState;

/// Oldest messages are dropped past this many.
pub const MAX_NOTIFICATIONS: usize = 200;

/// Notification level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warn,
    Error,
}

/// A message for the activity log.
#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }
}

/// Bounded activity log with an unread-error counter for the tab badge.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    messages: VecDeque<Notification>,
    pub unread_errors: usize,
    pub list_state: ListState,
}

impl ActivityLog {
    pub fn push(&mut self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => {
                self.unread_errors += 1;
                tracing::error!(message = %notification.message, "notification");
            }
            NotificationLevel::Warn => {
                tracing::warn!(message = %notification.message, "notification");
            }
            _ => tracing::info!(message = %notification.message, "notification"),
        }
        self.messages.push_back(notification);
        while self.messages.len() > MAX_NOTIFICATIONS {
            self.messages.pop_front();
        }
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.messages.back()
    }

    /// Newest first.
    pub fn newest_first(&self) -> impl Iterator<Item = &Notification> {
        self.messages.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn mark_read(&mut self) {
        self.unread_errors = 0;
    }
}
