//! In-memory notifications for the current session.

use crate::utils::generate_id;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// The most notifications kept at once. Older ones are dropped first.
pub const MAX_NOTIFICATIONS: usize = 50;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Warning,
}

serde_plain::derive_display_from_serialize!(NotificationKind);

/// A notification that has not been added to a store yet.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub message: String,
}

impl NotificationDraft {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Warning,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    id: String,
    message: String,
    #[serde(rename = "type")]
    kind: NotificationKind,
    created_at: DateTime<Utc>,
    read: bool,
}

impl Notification {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_read(&self) -> bool {
        self.read
    }
}

/// Holds notifications newest first, with no two sharing the same message text.
#[derive(Debug, Clone, Default)]
pub struct NotificationStore {
    entries: Vec<Notification>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `draft` stamped with the current time. See `add_at`.
    ///
    /// Stamps strictly increase, so drafts added in one burst keep their order in `sorted`: the
    /// last one added is listed first.
    pub fn add(&mut self, draft: NotificationDraft) -> bool {
        let now = Utc::now();
        let created_at = match self.entries.first() {
            Some(newest) if newest.created_at >= now => {
                newest.created_at + TimeDelta::microseconds(1)
            }
            _ => now,
        };
        self.add_at(draft, created_at)
    }

    /// Adds `draft` as an unread notification created at `created_at`.
    ///
    /// Nothing happens if a notification with the identical message is already held; this keeps
    /// repeated evaluation passes from announcing the same thing twice. Returns whether the draft
    /// was added.
    pub fn add_at(&mut self, draft: NotificationDraft, created_at: DateTime<Utc>) -> bool {
        if self.entries.iter().any(|n| n.message == draft.message) {
            trace!("Skipping duplicate notification: {}", draft.message);
            return false;
        }
        self.entries.insert(
            0,
            Notification {
                id: generate_id(),
                message: draft.message,
                kind: draft.kind,
                created_at,
                read: false,
            },
        );
        self.entries.truncate(MAX_NOTIFICATIONS);
        true
    }

    /// Adds each draft in order and returns how many were new.
    pub fn extend(&mut self, drafts: impl IntoIterator<Item = NotificationDraft>) -> usize {
        drafts.into_iter().filter(|d| self.add(d.clone())).count()
    }

    pub fn mark_all_read(&mut self) {
        for n in &mut self.entries {
            n.read = true;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| !n.read).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Notifications in storage order (most recently added first).
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    /// Notifications in display order: newest `created_at` first.
    pub fn sorted(&self) -> Vec<&Notification> {
        let mut sorted: Vec<&Notification> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted
    }
}
