use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Addressed to the connected user (e.g. an update on their report)
    User,
    /// Broadcast to everyone (e.g. a new issue nearby, maintenance notices)
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            message: message.into(),
            issue_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn user(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::User, title, message)
    }

    pub fn system(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::System, title, message)
    }

    pub fn for_issue(mut self, issue_id: Uuid) -> Self {
        self.issue_id = Some(issue_id);
        self
    }
}
