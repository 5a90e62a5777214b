use serde::Serialize;

use crate::model::{Item, ItemId};

/// Item state changes the policy looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Created,
    Completed,
}

impl Transition {
    /// Situational line appended to the message body
    pub fn message(&self) -> &'static str {
        match self {
            Transition::Created => "New task created and needs attention!",
            Transition::Completed => "Task has been completed!",
        }
    }
}

/// A message the dispatcher should attempt to deliver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRequest {
    pub to: String,
    pub body: String,
    pub transition: Transition,
    pub item_id: ItemId,
}

/// Decides which transitions produce a notification
#[derive(Debug, Clone, Default)]
pub struct NotificationPolicy {
    recipient: Option<String>,
}

impl NotificationPolicy {
    /// Policy delivering to a single configured recipient.
    ///
    /// With no recipient every decision is `None`.
    pub fn new(recipient: Option<String>) -> Self {
        Self {
            recipient: recipient.filter(|to| !to.trim().is_empty()),
        }
    }

    pub fn recipient(&self) -> Option<&str> {
        self.recipient.as_deref()
    }

    /// Build the notification for `transition` on `item`, if one is due.
    ///
    /// Only tasks with high or urgent priority are eligible. For
    /// [`Transition::Completed`] pass the item as it was before the toggle.
    pub fn decide(&self, transition: Transition, item: &Item) -> Option<NotificationRequest> {
        let priority = item.priority().filter(|p| p.is_elevated())?;
        let Some(to) = self.recipient.clone() else {
            tracing::debug!(item_id = %item.id, "no notification recipient configured");
            return None;
        };

        Some(NotificationRequest {
            to,
            body: format!(
                "[{}] Task: {}\n{}",
                priority.as_str().to_uppercase(),
                item.title,
                transition.message()
            ),
            transition,
            item_id: item.id,
        })
    }
}
