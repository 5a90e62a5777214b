//! Item, draft and patch types

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::status::{classify, Classification};

/// Identifier assigned to an item by storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Generate a random identifier
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of the user that owns an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub Uuid);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    /// High and urgent tasks are the ones that warrant an SMS
    pub fn is_elevated(&self) -> bool {
        matches!(self, Priority::High | Priority::Urgent)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Variant-specific part of an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    /// Actionable task with a due date
    Task { completed: bool, priority: Priority },
    /// Tracked medicine with an expiry date
    Medicine { barcode: Option<String> },
}

/// Canonical record as returned by storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(rename = "user_id")]
    pub owner_id: OwnerId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Due date for tasks, expiry date for medicines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl Item {
    /// Check the invariants a canonical record must hold
    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        if self.updated_at < self.created_at {
            return Err(Error::validation(format!(
                "item {} has updated_at {} before created_at {}",
                self.id, self.updated_at, self.created_at
            )));
        }
        Ok(())
    }

    /// Whether the item is a completed task
    pub fn is_completed(&self) -> bool {
        matches!(self.kind, ItemKind::Task { completed: true, .. })
    }

    /// Priority of a task; medicines have none
    pub fn priority(&self) -> Option<Priority> {
        match self.kind {
            ItemKind::Task { priority, .. } => Some(priority),
            ItemKind::Medicine { .. } => None,
        }
    }

    pub fn is_task(&self) -> bool {
        matches!(self.kind, ItemKind::Task { .. })
    }

    /// Derive the status of this item at `now`. Never stored.
    pub fn classify<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<Classification> {
        self.target_date.map(|date| classify(date, now))
    }
}

/// Variant-specific part of a create request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftKind {
    Task { priority: Priority },
    Medicine { barcode: Option<String> },
}

/// A create request from the caller
///
/// Never carries id, owner or timestamps; storage assigns those.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub kind: DraftKind,
}

impl ItemDraft {
    /// Draft a task with the given priority
    pub fn task(title: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: title.into(),
            description: None,
            target_date: None,
            kind: DraftKind::Task { priority },
        }
    }

    /// Draft a medicine record
    pub fn medicine(title: impl Into<String>, expiry_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: None,
            target_date: Some(expiry_date),
            kind: DraftKind::Medicine { barcode: None },
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_target_date(mut self, date: NaiveDate) -> Self {
        self.target_date = Some(date);
        self
    }

    /// Set the barcode; ignored for task drafts
    pub fn with_barcode(mut self, code: impl Into<String>) -> Self {
        if let DraftKind::Medicine { barcode } = &mut self.kind {
            *barcode = Some(code.into());
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        if matches!(self.kind, DraftKind::Medicine { .. }) && self.target_date.is_none() {
            return Err(Error::validation("medicines need an expiry date"));
        }
        Ok(())
    }

    /// Attach the owner resolved from the session
    pub fn into_new_item(self, owner_id: OwnerId) -> NewItem {
        NewItem {
            owner_id,
            title: self.title.trim().to_string(),
            description: self.description,
            target_date: self.target_date,
            kind: self.kind,
        }
    }
}

/// A draft bound to its owner, ready for storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub owner_id: OwnerId,
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub kind: DraftKind,
}

/// Partial update of an item
///
/// There are deliberately no id or owner fields: those never change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub title: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    /// `Some(None)` clears the date
    pub target_date: Option<Option<NaiveDate>>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub barcode: Option<Option<String>>,
}

impl ItemPatch {
    pub fn completed(value: bool) -> Self {
        Self {
            completed: Some(value),
            ..Default::default()
        }
    }

    pub fn title(value: impl Into<String>) -> Self {
        Self {
            title: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_target_date(mut self, date: Option<NaiveDate>) -> Self {
        self.target_date = Some(date);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::validation("patch does not change any field"));
        }
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::validation("title cannot be empty"));
    }
    Ok(())
}
