//! Dashboard tallies over a collection of items

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::model::{Item, Priority};
use crate::status::Status;

/// Counts shown above the task list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    /// Pending tasks with urgent priority
    pub urgent: usize,
    /// Pending tasks whose due date has passed
    pub overdue: usize,
}

impl TaskStats {
    /// Tally the tasks in `items`; medicines are skipped
    pub fn tally<'a, Tz, I>(items: I, now: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        I: IntoIterator<Item = &'a Item>,
    {
        let mut stats = Self::default();
        for item in items.into_iter().filter(|item| item.is_task()) {
            stats.total += 1;
            if item.is_completed() {
                stats.completed += 1;
                continue;
            }
            stats.pending += 1;
            if item.priority() == Some(Priority::Urgent) {
                stats.urgent += 1;
            }
            if matches!(item.classify(now), Some(c) if c.status == Status::Expired) {
                stats.overdue += 1;
            }
        }
        stats
    }
}

/// Counts shown above the medicine cabinet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExpiryStats {
    pub total: usize,
    pub safe: usize,
    pub expiring: usize,
    pub expired: usize,
}

impl ExpiryStats {
    /// Tally every item by its derived status. Undated items only count
    /// toward `total`.
    pub fn tally<'a, Tz, I>(items: I, now: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        I: IntoIterator<Item = &'a Item>,
    {
        let mut stats = Self::default();
        for item in items {
            stats.total += 1;
            match item.classify(now).map(|c| c.status) {
                Some(Status::Safe) => stats.safe += 1,
                Some(Status::ExpiringSoon) => stats.expiring += 1,
                Some(Status::Expired) => stats.expired += 1,
                None => {}
            }
        }
        stats
    }
}

/// Tabs of the task dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ItemFilter {
    #[default]
    All,
    Pending,
    Completed,
    /// Pending and urgent
    Urgent,
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            ItemFilter::All => true,
            ItemFilter::Pending => item.is_task() && !item.is_completed(),
            ItemFilter::Completed => item.is_completed(),
            ItemFilter::Urgent => {
                !item.is_completed() && item.priority() == Some(Priority::Urgent)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemId, ItemKind, OwnerId};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        "2024-06-01T09:00:00Z".parse().unwrap()
    }

    fn item(kind: ItemKind, days: Option<i64>) -> Item {
        let ts = now() - Duration::days(30);
        Item {
            id: ItemId::new_v4(),
            owner_id: OwnerId(Uuid::nil()),
            title: "x".to_string(),
            description: None,
            target_date: days.map(|d| now().date_naive() + Duration::days(d)),
            created_at: ts,
            updated_at: ts,
            kind,
        }
    }

    fn task(completed: bool, priority: Priority, days: Option<i64>) -> Item {
        item(ItemKind::Task { completed, priority }, days)
    }

    fn medicine(days: Option<i64>) -> Item {
        item(ItemKind::Medicine { barcode: None }, days)
    }

    #[test]
    fn task_tally() {
        let items = vec![
            task(false, Priority::Urgent, Some(-2)),
            task(false, Priority::Low, None),
            task(true, Priority::Urgent, Some(-5)),
            task(false, Priority::High, Some(0)),
            medicine(Some(-1)),
        ];
        let stats = TaskStats::tally(&items, &now());
        assert_eq!(
            stats,
            TaskStats {
                total: 4,
                pending: 3,
                completed: 1,
                urgent: 1,
                overdue: 1,
            }
        );
    }

    #[test]
    fn expiry_tally() {
        let items = vec![
            medicine(Some(30)),
            medicine(Some(7)),
            medicine(Some(0)),
            medicine(Some(-1)),
            medicine(None),
        ];
        let stats = ExpiryStats::tally(&items, &now());
        assert_eq!(stats.total, 5);
        assert_eq!(stats.safe, 1);
        assert_eq!(stats.expiring, 2);
        assert_eq!(stats.expired, 1);
    }

    #[test]
    fn filters() {
        let urgent = task(false, Priority::Urgent, None);
        let done = task(true, Priority::Urgent, None);
        let cabinet = medicine(Some(3));

        assert!(ItemFilter::Urgent.matches(&urgent));
        assert!(!ItemFilter::Urgent.matches(&done));
        assert!(ItemFilter::Completed.matches(&done));
        assert!(ItemFilter::Pending.matches(&urgent));
        assert!(!ItemFilter::Pending.matches(&cabinet));
        assert!(ItemFilter::All.matches(&cabinet));
    }
}
