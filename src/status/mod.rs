//! Time-sensitive status derived from an item's target date
//!
//! Everything here is pure. Status depends on "now", so it is recomputed on
//! every read and never stored on the item.

pub mod stats;

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::Serialize;

pub use stats::*;

/// Days (inclusive) before the target date during which an item is expiring soon
pub const EXPIRING_SOON_DAYS: i64 = 7;

/// Tri-state status of a dated item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// More than a week left
    Safe,
    /// Due today or within the next week
    ExpiringSoon,
    /// Past the target date (expired medicine, overdue task)
    Expired,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Safe => "safe",
            Status::ExpiringSoon => "expiring_soon",
            Status::Expired => "expired",
        }
    }
}

/// Result of classifying a target date against the current instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub status: Status,
    /// Whole calendar days from today to the target date; negative once past
    pub days_remaining: i64,
    /// Human display label
    pub label: String,
}

/// Classify `target_date` relative to `now`.
///
/// Days are counted in calendar days in `now`'s own time zone, so the hour
/// of day never matters. Both boundaries are inclusive: a date of today is
/// expiring soon (not expired), and so is a date exactly seven days out.
pub fn classify<Tz: TimeZone>(target_date: NaiveDate, now: &DateTime<Tz>) -> Classification {
    let days_remaining = target_date
        .signed_duration_since(now.date_naive())
        .num_days();

    let (status, label) = if days_remaining < 0 {
        (Status::Expired, "Expired".to_string())
    } else if days_remaining == 0 {
        (Status::ExpiringSoon, "Expires today".to_string())
    } else if days_remaining <= EXPIRING_SOON_DAYS {
        (Status::ExpiringSoon, days_left(days_remaining))
    } else {
        (Status::Safe, days_left(days_remaining))
    };

    Classification {
        status,
        days_remaining,
        label,
    }
}

fn days_left(days: i64) -> String {
    format!("{} days left", days)
}

/// Urgency of a task due date, used to tint the due label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DueTone {
    Overdue,
    Today,
    Tomorrow,
    Later,
}

/// Short due-date label for task lists: "Today", "Tomorrow" or e.g. "Mar 04"
pub fn due_label<Tz: TimeZone>(due_date: NaiveDate, now: &DateTime<Tz>) -> String {
    match due_tone(due_date, now) {
        DueTone::Today => "Today".to_string(),
        DueTone::Tomorrow => "Tomorrow".to_string(),
        DueTone::Overdue | DueTone::Later => due_date.format("%b %d").to_string(),
    }
}

pub fn due_tone<Tz: TimeZone>(due_date: NaiveDate, now: &DateTime<Tz>) -> DueTone {
    match due_date.signed_duration_since(now.date_naive()).num_days() {
        d if d < 0 => DueTone::Overdue,
        0 => DueTone::Today,
        1 => DueTone::Tomorrow,
        _ => DueTone::Later,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};

    fn today() -> DateTime<Utc> {
        "2024-03-10T15:30:00Z".parse().unwrap()
    }

    fn offset(days: i64) -> NaiveDate {
        today().date_naive() + Duration::days(days)
    }

    #[test]
    fn today_is_expiring_soon_not_expired() {
        let c = classify(offset(0), &today());
        assert_eq!(c.status, Status::ExpiringSoon);
        assert_eq!(c.days_remaining, 0);
        assert_eq!(c.label, "Expires today");
    }

    #[test]
    fn past_dates_are_expired() {
        for days in [-1, -2, -30, -400] {
            let c = classify(offset(days), &today());
            assert_eq!(c.status, Status::Expired, "offset {days}");
            assert_eq!(c.days_remaining, days);
            assert_eq!(c.label, "Expired");
        }
    }

    #[test]
    fn within_a_week_is_expiring_soon() {
        for days in 1..=7 {
            let c = classify(offset(days), &today());
            assert_eq!(c.status, Status::ExpiringSoon, "offset {days}");
        }
        assert_eq!(classify(offset(3), &today()).label, "3 days left");
        assert_eq!(classify(offset(7), &today()).label, "7 days left");
    }

    #[test]
    fn beyond_a_week_is_safe() {
        let c = classify(offset(8), &today());
        assert_eq!(c.status, Status::Safe);
        assert_eq!(c.label, "8 days left");
        assert_eq!(classify(offset(365), &today()).status, Status::Safe);
    }

    #[test]
    fn time_of_day_does_not_matter() {
        let late: DateTime<Utc> = "2024-03-10T23:59:59Z".parse().unwrap();
        let early: DateTime<Utc> = "2024-03-10T00:00:00Z".parse().unwrap();
        let target = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        assert_eq!(classify(target, &late).days_remaining, 1);
        assert_eq!(classify(target, &early).days_remaining, 1);
    }

    #[test]
    fn calendar_day_follows_the_callers_zone() {
        // 2024-03-10T23:00Z is already the 11th at UTC+2.
        let utc: DateTime<Utc> = "2024-03-10T23:00:00Z".parse().unwrap();
        let local = utc.with_timezone(&FixedOffset::east_opt(2 * 3600).unwrap());
        let target = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        assert_eq!(classify(target, &utc).days_remaining, 1);
        assert_eq!(classify(target, &local).days_remaining, 0);
    }

    #[test]
    fn due_labels() {
        assert_eq!(due_label(offset(0), &today()), "Today");
        assert_eq!(due_label(offset(1), &today()), "Tomorrow");
        assert_eq!(due_label(offset(5), &today()), "Mar 15");
        assert_eq!(due_tone(offset(-1), &today()), DueTone::Overdue);
        assert_eq!(due_tone(offset(9), &today()), DueTone::Later);
    }
}
