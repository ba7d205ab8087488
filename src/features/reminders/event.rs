//! Recurring weekly events as read from the catalog.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::core::ScheduleError;

/// Identity of an event for duplicate suppression: (name, day_of_week, time_slot)
pub type EventKey = (String, i64, String);

/// A weekly-repeating class session.
///
/// `time_slot` is kept exactly as stored ("HH:MM"); it is parsed on use so a
/// single bad record can be skipped without affecting the rest of a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringEvent {
    pub name: String,
    pub teacher: Option<String>,
    pub location: Option<String>,
    pub time_slot: String,
    /// 1 = Monday ... 7 = Sunday
    pub day_of_week: i64,
}

impl RecurringEvent {
    pub fn new(
        name: impl Into<String>,
        location: Option<&str>,
        time_slot: impl Into<String>,
        day_of_week: i64,
    ) -> Self {
        Self {
            name: name.into(),
            teacher: None,
            location: location.map(String::from),
            time_slot: time_slot.into(),
            day_of_week,
        }
    }

    pub fn key(&self) -> EventKey {
        (self.name.clone(), self.day_of_week, self.time_slot.clone())
    }

    /// Parse the stored "HH:MM" time slot
    pub fn time_of_day(&self) -> Result<NaiveTime, ScheduleError> {
        NaiveTime::parse_from_str(self.time_slot.trim(), "%H:%M").map_err(|e| {
            ScheduleError::MalformedEventRecord {
                name: self.name.clone(),
                reason: format!("invalid time '{}': {e}", self.time_slot),
            }
        })
    }

    /// Validated ISO day number (1 = Monday)
    pub fn day_number(&self) -> Result<u32, ScheduleError> {
        match self.day_of_week {
            1..=7 => Ok(self.day_of_week as u32),
            other => Err(ScheduleError::MalformedEventRecord {
                name: self.name.clone(),
                reason: format!("day_of_week must be 1-7, got {other}"),
            }),
        }
    }

    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.day_of_week == i64::from(date.weekday().number_from_monday())
    }

    pub fn location_label(&self) -> &str {
        self.location
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or("未知地点")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_parses() {
        let event = RecurringEvent::new("Python程序设计", Some("教学楼A301"), "08:00", 1);
        assert_eq!(event.time_of_day().unwrap(), NaiveTime::from_hms_opt(8, 0, 0).unwrap());
    }

    #[test]
    fn test_malformed_time_rejected() {
        let event = RecurringEvent::new("Broken", None, "25:99", 1);
        match event.time_of_day() {
            Err(ScheduleError::MalformedEventRecord { name, .. }) => assert_eq!(name, "Broken"),
            other => panic!("expected malformed record, got {other:?}"),
        }
        assert!(RecurringEvent::new("Blank", None, "", 1).time_of_day().is_err());
    }

    #[test]
    fn test_day_number_range() {
        assert_eq!(RecurringEvent::new("a", None, "08:00", 7).day_number().unwrap(), 7);
        assert!(RecurringEvent::new("a", None, "08:00", 0).day_number().is_err());
        assert!(RecurringEvent::new("a", None, "08:00", 8).day_number().is_err());
    }

    #[test]
    fn test_occurs_on_weekday() {
        // 2024-03-04 is a Monday
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let event = RecurringEvent::new("a", None, "08:00", 1);
        assert!(event.occurs_on(monday));
        assert!(!event.occurs_on(monday.succ_opt().unwrap()));
    }

    #[test]
    fn test_location_label_fallback() {
        assert_eq!(RecurringEvent::new("a", None, "08:00", 1).location_label(), "未知地点");
        assert_eq!(RecurringEvent::new("a", Some(" "), "08:00", 1).location_label(), "未知地点");
        assert_eq!(RecurringEvent::new("a", Some("图书馆"), "08:00", 1).location_label(), "图书馆");
    }
}
