//! Per-event, per-day record of fired reminders.
//!
//! Each entry maps an event to the occurrence date its reminder last fired
//! for. At most one reminder per event and occurrence date is ever emitted.
//!
//! Reset policy: on the first observation of a new local date, entries whose
//! occurrence date is before that date are dropped. Entries for today or a
//! later date (an event just after midnight is reminded the evening before)
//! are kept.

use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Mutex;

use super::EventKey;

#[derive(Debug, Default)]
pub struct ReminderFiredState {
    fired: DashMap<EventKey, NaiveDate>,
    current_date: Mutex<Option<NaiveDate>>,
}

impl ReminderFiredState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `key` fires for `occurrence`.
    ///
    /// Returns false when it has already fired for that date.
    pub fn try_mark(&self, key: EventKey, occurrence: NaiveDate) -> bool {
        match self.fired.entry(key) {
            Entry::Occupied(mut entry) => {
                if *entry.get() == occurrence {
                    false
                } else {
                    entry.insert(occurrence);
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(occurrence);
                true
            }
        }
    }

    pub fn has_fired(&self, key: &EventKey, occurrence: NaiveDate) -> bool {
        self.fired
            .get(key)
            .map(|date| *date == occurrence)
            .unwrap_or(false)
    }

    /// Apply the midnight reset when `today` differs from the last seen date.
    ///
    /// Returns the number of pruned entries.
    pub fn roll_over(&self, today: NaiveDate) -> usize {
        let mut current = self.current_date.lock().unwrap_or_else(|e| e.into_inner());
        if *current == Some(today) {
            return 0;
        }
        *current = Some(today);

        let before = self.fired.len();
        self.fired.retain(|_, occurrence| *occurrence >= today);
        before - self.fired.len()
    }

    pub fn len(&self) -> usize {
        self.fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> EventKey {
        (name.to_string(), 1, "08:00".to_string())
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_marks_once_per_date() {
        let state = ReminderFiredState::new();
        assert!(state.try_mark(key("a"), date(4)));
        assert!(!state.try_mark(key("a"), date(4)));
        assert!(state.has_fired(&key("a"), date(4)));
        // Same event a week later fires again
        assert!(state.try_mark(key("a"), date(11)));
    }

    #[test]
    fn test_events_are_independent() {
        let state = ReminderFiredState::new();
        assert!(state.try_mark(key("a"), date(4)));
        assert!(state.try_mark(key("b"), date(4)));
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_roll_over_prunes_past_dates_only() {
        let state = ReminderFiredState::new();
        assert_eq!(state.roll_over(date(4)), 0);
        state.try_mark(key("today"), date(4));
        state.try_mark(key("tomorrow"), date(5));

        // Same date: nothing happens
        assert_eq!(state.roll_over(date(4)), 0);
        assert_eq!(state.len(), 2);

        assert_eq!(state.roll_over(date(5)), 1);
        assert!(!state.has_fired(&key("today"), date(4)));
        assert!(state.has_fired(&key("tomorrow"), date(5)));
    }
}
