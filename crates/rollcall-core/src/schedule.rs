//! Timetable lookup: wall-clock time to class subject and time range.
//!
//! The timetable is a JSON object keyed by weekday name (`"Monday"`, ...),
//! each holding an ordered list of `{subject, start, end}` slots with
//! zero-padded 24h `"HH:MM"` times. Loading never fails: an unreadable file
//! or a non-object document degrades to a generic label. Only the current
//! day's list is interpreted, so a bad entry elsewhere in the week does not
//! affect today.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Label when the timetable has no slot covering the current time.
pub const SPECIAL_SESSION: &str = "Special Session";
/// Label when the timetable cannot be read or parsed.
pub const GENERAL_CLASS: &str = "General Class";
/// Timing shown when no slot applies.
pub const NOT_APPLICABLE: &str = "N/A";

/// One timetable entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub subject: String,
    pub start: String,
    pub end: String,
}

impl ScheduleSlot {
    /// Inclusive lexicographic range check on `"HH:MM"` strings.
    fn covers(&self, time: &str) -> bool {
        self.start.as_str() <= time && time <= self.end.as_str()
    }

    fn timing(&self) -> String {
        format!("{} - {}", self.start, self.end)
    }
}

/// Resolved subject and timing for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSlot {
    pub subject: String,
    pub timing: String,
}

impl ClassSlot {
    pub fn new(subject: impl Into<String>, timing: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            timing: timing.into(),
        }
    }
}

/// Maps a timestamp to the class slot it falls in.
#[derive(Debug, Clone, Default)]
pub struct ScheduleResolver {
    /// `None` when the timetable could not be loaded. Days stay raw JSON
    /// until they are looked up.
    timetable: Option<Map<String, Value>>,
}

impl ScheduleResolver {
    /// Load a timetable file. Failures are logged and produce a resolver
    /// that always answers with the generic label.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                let resolver = Self::from_json(&raw);
                if resolver.timetable.is_none() {
                    tracing::warn!(path = %path.display(), "timetable is not a JSON object; using generic class label");
                } else {
                    tracing::info!(path = %path.display(), days = resolver.days(), "timetable loaded");
                }
                resolver
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "timetable unreadable; using generic class label"
                );
                Self::unavailable()
            }
        }
    }

    /// Parse a timetable from JSON. Anything but an object yields an
    /// unavailable resolver; slots are validated lazily by [`Self::resolve`].
    pub fn from_json(raw: &str) -> Self {
        let timetable = match serde_json::from_str(raw) {
            Ok(Value::Object(days)) => Some(days),
            _ => None,
        };
        Self { timetable }
    }

    /// Resolver for a timetable that could not be read.
    pub fn unavailable() -> Self {
        Self { timetable: None }
    }

    pub fn is_available(&self) -> bool {
        self.timetable.is_some()
    }

    fn days(&self) -> usize {
        self.timetable.as_ref().map_or(0, Map::len)
    }

    /// Resolve the class slot for `now`. First matching slot in file order wins.
    pub fn resolve(&self, now: &NaiveDateTime) -> ClassSlot {
        let Some(timetable) = &self.timetable else {
            return ClassSlot::new(GENERAL_CLASS, NOT_APPLICABLE);
        };

        let day = now.format("%A").to_string();
        let time = now.format("%H:%M").to_string();

        let Some(entries) = timetable.get(&day) else {
            return ClassSlot::new(SPECIAL_SESSION, NOT_APPLICABLE);
        };
        let Some(entries) = entries.as_array() else {
            tracing::warn!(day = %day, "timetable day is not a list; using generic class label");
            return ClassSlot::new(GENERAL_CLASS, NOT_APPLICABLE);
        };

        for (position, entry) in entries.iter().enumerate() {
            let slot = match ScheduleSlot::deserialize(entry) {
                Ok(slot) => slot,
                Err(e) => {
                    tracing::warn!(day = %day, position, error = %e, "malformed timetable slot; using generic class label");
                    return ClassSlot::new(GENERAL_CLASS, NOT_APPLICABLE);
                }
            };
            if slot.covers(&time) {
                return ClassSlot::new(slot.subject.clone(), slot.timing());
            }
        }
        ClassSlot::new(SPECIAL_SESSION, NOT_APPLICABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const TIMETABLE: &str = r#"{
        "Monday": [
            {"subject": "Mathematics", "start": "09:00", "end": "10:00"},
            {"subject": "Physics", "start": "09:30", "end": "11:00"},
            {"subject": "Chemistry", "start": "13:00", "end": "14:00"}
        ],
        "Tuesday": [
            {"subject": "Biology", "start": "08:00", "end": "09:00"}
        ]
    }"#;

    /// 2024-01-01 was a Monday.
    fn monday_at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_slot_match() {
        let resolver = ScheduleResolver::from_json(TIMETABLE);
        assert_eq!(
            resolver.resolve(&monday_at(13, 30)),
            ClassSlot::new("Chemistry", "13:00 - 14:00")
        );
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let resolver = ScheduleResolver::from_json(TIMETABLE);
        assert_eq!(resolver.resolve(&monday_at(13, 0)).subject, "Chemistry");
        assert_eq!(resolver.resolve(&monday_at(14, 0)).subject, "Chemistry");
        assert_eq!(resolver.resolve(&monday_at(14, 1)).subject, SPECIAL_SESSION);
    }

    #[test]
    fn test_overlap_first_slot_wins() {
        let resolver = ScheduleResolver::from_json(TIMETABLE);
        assert_eq!(resolver.resolve(&monday_at(9, 45)).subject, "Mathematics");
        assert_eq!(resolver.resolve(&monday_at(10, 30)).subject, "Physics");
    }

    #[test]
    fn test_no_slot_is_special_session() {
        let resolver = ScheduleResolver::from_json(TIMETABLE);
        assert_eq!(
            resolver.resolve(&monday_at(18, 0)),
            ClassSlot::new(SPECIAL_SESSION, NOT_APPLICABLE)
        );
    }

    #[test]
    fn test_day_without_entries_is_special_session() {
        let resolver = ScheduleResolver::from_json(TIMETABLE);
        // 2024-01-06 was a Saturday.
        let saturday = NaiveDate::from_ymd_opt(2024, 1, 6)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(resolver.resolve(&saturday).subject, SPECIAL_SESSION);
    }

    #[test]
    fn test_malformed_timetable_is_general_class() {
        for raw in ["not json", "[1, 2]", r#"{"Monday": "#] {
            let resolver = ScheduleResolver::from_json(raw);
            assert!(!resolver.is_available());
            assert_eq!(
                resolver.resolve(&monday_at(9, 30)),
                ClassSlot::new(GENERAL_CLASS, NOT_APPLICABLE)
            );
        }
    }

    #[test]
    fn test_bad_slot_today_is_general_class() {
        let resolver = ScheduleResolver::from_json(r#"{"Monday": [{"subject": 3}]}"#);
        assert!(resolver.is_available());
        assert_eq!(
            resolver.resolve(&monday_at(9, 30)),
            ClassSlot::new(GENERAL_CLASS, NOT_APPLICABLE)
        );
    }

    #[test]
    fn test_bad_slot_on_other_day_is_ignored() {
        let resolver = ScheduleResolver::from_json(
            r#"{
                "Monday": [{"subject": "Math", "start": "09:00", "end": "10:00"}],
                "Tuesday": [{"subject": "Lab"}],
                "version": 2
            }"#,
        );
        assert_eq!(
            resolver.resolve(&monday_at(9, 30)),
            ClassSlot::new("Math", "09:00 - 10:00")
        );
        assert_eq!(resolver.resolve(&monday_at(11, 0)).subject, SPECIAL_SESSION);
    }

    #[test]
    fn test_bad_slot_after_match_is_not_reached() {
        let resolver = ScheduleResolver::from_json(
            r#"{"Monday": [
                {"subject": "Math", "start": "09:00", "end": "10:00"},
                {"subject": "Lab", "start": 11}
            ]}"#,
        );
        assert_eq!(resolver.resolve(&monday_at(9, 30)).subject, "Math");
        assert_eq!(resolver.resolve(&monday_at(10, 30)).subject, GENERAL_CLASS);
    }

    #[test]
    fn test_day_that_is_not_a_list_is_general_class() {
        let resolver = ScheduleResolver::from_json(r#"{"Monday": {"subject": "Math"}}"#);
        assert_eq!(resolver.resolve(&monday_at(9, 30)).subject, GENERAL_CLASS);
    }

    #[test]
    fn test_missing_file_is_general_class() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ScheduleResolver::load(&dir.path().join("timetable.json"));
        for hour in [0, 9, 13, 23] {
            assert_eq!(
                resolver.resolve(&monday_at(hour, 15)),
                ClassSlot::new(GENERAL_CLASS, NOT_APPLICABLE)
            );
        }
    }

    #[test]
    fn test_resolve_is_idempotent_within_a_minute() {
        let resolver = ScheduleResolver::from_json(TIMETABLE);
        let a = monday_at(9, 15);
        let b = a + chrono::Duration::seconds(42);
        assert_eq!(resolver.resolve(&a), resolver.resolve(&b));
    }
}
