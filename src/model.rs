//! Checklist data model
//!
//! Tasks and groups come from configuration and never change at runtime.
//! Completion records are the only user-owned data.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A single checklist item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable identifier, also the key in persisted state
    pub id: u32,
    pub text: String,
    pub points: u32,
}

impl Task {
    pub fn new(id: u32, text: impl Into<String>, points: u32) -> Self {
        Self {
            id,
            text: text.into(),
            points,
        }
    }
}

/// Named, ordered collection of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub title: String,
    pub tasks: Vec<Task>,
}

impl Group {
    pub fn new(title: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            title: title.into(),
            tasks,
        }
    }
}

/// The built-in classroom checklist
pub fn default_groups() -> Vec<Group> {
    vec![
        Group::new(
            "Readiness",
            vec![
                Task::new(1, "Safe hands & feet", 2),
                Task::new(2, "Ask for help", 2),
            ],
        ),
        Group::new(
            "Self\u{2011}management",
            vec![
                Task::new(3, "Try the steps", 2),
                Task::new(4, "Take breaks", 1),
                Task::new(5, "Fix mistakes", 1),
            ],
        ),
    ]
}

/// Iterate all tasks in group-then-task order
pub fn all_tasks(groups: &[Group]) -> impl Iterator<Item = &Task> {
    groups.iter().flat_map(|g| g.tasks.iter())
}

/// Per-task completion flag and timestamp
///
/// `completed_at` is present only while `completed` is true.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl CompletionRecord {
    pub fn done(at: impl Into<String>) -> Self {
        Self {
            completed: true,
            completed_at: Some(at.into()),
        }
    }

    pub fn undone() -> Self {
        Self {
            completed: false,
            completed_at: None,
        }
    }

    /// Drop a stray timestamp on an incomplete record
    pub fn normalized(mut self) -> Self {
        if !self.completed {
            self.completed_at = None;
        }
        self
    }
}

/// Task id -> completion record
///
/// Serializes as a JSON object keyed by the stringified task id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionState {
    records: BTreeMap<u32, CompletionRecord>,
}

impl CompletionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u32) -> Option<&CompletionRecord> {
        self.records.get(&id)
    }

    pub fn insert(&mut self, id: u32, record: CompletionRecord) {
        self.records.insert(id, record);
    }

    /// Absent records count as not completed
    pub fn is_completed(&self, id: u32) -> bool {
        self.records.get(&id).is_some_and(|r| r.completed)
    }

    /// Apply a checkbox toggle
    pub fn set_completed(&mut self, id: u32, checked: bool, now: &str) {
        let record = if checked {
            CompletionRecord::done(now)
        } else {
            CompletionRecord::undone()
        };
        self.records.insert(id, record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &CompletionRecord)> {
        self.records.iter().map(|(id, r)| (*id, r))
    }
}

impl FromIterator<(u32, CompletionRecord)> for CompletionState {
    fn from_iter<I: IntoIterator<Item = (u32, CompletionRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Sum of points over tasks marked completed
pub fn total_points(groups: &[Group], state: &CompletionState) -> u64 {
    all_tasks(groups)
        .filter(|t| state.is_completed(t.id))
        .map(|t| u64::from(t.points))
        .sum()
}

/// Current UTC time in `Date.toISOString()` form (millisecond precision, `Z` suffix)
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_on_sets_timestamp() {
        let mut state = CompletionState::new();
        state.set_completed(3, true, "2024-01-01T00:00:00.000Z");

        let record = state.get(3).unwrap();
        assert!(record.completed);
        assert_eq!(
            record.completed_at.as_deref(),
            Some("2024-01-01T00:00:00.000Z")
        );
    }

    #[test]
    fn test_toggle_off_clears_timestamp() {
        let mut state = CompletionState::new();
        state.set_completed(3, true, "2024-01-01T00:00:00.000Z");
        state.set_completed(3, false, "2024-01-02T00:00:00.000Z");

        let record = state.get(3).unwrap();
        assert!(!record.completed);
        assert!(record.completed_at.is_none());

        // Must not serialize a stale timestamp either
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"3":{"completed":false}}"#);
    }

    #[test]
    fn test_absent_record_not_completed() {
        let state = CompletionState::new();
        assert!(!state.is_completed(42));
    }

    #[test]
    fn test_state_json_shape() {
        let state: CompletionState = serde_json::from_str(
            r#"{"1":{"completed":true,"completedAt":"2024-01-01T00:00:00.000Z"},"2":{"completed":false}}"#,
        )
        .unwrap();
        assert!(state.is_completed(1));
        assert!(!state.is_completed(2));
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_total_points_counts_only_completed() {
        let groups = default_groups();
        let mut state = CompletionState::new();
        state.set_completed(1, true, "t");
        state.set_completed(4, true, "t");
        state.set_completed(2, false, "t");

        // 2 (task 1) + 1 (task 4); task 2 is explicitly incomplete, 3 and 5 untouched
        assert_eq!(total_points(&groups, &state), 3);
    }

    #[test]
    fn test_total_points_ignores_unknown_ids() {
        let groups = default_groups();
        let mut state = CompletionState::new();
        state.set_completed(99, true, "t");
        assert_eq!(total_points(&groups, &state), 0);
    }

    #[test]
    fn test_normalized_drops_stray_timestamp() {
        let record = CompletionRecord {
            completed: false,
            completed_at: Some("x".to_string()),
        };
        assert_eq!(record.normalized(), CompletionRecord::undone());
    }

    #[test]
    fn test_now_iso_format() {
        let now = now_iso();
        // 2024-01-01T00:00:00.000Z
        assert_eq!(now.len(), 24);
        assert!(now.ends_with('Z'));
        assert_eq!(&now[19..20], ".");
    }

    #[test]
    fn test_default_groups_ids_unique() {
        let groups = default_groups();
        let mut ids: Vec<u32> = all_tasks(&groups).map(|t| t.id).collect();
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
        assert_eq!(count, 5);
    }
}
