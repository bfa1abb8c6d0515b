//! Checklist state store
//!
//! Loads and saves completion records and the free-text note through an
//! injected [`KeyValueStore`].
//!
//! Reads and writes are best-effort, not transactional:
//! - a missing key, corrupt value, or unreachable backend loads as the empty default
//! - a failed write is logged and dropped
//!
//! The only path that reports write failures is [`ChecklistStore::replace_all`],
//! used by import.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::{CompletionState, now_iso};
use crate::storage::{KeyValueStore, StorageError};

/// Storage key for the completion map
pub const TASKS_KEY: &str = "gcc_tasks";
/// Storage key for the note
pub const NOTES_KEY: &str = "gcc_notes";

/// Completion state and note persistence
#[derive(Debug)]
pub struct ChecklistStore<S> {
    storage: S,
}

impl<S: KeyValueStore> ChecklistStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Load the completion map, empty on any failure
    pub fn load_completion_state(&self) -> CompletionState {
        let state: CompletionState = load_json_or_default(&self.storage, TASKS_KEY);
        log::info!("Loaded {} completion records", state.len());
        state
    }

    /// Write the whole completion map (best-effort)
    pub fn save_completion_state(&mut self, state: &CompletionState) {
        let result = write_json(&mut self.storage, TASKS_KEY, state);
        drop_write_error(TASKS_KEY, result);
    }

    /// Load the note, `""` on any failure
    pub fn load_note(&self) -> String {
        self.storage.get(NOTES_KEY).unwrap_or_default()
    }

    /// Write the note (best-effort)
    pub fn save_note(&mut self, text: &str) {
        let result = self.storage.set(NOTES_KEY, text);
        drop_write_error(NOTES_KEY, result);
    }

    /// Apply a checkbox toggle stamped with the current time and flush the map
    pub fn toggle(&mut self, state: &mut CompletionState, task_id: u32, checked: bool) {
        state.set_completed(task_id, checked, &now_iso());
        self.save_completion_state(state);
    }

    /// Replace tasks and/or note as one unit
    ///
    /// Both keys stay separate in storage. If the second write fails the first
    /// is restored to its previous value before the error is returned.
    pub fn replace_all(
        &mut self,
        tasks: Option<&CompletionState>,
        note: Option<&str>,
    ) -> Result<(), StorageError> {
        let tasks_json = tasks.map(serde_json::to_string).transpose()?;
        let previous_tasks = self.storage.get(TASKS_KEY);

        if let Some(json) = &tasks_json {
            self.storage.set(TASKS_KEY, json)?;
        }

        if let Some(note) = note {
            if let Err(e) = self.storage.set(NOTES_KEY, note) {
                if tasks_json.is_some() {
                    self.restore(TASKS_KEY, previous_tasks);
                }
                return Err(e);
            }
        }

        Ok(())
    }

    fn restore(&mut self, key: &str, previous: Option<String>) {
        let result = match previous {
            Some(value) => self.storage.set(key, &value),
            None => self.storage.remove(key),
        };
        if let Err(e) = result {
            log::error!("Rollback of '{}' failed, stored value may be stale: {}", key, e);
        }
    }
}

fn load_json_or_default<T: DeserializeOwned + Default>(storage: &impl KeyValueStore, key: &str) -> T {
    let Some(json) = storage.get(key) else {
        return T::default();
    };
    if json.is_empty() {
        return T::default();
    }
    match serde_json::from_str(&json) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Ignoring corrupt value under '{}': {}", key, e);
            T::default()
        }
    }
}

fn write_json<T: Serialize>(
    storage: &mut impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;
    storage.set(key, &json)
}

fn drop_write_error(key: &str, result: Result<(), StorageError>) {
    if let Err(e) = result {
        log::warn!("Could not save '{}': {}", key, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CompletionRecord;
    use crate::storage::{FailureMode, MemoryStore};
    use proptest::prelude::*;

    fn sample_state() -> CompletionState {
        let mut state = CompletionState::new();
        state.set_completed(1, true, "2024-01-01T00:00:00.000Z");
        state.set_completed(2, false, "ignored");
        state
    }

    #[test]
    fn test_load_missing_is_empty() {
        let store = ChecklistStore::new(MemoryStore::new());
        assert!(store.load_completion_state().is_empty());
        assert_eq!(store.load_note(), "");
    }

    #[test]
    fn test_load_corrupt_is_empty() {
        let store = ChecklistStore::new(MemoryStore::with_entries([(TASKS_KEY, "{not json")]));
        assert!(store.load_completion_state().is_empty());
    }

    #[test]
    fn test_load_empty_string_is_empty() {
        let store = ChecklistStore::new(MemoryStore::with_entries([(TASKS_KEY, "")]));
        assert!(store.load_completion_state().is_empty());
    }

    #[test]
    fn test_load_unavailable_is_default() {
        let mut storage = MemoryStore::with_entries([(NOTES_KEY, "hi"), (TASKS_KEY, "{}")]);
        storage.set_failure_mode(FailureMode::Unavailable);
        let store = ChecklistStore::new(storage);
        assert!(store.load_completion_state().is_empty());
        assert_eq!(store.load_note(), "");
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let mut storage = MemoryStore::new();
        storage.set_failure_mode(FailureMode::RejectWrites);
        let mut store = ChecklistStore::new(storage);

        store.save_completion_state(&sample_state());
        store.save_note("lost");

        assert!(store.storage().entries().is_empty());
    }

    #[test]
    fn test_storage_layout() {
        let mut store = ChecklistStore::new(MemoryStore::new());
        store.save_completion_state(&sample_state());
        store.save_note("line one\nline two");

        let entries = store.storage().entries();
        assert_eq!(
            entries.get(TASKS_KEY).map(String::as_str),
            Some(r#"{"1":{"completed":true,"completedAt":"2024-01-01T00:00:00.000Z"},"2":{"completed":false}}"#)
        );
        // Notes are stored raw, not JSON encoded
        assert_eq!(entries.get(NOTES_KEY).map(String::as_str), Some("line one\nline two"));
    }

    #[test]
    fn test_toggle_flushes_and_clears_timestamp() {
        let mut store = ChecklistStore::new(MemoryStore::new());
        let mut state = store.load_completion_state();

        store.toggle(&mut state, 4, true);
        let loaded = store.load_completion_state();
        let record = loaded.get(4).unwrap();
        assert!(record.completed);
        assert!(record.completed_at.as_deref().is_some_and(|t| !t.is_empty()));

        store.toggle(&mut state, 4, false);
        let loaded = store.load_completion_state();
        assert_eq!(loaded.get(4), Some(&CompletionRecord::undone()));
    }

    #[test]
    fn test_replace_all_writes_both() {
        let mut store = ChecklistStore::new(MemoryStore::new());
        store.replace_all(Some(&sample_state()), Some("new")).unwrap();
        assert_eq!(store.load_completion_state(), sample_state());
        assert_eq!(store.load_note(), "new");
    }

    #[test]
    fn test_replace_all_rolls_back_tasks_when_note_fails() {
        let mut store = ChecklistStore::new(MemoryStore::with_entries([
            (TASKS_KEY, r#"{"5":{"completed":false}}"#),
            (NOTES_KEY, "old"),
        ]));
        let before = store.storage().entries().clone();
        store
            .storage_mut()
            .set_failure_mode(FailureMode::RejectKey(NOTES_KEY));

        let result = store.replace_all(Some(&sample_state()), Some("new"));

        assert!(result.is_err());
        assert_eq!(store.storage().entries(), &before);
    }

    #[test]
    fn test_replace_all_rollback_removes_key_that_did_not_exist() {
        let mut storage = MemoryStore::new();
        storage.set_failure_mode(FailureMode::RejectKey(NOTES_KEY));
        let mut store = ChecklistStore::new(storage);

        assert!(store.replace_all(Some(&sample_state()), Some("new")).is_err());
        assert!(store.storage().entries().is_empty());
    }

    #[test]
    fn test_replace_all_note_only_leaves_tasks() {
        let mut store = ChecklistStore::new(MemoryStore::new());
        store.save_completion_state(&sample_state());
        store.replace_all(None, Some("only note")).unwrap();
        assert_eq!(store.load_completion_state(), sample_state());
        assert_eq!(store.load_note(), "only note");
    }

    fn arb_record() -> impl Strategy<Value = CompletionRecord> {
        prop_oneof![
            Just(CompletionRecord::undone()),
            "[0-9T:.Z-]{1,30}".prop_map(|at: String| CompletionRecord::done(at)),
        ]
    }

    proptest! {
        #[test]
        fn prop_completion_state_roundtrips(
            entries in proptest::collection::vec((any::<u32>(), arb_record()), 0..20)
        ) {
            let state: CompletionState = entries.into_iter().collect();
            let mut store = ChecklistStore::new(MemoryStore::new());
            store.save_completion_state(&state);
            prop_assert_eq!(store.load_completion_state(), state);
        }

        #[test]
        fn prop_note_roundtrips(note in any::<String>()) {
            let mut store = ChecklistStore::new(MemoryStore::new());
            store.save_note(&note);
            prop_assert_eq!(store.load_note(), note);
        }
    }
}
