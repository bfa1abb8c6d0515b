//! JSON import
//!
//! Accepts `{ "tasks"?: {...}, "notes"?: "..." }`, asks for confirmation, and
//! replaces persisted state. The file picker, file reading and the page reload
//! afterwards belong to the caller; everything between is here.

use serde_json::Value;
use thiserror::Error;

use crate::model::{CompletionRecord, CompletionState};
use crate::storage::{KeyValueStore, StorageError};
use crate::store::ChecklistStore;

pub const CONFIRM_MESSAGE: &str = "Importing will delete existing data. Continue?";
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON";
pub const SAVE_FAILED_MESSAGE: &str = "Could not save imported data";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid import document: {0}")]
    InvalidShape(String),

    #[error("could not save imported data: {0}")]
    Storage(#[from] StorageError),
}

/// Blocking user dialogs (`confirm` / `alert` in the browser)
pub trait Prompter {
    fn confirm(&mut self, message: &str) -> bool;
    fn alert(&mut self, message: &str);
}

/// How an import attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// State replaced; the caller should reload
    Applied,
    /// User declined the confirmation
    Declined,
    /// Document did not parse or had the wrong shape
    Rejected,
    /// Write failed; stored state was rolled back
    Failed,
}

/// A validated import document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportDocument {
    pub tasks: Option<CompletionState>,
    pub notes: Option<String>,
}

impl ImportDocument {
    /// Parse and validate
    ///
    /// `tasks` (when present and not null) must map canonical numeric task ids
    /// to completion records, and completed records must carry a timestamp. `notes` is taken only when it is a string; any
    /// other value is ignored.
    pub fn parse(text: &str) -> Result<Self, ImportError> {
        let value: Value = serde_json::from_str(text)?;

        let tasks = match value.get("tasks") {
            None | Some(Value::Null) => None,
            Some(tasks) => Some(parse_tasks(tasks)?),
        };
        let notes = value
            .get("notes")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self { tasks, notes })
    }
}

fn parse_tasks(value: &Value) -> Result<CompletionState, ImportError> {
    let Value::Object(map) = value else {
        return Err(ImportError::InvalidShape(
            "\"tasks\" must be an object".to_string(),
        ));
    };

    map.iter()
        .map(|(key, record)| {
            let id = key
                .parse::<u32>()
                .ok()
                .filter(|id| id.to_string() == *key)
                .ok_or_else(|| ImportError::InvalidShape(format!("task id '{}' is not a number", key)))?;
            let record: CompletionRecord = serde_json::from_value(record.clone())
                .map_err(|e| ImportError::InvalidShape(format!("task {}: {}", id, e)))?;
            if record.completed && record.completed_at.as_deref().is_none_or(str::is_empty) {
                return Err(ImportError::InvalidShape(format!(
                    "task {}: completed without completedAt",
                    id
                )));
            }
            Ok((id, record.normalized()))
        })
        .collect()
}

/// Parse, confirm, and write
///
/// Storage is untouched unless the document is valid and the user confirmed.
pub fn apply_import<S: KeyValueStore>(
    text: &str,
    store: &mut ChecklistStore<S>,
    prompter: &mut impl Prompter,
) -> Result<ImportOutcome, ImportError> {
    let doc = ImportDocument::parse(text)?;

    if !prompter.confirm(CONFIRM_MESSAGE) {
        log::info!("Import declined");
        return Ok(ImportOutcome::Declined);
    }

    store.replace_all(doc.tasks.as_ref(), doc.notes.as_deref())?;
    log::info!(
        "Imported {} completion records{}",
        doc.tasks.as_ref().map_or(0, CompletionState::len),
        if doc.notes.is_some() { " and notes" } else { "" }
    );
    Ok(ImportOutcome::Applied)
}

/// [`apply_import`] with failures reported to the user instead of returned
pub fn import_document<S: KeyValueStore>(
    text: &str,
    store: &mut ChecklistStore<S>,
    prompter: &mut impl Prompter,
) -> ImportOutcome {
    match apply_import(text, store, prompter) {
        Ok(outcome) => outcome,
        Err(e @ (ImportError::InvalidJson(_) | ImportError::InvalidShape(_))) => {
            log::warn!("Import rejected: {}", e);
            prompter.alert(INVALID_JSON_MESSAGE);
            ImportOutcome::Rejected
        }
        Err(e @ ImportError::Storage(_)) => {
            log::warn!("Import failed: {}", e);
            prompter.alert(SAVE_FAILED_MESSAGE);
            ImportOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FailureMode, MemoryStore};
    use crate::store::{NOTES_KEY, TASKS_KEY};

    /// Answers confirms from a fixed value and records every prompt
    #[derive(Default)]
    struct ScriptedPrompter {
        answer: bool,
        confirms: Vec<String>,
        alerts: Vec<String>,
    }

    impl ScriptedPrompter {
        fn answering(answer: bool) -> Self {
            Self {
                answer,
                ..Default::default()
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn confirm(&mut self, message: &str) -> bool {
            self.confirms.push(message.to_string());
            self.answer
        }

        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }
    }

    fn seeded_store() -> ChecklistStore<MemoryStore> {
        ChecklistStore::new(MemoryStore::with_entries([
            (TASKS_KEY, r#"{"1":{"completed":true,"completedAt":"2024-01-01T00:00:00.000Z"}}"#),
            (NOTES_KEY, "old note"),
        ]))
    }

    #[test]
    fn test_applies_tasks_and_notes() {
        let mut store = seeded_store();
        let mut prompter = ScriptedPrompter::answering(true);

        let outcome = import_document(
            r#"{"tasks":{"2":{"completed":true,"completedAt":"2025-05-05T05:05:05.000Z"}},"notes":"fresh"}"#,
            &mut store,
            &mut prompter,
        );

        assert_eq!(outcome, ImportOutcome::Applied);
        assert_eq!(prompter.confirms, [CONFIRM_MESSAGE]);
        let state = store.load_completion_state();
        assert!(!state.is_completed(1));
        assert!(state.is_completed(2));
        assert_eq!(store.load_note(), "fresh");
    }

    #[test]
    fn test_malformed_json_leaves_storage_identical() {
        let mut store = seeded_store();
        let before = store.storage().entries().clone();
        let mut prompter = ScriptedPrompter::answering(true);

        let outcome = import_document("{\"tasks\": ", &mut store, &mut prompter);

        assert_eq!(outcome, ImportOutcome::Rejected);
        assert_eq!(prompter.alerts, [INVALID_JSON_MESSAGE]);
        assert!(prompter.confirms.is_empty());
        assert_eq!(store.storage().entries(), &before);
    }

    #[test]
    fn test_declined_leaves_storage_identical() {
        let mut store = seeded_store();
        let before = store.storage().entries().clone();
        let mut prompter = ScriptedPrompter::answering(false);

        let outcome = import_document(r#"{"tasks":{},"notes":"x"}"#, &mut store, &mut prompter);

        assert_eq!(outcome, ImportOutcome::Declined);
        assert!(prompter.alerts.is_empty());
        assert_eq!(store.storage().entries(), &before);
    }

    #[test]
    fn test_bad_tasks_shape_rejected_before_confirm() {
        let mut store = seeded_store();
        let before = store.storage().entries().clone();

        for text in [
            r#"{"tasks":[1,2,3]}"#,
            r#"{"tasks":{"abc":{"completed":true}}}"#,
            r#"{"tasks":{"1":{"completed":"yes"}}}"#,
            r#"{"tasks":{"1":{"completedAt":"x"}}}"#,
            r#"{"tasks":{"1":{"completed":true}}}"#,
            r#"{"tasks":{"1":{"completed":true,"completedAt":""}}}"#,
            r#"{"tasks":{"+1":{"completed":false}}}"#,
            r#"{"tasks":{"01":{"completed":false}}}"#,
        ] {
            let mut prompter = ScriptedPrompter::answering(true);
            let outcome = import_document(text, &mut store, &mut prompter);
            assert_eq!(outcome, ImportOutcome::Rejected, "{}", text);
            assert!(prompter.confirms.is_empty());
        }
        assert_eq!(store.storage().entries(), &before);
    }

    #[test]
    fn test_empty_tasks_object_clears_state() {
        let mut store = seeded_store();
        let mut prompter = ScriptedPrompter::answering(true);

        import_document(r#"{"tasks":{}}"#, &mut store, &mut prompter);

        assert!(store.load_completion_state().is_empty());
        // Notes absent from the document stay as they were
        assert_eq!(store.load_note(), "old note");
    }

    #[test]
    fn test_non_string_notes_ignored() {
        let mut store = seeded_store();
        let tasks_before = store.storage().entries().get(TASKS_KEY).cloned();
        let mut prompter = ScriptedPrompter::answering(true);

        let outcome = import_document(r#"{"notes":42,"tasks":null}"#, &mut store, &mut prompter);

        assert_eq!(outcome, ImportOutcome::Applied);
        assert_eq!(store.load_note(), "old note");
        assert_eq!(store.storage().entries().get(TASKS_KEY).cloned(), tasks_before);
    }

    #[test]
    fn test_incomplete_record_timestamp_dropped() {
        let doc = ImportDocument::parse(
            r#"{"tasks":{"3":{"completed":false,"completedAt":"2024-01-01T00:00:00.000Z"}}}"#,
        )
        .unwrap();
        let tasks = doc.tasks.unwrap();
        assert_eq!(tasks.get(3), Some(&CompletionRecord::undone()));
    }

    #[test]
    fn test_aliased_ids_do_not_fold_together() {
        let err = ImportDocument::parse(
            r#"{"tasks":{"1":{"completed":false},"+1":{"completed":false},"01":{"completed":false}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ImportError::InvalidShape(_)));

        let doc = ImportDocument::parse(r#"{"tasks":{"0":{"completed":false},"10":{"completed":false}}}"#)
            .unwrap();
        assert_eq!(doc.tasks.unwrap().len(), 2);
    }

    #[test]
    fn test_non_object_document_has_no_fields() {
        let doc = ImportDocument::parse("[1, 2]").unwrap();
        assert_eq!(doc, ImportDocument::default());
    }

    #[test]
    fn test_storage_failure_rolls_back_and_alerts() {
        let mut store = seeded_store();
        let before = store.storage().entries().clone();
        store
            .storage_mut()
            .set_failure_mode(FailureMode::RejectKey(NOTES_KEY));
        let mut prompter = ScriptedPrompter::answering(true);

        let outcome = import_document(r#"{"tasks":{},"notes":"new"}"#, &mut store, &mut prompter);

        assert_eq!(outcome, ImportOutcome::Failed);
        assert_eq!(prompter.alerts, [SAVE_FAILED_MESSAGE]);
        assert_eq!(store.storage().entries(), &before);
    }

    #[test]
    fn test_apply_import_surfaces_typed_errors() {
        let mut store = seeded_store();
        let mut prompter = ScriptedPrompter::answering(true);
        let err = apply_import("nope", &mut store, &mut prompter).unwrap_err();
        assert!(matches!(err, ImportError::InvalidJson(_)));
    }
}
