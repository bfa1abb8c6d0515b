//! CSV export: one row per task, every field quoted

use super::ExportFile;
use crate::model::{CompletionState, Group, all_tasks};

pub const CSV_FILENAME: &str = "checklist.csv";
pub const CSV_HEADER: &str = "id,text,completed,timestamp,points,note";

/// Flatten all tasks into `checklist.csv`
///
/// The note has no natural place in a per-task table, so it is repeated on
/// every row with newlines collapsed to spaces.
pub fn export_csv(groups: &[Group], state: &CompletionState, note: &str) -> ExportFile {
    let note = note.replace('\n', " ");

    let mut lines = vec![CSV_HEADER.to_string()];
    for task in all_tasks(groups) {
        let record = state.get(task.id);
        let completed = if record.is_some_and(|r| r.completed) {
            "yes"
        } else {
            "no"
        };
        let timestamp = record
            .and_then(|r| r.completed_at.as_deref())
            .unwrap_or_default();

        let fields = [
            task.id.to_string(),
            task.text.clone(),
            completed.to_string(),
            timestamp.to_string(),
            task.points.to_string(),
            note.clone(),
        ];
        let row: Vec<String> = fields.iter().map(|f| quote(f)).collect();
        lines.push(row.join(","));
    }

    ExportFile {
        filename: CSV_FILENAME,
        mime: "text/csv",
        content: lines.join("\n"),
    }
}

/// Wrap in double quotes, doubling embedded quotes
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
