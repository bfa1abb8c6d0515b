//! Checklist export
//!
//! Both exporters are pure functions of groups, completion state and note.
//! Delivering the file (browser download, disk write) is the caller's job.

pub mod csv;
pub mod summary;

pub use csv::export_csv;
pub use summary::{SummaryCard, export_summary_document};

/// A generated file ready to hand to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: &'static str,
    pub mime: &'static str,
    pub content: String,
}
