//! Carrot Checklist - a classroom checklist widget
//!
//! Core modules:
//! - `model`: Tasks, groups and completion records
//! - `storage`: Key-value storage backends
//! - `store`: Checklist state persistence (best-effort)
//! - `export`: CSV and HTML summary export
//! - `import`: JSON import with confirmation
//! - `raster`: Software canvas for the summary image
//! - `settings`: Persisted preferences and feature flags
//! - `game`: Sticky Carrot brush-and-reveal mini-game
//! - `platform` / `ui` / `audio`: Browser shell (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod export;
pub mod game;
pub mod import;
pub mod model;
pub mod platform;
pub mod raster;
pub mod settings;
pub mod storage;
pub mod store;
#[cfg(target_arch = "wasm32")]
pub mod ui;

pub use export::{ExportFile, export_csv, export_summary_document};
pub use import::{ImportError, ImportOutcome, Prompter, import_document};
pub use model::{CompletionRecord, CompletionState, Group, Task, default_groups};
pub use settings::{FeatureFlags, Settings};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use store::ChecklistStore;
