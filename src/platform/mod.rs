//! Platform abstraction layer
//!
//! Browser-side implementations of the core's seams:
//! - Storage (LocalStorage)
//! - User prompts (`confirm` / `alert`)
//! - File download and page reload

#[cfg(target_arch = "wasm32")]
pub mod web;
