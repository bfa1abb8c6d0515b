//! Carrot Checklist entry point
//!
//! In the browser this mounts the widget. Natively it exports a stored
//! checklist to CSV and HTML.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    carrot_checklist::ui::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Export a saved Carrot Checklist to checklist.csv and checklist.html
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, clap::Parser)]
#[command(name = "carrot-checklist", version, about, long_about = None)]
struct Args {
    /// JSON file holding the gcc_tasks / gcc_notes entries
    #[arg(default_value = "checklist-store.json")]
    store: std::path::PathBuf,

    /// Directory the exported files are written to
    #[arg(default_value = ".")]
    out_dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::init();
    let args = Args::parse();
    log::info!("Carrot Checklist (native) starting...");

    if let Err(e) = export_store(&args.store, &args.out_dir) {
        log::error!("Export failed: {}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Write `checklist.csv` and `checklist.html` for the checklist kept in `store_path`
#[cfg(not(target_arch = "wasm32"))]
fn export_store(store_path: &std::path::Path, out_dir: &std::path::Path) -> std::io::Result<()> {
    use carrot_checklist::storage::JsonFileStore;
    use carrot_checklist::{ChecklistStore, default_groups, export_csv, export_summary_document};

    let store = ChecklistStore::new(JsonFileStore::open(store_path));
    let groups = default_groups();
    let state = store.load_completion_state();
    let note = store.load_note();

    std::fs::create_dir_all(out_dir)?;
    for file in [
        export_csv(&groups, &state, &note),
        export_summary_document(&groups, &state, &note)?,
    ] {
        let path = out_dir.join(file.filename);
        std::fs::write(&path, &file.content)?;
        log::info!("Wrote {}", path.display());
        println!("{}", path.display());
    }
    Ok(())
}
