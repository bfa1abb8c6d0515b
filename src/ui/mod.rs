//! Browser shell
//!
//! Builds the checklist DOM, wires its events to the core, and hosts the
//! Sticky Carrot overlay when the feature flag is on.

mod checklist;
mod overlay;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element};

use crate::model::{CompletionState, Group, default_groups};
use crate::platform::web::{LocalStorage, describe, query_param};
use crate::settings::{FeatureFlags, Settings};
use crate::store::ChecklistStore;

/// State shared by every event handler
pub struct App {
    pub groups: Vec<Group>,
    pub store: ChecklistStore<LocalStorage>,
    pub state: CompletionState,
    pub settings: Settings,
}

impl App {
    pub fn new(groups: Vec<Group>, storage: LocalStorage) -> Self {
        let settings = Settings::load(&storage);
        let store = ChecklistStore::new(storage);
        let state = store.load_completion_state();
        Self {
            groups,
            store,
            state,
            settings,
        }
    }

    /// Checkbox changed: update the record and flush the whole map
    pub fn toggle(&mut self, task_id: u32, checked: bool) {
        self.store.toggle(&mut self.state, task_id, checked);
    }

    pub fn save_settings(&mut self) {
        self.settings.save(self.store.storage_mut());
    }

    /// Flags as the next page load will see them
    pub fn feature_flags(&self) -> FeatureFlags {
        FeatureFlags::from_build(&self.settings, query_param("stickycarrot").as_deref())
    }
}

/// Entry point: logging, DOM, optional mini-game launcher
pub fn run() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);

    log::info!("Carrot Checklist starting...");

    let app = Rc::new(RefCell::new(App::new(default_groups(), LocalStorage::open())));

    if let Err(e) = checklist::mount(app.clone()) {
        log::error!("Failed to build checklist: {}", describe(&e));
        return;
    }

    let flags = app.borrow().feature_flags();
    if flags.sticky_carrot {
        if let Err(e) = overlay::install_launcher(app) {
            log::error!("Failed to install Sticky Carrot: {}", describe(&e));
        }
    }

    log::info!("Carrot Checklist running!");
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

/// Create an element with a class attribute
fn element(document: &Document, tag: &str, class: &str) -> Result<Element, JsValue> {
    let el = document.create_element(tag)?;
    if !class.is_empty() {
        el.set_class_name(class);
    }
    Ok(el)
}

/// Create an element and cast it to a concrete type
fn typed<T: JsCast>(document: &Document, tag: &str, class: &str) -> Result<T, JsValue> {
    element(document, tag, class)?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("<{}> has unexpected type", tag)))
}
