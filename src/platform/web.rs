//! Browser bindings for storage, dialogs and downloads

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use crate::export::ExportFile;
use crate::import::Prompter;
use crate::storage::{KeyValueStore, StorageError};

/// `window.localStorage`, or nothing when the browser refuses access
pub struct LocalStorage {
    inner: Option<web_sys::Storage>,
}

impl LocalStorage {
    pub fn open() -> Self {
        let inner = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if inner.is_none() {
            log::warn!("LocalStorage unavailable, changes will not persist");
        }
        Self { inner }
    }

    fn storage(&self) -> Result<&web_sys::Storage, StorageError> {
        self.inner.as_ref().ok_or(StorageError::Unavailable)
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.as_ref()?.get_item(key).ok()?
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::WriteRejected {
                key: key.to_string(),
                message: describe(&e),
            })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StorageError::WriteRejected {
                key: key.to_string(),
                message: describe(&e),
            })
    }
}

/// Best-effort text for a thrown JS value
pub fn describe(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Native `window.confirm` / `window.alert`
pub struct BrowserPrompter;

impl Prompter for BrowserPrompter {
    fn confirm(&mut self, message: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(message).ok())
            .unwrap_or(false)
    }

    fn alert(&mut self, message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }
}

/// Hand a generated file to the browser as a download
pub fn download(file: &ExportFile) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let parts = js_sys::Array::of1(&JsValue::from_str(&file.content));
    let options = BlobPropertyBag::new();
    options.set_type(file.mime);
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(file.filename);
    anchor.click();
    Url::revoke_object_url(&url)?;

    log::info!("Downloaded {} ({} bytes)", file.filename, file.content.len());
    Ok(())
}

/// Full page reload
pub fn reload() {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.location().reload() {
            log::error!("Reload failed: {}", describe(&e));
        }
    }
}

/// Decoded value of `name` in the page's query string
pub fn query_param(name: &str) -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    web_sys::UrlSearchParams::new_with_str(&search).ok()?.get(name)
}

/// `Date.now()` as an integer seed
pub fn now_seed() -> u64 {
    js_sys::Date::now() as u64
}
