//! Checklist view: grouped checkboxes, notes box and the "More" menu

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, Event, HtmlButtonElement, HtmlInputElement, HtmlTextAreaElement};

use super::{App, document, element, typed};
use crate::export::{ExportFile, export_csv, export_summary_document};
use crate::import::{ImportOutcome, Prompter, import_document};
use crate::platform::web::{BrowserPrompter, describe, download, reload};
use crate::settings::sticky_carrot_notice;

const CONTAINER_ID: &str = "checklist";
const MENU_BUTTON_CLASS: &str = "block w-full px-3 py-2 text-left text-sm hover:bg-gray-50";

/// Build the checklist into `#checklist`, creating it if the page has none
pub fn mount(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    let document = document()?;
    let container = match document.get_element_by_id(CONTAINER_ID) {
        Some(el) => el,
        None => {
            let el = element(&document, "div", "")?;
            el.set_id(CONTAINER_ID);
            document
                .body()
                .ok_or_else(|| JsValue::from_str("no body"))?
                .append_child(&el)?;
            el
        }
    };

    let note_box = build_note_box(&document, app.clone())?;
    let list = build_groups(&document, app.clone())?;
    let toolbar = build_toolbar(&document, app, &note_box)?;

    container.append_child(&list)?;
    container.append_child(&note_box)?;
    container.append_child(&toolbar)?;
    Ok(())
}

fn build_note_box(document: &Document, app: Rc<RefCell<App>>) -> Result<HtmlTextAreaElement, JsValue> {
    let note_box: HtmlTextAreaElement = typed(document, "textarea", "mt-6 w-full rounded border p-2")?;
    note_box.set_value(&app.borrow().store.load_note());
    note_box.set_placeholder("Notes...");

    let note_clone = note_box.clone();
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: Event| {
        app.borrow_mut().store.save_note(&note_clone.value());
    });
    note_box.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())?;
    closure.forget();

    Ok(note_box)
}

fn build_groups(document: &Document, app: Rc<RefCell<App>>) -> Result<Element, JsValue> {
    let list = element(document, "div", "space-y-6")?;
    let groups = app.borrow().groups.clone();
    let last = groups.len().saturating_sub(1);

    for (idx, group) in groups.iter().enumerate() {
        let section = element(document, "section", "space-y-3")?;

        let heading = element(
            document,
            "h2",
            "text-sm font-semibold text-gray-600 uppercase tracking-wide",
        )?;
        heading.set_text_content(Some(&group.title));
        section.append_child(&heading)?;

        for task in &group.tasks {
            let item = element(document, "label", "flex items-center justify-between py-3")?;

            let span = element(document, "span", "text-gray-800")?;
            span.set_text_content(Some(&task.text));

            let checkbox: HtmlInputElement = typed(document, "input", "ml-4 h-4 w-4")?;
            checkbox.set_type("checkbox");
            checkbox.set_checked(app.borrow().state.is_completed(task.id));

            let app = app.clone();
            let task_id = task.id;
            let checkbox_clone = checkbox.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: Event| {
                app.borrow_mut().toggle(task_id, checkbox_clone.checked());
            });
            checkbox.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())?;
            closure.forget();

            item.append_child(&span)?;
            item.append_child(&checkbox)?;
            section.append_child(&item)?;
        }

        if idx < last {
            let divider = element(document, "div", "border-b border-gray-200")?;
            section.append_child(&divider)?;
        }

        list.append_child(&section)?;
    }

    Ok(list)
}

fn build_toolbar(
    document: &Document,
    app: Rc<RefCell<App>>,
    note_box: &HtmlTextAreaElement,
) -> Result<Element, JsValue> {
    let toolbar = element(document, "div", "pt-4 flex justify-end")?;
    let menu = element(document, "details", "relative")?;

    let summary = element(document, "summary", "cursor-pointer text-sm text-gray-600")?;
    summary.set_text_content(Some("More"));
    menu.append_child(&summary)?;

    let menu_list = element(
        document,
        "div",
        "absolute right-0 mt-2 w-44 rounded-md border border-gray-200 bg-white shadow",
    )?;

    {
        let app = app.clone();
        let note_box = note_box.clone();
        menu_list.append_child(&menu_button(document, "Export HTML", move || {
            let a = app.borrow();
            match export_summary_document(&a.groups, &a.state, &note_box.value()) {
                Ok(file) => deliver(&file),
                Err(e) => log::error!("Summary export failed: {}", e),
            }
        })?)?;
    }

    {
        let app = app.clone();
        let note_box = note_box.clone();
        menu_list.append_child(&menu_button(document, "Export CSV", move || {
            let a = app.borrow();
            deliver(&export_csv(&a.groups, &a.state, &note_box.value()));
        })?)?;
    }

    {
        let app = app.clone();
        menu_list.append_child(&menu_button(document, "Import JSON", move || {
            if let Err(e) = open_import_picker(app.clone()) {
                log::error!("Import picker failed: {}", describe(&e));
            }
        })?)?;
    }

    menu_list.append_child(&menu_button(document, "Settings", move || {
        let message = {
            let mut a = app.borrow_mut();
            a.settings.sticky_carrot = !a.settings.sticky_carrot;
            a.save_settings();
            sticky_carrot_notice(&a.settings, a.feature_flags())
        };
        BrowserPrompter.alert(message);
    })?)?;

    menu.append_child(&menu_list)?;
    toolbar.append_child(&menu)?;
    Ok(toolbar)
}

fn menu_button(
    document: &Document,
    label: &str,
    mut on_click: impl FnMut() + 'static,
) -> Result<HtmlButtonElement, JsValue> {
    let button: HtmlButtonElement = typed(document, "button", MENU_BUTTON_CLASS)?;
    button.set_text_content(Some(label));
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| on_click());
    button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(button)
}

fn deliver(file: &ExportFile) {
    if let Err(e) = download(file) {
        log::error!("Download of {} failed: {}", file.filename, describe(&e));
    }
}

/// File picker -> read -> confirm -> write -> reload
fn open_import_picker(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    let document = document()?;
    let input: HtmlInputElement = typed(&document, "input", "")?;
    input.set_type("file");
    input.set_accept("application/json");

    let input_clone = input.clone();
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: Event| {
        let Some(file) = input_clone.files().and_then(|files| files.get(0)) else {
            return;
        };
        let app = app.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let text = match JsFuture::from(file.text()).await {
                Ok(text) => text.as_string().unwrap_or_default(),
                Err(e) => {
                    log::warn!("Could not read {}: {}", file.name(), describe(&e));
                    BrowserPrompter.alert("Could not read file");
                    return;
                }
            };

            let outcome = {
                let mut a = app.borrow_mut();
                import_document(&text, &mut a.store, &mut BrowserPrompter)
            };
            if outcome == ImportOutcome::Applied {
                reload();
            }
        });
    });
    input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())?;
    closure.forget();

    input.click();
    Ok(())
}
