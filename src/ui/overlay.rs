//! Sticky Carrot overlay: launcher, canvas drawing and the frame loop

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, KeyboardEvent, PointerEvent};

use super::{App, document, element, typed};
use crate::audio::{AudioManager, SoundEffect};
use crate::game::{Board, CELL, GRID_H, GRID_W, GameEvent, Nudge, Round, RoundInput, RoundPhase, tick};
use crate::import::Prompter;
use crate::platform::web::{BrowserPrompter, describe, now_seed};

const OVERLAY_ID: &str = "sticky-carrot-overlay";

const DIRT: &str = "#4a2e1b";
const HOLE: &str = "#2b1b0f";
const SHARD: &str = "#ff7f0e";
const BRUSH: &str = "#ffffff";

/// Carrot button in the corner plus the Shift+G shortcut
pub fn install_launcher(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    let document = document()?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

    let button = element(&document, "button", "")?;
    button.set_text_content(Some("\u{1F955}"));
    button.set_attribute(
        "style",
        "position:fixed;right:8px;bottom:8px;background:transparent;border:none;cursor:pointer;opacity:0.3",
    )?;
    button.set_attribute("aria-label", "Sticky Carrot")?;
    document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?
        .append_child(&button)?;

    {
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            launch(app.clone());
        });
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
        if event.shift_key() && event.key().eq_ignore_ascii_case("g") {
            launch(app.clone());
        }
    });
    window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
    closure.forget();

    log::info!("Sticky Carrot ready (Shift+G)");
    Ok(())
}

fn launch(app: Rc<RefCell<App>>) {
    let already_open = document()
        .ok()
        .and_then(|d| d.get_element_by_id(OVERLAY_ID))
        .is_some();
    if already_open {
        return;
    }
    if let Err(e) = open_game(app) {
        log::error!("Could not open Sticky Carrot: {}", describe(&e));
    }
}

/// Overlay instance
struct Game {
    app: Rc<RefCell<App>>,
    round: Round,
    input: RoundInput,
    last_time: f64,
    brushing: bool,
    audio: AudioManager,
    overlay: Element,
    hud: Element,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    keydown: Option<Closure<dyn FnMut(KeyboardEvent)>>,
    pointer: Vec<PointerListener>,
}

impl Game {
    fn pointer_pos(&self, event: &PointerEvent) -> Vec2 {
        let rect = self.canvas.get_bounding_client_rect();
        Vec2::new(
            (event.client_x() as f64 - rect.left()) as f32,
            (event.client_y() as f64 - rect.top()) as f32,
        )
    }

    fn draw(&self) {
        for y in 0..GRID_H {
            for x in 0..GRID_W {
                let color = match (self.round.board.is_revealed(x, y), self.round.board.has_shard(x, y)) {
                    (false, _) => DIRT,
                    (true, true) => SHARD,
                    (true, false) => HOLE,
                };
                self.ctx.set_fill_style_str(color);
                self.ctx.fill_rect(
                    (x * CELL) as f64,
                    (y * CELL) as f64,
                    CELL as f64,
                    CELL as f64,
                );
            }
        }

        let p = self.round.pointer;
        self.ctx.set_fill_style_str(BRUSH);
        self.ctx.fill_rect(p.x as f64 - 2.0, p.y as f64 - 2.0, 4.0, 4.0);

        let mut hud = format!(
            "Time: {}s   Meter: {}   {}",
            self.round.seconds_left(),
            self.round.meter,
            if self.round.muted { "Muted (M)" } else { "Sound on (M)" },
        );
        if self.round.phase == RoundPhase::Paused {
            hud.push_str("   Paused - Esc to resume");
        }
        self.hud.set_text_content(Some(&hud));
    }

    /// Detach every listener and remove the overlay
    ///
    /// Dropping the closures releases their `Rc<RefCell<Game>>` clones, so the
    /// round (and its audio context) is freed once the frame loop lets go.
    fn close(&mut self) {
        if let Some(keydown) = self.keydown.take() {
            if let Some(window) = web_sys::window() {
                let _ = window
                    .remove_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref());
            }
        }
        for (name, closure) in self.pointer.drain(..) {
            let _ = self
                .canvas
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
        self.overlay.remove();
    }
}

fn open_game(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    let document = document()?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let settings = app.borrow().settings.clone();

    let overlay = element(&document, "div", "")?;
    overlay.set_id(OVERLAY_ID);
    overlay.set_attribute(
        "style",
        "position:fixed;inset:0;background:#2b1b0f;display:flex;flex-direction:column;\
         align-items:center;justify-content:center;z-index:9999;font-family:monospace;color:#fff",
    )?;

    let hud = element(&document, "div", "")?;
    hud.set_attribute("style", "margin-bottom:8px")?;

    let size = Board::pixel_size();
    let canvas: HtmlCanvasElement = typed(&document, "canvas", "")?;
    canvas.set_width(size.x as u32);
    canvas.set_height(size.y as u32);
    canvas.set_attribute(
        "style",
        "border:4px solid #fff;image-rendering:pixelated;cursor:crosshair;touch-action:none",
    )?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    let help = element(&document, "div", "")?;
    help.set_text_content(Some("Brush to find carrot shards. Arrows move, Esc pauses, Q quits."));
    help.set_attribute("style", "margin-top:8px;opacity:0.7")?;

    overlay.append_child(&hud)?;
    overlay.append_child(&canvas)?;
    overlay.append_child(&help)?;
    document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?
        .append_child(&overlay)?;

    let seed = now_seed();
    log::info!("Sticky Carrot round started with seed: {}", seed);

    let game = Rc::new(RefCell::new(Game {
        app,
        round: Round::new(seed, &settings),
        input: RoundInput::default(),
        last_time: 0.0,
        brushing: false,
        audio: AudioManager::new(settings.game_muted),
        overlay,
        hud,
        canvas: canvas.clone(),
        ctx,
        keydown: None,
        pointer: Vec::new(),
    }));

    let pointer = setup_pointer_handlers(&canvas, &game)?;
    game.borrow_mut().pointer = pointer;

    let keydown = {
        let game = game.clone();
        Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let mut g = game.borrow_mut();
            let key = event.key();
            if let Some(nudge) = Nudge::from_key(&key) {
                event.prevent_default();
                g.input.nudges.push(nudge);
                return;
            }
            match key.as_str() {
                "Escape" => g.input.pause = true,
                "m" | "M" => g.input.mute = true,
                "q" | "Q" => g.input.quit = true,
                _ => {}
            }
        })
    };
    window.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
    game.borrow_mut().keydown = Some(keydown);

    game.borrow().draw();
    request_animation_frame(game);
    Ok(())
}

type PointerListener = (&'static str, Closure<dyn FnMut(PointerEvent)>);

fn setup_pointer_handlers(
    canvas: &HtmlCanvasElement,
    game: &Rc<RefCell<Game>>,
) -> Result<Vec<PointerListener>, JsValue> {
    let mut listeners: Vec<PointerListener> = Vec::new();

    // Pointer down - start brushing
    {
        let game = game.clone();
        let canvas_clone = canvas.clone();
        listeners.push((
            "pointerdown",
            Closure::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                g.brushing = true;
                let _ = canvas_clone.set_pointer_capture(event.pointer_id());
                let pos = g.pointer_pos(&event);
                g.input.strokes.push(pos);
            }),
        ));
    }

    // Pointer move - brush while pressed
    {
        let game = game.clone();
        listeners.push((
            "pointermove",
            Closure::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                if g.brushing {
                    let pos = g.pointer_pos(&event);
                    g.input.strokes.push(pos);
                }
            }),
        ));
    }

    // Pointer up / cancel - stop brushing
    for name in ["pointerup", "pointercancel"] {
        let game = game.clone();
        listeners.push((
            name,
            Closure::new(move |_event: PointerEvent| {
                game.borrow_mut().brushing = false;
            }),
        ));
    }

    for (name, closure) in &listeners {
        canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
    }
    Ok(listeners)
}

fn request_animation_frame(game: Rc<RefCell<Game>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    // Freed by wasm-bindgen after its single call
    let callback = Closure::once_into_js(move |time: f64| {
        game_loop(game, time);
    });
    let _ = window.request_animation_frame(callback.unchecked_ref());
}

fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
    let finished_score = {
        let mut g = game.borrow_mut();

        let dt = if g.last_time > 0.0 {
            (time - g.last_time) as f32
        } else {
            0.0
        };
        g.last_time = time;

        let input = std::mem::take(&mut g.input);
        tick(&mut g.round, &input, dt);

        let mut finished_score = None;
        let mut closed = false;
        for event in g.round.drain_events() {
            match event {
                GameEvent::Beep => g.audio.play(SoundEffect::ShardFound),
                GameEvent::MuteChanged { muted } => {
                    g.audio.set_muted(muted);
                    let mut app = g.app.borrow_mut();
                    app.settings.game_muted = muted;
                    app.save_settings();
                }
                GameEvent::Finished { score } => {
                    g.audio.play(SoundEffect::RoundEnd);
                    finished_score = Some(score);
                    closed = true;
                }
                GameEvent::Quit => closed = true,
                GameEvent::Revealed { .. }
                | GameEvent::ShardFound { .. }
                | GameEvent::Paused
                | GameEvent::Resumed => {}
            }
        }

        if closed {
            g.close();
            // Loop stops here; `game` drops with this frame
            if finished_score.is_none() {
                log::info!("Sticky Carrot closed");
                return;
            }
        } else {
            g.draw();
        }
        finished_score
    };

    match finished_score {
        Some(score) => BrowserPrompter.alert(&format!("Carrot shards collected: {}", score)),
        None => request_animation_frame(game),
    }
}
