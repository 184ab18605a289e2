//! Browser bridge: `localStorage`, the address bar, keyboard input and timers.
//!
//! The archive itself is plain Rust; this module owns the single live instance
//! and exposes it to JS. After every state change a `wordle-archive:update`
//! event is dispatched on `document` so the page can pull a fresh `view()`.

use std::cell::{Cell, RefCell};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Storage, window};

use crate::app::Archive;
use crate::config::ArchiveConfig;
use crate::error::{ArchiveError, Result};
use crate::puzzle::Navigation;
use crate::storage::KeyValueStore;

pub const UPDATE_EVENT: &str = "wordle-archive:update";

fn js_err(err: JsValue) -> ArchiveError {
    ArchiveError::Storage(format!("{err:?}"))
}

fn to_js(err: ArchiveError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// `window.localStorage` as a [`KeyValueStore`].
pub struct BrowserStore {
    storage: Storage,
}

impl BrowserStore {
    pub fn open() -> Result<Self> {
        let win = window().ok_or_else(|| ArchiveError::Storage("no window".into()))?;
        let storage = win
            .local_storage()
            .map_err(js_err)?
            .ok_or_else(|| ArchiveError::Storage("localStorage unavailable".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for BrowserStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(js_err)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage.set_item(key, value).map_err(js_err)
    }
}

thread_local! {
    static ARCHIVE: RefCell<Option<Archive<BrowserStore>>> = const { RefCell::new(None) };
    static KEYBOARD_BOUND: Cell<bool> = const { Cell::new(false) };
}

fn with_archive<R>(f: impl FnOnce(&mut Archive<BrowserStore>) -> R) -> std::result::Result<R, JsValue> {
    ARCHIVE.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let archive = borrow
            .as_mut()
            .ok_or_else(|| JsValue::from_str("archive not started; call start_game() first"))?;
        Ok(f(archive))
    })
}

fn random_entropy() -> u64 {
    let mut buf = [0u8; 8];
    if let Err(err) = getrandom::getrandom(&mut buf) {
        log::warn!("getrandom failed ({err}); falling back to the clock");
        return chrono::Utc::now().timestamp_millis() as u64;
    }
    u64::from_le_bytes(buf)
}

/// Push state out to the page: address bar, pending modal timer, update event.
/// Must run with the archive borrow released since listeners call back in.
fn refresh() -> std::result::Result<(), JsValue> {
    let (query, day, delay) =
        with_archive(|a| (a.query(), a.day(), a.take_end_game_delay()))?;
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;

    if win.location().search()? != query {
        win.history()?
            .push_state_with_url(&JsValue::NULL, "", Some(query.as_str()))?;
    }

    if let Some(ms) = delay {
        let open = Closure::once(move || {
            if with_archive(|a| a.open_end_game_modal_for(day)).unwrap_or(false) {
                let _ = notify();
            }
        });
        win.set_timeout_with_callback_and_timeout_and_arguments_0(
            open.as_ref().unchecked_ref(),
            i32::try_from(ms).unwrap_or(i32::MAX),
        )?;
        open.forget();
    }

    notify()
}

fn notify() -> std::result::Result<(), JsValue> {
    let doc = window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let event = web_sys::Event::new(UPDATE_EVENT)?;
    doc.dispatch_event(&event)?;
    Ok(())
}

fn bind_keyboard() -> std::result::Result<(), JsValue> {
    if KEYBOARD_BOUND.with(|b| b.replace(true)) {
        return Ok(());
    }
    let doc = window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
        if evt.ctrl_key() || evt.meta_key() || evt.alt_key() {
            return;
        }
        let key = evt.key();
        if with_archive(|a| a.press_key(&key)).is_ok() {
            let _ = refresh();
        }
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Open the archive for the day in the address bar. `config_json` may override
/// [`ArchiveConfig`] fields.
#[wasm_bindgen]
pub fn start_game(config_json: Option<String>) -> std::result::Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let config = ArchiveConfig::from_json_or_default(config_json.as_deref());
    let search = win.location().search()?;
    let query = (!search.is_empty()).then_some(search.as_str());
    let now = chrono::Local::now().naive_local();

    let store = BrowserStore::open().map_err(to_js)?;
    let archive = Archive::new(store, crate::words::EmbeddedWords, config, now, query)
        .map_err(to_js)?;
    ARCHIVE.with(|cell| cell.replace(Some(archive)));

    bind_keyboard()?;
    refresh()
}

/// On-screen keyboard: same values as `KeyboardEvent.key`.
#[wasm_bindgen]
pub fn key_down(key: &str) -> std::result::Result<(), JsValue> {
    with_archive(|a| a.press_key(key))?;
    refresh()
}

#[wasm_bindgen]
pub fn play_day(day: u32) -> std::result::Result<(), JsValue> {
    with_archive(|a| a.play_day(day))?.map_err(to_js)?;
    refresh()
}

/// `first`, `previous`, `next`, `last` or `random`.
#[wasm_bindgen]
pub fn navigate(name: &str) -> std::result::Result<u32, JsValue> {
    let nav = Navigation::from_name(name, random_entropy())
        .ok_or_else(|| JsValue::from_str(&format!("unknown navigation '{name}'")))?;
    let day = with_archive(|a| a.navigate(nav))?.map_err(to_js)?;
    refresh()?;
    Ok(day)
}

#[wasm_bindgen]
pub fn clear_solution() -> std::result::Result<(), JsValue> {
    with_archive(|a| a.clear_solution())?.map_err(to_js)?;
    refresh()
}

#[wasm_bindgen]
pub fn toggle_dark_mode() -> std::result::Result<(), JsValue> {
    with_archive(|a| a.toggle_dark_mode())?;
    refresh()
}

#[wasm_bindgen]
pub fn toggle_colorblind_mode() -> std::result::Result<(), JsValue> {
    with_archive(|a| a.toggle_colorblind_mode())?;
    refresh()
}

#[wasm_bindgen]
pub fn open_results() -> std::result::Result<(), JsValue> {
    with_archive(|a| a.open_end_game_modal())?;
    refresh()
}

#[wasm_bindgen]
pub fn close_modal() -> std::result::Result<(), JsValue> {
    with_archive(|a| a.close_modal())?;
    refresh()
}

#[wasm_bindgen]
pub fn play_again() -> std::result::Result<(), JsValue> {
    with_archive(|a| a.play_again())?;
    refresh()
}

#[wasm_bindgen]
pub fn open_intro() -> std::result::Result<(), JsValue> {
    with_archive(|a| a.open_intro())?;
    refresh()
}

#[wasm_bindgen]
pub fn dismiss_intro() -> std::result::Result<(), JsValue> {
    with_archive(|a| a.dismiss_intro())?;
    refresh()
}

/// Current view as JSON.
#[wasm_bindgen]
pub fn view() -> std::result::Result<String, JsValue> {
    let view = with_archive(|a| a.view())?;
    serde_json::to_string(&view).map_err(|e| to_js(e.into()))
}

/// Day picker entries as JSON.
#[wasm_bindgen]
pub fn menu() -> std::result::Result<String, JsValue> {
    let menu = with_archive(|a| a.menu())?;
    serde_json::to_string(&menu).map_err(|e| to_js(e.into()))
}
