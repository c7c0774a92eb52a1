//! Browser host: binds the guard to the live DOM.
//!
//! Usage from the page:
//! ```js
//! import init, { initialize } from "./swap_guard.js";
//! await init();
//! initialize();
//! ```
//! `initialize` may be called before the document is parsed; it then waits
//! for `DOMContentLoaded`. Guarded elements are tagged with
//! `data-swap-guard`, and tagged elements are skipped by later calls.

mod console;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, DocumentReadyState, Element, Event, Window};

use crate::config::GuardConfig;
use crate::guard::ConfirmationGuard;
use crate::host::{Confirm, Link, LinkSource, NavigationEvent};
use crate::matcher::HrefMatcher;

pub use console::init_logging;

/// Attribute set on every element that already has a click handler.
pub const ATTACHED_ATTRIBUTE: &str = "data-swap-guard";

#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("no global `window` object")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("JavaScript error: {0}")]
    Js(String),
}

impl From<JsValue> for BrowserError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                value
                    .dyn_ref::<js_sys::Error>()
                    .map(|error| String::from(error.message()))
            })
            .unwrap_or_else(|| format!("{value:?}"));
        BrowserError::Js(message)
    }
}

impl From<BrowserError> for JsValue {
    fn from(error: BrowserError) -> Self {
        js_sys::Error::new(&error.to_string()).into()
    }
}

// Listener closures must outlive `attach`; the page lifetime bounds them.
thread_local! {
    static LISTENERS: RefCell<Vec<Closure<dyn FnMut(Event)>>> = const { RefCell::new(Vec::new()) };
}

pub struct BrowserLink(Element);

impl BrowserLink {
    pub fn element(&self) -> &Element {
        &self.0
    }
}

impl Link for BrowserLink {
    fn href(&self) -> Option<String> {
        self.0.get_attribute("href")
    }
}

/// Anchors of a document that match the CSS pre-filter and are not guarded yet.
pub struct BrowserDocument {
    document: Document,
    selector: String,
}

impl BrowserDocument {
    pub fn new(document: Document, matcher: &HrefMatcher) -> Self {
        let selector = format!("{}:not([{ATTACHED_ATTRIBUTE}])", matcher.css_selector());
        Self { document, selector }
    }
}

impl LinkSource for BrowserDocument {
    type Link = BrowserLink;

    fn links(&self) -> Vec<BrowserLink> {
        let Ok(nodes) = self.document.query_selector_all(&self.selector) else {
            log::warn!("invalid link selector {}", self.selector);
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|index| nodes.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(BrowserLink)
            .collect()
    }
}

impl NavigationEvent for Event {
    fn prevent_default(&self) {
        Event::prevent_default(self);
    }
}

/// `window.confirm`. A dialog that throws counts as a decline.
pub struct WindowConfirm(Window);

impl WindowConfirm {
    pub fn new(window: Window) -> Self {
        Self(window)
    }
}

impl Confirm for WindowConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        self.0.confirm_with_message(message).unwrap_or(false)
    }
}

/// Guards the matching links of `document` right now.
///
/// Returns how many links got a new click handler.
pub fn attach<C>(
    document: &Document,
    config: GuardConfig,
    confirm: C,
) -> Result<usize, BrowserError>
where
    C: Confirm + 'static,
{
    let source = BrowserDocument::new(document.clone(), &config.matcher());
    let guard = Rc::new(RefCell::new(ConfirmationGuard::new(config)));
    let confirm = Rc::new(RefCell::new(confirm));

    let elements: Vec<Element> = guard
        .borrow_mut()
        .initialize(&source)
        .iter()
        .map(|guarded| guarded.link().element().clone())
        .collect();

    for (index, element) in elements.iter().enumerate() {
        let listener = Closure::<dyn FnMut(Event)>::new({
            let guard = Rc::clone(&guard);
            let confirm = Rc::clone(&confirm);
            move |event: Event| {
                let (Ok(mut guard), Ok(mut confirm)) =
                    (guard.try_borrow_mut(), confirm.try_borrow_mut())
                else {
                    log::warn!("click on guarded link {index} while a prompt is open, blocking");
                    NavigationEvent::prevent_default(&event);
                    return;
                };
                guard.handle_click(index, &mut *confirm, &event);
            }
        });
        element.add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())?;
        LISTENERS.with(|listeners| listeners.borrow_mut().push(listener));
        // Tagged only once the listener is in place, so a failed registration
        // is retried by the next `initialize`.
        element.set_attribute(ATTACHED_ATTRIBUTE, "attached")?;
    }
    Ok(elements.len())
}

/// What [`attach_when_ready`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduled {
    /// The document was ready; this many links were guarded.
    Attached(usize),
    /// The document is still loading; guarding happens on `DOMContentLoaded`.
    Deferred,
}

/// Runs [`attach`] now, or on `DOMContentLoaded` while `ready_state` is
/// `loading`.
pub fn attach_when_ready<C>(
    document: &Document,
    ready_state: DocumentReadyState,
    config: GuardConfig,
    confirm: C,
) -> Result<Scheduled, BrowserError>
where
    C: Confirm + 'static,
{
    if ready_state != DocumentReadyState::Loading {
        return attach(document, config, confirm).map(Scheduled::Attached);
    }

    log::debug!("document still loading, waiting for DOMContentLoaded");
    let on_ready = Closure::once_into_js({
        let document = document.clone();
        move || {
            if let Err(error) = attach(&document, config, confirm) {
                log::error!("failed to attach confirmation guard: {error}");
            }
        }
    });
    document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())?;
    Ok(Scheduled::Deferred)
}

/// Guards the page with `config`, deferring until the document is parsed.
pub fn initialize_with(config: GuardConfig) -> Result<Scheduled, BrowserError> {
    let window = web_sys::window().ok_or(BrowserError::NoWindow)?;
    let document = window.document().ok_or(BrowserError::NoDocument)?;
    let ready_state = document.ready_state();
    attach_when_ready(&document, ready_state, config, WindowConfirm::new(window))
}

/// Guards every `delete_swap` link with the stock prompt.
#[wasm_bindgen]
pub fn initialize() -> Result<(), JsValue> {
    initialize_with(GuardConfig::default())?;
    Ok(())
}

/// Same as `initialize`, configured from a TOML document.
#[wasm_bindgen(js_name = initializeWithConfig)]
pub fn initialize_with_config(config: &str) -> Result<(), JsValue> {
    let config = GuardConfig::from_toml_str(config)
        .map_err(|error| js_sys::Error::new(&error.to_string()))?;
    initialize_with(config)?;
    Ok(())
}

/// Routes `log` output to the browser console.
#[wasm_bindgen(js_name = enableLogging)]
pub fn enable_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    init_logging(level);
}
