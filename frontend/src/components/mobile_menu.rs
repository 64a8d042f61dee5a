use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, KeyboardEvent};

use crate::config::selectors;
use crate::view::{self, safe_query, DomNode, EventListener, ViewNode};

const FOCUSABLE: &str = "a, button, input, [tabindex]:not([tabindex=\"-1\"])";
const FOCUS_DELAY_MS: u32 = 100;

struct Drawer {
    open_button: DomNode,
    nav: DomNode,
    focus: RefCell<Option<Timeout>>,
}

impl Drawer {
    fn is_open(&self) -> bool {
        self.nav.has_class(selectors::MOBILE_NAV_OPEN_CLASS)
    }

    fn open(&self) {
        self.nav.add_class(selectors::MOBILE_NAV_OPEN_CLASS);
        self.nav.set_attribute("aria-hidden", "false");
        set_body_overflow("hidden");

        if let Some(first) = self.nav.find(FOCUSABLE) {
            let timeout = Timeout::new(FOCUS_DELAY_MS, move || first.focus());
            self.focus.replace(Some(timeout));
        }
    }

    fn close(&self) {
        self.focus.replace(None);
        self.nav.remove_class(selectors::MOBILE_NAV_OPEN_CLASS);
        self.nav.set_attribute("aria-hidden", "true");
        set_body_overflow("");
        self.open_button.focus();
    }
}

fn set_body_overflow(value: &str) {
    if let Some(body) = view::document().and_then(|d| d.body()) {
        let _ = body.style().set_property("overflow", value);
    }
}

fn is_same_target(event: &Event, node: &DomNode) -> bool {
    event
        .target()
        .map_or(false, |t| &t == node.target())
}

/// Mobile navigation drawer.
pub struct MobileMenu {
    drawer: Rc<Drawer>,
    _listeners: Vec<EventListener>,
}

impl MobileMenu {
    pub fn install() -> Option<Self> {
        let open_button = safe_query(selectors::MENU_OPEN)?;
        let nav = safe_query(selectors::MOBILE_NAV)?;
        let close_button = nav.find(selectors::MOBILE_NAV_CLOSE);
        let drawer = Rc::new(Drawer { open_button, nav, focus: RefCell::new(None) });
        let mut listeners = Vec::new();

        let d = drawer.clone();
        listeners.push(EventListener::new(drawer.open_button.target(), "click", move |_| d.open()));

        if let Some(close) = close_button {
            let d = drawer.clone();
            listeners.push(EventListener::new(close.target(), "click", move |_| d.close()));
        }

        // Clicks on the backdrop (the drawer itself, not its content) close it.
        let d = drawer.clone();
        listeners.push(EventListener::new(drawer.nav.target(), "click", move |event: Event| {
            if is_same_target(&event, &d.nav) {
                d.close();
            }
        }));

        if let Some(document) = view::document_target() {
            let d = drawer.clone();
            listeners.push(EventListener::new(&document, "keydown", move |event: Event| {
                let escape = event.dyn_ref::<KeyboardEvent>().map_or(false, |e| e.key() == "Escape");
                if escape && d.is_open() {
                    d.close();
                }
            }));
        }

        for link in drawer.nav.find_all("a") {
            let is_anchor = link.attribute("href").map_or(false, |href| href.starts_with('#'));
            if !is_anchor {
                continue;
            }
            let d = drawer.clone();
            let target: EventTarget = link.target().clone();
            listeners.push(EventListener::new(&target, "click", move |_| d.close()));
        }

        debug!("mobile menu: installed");
        Some(Self { drawer, _listeners: listeners })
    }
}

impl Drop for MobileMenu {
    fn drop(&mut self) {
        self.drawer.focus.replace(None);
        if self.drawer.is_open() {
            set_body_overflow("");
        }
    }
}
